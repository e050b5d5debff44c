use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::JellyfinError;

const CLIENT_NAME: &str = "dockyard";

/// A Jellyfin library ("virtual folder"). Only the fields dockyard uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Library {
    pub name: String,
    #[serde(default)]
    pub locations: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AddPathRequest<'a> {
    name: &'a str,
    path_info: PathInfo<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PathInfo<'a> {
    path: &'a str,
}

/// Client for the Jellyfin server API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct JellyfinClient {
    http: reqwest::Client,
    base_url: Url,
    authorization: String,
}

impl std::fmt::Debug for JellyfinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JellyfinClient")
            .field("base_url", &self.base_url.as_str())
            .field("authorization", &"[REDACTED]")
            .finish()
    }
}

impl JellyfinClient {
    pub fn new(base_url: &str, api_key: &SecretString) -> Result<Self, JellyfinError> {
        let base_url = Url::parse(base_url).map_err(|e| JellyfinError::InvalidUrl {
            url: base_url.to_owned(),
            source: e,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(JellyfinError::InvalidUrl {
                url: base_url.to_string(),
                source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
            });
        }

        let token: String =
            url::form_urlencoded::byte_serialize(api_key.expose_secret().as_bytes()).collect();
        let authorization = format!(
            "MediaBrowser Token=\"{token}\", Client=\"{CLIENT_NAME}\", Version=\"{version}\", Device=\"{CLIENT_NAME}\", DeviceId=\"{CLIENT_NAME}\"",
            version = env!("CARGO_PKG_VERSION"),
        );

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            authorization,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, JellyfinError> {
        self.base_url
            .join(path)
            .map_err(|e| JellyfinError::InvalidUrl {
                url: format!("{}{path}", self.base_url),
                source: e,
            })
    }

    /// All libraries configured on the server.
    pub async fn get_libraries(&self) -> Result<Vec<Library>, JellyfinError> {
        let url = self.endpoint("/Library/VirtualFolders")?;
        tracing::debug!(%url, "fetching libraries");

        let response = self
            .http
            .get(url.clone())
            .header("Authentication", &self.authorization)
            .send()
            .await
            .map_err(|e| JellyfinError::Request {
                url: url.to_string(),
                source: e,
            })?
            .error_for_status()
            .map_err(|e| JellyfinError::Status {
                url: url.to_string(),
                source: e,
            })?;

        response
            .json::<Vec<Library>>()
            .await
            .map_err(|e| JellyfinError::Decode {
                url: url.to_string(),
                source: e,
            })
    }

    /// Add a folder to a library, optionally triggering a library scan.
    pub async fn add_path_to_library(
        &self,
        library_name: &str,
        folder_path: &str,
        refresh_library: bool,
    ) -> Result<(), JellyfinError> {
        let mut url = self.endpoint("/Library/VirtualFolders/Paths")?;
        url.query_pairs_mut()
            .append_pair("refreshLibrary", if refresh_library { "true" } else { "false" });

        let body = AddPathRequest {
            name: library_name,
            path_info: PathInfo { path: folder_path },
        };

        tracing::debug!(library = library_name, path = folder_path, refresh_library, "adding path");
        self.http
            .post(url.clone())
            .header("Authentication", &self.authorization)
            .json(&body)
            .send()
            .await
            .map_err(|e| JellyfinError::Request {
                url: url.to_string(),
                source: e,
            })?
            .error_for_status()
            .map_err(|e| JellyfinError::Status {
                url: url.to_string(),
                source: e,
            })?;

        Ok(())
    }
}
