//! Jellyfin server helpers.

mod client;
mod library;

pub use client::{JellyfinClient, Library};
pub use library::{AddOutcome, PathReplace, add_all_subdirectories, subdirectory_paths};

use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};

/// Default server when `JELLYFIN_SERVER_URL` is unset.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8096";

/// Connection settings, usually filled from `JELLYFIN_SERVER_URL` and
/// `JELLYFIN_API_KEY`.
#[derive(Debug, Clone)]
pub struct JellyfinSettings {
    pub server_url: String,
    pub api_key: Option<SecretString>,
}

impl JellyfinSettings {
    pub fn connect(&self) -> Result<JellyfinClient, JellyfinError> {
        // A blank key counts as unset.
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(JellyfinError::MissingApiKey)?;
        JellyfinClient::new(&self.server_url, api_key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JellyfinError {
    #[error(
        "JELLYFIN_API_KEY environment variable must be set or the --api-key option must be provided"
    )]
    MissingApiKey,

    #[error("both --path-replace-from and --path-replace-to must be provided together")]
    IncompletePathReplace,

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("path {0} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("invalid Jellyfin URL {url}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("request to {url} failed")]
    Request { url: String, source: reqwest::Error },

    #[error("Jellyfin returned an error for {url}")]
    Status { url: String, source: reqwest::Error },

    #[error("unexpected response from {url}")]
    Decode { url: String, source: reqwest::Error },

    #[error("library with name '{0}' not found")]
    LibraryNotFound(String),

    #[error("background task failed")]
    Join(#[from] tokio::task::JoinError),
}
