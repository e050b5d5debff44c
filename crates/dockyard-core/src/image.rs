//! Pinned container image references.
//!
//! The base image is the first input of every build, so a reference is only
//! accepted when it names an exact, reproducible image: either a digest
//! (`name@sha256:…`) or a tag that carries a full `major.minor.patch`
//! version (`22.12.0-bookworm-slim`, `0.5.11-python3.13-bookworm-slim`).
//! `latest`, missing tags, variant tags such as `bookworm`, and partial
//! versions such as `3`, `22` or `3.13-slim` are rejected.

use std::fmt;

use crate::{Error, Result};

/// A parsed `[registry/]repository[:tag][@digest]` reference.
///
/// # Examples
///
/// ```
/// use dockyard_core::ImageRef;
///
/// let image = ImageRef::parse_pinned("ghcr.io/astral-sh/uv:0.5.11-python3.13-bookworm-slim").unwrap();
/// assert_eq!(image.repository, "ghcr.io/astral-sh/uv");
/// assert_eq!(image.tag.as_deref(), Some("0.5.11-python3.13-bookworm-slim"));
///
/// assert!(ImageRef::parse_pinned("python:latest").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageRef {
    /// Parse a reference without any pinning requirement.
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidImageRef {
            reference: reference.to_owned(),
            reason,
        };

        if reference.is_empty() {
            return Err(invalid("empty reference"));
        }
        if reference.chars().any(char::is_whitespace) {
            return Err(invalid("contains whitespace"));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) => {
                validate_digest(digest).map_err(invalid)?;
                (name, Some(digest.to_owned()))
            }
            None => (reference, None),
        };

        // A ':' after the last '/' separates the tag; earlier ones belong to
        // a registry port (`localhost:5000/app`).
        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (repository, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&name[..split], Some(&name[split + 1..]))
            }
            None => (name, None),
        };

        if repository.is_empty() {
            return Err(invalid("missing repository"));
        }
        if repository.split('/').any(str::is_empty) {
            return Err(invalid("empty path component"));
        }
        let path_start = repository.find('/').map_or(0, |i| i + 1);
        if !repository[path_start..]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "._-/".contains(c))
        {
            return Err(invalid(
                "repository path must be lowercase alphanumerics and separators",
            ));
        }

        if let Some(tag) = tag {
            if tag.is_empty() {
                return Err(invalid("empty tag"));
            }
            if tag.len() > 128
                || !tag
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "._-".contains(c))
            {
                return Err(invalid("tag must be at most 128 of [A-Za-z0-9._-]"));
            }
        }

        Ok(Self {
            repository: repository.to_owned(),
            tag: tag.map(str::to_owned),
            digest,
        })
    }

    /// Parse a reference and require it to be pinned.
    pub fn parse_pinned(reference: &str) -> Result<Self> {
        let image = Self::parse(reference)?;
        if !image.is_pinned() {
            return Err(Error::FloatingImageTag {
                reference: reference.to_owned(),
            });
        }
        Ok(image)
    }

    /// A digest always pins. Otherwise the tag must contain an exact
    /// `major.minor.patch` version; registries move shorter version tags.
    pub fn is_pinned(&self) -> bool {
        if self.digest.is_some() {
            return true;
        }
        self.tag.as_deref().is_some_and(has_exact_version)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

/// True when some run of digits and dots in `tag` has at least three
/// numeric components.
fn has_exact_version(tag: &str) -> bool {
    tag.split(|c: char| !c.is_ascii_digit() && c != '.')
        .any(|run| {
            let parts: Vec<&str> = run.split('.').collect();
            parts.len() >= 3 && parts.iter().all(|p| !p.is_empty())
        })
}

fn validate_digest(digest: &str) -> std::result::Result<(), &'static str> {
    let Some((algorithm, hex)) = digest.split_once(':') else {
        return Err("digest must be <algorithm>:<hex>");
    };
    if algorithm != "sha256" {
        return Err("only sha256 digests are supported");
    }
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("sha256 digest must be 64 hex characters");
    }
    Ok(())
}
