use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::Toolchain;

/// File name of the project configuration.
pub const CONFIG_FILE: &str = "dockyard.toml";

/// dockyard.toml configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DockyardConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (defaults to the project directory name)
    pub name: Option<String>,
}

/// Inputs of the image build. Unset fields fall back to the toolchain's
/// defaults through the accessor methods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Package manager owning the dependency layer
    #[serde(default)]
    pub toolchain: Toolchain,
    /// Pinned base image bundling interpreter and package manager
    pub base_image: Option<String>,
    /// Working directory inside the image
    #[serde(default = "default_workdir")]
    pub workdir: String,
    /// Interpreter version pin file; an empty string disables it
    pub version_pin: Option<String>,
    /// Dependency declaration file
    pub manifest: Option<String>,
    /// Dependency lockfile
    pub lockfile: Option<String>,
    /// Application source paths, copied after the dependency install
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
    /// Entry script executed through the run wrapper
    pub entry: Option<String>,
    /// Tag for the built image (defaults to `<project>:latest`)
    pub tag: Option<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            toolchain: Toolchain::default(),
            base_image: None,
            workdir: default_workdir(),
            version_pin: None,
            manifest: None,
            lockfile: None,
            sources: default_sources(),
            entry: None,
            tag: None,
        }
    }
}

impl ImageConfig {
    pub fn base_image(&self) -> &str {
        self.base_image
            .as_deref()
            .unwrap_or(self.toolchain.default_base_image())
    }

    pub fn version_pin(&self) -> Option<&str> {
        match self.version_pin.as_deref() {
            Some("") => None,
            Some(pin) => Some(pin),
            None => self.toolchain.default_version_pin(),
        }
    }

    pub fn manifest(&self) -> &str {
        self.manifest
            .as_deref()
            .unwrap_or(self.toolchain.default_manifest())
    }

    pub fn lockfile(&self) -> &str {
        self.lockfile
            .as_deref()
            .unwrap_or(self.toolchain.default_lockfile())
    }

    pub fn entry(&self) -> &str {
        self.entry
            .as_deref()
            .unwrap_or(self.toolchain.default_entry())
    }

    /// Version pin, manifest and lockfile, in copy order.
    pub fn dependency_files(&self) -> Vec<&str> {
        self.version_pin()
            .into_iter()
            .chain([self.manifest(), self.lockfile()])
            .collect()
    }
}

impl DockyardConfig {
    /// Load from dockyard.toml at the given path, or return defaults if not found.
    pub fn load(project_dir: &Path) -> crate::Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content =
                std::fs::read_to_string(&config_path).map_err(|e| crate::Error::ConfigLoad {
                    path: config_path.clone(),
                    source: e,
                })?;
            let config: Self = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
                path: config_path.clone(),
                source: e,
            })?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            tracing::debug!(path = %config_path.display(), "config not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Project name: configured, or derived from the directory name.
    pub fn project_name(&self, project_dir: &Path) -> String {
        if let Some(name) = &self.project.name {
            return name.clone();
        }
        let dir_name = std::path::absolute(project_dir)
            // arch-lint: allow(no-silent-result-drop) reason="an unresolvable directory falls back to the generic name"
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();
        sanitize_image_name(&dir_name)
    }

    /// Tag given to the built image.
    pub fn image_tag(&self, project_dir: &Path) -> String {
        match &self.image.tag {
            Some(tag) => tag.clone(),
            None => format!("{}:latest", self.project_name(project_dir)),
        }
    }
}

/// Reject paths that would copy from outside the build context.
pub fn validate_context_path(path: &str) -> crate::Result<()> {
    let invalid = |reason| crate::Error::InvalidPath {
        path: path.to_owned(),
        reason,
    };
    if path.trim().is_empty() {
        return Err(invalid("empty path"));
    }
    let p = Path::new(path);
    if p.is_absolute() {
        return Err(invalid("must be relative to the project directory"));
    }
    if p.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(invalid("must not contain '..'"));
    }
    if path.contains('$') {
        return Err(invalid("must not reference variables"));
    }
    Ok(())
}

fn sanitize_image_name(raw: &str) -> String {
    let name: String = raw
        .to_ascii_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let name = name.trim_matches(|c: char| !c.is_ascii_alphanumeric());
    if name.is_empty() {
        "app".to_owned()
    } else {
        name.to_owned()
    }
}

fn default_workdir() -> String {
    "/app".to_owned()
}

fn default_sources() -> Vec<String> {
    vec!["src".to_owned()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_lowercases_and_replaces() {
        assert_eq!(sanitize_image_name("My Project"), "my-project");
        assert_eq!(sanitize_image_name("__"), "app");
        assert_eq!(sanitize_image_name(""), "app");
    }

    #[test]
    fn context_path_rules() {
        assert!(validate_context_path("src").is_ok());
        assert!(validate_context_path("./main.py").is_ok());
        assert!(validate_context_path("/etc/passwd").is_err());
        assert!(validate_context_path("../outside").is_err());
        assert!(validate_context_path("src/../../x").is_err());
        assert!(validate_context_path("$HOME/src").is_err());
        assert!(validate_context_path(" ").is_err());
    }
}
