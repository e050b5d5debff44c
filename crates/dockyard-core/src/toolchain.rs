use serde::{Deserialize, Serialize};

/// Package manager that owns the dependency layer and the run wrapper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolchain {
    /// Python projects managed by uv (`pyproject.toml` + `uv.lock`).
    #[default]
    Uv,
    /// Node projects managed by npm (`package.json` + `package-lock.json`).
    Npm,
}

impl Toolchain {
    pub fn name(self) -> &'static str {
        match self {
            Self::Uv => "uv",
            Self::Npm => "npm",
        }
    }

    /// Pinned image bundling the interpreter and the package manager.
    pub fn default_base_image(self) -> &'static str {
        match self {
            Self::Uv => "ghcr.io/astral-sh/uv:0.5.11-python3.13-bookworm-slim",
            Self::Npm => "node:22.12.0-bookworm-slim",
        }
    }

    /// Interpreter version pin read by the package manager during install.
    pub fn default_version_pin(self) -> Option<&'static str> {
        match self {
            Self::Uv => Some(".python-version"),
            Self::Npm => None,
        }
    }

    pub fn default_manifest(self) -> &'static str {
        match self {
            Self::Uv => "pyproject.toml",
            Self::Npm => "package.json",
        }
    }

    pub fn default_lockfile(self) -> &'static str {
        match self {
            Self::Uv => "uv.lock",
            Self::Npm => "package-lock.json",
        }
    }

    pub fn default_entry(self) -> &'static str {
        match self {
            Self::Uv => "main.py",
            Self::Npm => "index.js",
        }
    }

    /// Locked, non-interactive install of dependencies only.
    ///
    /// Both commands fail when the lockfile no longer matches the manifest
    /// instead of re-resolving.
    pub fn install_command(self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::Uv => &["uv", "sync", "--locked", "--no-install-project"],
            Self::Npm => &["npm", "ci", "--omit=dev", "--ignore-scripts"],
        };
        args.iter().map(|s| (*s).to_owned()).collect()
    }

    /// Entrypoint that runs `./<entry>` inside the installed environment.
    pub fn run_command(self, entry: &str) -> Vec<String> {
        let script = format!("./{entry}");
        let wrapper: &[&str] = match self {
            Self::Uv => &["uv", "run"],
            Self::Npm => &["npm", "exec", "--offline", "--", "node"],
        };
        wrapper
            .iter()
            .map(|s| (*s).to_owned())
            .chain(std::iter::once(script))
            .collect()
    }
}
