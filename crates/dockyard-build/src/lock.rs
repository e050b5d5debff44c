//! Lockfile drift detection.
//!
//! The locked install inside the image already refuses an outdated
//! lockfile, but only after the build context has been assembled and sent.
//! This check reads the manifest and lockfile locally and fails before any
//! application source is copied.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use dockyard_core::{ImageConfig, Toolchain};
use serde::Deserialize;

/// Outcome of a successful drift check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockReport {
    pub toolchain: Toolchain,
    /// Normalized names declared in the manifest.
    pub declared: Vec<String>,
    /// Number of packages recorded in the lockfile.
    pub locked: usize,
}

/// Verify that every dependency declared in the manifest is in the lockfile.
pub fn check_drift(project_dir: &Path, config: &ImageConfig) -> Result<LockReport, LockError> {
    let manifest_path = project_dir.join(config.manifest());
    let lock_path = project_dir.join(config.lockfile());

    let manifest = read(&manifest_path)?;
    let lock = read(&lock_path)?;

    let (declared, locked, root) = match config.toolchain {
        Toolchain::Uv => uv_names(&manifest_path, &manifest, &lock_path, &lock)?,
        Toolchain::Npm => npm_names(&manifest_path, &manifest, &lock_path, &lock)?,
    };

    if let Some(name) = root
        && !locked.contains(&name)
    {
        return Err(LockError::ProjectNotLocked {
            lockfile: lock_path,
            name,
        });
    }

    let missing: Vec<String> = declared
        .iter()
        .filter(|name| !locked.contains(*name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(LockError::Drift {
            lockfile: lock_path,
            missing,
        });
    }

    tracing::debug!(
        toolchain = config.toolchain.name(),
        declared = declared.len(),
        locked = locked.len(),
        "lockfile consistent with manifest"
    );

    Ok(LockReport {
        toolchain: config.toolchain,
        declared: declared.into_iter().collect(),
        locked: locked.len(),
    })
}

type Names = (BTreeSet<String>, BTreeSet<String>, Option<String>);

// ── uv ──

#[derive(Deserialize)]
struct PyProject {
    project: Option<PyProjectTable>,
    #[serde(rename = "dependency-groups", default)]
    dependency_groups: BTreeMap<String, Vec<toml::Value>>,
}

#[derive(Deserialize)]
struct PyProjectTable {
    name: Option<String>,
    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Deserialize)]
struct UvLock {
    #[serde(default)]
    package: Vec<UvPackage>,
}

#[derive(Deserialize)]
struct UvPackage {
    name: String,
}

fn uv_names(
    manifest_path: &Path,
    manifest: &str,
    lock_path: &Path,
    lock: &str,
) -> Result<Names, LockError> {
    let pyproject: PyProject = toml::from_str(manifest).map_err(|e| LockError::ParseToml {
        path: manifest_path.to_path_buf(),
        source: e,
    })?;
    let uv_lock: UvLock = toml::from_str(lock).map_err(|e| LockError::ParseToml {
        path: lock_path.to_path_buf(),
        source: e,
    })?;

    let (root, requirements) = match pyproject.project {
        Some(project) => (project.name, project.dependencies),
        None => (None, Vec::new()),
    };

    // uv installs the `dev` group by default.
    let dev = pyproject
        .dependency_groups
        .get("dev")
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str().map(str::to_owned));

    let declared = requirements
        .into_iter()
        .chain(dev)
        .filter_map(|req| requirement_name(&req))
        .collect();
    let locked = uv_lock
        .package
        .into_iter()
        .map(|p| normalize_python_name(&p.name))
        .collect();

    Ok((declared, locked, root.map(|n| normalize_python_name(&n))))
}

/// Distribution name at the start of a PEP 508 requirement string.
pub fn requirement_name(requirement: &str) -> Option<String> {
    let name: String = requirement
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if name.is_empty() {
        None
    } else {
        Some(normalize_python_name(&name))
    }
}

/// PEP 503 normalization: lowercase, runs of `-`, `_`, `.` collapse to `-`.
pub fn normalize_python_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

// ── npm ──

#[derive(Deserialize)]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(rename = "devDependencies", default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct PackageLock {
    #[serde(default)]
    packages: BTreeMap<String, serde_json::Value>,
    /// Lockfile v1 layout
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

fn npm_names(
    manifest_path: &Path,
    manifest: &str,
    lock_path: &Path,
    lock: &str,
) -> Result<Names, LockError> {
    let package: PackageJson =
        serde_json::from_str(manifest).map_err(|e| LockError::ParseJson {
            path: manifest_path.to_path_buf(),
            source: e,
        })?;
    let package_lock: PackageLock =
        serde_json::from_str(lock).map_err(|e| LockError::ParseJson {
            path: lock_path.to_path_buf(),
            source: e,
        })?;

    let declared = package
        .dependencies
        .into_keys()
        .chain(package.dev_dependencies.into_keys())
        .collect();

    let locked = package_lock
        .packages
        .into_keys()
        .filter_map(|key| {
            key.strip_prefix("node_modules/")
                .filter(|name| !name.contains("/node_modules/"))
                .map(str::to_owned)
        })
        .chain(package_lock.dependencies.into_keys())
        .collect();

    Ok((declared, locked, None))
}

fn read(path: &Path) -> Result<String, LockError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LockError::MissingFile {
                path: path.to_path_buf(),
            }
        } else {
            LockError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("{path} not found")]
    MissingFile { path: PathBuf },
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to parse {path}")]
    ParseJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(
        "{lockfile} is out of date — missing {}; re-lock before building",
        missing.join(", ")
    )]
    Drift {
        lockfile: PathBuf,
        missing: Vec<String>,
    },
    #[error("{lockfile} does not describe project '{name}'; re-lock before building")]
    ProjectNotLocked { lockfile: PathBuf, name: String },
}
