use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::plan::BuildPlan;

/// Content hash of everything that determines the dependency-install layer.
///
/// Covers the base image, working directory, install command and the bytes
/// of each dependency input. Application sources never contribute, so the
/// value only moves when the dependency layer would be rebuilt.
///
/// Format: `sha256:<64 hex digits>`.
pub fn dependency_fingerprint(
    project_dir: &Path,
    plan: &BuildPlan,
) -> Result<String, FingerprintError> {
    let mut hasher = Sha256::new();

    hash_field(&mut hasher, b"image", plan.base_image().to_string().as_bytes());
    hash_field(&mut hasher, b"workdir", plan.workdir().as_bytes());
    for arg in plan.install_command() {
        hash_field(&mut hasher, b"install", arg.as_bytes());
    }

    for relative in plan.dependency_inputs() {
        let path = project_dir.join(relative);
        let content = std::fs::read(&path).map_err(|e| FingerprintError::Read {
            path: path.clone(),
            source: e,
        })?;
        hash_field(&mut hasher, b"path", relative.as_bytes());
        hash_field(&mut hasher, b"content", &content);
    }

    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    Ok(format!("sha256:{hex}"))
}

/// Length-prefixed so adjacent fields can never alias each other.
fn hash_field(hasher: &mut Sha256, label: &[u8], value: &[u8]) {
    hasher.update(label);
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value);
}

#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("failed to read dependency input {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
