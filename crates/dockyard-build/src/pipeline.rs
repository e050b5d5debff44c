use std::path::{Path, PathBuf};

use dockyard_core::ImageConfig;

use crate::bundle::{self, BundleError};
use crate::dockerfile::DockerfileGenerator;
use crate::eject::{self, EjectError};
use crate::fingerprint::{self, FingerprintError};
use crate::lock::{self, LockError, LockReport};
use crate::plan::{BuildPlan, PlanError};

/// Everything `docker build` needs, produced without touching Docker.
#[derive(Debug, Clone)]
pub struct PreparedBuild {
    pub plan: BuildPlan,
    pub dockerfile: String,
    pub fingerprint: String,
    pub bundle_dir: PathBuf,
    /// `None` when the lock check was skipped.
    pub lock: Option<LockReport>,
    pub ejected: bool,
}

/// Validate, check the lock, render and bundle, in that order.
///
/// The lock check runs before the bundle, so a drifted lockfile stops the
/// build before any application source is copied.
pub fn prepare(
    project_dir: &Path,
    config: &ImageConfig,
    skip_lock_check: bool,
) -> Result<PreparedBuild, BuildError> {
    let plan = BuildPlan::from_config(config)?;

    let lock = if skip_lock_check {
        tracing::warn!("lock check skipped");
        None
    } else {
        Some(lock::check_drift(project_dir, config)?)
    };

    let ejected = eject::is_ejected(project_dir);
    let dockerfile = if ejected {
        tracing::info!("using ejected Dockerfile from .dockyard/Dockerfile");
        eject::load_ejected_dockerfile(project_dir)?
    } else {
        DockerfileGenerator::new(&plan).render()
    };

    // The bundle reports every missing input at once; fingerprint after it.
    let bundle_dir = bundle::create_bundle(project_dir, &plan, &dockerfile)?;
    let fingerprint = fingerprint::dependency_fingerprint(project_dir, &plan)?;

    Ok(PreparedBuild {
        plan,
        dockerfile,
        fingerprint,
        bundle_dir,
        lock,
        ejected,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error(transparent)]
    Eject(#[from] EjectError),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
    #[error(transparent)]
    Bundle(#[from] BundleError),
}
