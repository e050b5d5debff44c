//! Docker CLI operations for dockyard.
//!
//! All commands go through [`DockerExecutor`], so the [`DockerClient`]
//! logic is tested against mocks without a Docker daemon.

pub mod client;
pub mod docker;
pub mod executor;

pub use client::{
    BuildImageError, CheckResult, DockerClient, DoctorReport, FINGERPRINT_LABEL, InspectError,
    RunError,
};
pub use docker::DockerError;
pub use executor::{DockerExecutor, RealExecutor};
