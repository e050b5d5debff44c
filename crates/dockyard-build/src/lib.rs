//! Build plans, Dockerfile generation, lock checks and build contexts.
//!
//! # Build pipeline
//!
//! ```text
//! dockyard build
//!   1. Plan        ── BuildPlan::from_config() + validate()
//!   2. Lock check  ── manifest vs lockfile (skip with --skip-lock-check)
//!   3. Dockerfile  ── DockerfileGenerator::render() or .dockyard/Dockerfile
//!   4. Fingerprint ── sha256 over the dependency-layer inputs
//!   5. Bundle      ── declared inputs → .dockyard-bundle/
//!   6. Docker      ── docker build .dockyard-bundle/
//! ```
//!
//! # Layer order
//!
//! Every plan copies the version pin, manifest and lockfile, runs the
//! locked dependencies-only install, and only then copies the sources and
//! entry script. Editing application code therefore reuses the cached
//! install layer; editing the manifest or lockfile rebuilds it.

pub mod bundle;
pub mod dockerfile;
pub mod eject;
pub mod fingerprint;
pub mod lock;
pub mod pipeline;
pub mod plan;

pub use dockerfile::DockerfileGenerator;
pub use pipeline::{BuildError, PreparedBuild, prepare};
pub use plan::{BuildPlan, PlanError, Step, StepKind};
