mod build;
mod check;
mod dockerfile;
mod doctor;
mod eject;
mod fingerprint;
#[cfg(unix)]
mod hardlinks;
mod init;
mod jellyfin;
mod run;

use std::path::PathBuf;

use dockyard_core::DockyardConfig;

pub use build::build;
pub use check::check;
pub use dockerfile::dockerfile;
pub use doctor::doctor;
pub use eject::eject;
pub use fingerprint::fingerprint;
#[cfg(unix)]
pub use hardlinks::find_hardlinks;
pub use init::init_project;
pub use jellyfin::add_all_subdirectories_to_library;
pub use run::run;

/// Commands operate on the current directory.
pub(crate) fn load_project() -> anyhow::Result<(PathBuf, DockyardConfig)> {
    let project_dir = PathBuf::from(".");
    let config = DockyardConfig::load(&project_dir)?;
    Ok((project_dir, config))
}
