//! Maintenance commands shipped inside dockyard-built images.
//!
//! - [`backup`]: find files that are hard links to a tree of originals
//!   (for example media imported into a library without copying).
//! - [`jellyfin`]: register every subdirectory of a folder as a location of
//!   a Jellyfin library.

#[cfg(unix)]
pub mod backup;
pub mod jellyfin;
