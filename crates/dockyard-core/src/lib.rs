//! Core types and configuration for dockyard.
//!
//! This crate defines the `dockyard.toml` schema ([`DockyardConfig`]),
//! the supported package managers ([`Toolchain`]), pinned base image
//! references ([`ImageRef`]), and shared error types.

pub mod config;
pub mod error;
pub mod image;
pub mod toolchain;

pub use config::{CONFIG_FILE, DockyardConfig, ImageConfig, ProjectConfig, validate_context_path};
pub use error::{Error, Result};
pub use image::ImageRef;
pub use toolchain::Toolchain;
