//! Core types and configuration for leo.
//!
//! This crate defines the `repo@version` argument type ([`VersionRef`]),
//! patch source locations ([`PatchSource`]), the `leo.toml` schema
//! ([`LeoConfig`]), and shared error types.

pub mod config;
pub mod error;
pub mod source;
pub mod version;

pub use config::{BuildConfig, CONFIG_FILE, GitHubConfig, LeoConfig, PatchConfig};
pub use error::{Error, Result};
pub use source::{DEFAULT_PATCH_REF, PatchSource};
pub use version::{Repo, VersionRef, minor_version};
