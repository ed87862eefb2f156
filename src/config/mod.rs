// src/config/mod.rs

//! Configuration: optional `SyncServer.toml` plus CLI overrides.
//!
//! - [`model`] holds the serde structs and their defaults.
//! - [`loader`] reads TOML and layers CLI flags on top.
//! - [`validate`] turns a `RawConfigFile` into a checked `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, resolve_config};
pub use model::{ConfigFile, DisplaySection, ProcessSection, RawConfigFile, WatchSection};
