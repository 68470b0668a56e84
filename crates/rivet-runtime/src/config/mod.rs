//! Configuration for the Rivet runtime.
//!
//! Settings are layered with figment: built-in defaults, then
//! `rivet.toml` / `config.toml`, then `RIVET_*` environment variables.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ClientSettings, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, RivetConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
