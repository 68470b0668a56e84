//! Rivet Runtime - configuration, logging and the serve loop.
//!
//! This crate provides:
//! - Layered configuration (`RivetConfig`, `ConfigLoader`)
//! - Logging setup (`LoggingBuilder`, `init_from_config`)
//! - The serve loop (`RivetRuntime`) that dispatches a stream of
//!   interactions to a [`Client`](rivet_framework::Client)
//!
//! ```ignore
//! use rivet_runtime::RivetRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = RivetRuntime::new();
//!     runtime.client().start_view(&menu, Snowflake(1234))?;
//!
//!     // Dispatch until the gateway stream closes or Ctrl+C.
//!     let stats = runtime.serve(gateway.interactions()).await?;
//!     println!("handled {} interactions", stats.handled);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, Profile, RivetConfig, load_config,
    load_config_from_file,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents, init_from_config};
pub use runtime::{RivetRuntime, RuntimeBuilder, RuntimeStats, shutdown_signal};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for application code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
