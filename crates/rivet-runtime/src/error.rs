//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while building or running a [`RivetRuntime`](crate::RivetRuntime).
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `serve` was called while another `serve` is still running.
    #[error("Runtime is already serving")]
    AlreadyServing,

    /// The client was shut down by an earlier `serve`.
    #[error("Client has been shut down")]
    ShutDown,
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
