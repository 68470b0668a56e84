//! Error types for sessions, responses and dispatch.

use rivet_core::{ApiError, ComponentError, Snowflake};
use thiserror::Error;

use crate::session::SessionId;

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised when starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Another running view is already bound to this message.
    #[error("message {message_id} is already bound to a running view")]
    Conflict {
        /// The contested message.
        message_id: Snowflake,
    },

    /// The session is already registered.
    #[error("session {0} is already running")]
    AlreadyRunning(SessionId),

    /// Stopped sessions cannot be restarted; build a new one instead.
    #[error("session {0} has been stopped and cannot be started again")]
    AlreadyStopped(SessionId),

    /// The client has been shut down.
    #[error("client has been shut down")]
    Closed,
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

// =============================================================================
// Response Errors
// =============================================================================

/// Errors raised by context response methods.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// An initial response was already issued for this interaction.
    #[error("an initial response has already been issued")]
    AlreadyResponded,

    /// Modal submissions cannot be answered with another modal.
    #[error("cannot respond to a modal submission with a modal")]
    ModalFromModal,

    /// The modal could not be started.
    #[error("failed to start modal: {0}")]
    Registry(#[from] RegistryError),

    /// The host rejected the response.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result type for response operations.
pub type ResponseResult<T> = Result<T, ResponseError>;

// =============================================================================
// Callback Errors
// =============================================================================

/// A failure inside an application callback.
///
/// These never leave the dispatcher; they are handed to the session's
/// `on_error` hook.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback failed: {0:#}")]
    Failed(#[from] anyhow::Error),

    /// The callback panicked.
    #[error("callback panicked: {0}")]
    Panicked(String),

    /// The callback task was cancelled by the runtime.
    #[error("callback was cancelled")]
    Cancelled,
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Internal-consistency defects found while dispatching.
///
/// Application mistakes never show up here. Seeing one of these means the
/// registry and a session disagree about what the session contains.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A resolved view has no item with the interaction's custom_id.
    #[error("session {session} resolved for custom_id '{custom_id}' but has no such item")]
    ItemMissing {
        /// The resolved session.
        session: SessionId,
        /// custom_id carried by the interaction.
        custom_id: String,
    },
}

/// Result type for dispatch.
pub type DispatchResult<T> = Result<T, DispatchError>;

// =============================================================================
// Reconstruction Errors
// =============================================================================

/// Errors raised while rebuilding a view from a sent message.
#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("failed to fetch message components: {0}")]
    Api(#[from] ApiError),

    #[error(transparent)]
    Component(#[from] ComponentError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_error_keeps_context() {
        let err = anyhow::anyhow!("disk full").context("saving vote");
        let err = CallbackError::from(err);
        assert_eq!(err.to_string(), "callback failed: saving vote: disk full");
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::Conflict {
            message_id: Snowflake(99),
        };
        assert_eq!(
            err.to_string(),
            "message 99 is already bound to a running view"
        );
        let err = ResponseError::from(RegistryError::Closed);
        assert_eq!(err.to_string(), "failed to start modal: client has been shut down");
    }
}
