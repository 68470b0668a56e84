//! Error types shared by the component model.
//!
//! Session and dispatch errors live in `rivet-framework`; this module only
//! covers what can go wrong while building items or talking to the host.

use thiserror::Error;

// =============================================================================
// Component Errors
// =============================================================================

/// Errors raised while constructing items or laying them out in rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// The requested row cannot hold the item.
    #[error("row {row} is full, cannot fit an item of width {width}")]
    RowFull {
        /// Row that was requested.
        row: u8,
        /// Width of the rejected item.
        width: u8,
    },

    /// No row has room left for the item.
    #[error("all rows are full, cannot fit an item of width {width}")]
    HandlerFull {
        /// Width of the rejected item.
        width: u8,
    },

    /// A row index outside `0..5`.
    #[error("row {0} is out of range, expected 0..=4")]
    InvalidRow(u8),

    /// A text attribute exceeded its length limit.
    #[error("{field} must be at most {max} characters, got {len}")]
    TooLong {
        /// Name of the offending attribute.
        field: &'static str,
        /// Maximum allowed length.
        max: usize,
        /// Actual length.
        len: usize,
    },

    /// A numeric range was inconsistent or out of bounds.
    #[error("invalid range for {field}: {reason}")]
    InvalidRange {
        /// Name of the offending attribute.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// The item kind is not allowed in this container.
    #[error("{kind} items cannot be added to a {container}")]
    NotAllowed {
        /// Item kind.
        kind: &'static str,
        /// Container kind ("view" or "modal").
        container: &'static str,
    },

    /// Another item with the same custom_id is already attached.
    #[error("an item with custom_id '{0}' is already attached")]
    ItemAlreadyAttached(String),

    /// Raw component data could not be turned into an item.
    #[error("invalid component: {0}")]
    InvalidComponent(String),
}

impl ComponentError {
    /// Creates a length violation error.
    pub fn too_long(field: &'static str, max: usize, len: usize) -> Self {
        Self::TooLong { field, max, len }
    }

    /// Creates a range violation error.
    pub fn invalid_range(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for component operations.
pub type ComponentResult<T> = Result<T, ComponentError>;

// =============================================================================
// API Errors
// =============================================================================

/// Errors reported by the host when sending responses or fetching messages.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The host rejected the request.
    #[error("request rejected ({code}): {message}")]
    Rejected {
        /// Host-specific error code.
        code: u32,
        /// Error message from the host.
        message: String,
    },

    /// The interaction token has expired.
    #[error("interaction has expired")]
    Expired,

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

impl ApiError {
    /// Creates a rejection error.
    pub fn rejected(code: u32, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }
}

/// Result type for host API calls.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ComponentError::too_long("label", 80, 81);
        assert_eq!(err.to_string(), "label must be at most 80 characters, got 81");

        let err = ComponentError::RowFull { row: 2, width: 5 };
        assert_eq!(err.to_string(), "row 2 is full, cannot fit an item of width 5");

        let err = ApiError::rejected(10062, "Unknown interaction");
        assert_eq!(err.to_string(), "request rejected (10062): Unknown interaction");
    }
}
