//! Unified error types for the Sigil core.
//!
//! Registration and dispatch errors live in `sigil-framework`; configuration
//! errors live in `sigil-runtime`.

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by [`Transport`](crate::Transport) operations.
///
/// Handlers see these as ordinary `Result`s. The dispatcher does not treat
/// them specially: an `Err` that a handler propagates becomes a fault like
/// any other.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The transport has no live session.
    #[error("transport is not connected")]
    NotConnected,

    /// The transport rejected or failed to deliver a message.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// The bot's own identity is not known yet.
    #[error("own identity is not available")]
    MissingIdentity,

    /// The operation needs a triggering message but the context has none.
    #[error("no message is attached to this context")]
    NoMessage,

    /// Media bytes could not be read or downloaded.
    #[error("media unavailable: {0}")]
    MediaUnavailable(String),

    /// Any other transport failure.
    #[error("{0}")]
    Other(String),
}

impl ApiError {
    /// Creates an [`ApiError::SendFailed`] from anything printable.
    pub fn send_failed(reason: impl std::fmt::Display) -> Self {
        Self::SendFailed(reason.to_string())
    }

    /// Creates an [`ApiError::MediaUnavailable`] from anything printable.
    pub fn media_unavailable(reason: impl std::fmt::Display) -> Self {
        Self::MediaUnavailable(reason.to_string())
    }
}

// =============================================================================
// Identity Errors
// =============================================================================

/// Error returned when an address string cannot be parsed into a [`Jid`](crate::Jid).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JidParseError {
    /// The input was empty.
    #[error("address is empty")]
    Empty,

    /// The device suffix after `:` was not a number.
    #[error("invalid device suffix in '{0}'")]
    InvalidDevice(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport calls.
pub type ApiResult<T> = Result<T, ApiError>;
