//! Runtime error types.

use sigil_core::ApiError;
use sigil_framework::{PrefixError, RegisterError};
use thiserror::Error;

pub use crate::config::{ConfigError, ConfigResult};

/// Errors that stop the runtime from starting.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The `handlers` setting does not compile.
    #[error(transparent)]
    Prefix(#[from] PrefixError),

    /// A command or plugin failed to register.
    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error("Transport error: {0}")]
    Transport(#[from] ApiError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
