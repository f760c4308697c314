//! Error types for the Sigil framework.

use thiserror::Error;

/// The configured prefix does not produce a valid regular expression.
#[derive(Debug, Clone, Error)]
#[error("invalid prefix '{raw}': {source}")]
pub struct PrefixError {
    /// The raw configuration value.
    pub raw: String,
    /// Why the derived fragment failed to compile.
    #[source]
    pub source: regex::Error,
}

/// Errors raised while registering a command.
#[derive(Debug, Clone, Error)]
pub enum RegisterError {
    /// The assembled pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The full pattern, including prefix and flags.
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A plugin failed to set itself up.
    #[error("plugin '{plugin}' failed to register: {reason}")]
    Plugin {
        plugin: String,
        reason: String,
    },
}

impl RegisterError {
    /// Creates a [`RegisterError::Plugin`] error.
    pub fn plugin(plugin: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for registration.
pub type RegisterResult<T> = Result<T, RegisterError>;

/// The outcome of a handler run that did not succeed.
///
/// Faults never leave the task that produced them. The dispatcher logs them
/// and, when reporting is enabled, forwards them to the administrative chat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// The handler returned an error.
    #[error("{0}")]
    Error(String),

    /// The handler panicked.
    #[error("panic: {0}")]
    Panic(String),
}

impl Fault {
    /// Creates a [`Fault::Error`] from anything printable.
    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error(err.to_string())
    }

    /// Returns `true` if the handler panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic(_))
    }
}
