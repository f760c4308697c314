//! Configuration for the Sigil runtime.
//!
//! Settings are layered with figment from defaults, TOML files and the
//! environment, then validated once at startup.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, LEGACY_ENV_VARS, Profile, load_config, load_config_from_file};
pub use schema::{LogFormat, LogLevel, LogOutput, LoggingConfig, SigilConfig, SpanEventConfig};
pub use validation::validate_config;
