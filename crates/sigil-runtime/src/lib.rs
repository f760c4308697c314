//! Sigil Runtime - orchestration layer for the Sigil chat bot.
//!
//! This crate provides:
//! - Configuration loading and validation (`config`)
//! - Logging setup (`logging`)
//! - The event loop: classification, read receipts, the readiness barrier
//!   and dispatch (`BotRuntime`, `EventLoop`)
//! - Graceful shutdown on Ctrl+C or SIGTERM
//!
//! ```ignore
//! use sigil_runtime::BotRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (transport, events) = connect().await?;
//!     let mut runtime = BotRuntime::builder().build(transport)?;
//!     runtime.install(&PingPlugin)?;
//!     runtime.run_until_signal(events).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput, LoggingConfig,
    SigilConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::{BotRuntime, EventLoop, RuntimeBuilder, startup_message};

// Re-export tracing for use by plugins
pub use tracing;
pub use tokio_util::sync::CancellationToken;

/// Logging macros for plugin code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
