//! # Sigil
//!
//! Pattern-based command registration and dispatch for WhatsApp bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  InboundEvent  ┌───────────┐   ┌──────────┐   ┌───────┐   ┌─────────────────┐
//! │ Transport │───────────────▶│ EventLoop │──▶│ evaluate │──▶│ Gates │──▶│ handler (task)  │
//! └───────────┘                └───────────┘   └──────────┘   └───────┘   └─────────────────┘
//!       ▲                           │ readiness barrier                           │
//!       └───────────────────────────┴──────── reply / send / mark read ───────────┘
//! ```
//!
//! - **Transport**: the WhatsApp session; supplies events and sends messages
//! - **Registry**: commands compiled against the configured prefix, in
//!   registration order
//! - **Gates**: operator, group-only and private-only restrictions
//! - **Handlers**: async closures receiving a [`CommandContext`](prelude::CommandContext);
//!   each runs in its own task and a failure never reaches the loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sigil::prelude::*;
//!
//! let mut runtime = BotRuntime::builder().build(transport)?;
//! runtime.register(
//!     TriggerConfig::pattern("ping").desc("Latency"),
//!     |ctx: CommandContext| async move { ctx.reply("*Pong!*").await.map(|_| ()) },
//! )?;
//! runtime.run_until_signal(events).await?;
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): `sigil.toml` configuration files
//! - `json-log`: JSON log output

pub use sigil_core as core;
pub use sigil_framework as framework;
pub use sigil_runtime as runtime;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use sigil::prelude::*;
/// ```
pub mod prelude {
    // Runtime
    pub use sigil_runtime::{BotRuntime, CancellationToken, SigilConfig};

    // Registration
    pub use sigil_framework::{
        CommandContext, CommandMenu, CommandRegistry, Fault, Mode, Plugin, RegisterResult,
        TriggerConfig,
    };

    // Messages and transport
    pub use sigil_core::{
        ApiError, ApiResult, InboundEvent, Jid, MediaKind, MediaSource, Message, OutgoingMedia,
        OutgoingMessage, Transport,
    };

    pub use sigil_runtime::prelude::*;
}
