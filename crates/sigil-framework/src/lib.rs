//! # Sigil Framework
//!
//! Command registration, matching and dispatch.
//!
//! ```text
//! TriggerConfig ──register──▶ CommandRegistry ──freeze──▶ Arc<CommandRegistry>
//!                                                             │
//! Message ──▶ evaluate (registration order) ──▶ Gates ──▶ Dispatcher ──▶ tokio tasks
//! ```
//!
//! - [`PrefixState`]: compiles the `handlers` setting once
//! - [`CommandRegistry`]: ordered commands, compiled at registration
//! - [`matcher`]: trigger evaluation and argument extraction
//! - [`Gates`]: operator, group and private-chat restrictions
//! - [`Dispatcher`]: fault-isolated handler tasks
//! - [`ReadinessBarrier`]: holds dispatch until the offline backlog is replayed

pub mod barrier;
pub mod command;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod matcher;
pub mod menu;
pub mod permission;
pub mod plugin;
pub mod prefix;
pub mod registry;
pub mod trigger;

pub use barrier::ReadinessBarrier;
pub use command::{Command, CompiledPattern, PatternShape, TriggerKind};
pub use context::{CommandContext, Trigger};
pub use dispatcher::{DispatchPolicy, Dispatched, Dispatcher, error_report};
pub use error::{Fault, PrefixError, RegisterError, RegisterResult};
pub use handler::{BoxedHandler, Handler, IntoOutcome, into_handler};
pub use matcher::{Match, evaluate, extract_argument, positional_argument};
pub use menu::{CommandMenu, MenuEntry, MenuSection};
pub use permission::{Denial, Gates};
pub use plugin::{Mode, Plugin};
pub use prefix::PrefixState;
pub use registry::CommandRegistry;
pub use trigger::{ContentTrigger, TriggerConfig};
