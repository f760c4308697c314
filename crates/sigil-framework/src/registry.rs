//! The command registry.
//!
//! Commands are registered once at startup and then frozen behind an `Arc`.
//! Registration order is evaluation order: the first registered command is
//! the first one matched against every event.

use std::sync::Arc;

use tracing::debug;

use crate::command::{Command, TriggerKind};
use crate::error::RegisterResult;
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::plugin::{Mode, Plugin};
use crate::prefix::PrefixState;
use crate::trigger::TriggerConfig;

/// The ordered list of registered commands.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    prefix: PrefixState,
    mode: Mode,
    commands: Vec<Arc<Command>>,
}

impl CommandRegistry {
    /// Creates an empty registry compiling patterns against `prefix`.
    pub fn new(prefix: PrefixState) -> Self {
        Self {
            prefix,
            mode: Mode::default(),
            commands: Vec::new(),
        }
    }

    /// Sets the bot mode plugins consult when choosing their `fromMe` gate.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Registers a command and appends it to the evaluation order.
    ///
    /// Fails if the assembled pattern is not a valid regular expression.
    pub fn register<H: Handler>(
        &mut self,
        config: TriggerConfig,
        handler: H,
    ) -> RegisterResult<Arc<Command>> {
        self.register_boxed(config, into_handler(handler))
    }

    /// Registers a command with an already erased handler.
    pub fn register_boxed(
        &mut self,
        config: TriggerConfig,
        handler: BoxedHandler,
    ) -> RegisterResult<Arc<Command>> {
        let command = Arc::new(Command::compile(config, &self.prefix, handler)?);
        debug!(
            index = self.commands.len(),
            command = command.label(),
            pattern = command.pattern().map(|p| p.as_str()).unwrap_or(""),
            "Registered command"
        );
        self.commands.push(Arc::clone(&command));
        Ok(command)
    }

    /// Lets `plugin` register its commands.
    pub fn install(&mut self, plugin: &dyn Plugin) -> RegisterResult<()> {
        let before = self.commands.len();
        plugin.register(self)?;
        debug!(
            plugin = plugin.name(),
            commands = self.commands.len() - before,
            "Installed plugin"
        );
        Ok(())
    }

    /// All commands in registration order.
    pub fn commands(&self) -> &[Arc<Command>] {
        &self.commands
    }

    /// Commands listening for the named event `name`, in registration order.
    pub fn event_commands<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Command>> {
        self.commands
            .iter()
            .filter(move |command| matches!(command.trigger(), TriggerKind::Event(ev) if ev == name))
    }

    pub fn prefix(&self) -> &PrefixState {
        &self.prefix
    }

    /// The prefix as shown to users.
    pub fn display_prefix(&self) -> String {
        self.prefix.display_prefix()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
