//! Runtime orchestration: startup, the event loop and shutdown.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sigil_runtime::BotRuntime;
//!
//! let mut runtime = BotRuntime::builder()
//!     .config_file("sigil.toml")
//!     .build(transport)?;
//! runtime.install(&MyPlugin)?;
//! runtime.run_until_signal(events).await?;
//! ```
//!
//! Commands are registered on the [`BotRuntime`] while it is being set up.
//! [`BotRuntime::start`] freezes the registry into an [`EventLoop`], which
//! consumes events one at a time: it classifies and logs each message, marks
//! it read, and hands it to the dispatcher once the readiness barrier is open.

use std::sync::Arc;

use sigil_core::{
    ApiResult, BoxedTransport, IdentityResolver, InboundEvent, Message, MessageEvent, MessageId,
    OutgoingMessage, SudoList,
};
use sigil_framework::{
    Command, CommandRegistry, DispatchPolicy, Dispatched, Dispatcher, Handler, Plugin,
    PrefixState, ReadinessBarrier, TriggerConfig,
};
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::{ConfigLoader, SigilConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging::{self, MESSAGE_TARGET};

/// Formats the startup announcement.
pub fn startup_message(prefix: &str, commands: usize) -> String {
    format!(
        "*BOT CONNECTED*\n\n```PREFIX : {prefix}\nPLUGINS : {commands}\nVERSION : {}```",
        env!("CARGO_PKG_VERSION")
    )
}

/// A bot being set up: configuration, transport and the commands registered
/// so far.
pub struct BotRuntime {
    config: SigilConfig,
    transport: BoxedTransport,
    registry: CommandRegistry,
    identity: Option<Arc<dyn IdentityResolver>>,
    barrier: Arc<ReadinessBarrier>,
}

impl std::fmt::Debug for BotRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotRuntime")
            .field("config", &self.config)
            .field("commands", &self.registry.len())
            .finish()
    }
}

impl BotRuntime {
    /// Creates a runtime builder that loads configuration from the usual sources.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Validates the configuration, initializes logging and compiles the
    /// prefix. A prefix that does not compile is fatal.
    pub fn from_config(config: SigilConfig, transport: BoxedTransport) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        let prefix = PrefixState::compile(&config.handlers)?;
        info!(
            handlers = %config.handlers,
            prefix = %prefix.display_prefix(),
            mode = %config.mode,
            log_level = %config.logging.level,
            "Runtime initialized from configuration"
        );

        Ok(Self {
            registry: CommandRegistry::new(prefix).with_mode(config.mode),
            config,
            transport,
            identity: None,
            barrier: Arc::new(ReadinessBarrier::new()),
        })
    }

    pub fn config(&self) -> &SigilConfig {
        &self.config
    }

    /// The commands registered so far.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Replaces the default [`SudoList`] built from `sudo` and the
    /// transport's own identity.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityResolver>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// The barrier the event loop will consult. Opens on the first
    /// [`InboundEvent::OfflineSyncCompleted`].
    pub fn barrier(&self) -> Arc<ReadinessBarrier> {
        Arc::clone(&self.barrier)
    }

    pub fn register<H: Handler>(
        &mut self,
        config: TriggerConfig,
        handler: H,
    ) -> RuntimeResult<Arc<Command>> {
        Ok(self.registry.register(config, handler)?)
    }

    pub fn install(&mut self, plugin: &dyn Plugin) -> RuntimeResult<()> {
        self.registry.install(plugin)?;
        Ok(())
    }

    /// Installs several plugins in order.
    pub fn install_all<'a>(
        &mut self,
        plugins: impl IntoIterator<Item = &'a dyn Plugin>,
    ) -> RuntimeResult<()> {
        for plugin in plugins {
            self.install(plugin)?;
        }
        Ok(())
    }

    /// Freezes the registry and builds the event loop.
    pub fn start(self) -> EventLoop {
        let identity = match self.identity {
            Some(identity) => identity,
            None => Arc::new(SudoList::new(self.transport.own_jid(), &self.config.sudo)),
        };
        let registry = Arc::new(self.registry);

        let policy = DispatchPolicy {
            read_cmd: self.config.read_cmd,
            error_msg: self.config.error_msg,
            report_to: identity.admin_destination(),
        };
        if policy.error_msg && policy.report_to.is_none() {
            warn!("Error reporting is enabled but no administrative chat is known");
        }

        info!(commands = registry.len(), "Command registry frozen");

        EventLoop {
            dispatcher: Dispatcher::new(registry, Arc::clone(&self.transport), policy),
            transport: self.transport,
            identity,
            barrier: self.barrier,
            log_msg: self.config.log_msg,
            read_msg: self.config.read_msg,
            notify_on_connect: self.config.notify_on_connect,
        }
    }

    /// Starts the bot and consumes `events` until the channel closes or
    /// `shutdown` is cancelled.
    pub async fn run(
        self,
        events: mpsc::Receiver<InboundEvent>,
        shutdown: CancellationToken,
    ) -> RuntimeResult<()> {
        self.start().run(events, shutdown).await
    }

    /// Like [`run`](Self::run), stopping on Ctrl+C or SIGTERM.
    pub async fn run_until_signal(self, events: mpsc::Receiver<InboundEvent>) -> RuntimeResult<()> {
        let shutdown = CancellationToken::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown().await;
            trigger.cancel();
        });

        self.run(events, shutdown).await
    }
}

/// The running bot.
pub struct EventLoop {
    dispatcher: Dispatcher,
    transport: BoxedTransport,
    identity: Arc<dyn IdentityResolver>,
    barrier: Arc<ReadinessBarrier>,
    log_msg: bool,
    read_msg: bool,
    notify_on_connect: bool,
}

impl EventLoop {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn barrier(&self) -> &Arc<ReadinessBarrier> {
        &self.barrier
    }

    /// Handles one event and returns the handler tasks it spawned.
    ///
    /// Never waits on handlers. Must be called from within a Tokio runtime.
    pub fn handle(&self, event: InboundEvent) -> Dispatched {
        match event {
            InboundEvent::Message(event) => self.handle_message(&event),
            InboundEvent::OfflineSyncPreview(preview) => {
                info!(
                    messages = preview.messages,
                    notifications = preview.notifications,
                    receipts = preview.receipts,
                    "Offline sync preview"
                );
                Dispatched::default()
            }
            InboundEvent::OfflineSyncCompleted => {
                self.barrier.mark_ready();
                Dispatched::default()
            }
            InboundEvent::Named(event) => {
                if !self.barrier.is_ready() {
                    trace!(event = %event.name, "Event ignored before offline sync completed");
                    return Dispatched::default();
                }
                self.dispatcher.dispatch_named(Arc::new(event))
            }
        }
    }

    fn handle_message(&self, event: &MessageEvent) -> Dispatched {
        let Some(message) = Message::from_event(event, self.identity.as_ref()) else {
            trace!(id = %event.info.id, "Message without payload ignored");
            return Dispatched::default();
        };

        if self.log_msg {
            info!(target: MESSAGE_TARGET, "[{}] : {}", message.push_name, message.text);
        }

        if self.read_msg && !message.chat.is_broadcast() {
            self.spawn_mark_read(&message);
        }

        if !self.barrier.is_ready() {
            trace!(id = %message.id, "Dispatch held until offline sync completes");
            return Dispatched::default();
        }

        self.dispatcher.dispatch_message(Arc::new(message))
    }

    fn spawn_mark_read(&self, message: &Message) {
        let transport = Arc::clone(&self.transport);
        let ids = vec![message.id.clone()];
        let chat = message.chat.clone();
        let sender = message.sender.clone();

        tokio::spawn(async move {
            if let Err(e) = transport.mark_read(&ids, &chat, &sender).await {
                warn!(chat = %chat, "Failed to mark message read: {e}");
            }
        });
    }

    /// Sends the startup announcement to the administrative chat.
    ///
    /// Returns `Ok(None)` when no administrative chat is known.
    pub async fn announce_connected(&self) -> ApiResult<Option<MessageId>> {
        let Some(destination) = self.identity.admin_destination() else {
            warn!("No administrative chat known, skipping startup announcement");
            return Ok(None);
        };

        let registry = self.dispatcher.registry();
        let text = startup_message(&registry.display_prefix(), registry.len());
        let id = self
            .transport
            .send(&destination, OutgoingMessage::Text(text), None)
            .await?;
        debug!(destination = %destination, "Startup announcement sent");
        Ok(Some(id))
    }

    /// Consumes events until the channel closes or `shutdown` is cancelled.
    pub async fn run(
        self,
        mut events: mpsc::Receiver<InboundEvent>,
        shutdown: CancellationToken,
    ) -> RuntimeResult<()> {
        if self.notify_on_connect {
            if let Err(e) = self.announce_connected().await {
                warn!("Failed to send startup announcement: {e}");
            }
        }

        info!("Sigil is running");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                event = events.recv() => match event {
                    Some(event) => {
                        let dispatched = self.handle(event);
                        trace!(handlers = dispatched.len(), "Event handled");
                    }
                    None => {
                        info!("Event stream closed");
                        break;
                    }
                },
            }
        }

        info!("Sigil stopped");
        Ok(())
    }
}

/// Waits for Ctrl+C or SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        info!("Received Ctrl+C, shutting down");
                    }
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
                return;
            }
            Err(e) => warn!("Failed to register SIGTERM handler: {e}"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a [`BotRuntime`] with custom configuration.
///
/// ```rust,ignore
/// let runtime = BotRuntime::builder()
///     .profile("production")
///     .build(transport)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: SigilConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads the configuration and builds the runtime around `transport`.
    pub fn build(self, transport: BoxedTransport) -> RuntimeResult<BotRuntime> {
        let config = self.config_loader.load()?;
        BotRuntime::from_config(config, transport)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
