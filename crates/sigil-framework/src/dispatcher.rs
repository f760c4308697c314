//! The dispatch scheduler.
//!
//! For each event the [`Dispatcher`]:
//!
//! 1. evaluates the registry in registration order,
//! 2. drops commands whose [`Gates`](crate::Gates) reject the sender or chat,
//! 3. optionally marks the message read (pattern commands only),
//! 4. spawns every remaining handler as its own task.
//!
//! Matching and gating never await. Handler tasks are not awaited either:
//! dispatch returns as soon as every task is spawned, and the caller decides
//! whether to wait on the returned [`Dispatched`] handles.
//!
//! A handler that returns an error or panics produces a [`Fault`]. The fault
//! stays inside its task: it is logged and, when enabled, reported to the
//! administrative chat.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use sigil_core::{BoxedTransport, Jid, Message, NamedEvent, OutgoingMessage};
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tracing::{Instrument, Level, debug, error, span, trace, warn};

use crate::command::Command;
use crate::context::CommandContext;
use crate::error::Fault;
use crate::matcher;
use crate::registry::CommandRegistry;

/// Formats the administrative report for a fault.
pub fn error_report(text: &str, fault: &Fault, chat: &str) -> String {
    format!("```─━❲ ERROR REPORT ❳━─\n\nMessage : {text}\nError : {fault}\nJid : {chat}```")
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Dispatch switches.
#[derive(Debug, Clone, Default)]
pub struct DispatchPolicy {
    /// Mark messages that fire a pattern command as read.
    pub read_cmd: bool,
    /// Send fault reports to `report_to`.
    pub error_msg: bool,
    /// The administrative chat.
    pub report_to: Option<Jid>,
}

/// Join handles of the handler tasks spawned for one event.
#[derive(Debug, Default)]
pub struct Dispatched {
    handles: Vec<JoinHandle<Result<(), Fault>>>,
}

impl Dispatched {
    /// Number of handlers spawned.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits for every handler and returns their outcomes in spawn order.
    pub async fn join(self) -> Vec<Result<(), Fault>> {
        let mut outcomes = Vec::with_capacity(self.handles.len());
        for handle in self.handles {
            outcomes.push(match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(Fault::Panic(join_error.to_string())),
            });
        }
        outcomes
    }
}

/// Routes events to handler tasks.
///
/// Must be used from within a Tokio runtime.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    transport: BoxedTransport,
    policy: DispatchPolicy,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.registry.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        transport: BoxedTransport,
        policy: DispatchPolicy,
    ) -> Self {
        Self {
            registry,
            transport,
            policy,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Dispatches a message to every matching, permitted command.
    pub fn dispatch_message(&self, message: Arc<Message>) -> Dispatched {
        let span = span!(Level::DEBUG, "dispatch", id = %message.id, chat = %message.chat);
        let _enter = span.enter();

        let mut dispatched = Dispatched::default();
        for found in matcher::evaluate(&self.registry, message.content_type, &message.text) {
            if let Err(denial) = found.command.gates().check(&message) {
                trace!(command = found.command.label(), %denial, "Command skipped");
                continue;
            }

            if found.command.pattern().is_some() && self.policy.read_cmd {
                self.spawn_mark_read(&message);
            }

            let ctx = CommandContext::for_message(
                Arc::clone(&message),
                found.argument,
                Arc::clone(&self.transport),
                Arc::clone(&self.registry),
            );
            dispatched
                .handles
                .push(self.spawn_handler(&found.command, ctx, message.text.clone(), message.chat.to_string()));
        }

        debug!(handlers = dispatched.len(), "Message dispatched");
        dispatched
    }

    /// Dispatches a named event to every command listening for it.
    ///
    /// Permission gates do not apply: named events have no sender.
    pub fn dispatch_named(&self, event: Arc<NamedEvent>) -> Dispatched {
        let span = span!(Level::DEBUG, "dispatch", event = %event.name);
        let _enter = span.enter();

        let mut dispatched = Dispatched::default();
        for command in self.registry.event_commands(&event.name) {
            let ctx = CommandContext::for_event(
                Arc::clone(&event),
                Arc::clone(&self.transport),
                Arc::clone(&self.registry),
            );
            dispatched
                .handles
                .push(self.spawn_handler(command, ctx, event.name.clone(), String::new()));
        }

        debug!(handlers = dispatched.len(), "Event dispatched");
        dispatched
    }

    fn spawn_mark_read(&self, message: &Message) {
        let transport = Arc::clone(&self.transport);
        let ids = vec![message.id.clone()];
        let chat = message.chat.clone();
        let sender = message.sender.clone();

        tokio::spawn(async move {
            if let Err(e) = transport.mark_read(&ids, &chat, &sender).await {
                warn!(chat = %chat, "Failed to mark command message read: {e}");
            }
        });
    }

    fn spawn_handler(
        &self,
        command: &Command,
        ctx: CommandContext,
        text: String,
        chat: String,
    ) -> JoinHandle<Result<(), Fault>> {
        let handler = command.handler();
        let label = command.label().to_string();
        let desc = command.desc().to_string();
        let reporter = self
            .policy
            .error_msg
            .then(|| self.policy.report_to.clone())
            .flatten()
            .map(|destination| (Arc::clone(&self.transport), destination));

        let span = span!(Level::DEBUG, "command", command = %label);
        tokio::spawn(
            async move {
                let outcome = match AssertUnwindSafe(handler.oneshot(ctx)).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => Err(Fault::Panic(panic_message(panic.as_ref()))),
                };

                if let Err(fault) = &outcome {
                    error!(command = %label, desc = %desc, chat = %chat, "Handler failed: {fault}");

                    if let Some((transport, destination)) = reporter {
                        let report = OutgoingMessage::Text(error_report(&text, fault, &chat));
                        if let Err(e) = transport.send(&destination, report, None).await {
                            warn!(destination = %destination, "Failed to send error report: {e}");
                        }
                    }
                }

                outcome
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sigil_core::{ApiResult, ContentType, MessageId, MessagePayload, Quote, Transport};

    use super::*;
    use crate::trigger::TriggerConfig;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(Jid, String)>>,
        read: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        fn own_jid(&self) -> Option<Jid> {
            Some(Jid::user_jid("100"))
        }

        async fn send(
            &self,
            chat: &Jid,
            message: OutgoingMessage,
            _quote: Option<Quote>,
        ) -> ApiResult<MessageId> {
            let text = message.text_content().unwrap_or_default().to_string();
            self.sent.lock().push((chat.clone(), text));
            Ok("SENT".into())
        }

        async fn mark_read(&self, ids: &[String], _chat: &Jid, _sender: &Jid) -> ApiResult<()> {
            self.read.lock().extend(ids.iter().cloned());
            Ok(())
        }

        async fn revoke(&self, _chat: &Jid, _id: &str) -> ApiResult<()> {
            Ok(())
        }
    }

    fn message(text: &str, is_group: bool, is_sudo: bool) -> Arc<Message> {
        Arc::new(Message {
            id: "MSG1".into(),
            sender: Jid::user_jid("200"),
            chat: if is_group {
                Jid::new("120363", "g.us")
            } else {
                Jid::user_jid("200")
            },
            from_me: false,
            is_group,
            is_pm: !is_group,
            is_bot: false,
            is_sudo,
            push_name: "Ann".into(),
            content_type: ContentType::Conversation,
            text: text.into(),
            mentioned: Vec::new(),
            quoted: None,
            payload: MessagePayload::text(text),
        })
    }

    fn dispatcher(registry: CommandRegistry, recorder: &Arc<Recorder>, policy: DispatchPolicy) -> Dispatcher {
        let transport: BoxedTransport = recorder.clone();
        Dispatcher::new(Arc::new(registry), transport, policy)
    }

    #[tokio::test]
    async fn test_reply_with_argument() {
        let mut registry = CommandRegistry::default();
        registry
            .register(
                TriggerConfig::pattern("echo ?(.*)").from_me(false),
                |ctx: CommandContext| async move {
                    ctx.reply(ctx.argument().to_string()).await.map(|_| ())
                },
            )
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        let policy = DispatchPolicy {
            read_cmd: true,
            ..Default::default()
        };
        let outcomes = dispatcher(registry, &recorder, policy)
            .dispatch_message(message(".echo hi", false, false))
            .join()
            .await;

        assert_eq!(outcomes, vec![Ok(())]);
        assert_eq!(recorder.sent.lock()[0].1, "hi");
    }

    async fn explode(_ctx: CommandContext) {
        panic!("exploded");
    }

    #[tokio::test]
    async fn test_panic_is_isolated_and_reported() {
        let mut registry = CommandRegistry::default();
        registry
            .register(TriggerConfig::pattern("boom").from_me(false), explode)
            .unwrap();
        registry
            .register(TriggerConfig::pattern("boom").from_me(false), |_ctx: CommandContext| async {})
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        let policy = DispatchPolicy {
            read_cmd: false,
            error_msg: true,
            report_to: Some(Jid::user_jid("999")),
        };
        let outcomes = dispatcher(registry, &recorder, policy)
            .dispatch_message(message(".boom", true, false))
            .join()
            .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], Err(Fault::Panic("exploded".into())));
        assert_eq!(outcomes[1], Ok(()));

        let sent = recorder.sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, Jid::user_jid("999"));
        assert!(sent[0].1.contains("ERROR REPORT"));
        assert!(sent[0].1.contains("Message : .boom"));
        assert!(sent[0].1.contains("Jid : 120363@g.us"));
    }

    #[tokio::test]
    async fn test_returned_error_without_reporting() {
        let mut registry = CommandRegistry::default();
        registry
            .register(TriggerConfig::pattern("fail").from_me(false), |_ctx: CommandContext| async {
                Err::<(), _>("nope")
            })
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        let outcomes = dispatcher(registry, &recorder, DispatchPolicy::default())
            .dispatch_message(message(".fail", false, false))
            .join()
            .await;

        assert_eq!(outcomes, vec![Err(Fault::Error("nope".into()))]);
        assert!(recorder.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_gates_skip_silently() {
        let mut registry = CommandRegistry::default();
        registry
            .register(TriggerConfig::pattern("admin"), |_ctx: CommandContext| async {})
            .unwrap();
        registry
            .register(
                TriggerConfig::pattern("admin").from_me(false).only_group(true),
                |_ctx: CommandContext| async {},
            )
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        let dispatcher = dispatcher(registry, &recorder, DispatchPolicy::default());

        assert!(dispatcher.dispatch_message(message(".admin", false, false)).is_empty());
        assert_eq!(dispatcher.dispatch_message(message(".admin", true, false)).len(), 1);
        assert_eq!(dispatcher.dispatch_message(message(".admin", true, true)).len(), 2);
    }

    #[tokio::test]
    async fn test_named_event_dispatch() {
        let mut registry = CommandRegistry::default();
        registry
            .register(TriggerConfig::event("call"), |ctx: CommandContext| async move {
                assert_eq!(ctx.argument(), "");
                assert!(ctx.message().is_none());
                assert_eq!(ctx.event().map(|e| e.name.as_str()), Some("call"));
            })
            .unwrap();

        let recorder = Arc::new(Recorder::default());
        let outcomes = dispatcher(registry, &recorder, DispatchPolicy::default())
            .dispatch_named(Arc::new(NamedEvent::new("call")))
            .join()
            .await;
        assert_eq!(outcomes, vec![Ok(())]);
    }

    #[test]
    fn test_error_report_format() {
        let report = error_report(".x", &Fault::Error("bad".into()), "1@s.whatsapp.net");
        assert_eq!(
            report,
            "```─━❲ ERROR REPORT ❳━─\n\nMessage : .x\nError : bad\nJid : 1@s.whatsapp.net```"
        );
    }
}
