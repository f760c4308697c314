//! The context a handler receives.

use std::sync::Arc;

use sigil_core::{
    ApiError, ApiResult, BoxedTransport, Jid, Message, MessageId, NamedEvent, OutgoingMessage,
    QuotedMessage, Quote,
};
use tracing::debug;

use crate::registry::CommandRegistry;

/// What triggered a handler.
#[derive(Debug, Clone)]
pub enum Trigger {
    Message(Arc<Message>),
    Event(Arc<NamedEvent>),
}

/// Everything a handler needs: the trigger, the extracted argument and the
/// outgoing side of the transport.
///
/// Cloning is cheap; all shared state sits behind `Arc`s.
#[derive(Clone)]
pub struct CommandContext {
    trigger: Trigger,
    argument: Arc<str>,
    transport: BoxedTransport,
    registry: Arc<CommandRegistry>,
}

impl CommandContext {
    /// Context for a command fired by a message.
    pub fn for_message(
        message: Arc<Message>,
        argument: impl Into<Arc<str>>,
        transport: BoxedTransport,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        Self {
            trigger: Trigger::Message(message),
            argument: argument.into(),
            transport,
            registry,
        }
    }

    /// Context for a command fired by a named event. The argument is empty.
    pub fn for_event(
        event: Arc<NamedEvent>,
        transport: BoxedTransport,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        Self {
            trigger: Trigger::Event(event),
            argument: Arc::from(""),
            transport,
            registry,
        }
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// The triggering message, if the command was fired by one.
    pub fn message(&self) -> Option<&Message> {
        match &self.trigger {
            Trigger::Message(message) => Some(message),
            Trigger::Event(_) => None,
        }
    }

    /// The triggering named event, if any.
    pub fn event(&self) -> Option<&NamedEvent> {
        match &self.trigger {
            Trigger::Event(event) => Some(event),
            Trigger::Message(_) => None,
        }
    }

    /// The argument extracted from the message text, `""` if none.
    pub fn argument(&self) -> &str {
        &self.argument
    }

    /// The chat the triggering message came from.
    pub fn chat(&self) -> Option<&Jid> {
        self.message().map(|message| &message.chat)
    }

    pub fn transport(&self) -> &BoxedTransport {
        &self.transport
    }

    /// The frozen command registry, for introspection such as menus.
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// The prefix as shown to users.
    pub fn display_prefix(&self) -> String {
        self.registry.display_prefix()
    }

    fn require_message(&self) -> ApiResult<&Message> {
        self.message().ok_or(ApiError::NoMessage)
    }

    fn require_quoted(&self) -> ApiResult<&QuotedMessage> {
        self.require_message()?
            .quoted
            .as_ref()
            .ok_or(ApiError::NoMessage)
    }

    /// The message the triggering message replied to, if any.
    pub fn quoted(&self) -> Option<&QuotedMessage> {
        self.message().and_then(|message| message.quoted.as_ref())
    }

    /// Replies in the same chat, quoting the triggering message.
    pub async fn reply(&self, message: impl Into<OutgoingMessage>) -> ApiResult<MessageId> {
        let source = self.require_message()?;
        let quote = Quote {
            id: source.id.clone(),
            participant: source.sender.clone(),
            payload: source.payload.clone(),
        };
        debug!(chat = %source.chat, "Replying");
        self.transport
            .send(&source.chat, message.into(), Some(quote))
            .await
    }

    /// Replies to the quoted message instead of the triggering one.
    ///
    /// Fails with [`ApiError::NoMessage`] when nothing was quoted.
    pub async fn reply_quoted(&self, message: impl Into<OutgoingMessage>) -> ApiResult<MessageId> {
        let quoted = self.require_quoted()?;
        let quote = Quote {
            id: quoted.id.clone(),
            participant: quoted.sender.clone(),
            payload: quoted.payload.clone(),
        };
        debug!(chat = %quoted.chat, quoted = %quoted.id, "Replying to quoted message");
        self.transport
            .send(&quoted.chat, message.into(), Some(quote))
            .await
    }

    /// Sends a message to any chat.
    pub async fn send(
        &self,
        chat: &Jid,
        message: impl Into<OutgoingMessage>,
    ) -> ApiResult<MessageId> {
        self.transport.send(chat, message.into(), None).await
    }

    /// Sends plain text to any chat.
    pub async fn send_text(&self, chat: &Jid, text: impl Into<String>) -> ApiResult<MessageId> {
        self.send(chat, OutgoingMessage::Text(text.into())).await
    }

    /// Revokes the triggering message for everyone.
    pub async fn delete(&self) -> ApiResult<()> {
        let source = self.require_message()?;
        self.transport.revoke(&source.chat, &source.id).await
    }

    /// Revokes the quoted message for everyone.
    pub async fn delete_quoted(&self) -> ApiResult<()> {
        let quoted = self.require_quoted()?;
        self.transport.revoke(&quoted.chat, &quoted.id).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sigil_core::{ContentType, MessagePayload, Transport};
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(Jid, Option<Quote>)>>,
        revoked: Mutex<Vec<(Jid, String)>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        fn own_jid(&self) -> Option<Jid> {
            Some(Jid::user_jid("100"))
        }

        async fn send(
            &self,
            chat: &Jid,
            _message: OutgoingMessage,
            quote: Option<Quote>,
        ) -> ApiResult<MessageId> {
            self.sent.lock().push((chat.clone(), quote));
            Ok("SENT".into())
        }

        async fn mark_read(&self, _ids: &[String], _chat: &Jid, _sender: &Jid) -> ApiResult<()> {
            Ok(())
        }

        async fn revoke(&self, chat: &Jid, id: &str) -> ApiResult<()> {
            self.revoked.lock().push((chat.clone(), id.to_string()));
            Ok(())
        }
    }

    fn group() -> Jid {
        Jid::new("120363", "g.us")
    }

    fn message(quoted: Option<QuotedMessage>) -> Arc<Message> {
        Arc::new(Message {
            id: "MSG1".into(),
            sender: Jid::user_jid("200"),
            chat: group(),
            from_me: false,
            is_group: true,
            is_pm: false,
            is_bot: false,
            is_sudo: false,
            push_name: "Ann".into(),
            content_type: ContentType::ExtendedText,
            text: ".del".into(),
            mentioned: Vec::new(),
            quoted,
            payload: MessagePayload::text(".del"),
        })
    }

    fn quoted() -> QuotedMessage {
        QuotedMessage {
            id: "QUOTED1".into(),
            sender: Jid::user_jid("300"),
            chat: group(),
            from_me: false,
            is_group: true,
            is_pm: false,
            is_bot: false,
            is_sudo: false,
            content_type: ContentType::Conversation,
            text: "spam".into(),
            payload: MessagePayload::text("spam"),
        }
    }

    fn context(message: Arc<Message>, recorder: &Arc<Recorder>) -> CommandContext {
        CommandContext::for_message(
            message,
            "",
            Arc::clone(recorder) as BoxedTransport,
            Arc::new(CommandRegistry::default()),
        )
    }

    #[tokio::test]
    async fn test_reply_quoted_targets_the_quoted_message() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(message(Some(quoted())), &recorder);

        assert_ok!(ctx.reply_quoted("noted").await);
        assert_ok!(ctx.reply("done").await);

        let sent = recorder.sent.lock();
        let (chat, quote) = &sent[0];
        assert_eq!(*chat, group());
        let quote = quote.as_ref().unwrap();
        assert_eq!(quote.id, "QUOTED1");
        assert_eq!(quote.participant, Jid::user_jid("300"));
        assert_eq!(quote.payload, MessagePayload::text("spam"));

        assert_eq!(sent[1].1.as_ref().unwrap().id, "MSG1");
    }

    #[tokio::test]
    async fn test_delete_quoted_revokes_the_quoted_message() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(message(Some(quoted())), &recorder);

        assert_ok!(ctx.delete_quoted().await);
        assert_eq!(
            recorder.revoked.lock().as_slice(),
            &[(group(), "QUOTED1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_quoted_operations_need_a_quote() {
        let recorder = Arc::new(Recorder::default());
        let ctx = context(message(None), &recorder);

        assert!(ctx.quoted().is_none());
        assert!(matches!(
            assert_err!(ctx.reply_quoted("noted").await),
            ApiError::NoMessage
        ));
        assert!(matches!(
            assert_err!(ctx.delete_quoted().await),
            ApiError::NoMessage
        ));
        assert!(recorder.sent.lock().is_empty());
        assert!(recorder.revoked.lock().is_empty());

        let event = CommandContext::for_event(
            Arc::new(NamedEvent::new("call")),
            Arc::clone(&recorder) as BoxedTransport,
            Arc::new(CommandRegistry::default()),
        );
        assert!(matches!(
            assert_err!(event.delete_quoted().await),
            ApiError::NoMessage
        ));
    }
}
