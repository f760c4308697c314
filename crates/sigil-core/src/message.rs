//! The handler-facing view of a received message.

use tracing::trace;

use crate::event::MessageEvent;
use crate::identity::IdentityResolver;
use crate::jid::Jid;
use crate::payload::{ContentType, MessagePayload};

/// Ids of messages sent by bots start with this marker and are 16 characters long.
const BOT_ID_MARKER: &str = "BAE5";
const BOT_ID_LEN: usize = 16;

fn is_bot_id(id: &str) -> bool {
    id.starts_with(BOT_ID_MARKER) && id.len() == BOT_ID_LEN
}

/// Parses a mention or participant string, treating a bare number as a user.
fn parse_address(raw: &str) -> Jid {
    raw.parse::<Jid>()
        .ok()
        .filter(|jid| !jid.user().is_empty())
        .unwrap_or_else(|| Jid::user_jid(raw.split('@').next().unwrap_or(raw)))
}

/// A classified inbound message.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub sender: Jid,
    pub chat: Jid,
    pub from_me: bool,
    pub is_group: bool,
    pub is_pm: bool,
    pub is_bot: bool,
    pub is_sudo: bool,
    pub push_name: String,
    pub content_type: ContentType,
    /// Display text or caption, `""` when the payload has none.
    pub text: String,
    pub mentioned: Vec<Jid>,
    pub quoted: Option<QuotedMessage>,
    pub payload: MessagePayload,
}

/// The message a received message replies to.
#[derive(Debug, Clone)]
pub struct QuotedMessage {
    pub id: String,
    pub sender: Jid,
    pub chat: Jid,
    pub from_me: bool,
    pub is_group: bool,
    pub is_pm: bool,
    pub is_bot: bool,
    pub is_sudo: bool,
    pub content_type: ContentType,
    pub text: String,
    pub payload: MessagePayload,
}

impl Message {
    /// Builds the handler view of `event`.
    ///
    /// Returns `None` when the event carries no payload.
    pub fn from_event(event: &MessageEvent, identity: &dyn IdentityResolver) -> Option<Self> {
        let payload = event.message.as_ref()?;
        let info = &event.info;

        let mut mentioned = Vec::new();
        let mut quoted = None;
        if let Some(ctx) = payload.context_info() {
            mentioned = ctx.mentioned_jid.iter().map(|raw| parse_address(raw)).collect();

            if let Some(quoted_payload) = ctx.quoted_message.as_deref() {
                let sender = ctx
                    .participant
                    .as_deref()
                    .map(parse_address)
                    .unwrap_or_else(|| info.sender.clone());
                let id = ctx.stanza_id.clone().unwrap_or_default();
                let from_me = identity
                    .own_jid()
                    .is_some_and(|own| own.user() == sender.user());

                quoted = Some(QuotedMessage {
                    is_bot: is_bot_id(&id),
                    is_sudo: identity.is_sudo(&sender),
                    id,
                    from_me,
                    sender,
                    chat: info.chat.clone(),
                    is_group: info.is_group,
                    is_pm: !info.is_group,
                    content_type: quoted_payload.content_type(),
                    text: quoted_payload.display_text().to_string(),
                    payload: quoted_payload.clone(),
                });
            }
        }

        let message = Self {
            id: info.id.clone(),
            sender: info.sender.clone(),
            chat: info.chat.clone(),
            from_me: info.is_from_me,
            is_group: info.is_group,
            is_pm: !info.is_group,
            is_bot: is_bot_id(&info.id),
            is_sudo: identity.is_sudo(&info.sender),
            push_name: info.push_name.clone(),
            content_type: payload.content_type(),
            text: payload.display_text().to_string(),
            mentioned,
            quoted,
            payload: payload.clone(),
        };

        trace!(
            id = %message.id,
            content_type = %message.content_type,
            is_sudo = message.is_sudo,
            "Classified message"
        );

        Some(message)
    }

    /// Returns `true` if the sender may run operator-only commands.
    pub fn is_operator(&self) -> bool {
        self.from_me || self.is_sudo
    }
}
