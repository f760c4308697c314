//! A transport that prints outgoing messages to the terminal.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sigil::core::{ApiResult, Jid, MessageId, OutgoingMessage, Quote, Transport};
use tracing::debug;

pub struct ConsoleTransport {
    own: Jid,
    next_id: AtomicU64,
}

impl ConsoleTransport {
    pub fn new(own: Jid) -> Self {
        Self {
            own,
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> MessageId {
        format!("3EB0{:012X}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

#[async_trait]
impl Transport for ConsoleTransport {
    fn own_jid(&self) -> Option<Jid> {
        Some(self.own.clone())
    }

    async fn send(
        &self,
        chat: &Jid,
        message: OutgoingMessage,
        quote: Option<Quote>,
    ) -> ApiResult<MessageId> {
        let id = self.next_id();
        match quote {
            Some(quote) => println!("→ {chat} [{id}, replying to {}]", quote.id),
            None => println!("→ {chat} [{id}]"),
        }

        match message {
            OutgoingMessage::Text(text) => println!("{text}\n"),
            OutgoingMessage::Media(media) => {
                println!(
                    "[{} {}, {} bytes] {}\n",
                    media.file_name.as_deref().unwrap_or("media"),
                    media.mimetype,
                    media.data.len(),
                    media.caption.as_deref().unwrap_or_default()
                );
            }
        }

        Ok(id)
    }

    async fn mark_read(&self, ids: &[String], chat: &Jid, _sender: &Jid) -> ApiResult<()> {
        debug!(chat = %chat, ?ids, "Marked read");
        Ok(())
    }

    async fn revoke(&self, chat: &Jid, id: &str) -> ApiResult<()> {
        println!("✗ {chat} [{id}] deleted\n");
        Ok(())
    }
}
