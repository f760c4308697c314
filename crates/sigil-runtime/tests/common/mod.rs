use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use sigil_core::{
    ApiResult, BoxedTransport, InboundEvent, Jid, MessageEvent, MessageId, MessageInfo,
    MessagePayload, OutgoingMessage, Quote, Transport,
};
use sigil_runtime::{BotRuntime, SigilConfig};
use tokio::sync::mpsc;

pub const OWN: &str = "100";
pub const ADMIN: &str = "900";
pub const STRANGER: &str = "200";

/// A transport that records everything the bot sends.
pub struct RecordingTransport {
    sent: mpsc::UnboundedSender<(Jid, String)>,
    pub read: Mutex<Vec<String>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    fn own_jid(&self) -> Option<Jid> {
        Some(Jid::user_jid(OWN).with_device(12))
    }

    async fn send(
        &self,
        chat: &Jid,
        message: OutgoingMessage,
        _quote: Option<Quote>,
    ) -> ApiResult<MessageId> {
        let text = message.text_content().unwrap_or_default().to_string();
        let _ = self.sent.send((chat.clone(), text));
        Ok("3EB0SENT".into())
    }

    async fn mark_read(&self, ids: &[String], _chat: &Jid, _sender: &Jid) -> ApiResult<()> {
        self.read.lock().extend(ids.iter().cloned());
        Ok(())
    }

    async fn revoke(&self, _chat: &Jid, _id: &str) -> ApiResult<()> {
        Ok(())
    }
}

pub struct Outbox(mpsc::UnboundedReceiver<(Jid, String)>);

impl Outbox {
    /// Waits for the next sent message.
    pub async fn next(&mut self) -> (Jid, String) {
        tokio::time::timeout(Duration::from_secs(2), self.0.recv())
            .await
            .expect("timed out waiting for a sent message")
            .expect("transport dropped")
    }

    /// Asserts nothing else has been sent.
    pub fn assert_empty(&mut self) {
        assert!(self.0.try_recv().is_err(), "unexpected message sent");
    }
}

pub fn transport() -> (Arc<RecordingTransport>, Outbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let transport = Arc::new(RecordingTransport {
        sent: tx,
        read: Mutex::new(Vec::new()),
    });
    (transport, Outbox(rx))
}

/// Quiet configuration: no announcement, no read receipts.
pub fn config() -> SigilConfig {
    SigilConfig {
        sudo: ADMIN.into(),
        read_msg: false,
        read_cmd: false,
        error_msg: false,
        notify_on_connect: false,
        ..Default::default()
    }
}

pub fn runtime(config: SigilConfig) -> (BotRuntime, Arc<RecordingTransport>, Outbox) {
    let (recorder, outbox) = transport();
    let transport: BoxedTransport = recorder.clone();
    let runtime = BotRuntime::from_config(config, transport).expect("valid configuration");
    (runtime, recorder, outbox)
}

pub fn direct(sender: &str, text: &str) -> InboundEvent {
    message(sender, Jid::user_jid(sender), false, text)
}

pub fn group(sender: &str, text: &str) -> InboundEvent {
    message(sender, Jid::new("120363041234", "g.us"), true, text)
}

fn message(sender: &str, chat: Jid, is_group: bool, text: &str) -> InboundEvent {
    InboundEvent::Message(MessageEvent {
        info: MessageInfo {
            id: format!("3EB0{sender}{}", text.len()),
            sender: Jid::user_jid(sender),
            chat,
            is_from_me: sender == OWN,
            is_group,
            push_name: format!("user {sender}"),
            ..Default::default()
        },
        message: Some(MessagePayload::text(text)),
    })
}
