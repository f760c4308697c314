//! The transport collaborator.
//!
//! The chat client owns the wire protocol, sessions and media upload. The bot
//! only needs a narrow set of operations from it, collected in [`Transport`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::jid::Jid;
use crate::payload::MessagePayload;

/// Identifier the transport assigns to a sent message.
pub type MessageId = String;

// =============================================================================
// Outgoing Messages
// =============================================================================

/// Kind of an outgoing media message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Sticker,
    Document,
}

impl MediaKind {
    /// The mimetype used when the caller does not provide one.
    ///
    /// Images are sniffed from their leading bytes; unknown images fall back
    /// to JPEG.
    pub fn default_mimetype(&self, data: &[u8]) -> &'static str {
        match self {
            Self::Image => sniff_image(data).unwrap_or("image/jpeg"),
            Self::Video => "video/mp4",
            Self::Audio => "audio/ogg; codecs=opus",
            Self::Sticker => "image/webp",
            Self::Document => "application/octet-stream",
        }
    }
}

fn sniff_image(data: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
    ];

    if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| data.starts_with(magic))
        .map(|(_, mime)| *mime)
}

/// A media message ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMedia {
    pub kind: MediaKind,
    pub data: Vec<u8>,
    pub caption: Option<String>,
    pub file_name: Option<String>,
    pub mimetype: String,
}

impl OutgoingMedia {
    /// Creates a media message with the default mimetype for `kind`.
    pub fn new(kind: MediaKind, data: Vec<u8>) -> Self {
        let mimetype = kind.default_mimetype(&data).to_string();
        let file_name = (kind == MediaKind::Document).then(|| "document".to_string());
        Self {
            kind,
            data,
            caption: None,
            file_name,
            mimetype,
        }
    }

    /// Sets the caption.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Sets the file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Overrides the sniffed or default mimetype.
    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }
}

/// A message the bot sends.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingMessage {
    Text(String),
    Media(OutgoingMedia),
}

impl OutgoingMessage {
    /// Creates a text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Returns the text or caption, if any.
    pub fn text_content(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Media(media) => media.caption.as_deref(),
        }
    }
}

impl From<String> for OutgoingMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for OutgoingMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<OutgoingMedia> for OutgoingMessage {
    fn from(media: OutgoingMedia) -> Self {
        Self::Media(media)
    }
}

/// The message a reply quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub id: String,
    pub participant: Jid,
    pub payload: MessagePayload,
}

// =============================================================================
// Transport Trait
// =============================================================================

/// Operations the bot needs from the chat client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The bot's own account, once the session is established.
    fn own_jid(&self) -> Option<Jid>;

    /// Sends `message` to `chat`, optionally quoting an earlier message.
    async fn send(
        &self,
        chat: &Jid,
        message: OutgoingMessage,
        quote: Option<Quote>,
    ) -> ApiResult<MessageId>;

    /// Marks `ids` in `chat` as read.
    async fn mark_read(&self, ids: &[String], chat: &Jid, sender: &Jid) -> ApiResult<()>;

    /// Revokes (deletes for everyone) the message `id` in `chat`.
    async fn revoke(&self, chat: &Jid, id: &str) -> ApiResult<()>;
}

/// Shared transport handle.
pub type BoxedTransport = Arc<dyn Transport>;
