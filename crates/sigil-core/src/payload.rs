//! Inbound message payloads and content classification.
//!
//! A [`MessagePayload`] holds at most a handful of populated variants, the
//! same shape the chat client delivers. Classification picks the first
//! populated variant in a fixed priority order:
//!
//! ```text
//! conversation → extended text → image → video → audio → document → sticker → empty
//! ```
//!
//! Text extraction takes the first non-empty candidate in its own order,
//! which skips audio and sticker because they carry no caption:
//!
//! ```text
//! conversation → extended text → image caption → video caption → document caption → ""
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of an inbound payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// Plain conversation text.
    Conversation,
    /// Text with context (mentions, quotes, link previews).
    ExtendedText,
    /// Image, optionally captioned.
    Image,
    /// Video, optionally captioned.
    Video,
    /// Audio or voice note.
    Audio,
    /// Document, optionally captioned.
    Document,
    /// Sticker.
    Sticker,
    /// Nothing recognisable.
    Empty,
}

impl ContentType {
    /// The label used by the chat client for this content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conversation => "conversation",
            Self::ExtendedText => "extendedTextMessage",
            Self::Image => "imageMessage",
            Self::Video => "videoMessage",
            Self::Audio => "audioMessage",
            Self::Document => "documentMessage",
            Self::Sticker => "stickerMessage",
            Self::Empty => "",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The message body of an inbound event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_text_message: Option<ExtendedText>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_message: Option<MediaContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_message: Option<MediaContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_message: Option<MediaContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_message: Option<MediaContent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sticker_message: Option<MediaContent>,
}

/// Text carrying context information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedText {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub context_info: Option<ContextInfo>,
}

/// Mentions and quote information attached to extended text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    #[serde(default, rename = "mentionedJid")]
    pub mentioned_jid: Vec<String>,

    /// Id of the quoted message.
    #[serde(default)]
    pub stanza_id: Option<String>,

    /// Author of the quoted message.
    #[serde(default)]
    pub participant: Option<String>,

    #[serde(default)]
    pub quoted_message: Option<Box<MessagePayload>>,
}

/// Metadata of a media payload. The media bytes themselves stay with the
/// transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    #[serde(default)]
    pub caption: Option<String>,

    #[serde(default)]
    pub mimetype: Option<String>,

    #[serde(default)]
    pub file_name: Option<String>,
}

impl MessagePayload {
    /// Creates a plain conversation payload.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            conversation: Some(text.into()),
            ..Default::default()
        }
    }

    /// Classifies this payload.
    pub fn content_type(&self) -> ContentType {
        if self.conversation.is_some() {
            ContentType::Conversation
        } else if self.extended_text_message.is_some() {
            ContentType::ExtendedText
        } else if self.image_message.is_some() {
            ContentType::Image
        } else if self.video_message.is_some() {
            ContentType::Video
        } else if self.audio_message.is_some() {
            ContentType::Audio
        } else if self.document_message.is_some() {
            ContentType::Document
        } else if self.sticker_message.is_some() {
            ContentType::Sticker
        } else {
            ContentType::Empty
        }
    }

    /// Returns the first non-empty text or caption, or `""` when there is none.
    pub fn display_text(&self) -> &str {
        let conversation = self.conversation.as_deref();
        let extended = self
            .extended_text_message
            .as_ref()
            .and_then(|ext| ext.text.as_deref());
        let captions = [
            &self.image_message,
            &self.video_message,
            &self.document_message,
        ]
        .into_iter()
        .flatten()
        .filter_map(|media| media.caption.as_deref());

        [conversation, extended]
            .into_iter()
            .flatten()
            .chain(captions)
            .find(|text| !text.is_empty())
            .unwrap_or("")
    }

    /// Returns the context info of an extended text payload.
    pub fn context_info(&self) -> Option<&ContextInfo> {
        self.extended_text_message
            .as_ref()
            .and_then(|ext| ext.context_info.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(caption: Option<&str>) -> MediaContent {
        MediaContent {
            caption: caption.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_conversation_wins_over_everything() {
        let payload = MessagePayload {
            conversation: Some("hi".into()),
            image_message: Some(image(Some("cap"))),
            ..Default::default()
        };
        assert_eq!(payload.content_type(), ContentType::Conversation);
        assert_eq!(payload.display_text(), "hi");
    }

    #[test]
    fn test_caption_priority() {
        let payload = MessagePayload {
            image_message: Some(image(None)),
            video_message: Some(image(Some("video caption"))),
            ..Default::default()
        };
        assert_eq!(payload.content_type(), ContentType::Image);
        assert_eq!(payload.display_text(), "video caption");
    }

    #[test]
    fn test_empty_candidates_are_skipped() {
        let payload = MessagePayload {
            conversation: Some(String::new()),
            extended_text_message: Some(ExtendedText {
                text: Some(".ping".into()),
                context_info: None,
            }),
            ..Default::default()
        };
        assert_eq!(payload.content_type(), ContentType::Conversation);
        assert_eq!(payload.display_text(), ".ping");

        let payload = MessagePayload {
            image_message: Some(image(Some(""))),
            document_message: Some(image(Some(".ping"))),
            ..Default::default()
        };
        assert_eq!(payload.content_type(), ContentType::Image);
        assert_eq!(payload.display_text(), ".ping");
    }

    #[test]
    fn test_sticker_and_empty() {
        let sticker = MessagePayload {
            sticker_message: Some(MediaContent::default()),
            ..Default::default()
        };
        assert_eq!(sticker.content_type(), ContentType::Sticker);
        assert_eq!(sticker.display_text(), "");

        assert_eq!(MessagePayload::default().content_type(), ContentType::Empty);
        assert_eq!(ContentType::Empty.as_str(), "");
    }

    #[test]
    fn test_deserialize_client_shape() {
        let payload: MessagePayload = serde_json::from_str(
            r#"{"extendedTextMessage":{"text":".jid","contextInfo":{"mentionedJid":["1@s.whatsapp.net"]}}}"#,
        )
        .unwrap();
        assert_eq!(payload.content_type(), ContentType::ExtendedText);
        assert_eq!(payload.display_text(), ".jid");
        assert_eq!(payload.context_info().unwrap().mentioned_jid.len(), 1);
    }
}
