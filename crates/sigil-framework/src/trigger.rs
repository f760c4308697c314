//! Trigger configuration.
//!
//! A [`TriggerConfig`] describes when a command fires. It can be built in
//! code or deserialized from the same camelCase keys plugins have always
//! used (`on`, `pattern`, `ev`, `handler`, `flags`, `fromMe`, `onlyGroup`,
//! `onlyPm`, `desc`, `type`, `dontAddCommandList`). Unknown keys are rejected.
//!
//! # Example
//!
//! ```rust,ignore
//! let ping = TriggerConfig::pattern("ping")
//!     .from_me(false)
//!     .desc("Bot response in milliseconds.")
//!     .kind("info");
//!
//! let stickers = TriggerConfig::on("sticker").desc("Logs every sticker");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use sigil_core::ContentType;

/// Default `type` tag.
pub const DEFAULT_KIND: &str = "misc";

/// Flags applied to pattern-only commands when none are given.
pub const DEFAULT_PATTERN_FLAGS: &str = "is";

fn default_true() -> bool {
    true
}

fn default_kind() -> String {
    DEFAULT_KIND.to_string()
}

/// Options recognised at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TriggerConfig {
    /// Content-type trigger name, see [`ContentTrigger`].
    #[serde(default)]
    pub on: Option<String>,

    /// Regular-expression fragment, neither anchored nor prefixed.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Named event to listen for.
    #[serde(default)]
    pub ev: Option<String>,

    /// Whether the compiled pattern includes the configured prefix.
    #[serde(rename = "handler", default = "default_true")]
    pub use_prefix: bool,

    /// Inline regex flags. `None` picks the branch default.
    #[serde(default)]
    pub flags: Option<String>,

    /// Restrict to the bot itself and configured administrators.
    #[serde(default = "default_true")]
    pub from_me: bool,

    #[serde(default)]
    pub only_group: bool,

    #[serde(default)]
    pub only_pm: bool,

    #[serde(default)]
    pub desc: String,

    /// Grouping tag used by the command menu.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// Hide the command from the command menu.
    #[serde(default)]
    pub dont_add_command_list: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            on: None,
            pattern: None,
            ev: None,
            use_prefix: true,
            flags: None,
            from_me: true,
            only_group: false,
            only_pm: false,
            desc: String::new(),
            kind: default_kind(),
            dont_add_command_list: false,
        }
    }
}

impl TriggerConfig {
    /// A pattern-only command.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Default::default()
        }
    }

    /// A content-type command.
    pub fn on(content: impl Into<String>) -> Self {
        Self {
            on: Some(content.into()),
            ..Default::default()
        }
    }

    /// A named-event command.
    pub fn event(name: impl Into<String>) -> Self {
        Self {
            ev: Some(name.into()),
            ..Default::default()
        }
    }

    /// Attaches an argument pattern to a content-type command.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn use_prefix(mut self, use_prefix: bool) -> Self {
        self.use_prefix = use_prefix;
        self
    }

    pub fn flags(mut self, flags: impl Into<String>) -> Self {
        self.flags = Some(flags.into());
        self
    }

    pub fn from_me(mut self, from_me: bool) -> Self {
        self.from_me = from_me;
        self
    }

    pub fn only_group(mut self, only_group: bool) -> Self {
        self.only_group = only_group;
        self
    }

    pub fn only_pm(mut self, only_pm: bool) -> Self {
        self.only_pm = only_pm;
        self
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Hides the command from the command menu.
    pub fn hidden(mut self) -> Self {
        self.dont_add_command_list = true;
        self
    }
}

/// Content-type trigger names accepted by `on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentTrigger {
    Photo,
    Image,
    Text,
    Message,
    Video,
    Number,
    ViewOnce,
    Sticker,
    Audio,
    MessagesUpsert,
}

impl ContentTrigger {
    /// Every accepted trigger, in documentation order.
    pub const ALL: [ContentTrigger; 10] = [
        Self::Photo,
        Self::Image,
        Self::Text,
        Self::Message,
        Self::Video,
        Self::Number,
        Self::ViewOnce,
        Self::Sticker,
        Self::Audio,
        Self::MessagesUpsert,
    ];

    /// Looks a trigger up by its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|trigger| trigger.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Image => "image",
            Self::Text => "text",
            Self::Message => "message",
            Self::Video => "video",
            Self::Number => "number",
            Self::ViewOnce => "viewonce",
            Self::Sticker => "sticker",
            Self::Audio => "audio",
            Self::MessagesUpsert => "messages.upsert",
        }
    }

    /// Returns `true` if an event with this classification and text fires
    /// the trigger.
    ///
    /// `photo`, `number`, `viewonce` and `messages.upsert` have no
    /// classification counterpart and never fire.
    pub fn matches(&self, content_type: ContentType, text: &str) -> bool {
        match self {
            Self::Message => true,
            Self::Text => !text.is_empty(),
            Self::Image => content_type == ContentType::Image,
            Self::Video => content_type == ContentType::Video,
            Self::Sticker => content_type == ContentType::Sticker,
            Self::Audio => content_type == ContentType::Audio,
            Self::Photo | Self::Number | Self::ViewOnce | Self::MessagesUpsert => false,
        }
    }
}

impl fmt::Display for ContentTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TriggerConfig::default();
        assert!(config.use_prefix);
        assert!(config.from_me);
        assert!(!config.only_group);
        assert_eq!(config.kind, "misc");
    }

    #[test]
    fn test_deserialize_plugin_keys() {
        let config: TriggerConfig = serde_json::from_str(
            r#"{"pattern":"menu","fromMe":false,"desc":"Display all commands","type":"info","handler":true}"#,
        )
        .unwrap();
        assert_eq!(config, TriggerConfig::pattern("menu").from_me(false).desc("Display all commands").kind("info"));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let result = serde_json::from_str::<TriggerConfig>(r#"{"pattern":"x","alias":"y"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_content_trigger_names() {
        for trigger in ContentTrigger::ALL {
            assert_eq!(ContentTrigger::from_name(trigger.as_str()), Some(trigger));
        }
        assert_eq!(ContentTrigger::from_name("document"), None);
    }

    #[test]
    fn test_content_trigger_matching() {
        assert!(ContentTrigger::Message.matches(ContentType::Empty, ""));
        assert!(ContentTrigger::Text.matches(ContentType::Image, "caption"));
        assert!(!ContentTrigger::Text.matches(ContentType::Conversation, ""));
        assert!(ContentTrigger::Sticker.matches(ContentType::Sticker, ""));
        assert!(!ContentTrigger::Image.matches(ContentType::Video, ""));
        assert!(!ContentTrigger::Photo.matches(ContentType::Image, ""));
    }
}
