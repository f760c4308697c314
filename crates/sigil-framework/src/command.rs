//! Registered commands and pattern compilation.
//!
//! A trigger pattern is compiled into one of three shapes:
//!
//! ```text
//! Prefixed   (?is)<anchored prefix>\s?(?P<keyword><pattern>)(?P<rest>.*)
//! Content    (?flags)<primary prefix><pattern>
//! Bare       (?flags)<pattern>
//! ```
//!
//! `Prefixed` is used for pattern-only commands, `Content` for a pattern
//! attached to a content-type trigger and `Bare` whenever `handler` is off.
//! User patterns must not declare groups named `keyword` or `rest`.

use std::fmt;
use std::ops::Range;

use regex::Regex;
use tracing::warn;

use crate::error::{RegisterError, RegisterResult};
use crate::handler::BoxedHandler;
use crate::permission::Gates;
use crate::prefix::PrefixState;
use crate::trigger::{ContentTrigger, DEFAULT_KIND, DEFAULT_PATTERN_FLAGS, TriggerConfig};

/// Group wrapping the user pattern in the `Prefixed` shape.
pub const KEYWORD_GROUP: &str = "keyword";

/// Group consuming the text after the keyword in the `Prefixed` shape.
pub const REST_GROUP: &str = "rest";

/// A user group with this name is always used as the argument.
pub const ARG_GROUP: &str = "arg";

/// What makes a command fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerKind {
    /// Fires on a content classification.
    Content(ContentTrigger),
    /// Fires when the compiled pattern matches the message text.
    Pattern,
    /// Fires on a named event.
    Event(String),
    /// Never fires: `on` named an unknown content type and no pattern was given.
    Inert,
}

/// Layout of a compiled pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternShape {
    Prefixed,
    Content,
    Bare,
}

/// A trigger pattern, compiled at registration.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    shape: PatternShape,
    source: String,
    user_groups: Range<usize>,
    rest: Option<usize>,
}

fn inline_flags(flags: &str) -> String {
    if flags.is_empty() {
        String::new()
    } else {
        format!("(?{flags})")
    }
}

fn build(pattern: String) -> RegisterResult<Regex> {
    Regex::new(&pattern).map_err(|source| RegisterError::InvalidPattern { pattern, source })
}

fn group_index(regex: &Regex, name: &str) -> Option<usize> {
    regex.capture_names().position(|group| group == Some(name))
}

impl CompiledPattern {
    /// Compiles a pattern-only command behind the anchored prefix.
    pub fn prefixed(source: &str, flags: &str, prefix: &PrefixState) -> RegisterResult<Self> {
        let regex = build(format!(
            r"{}{}\s?(?P<{KEYWORD_GROUP}>{source})(?P<{REST_GROUP}>.*)",
            inline_flags(flags),
            prefix.anchored(),
        ))?;

        let keyword = group_index(&regex, KEYWORD_GROUP).unwrap_or(0);
        let rest = group_index(&regex, REST_GROUP);
        let user_groups = match rest {
            Some(rest) if keyword > 0 => keyword + 1..rest,
            _ => 0..0,
        };

        Ok(Self {
            regex,
            shape: PatternShape::Prefixed,
            source: source.to_string(),
            user_groups,
            rest,
        })
    }

    /// Compiles a pattern attached to a content-type trigger.
    ///
    /// The primary prefix is inserted as-is, without anchoring.
    pub fn content(source: &str, flags: &str, prefix: &PrefixState) -> RegisterResult<Self> {
        let regex = build(format!("{}{}{source}", inline_flags(flags), prefix.primary()))?;
        let first = 1 + prefix.group_count();
        Ok(Self {
            user_groups: first..regex.captures_len(),
            regex,
            shape: PatternShape::Content,
            source: source.to_string(),
            rest: None,
        })
    }

    /// Compiles a pattern without any prefix.
    pub fn bare(source: &str, flags: &str) -> RegisterResult<Self> {
        let regex = build(format!("{}{source}", inline_flags(flags)))?;
        Ok(Self {
            user_groups: 1..regex.captures_len(),
            regex,
            shape: PatternShape::Bare,
            source: source.to_string(),
            rest: None,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn shape(&self) -> PatternShape {
        self.shape
    }

    /// The pattern as the plugin wrote it.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The full compiled expression.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Indices of the capture groups declared by the user pattern.
    pub fn user_groups(&self) -> Range<usize> {
        self.user_groups.clone()
    }

    /// Index of the `rest` group, for the `Prefixed` shape.
    pub fn rest_group(&self) -> Option<usize> {
        self.rest
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A registered command. Immutable once created.
#[derive(Clone)]
pub struct Command {
    trigger: TriggerKind,
    pattern: Option<CompiledPattern>,
    gates: Gates,
    desc: String,
    kind: String,
    dont_add_command_list: bool,
    handler: BoxedHandler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("trigger", &self.trigger)
            .field("pattern", &self.pattern.as_ref().map(CompiledPattern::as_str))
            .field("gates", &self.gates)
            .field("desc", &self.desc)
            .field("kind", &self.kind)
            .field("dont_add_command_list", &self.dont_add_command_list)
            .finish_non_exhaustive()
    }
}

impl Command {
    /// Resolves the trigger kind and compiles the pattern of `config`.
    pub(crate) fn compile(
        config: TriggerConfig,
        prefix: &PrefixState,
        handler: BoxedHandler,
    ) -> RegisterResult<Self> {
        let TriggerConfig {
            on,
            pattern,
            ev,
            use_prefix,
            flags,
            mut from_me,
            only_group,
            only_pm,
            desc,
            kind,
            dont_add_command_list,
        } = config;

        let (trigger, pattern) = match (on, pattern, ev) {
            (None, None, None) => {
                // A command without a trigger listens to everything, publicly.
                from_me = false;
                (TriggerKind::Content(ContentTrigger::Message), None)
            }
            (None, None, Some(ev)) => (TriggerKind::Event(ev), None),
            (on, pattern, _) => {
                let content = on.as_deref().and_then(ContentTrigger::from_name);
                if let (None, Some(on)) = (content, &on) {
                    warn!(on = %on, "Unknown content trigger, ignoring it");
                }

                match (content, pattern) {
                    (Some(content), Some(source)) => {
                        let flags = flags.as_deref().unwrap_or("");
                        let compiled = if use_prefix {
                            CompiledPattern::content(&source, flags, prefix)?
                        } else {
                            CompiledPattern::bare(&source, flags)?
                        };
                        (TriggerKind::Content(content), Some(compiled))
                    }
                    (Some(content), None) => (TriggerKind::Content(content), None),
                    (None, Some(source)) => {
                        let flags = flags.as_deref().unwrap_or(DEFAULT_PATTERN_FLAGS);
                        let compiled = if use_prefix {
                            CompiledPattern::prefixed(&source, flags, prefix)?
                        } else {
                            CompiledPattern::bare(&source, flags)?
                        };
                        (TriggerKind::Pattern, Some(compiled))
                    }
                    (None, None) => (TriggerKind::Inert, None),
                }
            }
        };

        Ok(Self {
            trigger,
            pattern,
            gates: Gates {
                from_me,
                only_group,
                only_pm,
            },
            desc,
            kind,
            dont_add_command_list,
            handler,
        })
    }

    pub fn trigger(&self) -> &TriggerKind {
        &self.trigger
    }

    pub fn pattern(&self) -> Option<&CompiledPattern> {
        self.pattern.as_ref()
    }

    pub fn gates(&self) -> Gates {
        self.gates
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// The menu grouping tag, `misc` when left empty.
    pub fn kind(&self) -> &str {
        if self.kind.is_empty() {
            DEFAULT_KIND
        } else {
            &self.kind
        }
    }

    /// Returns `true` if the command is listed in the command menu.
    pub fn is_listed(&self) -> bool {
        !self.dont_add_command_list && self.pattern.is_some()
    }

    /// The command keyword: the leading word of the pattern source.
    ///
    /// `"hello ?(.*)"` is named `hello`.
    pub fn name(&self) -> &str {
        let Some(pattern) = &self.pattern else {
            return "";
        };
        let source = pattern.source();
        let end = source
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(source.len());
        &source[..end]
    }

    /// A label for logs.
    pub fn label(&self) -> &str {
        match &self.trigger {
            TriggerKind::Content(content) if self.pattern.is_none() => content.as_str(),
            TriggerKind::Event(name) => name,
            _ => self.name(),
        }
    }

    /// A fresh handle to the handler service.
    pub fn handler(&self) -> BoxedHandler {
        self.handler.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::into_handler;
    use crate::context::CommandContext;

    fn noop() -> BoxedHandler {
        into_handler(|_ctx: CommandContext| async {})
    }

    fn compile(config: TriggerConfig) -> Command {
        Command::compile(config, &PrefixState::default(), noop()).unwrap()
    }

    #[test]
    fn test_default_trigger_is_public_message() {
        let command = compile(TriggerConfig::default().from_me(true));
        assert_eq!(command.trigger(), &TriggerKind::Content(ContentTrigger::Message));
        assert!(!command.gates().from_me);
        assert!(command.pattern().is_none());
    }

    #[test]
    fn test_event_trigger() {
        let command = compile(TriggerConfig::event("group.join"));
        assert_eq!(command.trigger(), &TriggerKind::Event("group.join".into()));
        assert!(command.gates().from_me);
        assert_eq!(command.label(), "group.join");
    }

    #[test]
    fn test_prefixed_shape() {
        let command = compile(TriggerConfig::pattern("hello ?(.*)"));
        let pattern = command.pattern().unwrap();
        assert_eq!(pattern.shape(), PatternShape::Prefixed);
        assert_eq!(
            pattern.as_str(),
            r"(?is)^[.]\s?(?P<keyword>hello ?(.*))(?P<rest>.*)"
        );
        assert_eq!(pattern.user_groups(), 2..3);
        assert_eq!(pattern.rest_group(), Some(3));
        assert_eq!(command.name(), "hello");
    }

    #[test]
    fn test_content_shape_uses_primary_prefix() {
        let command = compile(TriggerConfig::on("image").with_pattern("save (.*)"));
        let pattern = command.pattern().unwrap();
        assert_eq!(pattern.shape(), PatternShape::Content);
        assert_eq!(pattern.as_str(), "[.]save (.*)");
        assert_eq!(pattern.user_groups(), 1..2);
    }

    #[test]
    fn test_bare_shape_without_prefix() {
        let command = compile(TriggerConfig::pattern("^hi$").use_prefix(false).flags("i"));
        let pattern = command.pattern().unwrap();
        assert_eq!(pattern.shape(), PatternShape::Bare);
        assert_eq!(pattern.as_str(), "(?i)^hi$");
        assert!(pattern.is_match("HI"));
    }

    #[test]
    fn test_unknown_on_is_inert_or_pattern() {
        let inert = compile(TriggerConfig::on("location"));
        assert_eq!(inert.trigger(), &TriggerKind::Inert);

        let pattern = compile(TriggerConfig::on("location").with_pattern("loc"));
        assert_eq!(pattern.trigger(), &TriggerKind::Pattern);
    }

    #[test]
    fn test_malformed_pattern_is_rejected() {
        let err = Command::compile(TriggerConfig::pattern("(unclosed"), &PrefixState::default(), noop())
            .unwrap_err();
        assert!(matches!(err, RegisterError::InvalidPattern { .. }));
    }

    #[test]
    fn test_prefix_groups_are_skipped_in_content_shape() {
        let prefix = PrefixState::compile("^(!|#)").unwrap();
        let command = Command::compile(
            TriggerConfig::on("text").with_pattern("tag (\\w+)"),
            &prefix,
            noop(),
        )
        .unwrap();
        assert_eq!(command.pattern().unwrap().user_groups(), 2..3);
    }
}
