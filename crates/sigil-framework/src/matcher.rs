//! Match evaluation and argument extraction.
//!
//! Evaluation is synchronous and walks the registry in registration order,
//! so the matches for one event always come out in the same order.
//!
//! # Arguments
//!
//! The argument is read from named groups:
//!
//! 1. a user group named `arg`, when it took part in the match;
//! 2. for pattern-only commands, the first group inside the keyword, then
//!    whatever follows the keyword (`rest`);
//! 3. otherwise, the first non-empty group declared by the user pattern.
//!
//! The older positional rule is still available as [`positional_argument`].
//! Both are computed and a `debug` event is emitted when they disagree.

use std::sync::Arc;

use regex::Captures;
use sigil_core::ContentType;
use tracing::{debug, trace};

use crate::command::{ARG_GROUP, Command, CompiledPattern, PatternShape, TriggerKind};
use crate::registry::CommandRegistry;

/// A command whose trigger fired.
#[derive(Debug, Clone)]
pub struct Match {
    /// Position of the command in the registry.
    pub index: usize,
    pub command: Arc<Command>,
    /// The extracted argument, `""` when there is none.
    pub argument: String,
}

/// Returns every command whose trigger fires for `content_type` and `text`,
/// in registration order.
///
/// Named-event commands never match here.
pub fn evaluate(registry: &CommandRegistry, content_type: ContentType, text: &str) -> Vec<Match> {
    let mut matches = Vec::new();

    for (index, command) in registry.commands().iter().enumerate() {
        let argument = match command.trigger() {
            TriggerKind::Content(content) => {
                if !content.matches(content_type, text) {
                    continue;
                }
                command
                    .pattern()
                    .and_then(|pattern| extract_argument(pattern, text))
                    .unwrap_or_default()
            }
            TriggerKind::Pattern => match command.pattern().and_then(|p| extract_argument(p, text)) {
                Some(argument) => argument,
                None => continue,
            },
            TriggerKind::Event(_) | TriggerKind::Inert => continue,
        };

        trace!(index, command = command.label(), argument = %argument, "Command matched");
        matches.push(Match {
            index,
            command: Arc::clone(command),
            argument,
        });
    }

    matches
}

/// Matches `pattern` against `text` and extracts the argument.
///
/// Returns `None` if the pattern does not match.
pub fn extract_argument(pattern: &CompiledPattern, text: &str) -> Option<String> {
    let caps = pattern.regex().captures(text)?;
    let argument = named_argument(pattern, &caps);

    let positional = positional_argument(&caps);
    if positional != argument {
        debug!(
            pattern = pattern.as_str(),
            text,
            argument = %argument,
            positional = %positional,
            "Named and positional argument extraction disagree"
        );
    }

    Some(argument)
}

fn named_argument(pattern: &CompiledPattern, caps: &Captures<'_>) -> String {
    if let Some(arg) = caps.name(ARG_GROUP) {
        return arg.as_str().to_string();
    }

    let group = |index: usize| caps.get(index).map_or("", |m| m.as_str());
    let mut user_groups = pattern.user_groups();

    let argument = match pattern.shape() {
        PatternShape::Prefixed => user_groups
            .next()
            .map(group)
            .filter(|first| !first.is_empty())
            .or_else(|| pattern.rest_group().map(group))
            .unwrap_or(""),
        PatternShape::Content | PatternShape::Bare => user_groups
            .map(group)
            .find(|value| !value.is_empty())
            .unwrap_or(""),
    };

    argument.to_string()
}

/// The positional extraction rule, kept for comparison.
///
/// With six groups (counting group 0) the argument is group 3, falling back
/// to group 4; otherwise group 2, falling back to group 3.
pub fn positional_argument(caps: &Captures<'_>) -> String {
    let group = |index: usize| caps.get(index).map_or("", |m| m.as_str());

    let argument = match caps.len() {
        0 | 1 => "",
        6 => Some(group(3))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| group(4)),
        _ => Some(group(2))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| group(3)),
    };

    argument.to_string()
}
