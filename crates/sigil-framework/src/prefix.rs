//! Prefix compilation.
//!
//! The `handlers` setting decides which invocation marker commands need. It
//! is compiled once into a [`PrefixState`] holding two fragments:
//!
//! | raw value         | primary                      | fallback |
//! |-------------------|------------------------------|----------|
//! | `false`           | `""`                         | `^.?`    |
//! | `null`            | `null`                       | `^.?`    |
//! | `^...`            | verbatim                     | `^`      |
//! | anything else     | brackets removed, `.` → `[.]` | `^`      |
//!
//! Every pattern command compiled afterwards uses the same frozen state.

use regex::Regex;

use crate::error::PrefixError;

/// Raw value that disables the prefix.
pub const DISABLED: &str = "false";

/// Raw value that accepts any single leading character.
pub const ANY: &str = "null";

/// Start-of-text anchor.
pub const START_ANCHOR: &str = "^";

/// Start of text, optionally followed by one arbitrary character.
pub const OPTIONAL_LEADING_CHAR: &str = "^.?";

/// The compiled prefix configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixState {
    raw: String,
    primary: String,
    fallback: &'static str,
    groups: usize,
}

impl PrefixState {
    /// Compiles the raw `handlers` setting.
    ///
    /// Fails if the resulting fragment is not a valid regular expression,
    /// which would otherwise break every pattern command later on.
    pub fn compile(raw: &str) -> Result<Self, PrefixError> {
        let (primary, fallback) = match raw {
            DISABLED => (String::new(), OPTIONAL_LEADING_CHAR),
            ANY => (raw.to_string(), OPTIONAL_LEADING_CHAR),
            _ if raw.starts_with(START_ANCHOR) => (raw.to_string(), START_ANCHOR),
            _ => {
                let literal = raw.replace(['[', ']'], "").replace('.', "[.]");
                (literal, START_ANCHOR)
            }
        };

        let regex = Regex::new(&primary).map_err(|source| PrefixError {
            raw: raw.to_string(),
            source,
        })?;

        Ok(Self {
            raw: raw.to_string(),
            groups: regex.captures_len() - 1,
            primary,
            fallback,
        })
    }

    /// The configuration value this state was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The fragment prepended to patterns.
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// The anchor used when the primary fragment is not anchored itself.
    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    /// Number of capture groups inside the primary fragment.
    pub fn group_count(&self) -> usize {
        self.groups
    }

    /// The fragment placed in front of pattern-only commands.
    pub fn anchored(&self) -> String {
        if self.primary.starts_with(START_ANCHOR) {
            self.primary.clone()
        } else {
            format!("{}{}", self.fallback, self.primary)
        }
    }

    /// A human-friendly prefix for menus and announcements.
    ///
    /// For a regex prefix this is the first symbol of its first bracketed
    /// class; otherwise the primary fragment without brackets.
    pub fn display_prefix(&self) -> String {
        if self.primary.starts_with(START_ANCHOR) {
            let first = Regex::new(r"\[(\W*)\]")
                .ok()
                .and_then(|re| re.captures(&self.primary))
                .and_then(|caps| caps.get(1))
                .and_then(|symbols| symbols.as_str().chars().next());
            if let Some(first) = first {
                return first.to_string();
            }
        }

        self.primary.replace(['[', ']'], "").trim().to_string()
    }
}

impl Default for PrefixState {
    fn default() -> Self {
        Self {
            raw: ".".to_string(),
            primary: "[.]".to_string(),
            fallback: START_ANCHOR,
            groups: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_prefix() {
        let state = PrefixState::compile("false").unwrap();
        assert_eq!(state.primary(), "");
        assert_eq!(state.fallback(), OPTIONAL_LEADING_CHAR);
        assert_eq!(state.anchored(), "^.?");
    }

    #[test]
    fn test_any_prefix_keeps_raw_value() {
        let state = PrefixState::compile("null").unwrap();
        assert_eq!(state.primary(), "null");
        assert_eq!(state.fallback(), OPTIONAL_LEADING_CHAR);
    }

    #[test]
    fn test_regex_prefix_is_verbatim() {
        let state = PrefixState::compile("^[.!]").unwrap();
        assert_eq!(state.primary(), "^[.!]");
        assert_eq!(state.fallback(), START_ANCHOR);
        assert_eq!(state.anchored(), "^[.!]");
        assert_eq!(state.display_prefix(), ".");
    }

    #[test]
    fn test_literal_list_is_escaped() {
        let state = PrefixState::compile("[.]").unwrap();
        assert_eq!(state.primary(), "[.]");
        assert_eq!(state.anchored(), "^[.]");
        assert_eq!(state.display_prefix(), ".");

        let state = PrefixState::compile("!.").unwrap();
        assert_eq!(state.primary(), "![.]");
        assert_eq!(state.display_prefix(), "!.");

        assert_eq!(PrefixState::compile(".").unwrap(), PrefixState::default());
    }

    #[test]
    fn test_invalid_regex_prefix() {
        let err = PrefixState::compile("^(").unwrap_err();
        assert_eq!(err.raw, "^(");
    }

    #[test]
    fn test_prefix_groups_are_counted() {
        let state = PrefixState::compile("^(!|#)").unwrap();
        assert_eq!(state.group_count(), 1);
    }
}
