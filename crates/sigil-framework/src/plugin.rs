//! Plugins and the bot mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegisterResult;
use crate::registry::CommandRegistry;

/// Who may use the bundled commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Everyone.
    #[default]
    Public,
    /// Only the bot itself and configured administrators.
    Private,
}

impl Mode {
    /// The `fromMe` gate plugins should use under this mode.
    pub fn restricts(&self) -> bool {
        matches!(self, Self::Private)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = std::convert::Infallible;

    /// Anything other than `public` is private.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.trim().eq_ignore_ascii_case("public") {
            Self::Public
        } else {
            Self::Private
        })
    }
}

/// A bundle of commands installed at startup.
///
/// ```rust,ignore
/// struct Info;
///
/// impl Plugin for Info {
///     fn name(&self) -> &str {
///         "info"
///     }
///
///     fn register(&self, registry: &mut CommandRegistry) -> RegisterResult<()> {
///         let restricted = registry.mode().restricts();
///         registry.register(TriggerConfig::pattern("ping").from_me(restricted), ping)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    fn register(&self, registry: &mut CommandRegistry) -> RegisterResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("public".parse::<Mode>(), Ok(Mode::Public));
        assert_eq!("PUBLIC".parse::<Mode>(), Ok(Mode::Public));
        assert_eq!("private".parse::<Mode>(), Ok(Mode::Private));
        assert_eq!("anything".parse::<Mode>(), Ok(Mode::Private));
        assert!(Mode::Private.restricts());
        assert!(!Mode::Public.restricts());
    }
}
