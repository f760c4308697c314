//! The permission gate.
//!
//! Rejections are not errors: a denied command is skipped silently and
//! evaluation moves on to the next one.

use std::fmt;

use sigil_core::Message;

/// The sender and chat constraints of a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gates {
    /// Only the bot itself and configured administrators.
    pub from_me: bool,
    pub only_group: bool,
    pub only_pm: bool,
}

/// Why a command was not allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    OperatorOnly,
    GroupOnly,
    PrivateOnly,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OperatorOnly => "sender is not an operator",
            Self::GroupOnly => "command only runs in groups",
            Self::PrivateOnly => "command only runs in private chats",
        })
    }
}

impl Gates {
    /// Checks `message` against every gate.
    pub fn check(&self, message: &Message) -> Result<(), Denial> {
        if self.from_me && !message.is_operator() {
            return Err(Denial::OperatorOnly);
        }
        if self.only_group && !message.is_group {
            return Err(Denial::GroupOnly);
        }
        if self.only_pm && !message.is_pm {
            return Err(Denial::PrivateOnly);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_core::{ContentType, Jid, MessagePayload};

    fn message(is_group: bool, from_me: bool, is_sudo: bool) -> Message {
        Message {
            id: "ID".into(),
            sender: Jid::user_jid("200"),
            chat: Jid::user_jid("200"),
            from_me,
            is_group,
            is_pm: !is_group,
            is_bot: false,
            is_sudo,
            push_name: String::new(),
            content_type: ContentType::Conversation,
            text: ".x".into(),
            mentioned: Vec::new(),
            quoted: None,
            payload: MessagePayload::text(".x"),
        }
    }

    #[test]
    fn test_operator_gate() {
        let gates = Gates {
            from_me: true,
            ..Default::default()
        };
        assert_eq!(gates.check(&message(false, false, false)), Err(Denial::OperatorOnly));
        assert_eq!(gates.check(&message(false, true, false)), Ok(()));
        assert_eq!(gates.check(&message(false, false, true)), Ok(()));
    }

    #[test]
    fn test_chat_kind_gates() {
        let group_only = Gates {
            only_group: true,
            ..Default::default()
        };
        assert_eq!(group_only.check(&message(false, true, true)), Err(Denial::GroupOnly));
        assert_eq!(group_only.check(&message(true, false, false)), Ok(()));

        let pm_only = Gates {
            only_pm: true,
            ..Default::default()
        };
        assert_eq!(pm_only.check(&message(true, true, true)), Err(Denial::PrivateOnly));
        assert_eq!(pm_only.check(&message(false, false, false)), Ok(()));
    }

    #[test]
    fn test_conflicting_gates_never_pass() {
        let both = Gates {
            from_me: false,
            only_group: true,
            only_pm: true,
        };
        assert!(both.check(&message(true, false, false)).is_err());
        assert!(both.check(&message(false, false, false)).is_err());
    }
}
