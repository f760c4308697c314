//! Operator identity resolution.
//!
//! An operator ("sudo") is the bot's own account or any administrator named
//! in the comma-separated `sudo` setting. Senders are compared in their
//! normalized `user@s.whatsapp.net` form, so device suffixes never matter.

use crate::jid::{DEFAULT_USER_SERVER, Jid};

/// Decides which senders are operators.
pub trait IdentityResolver: Send + Sync {
    /// The bot's own account, once the transport knows it.
    fn own_jid(&self) -> Option<&Jid>;

    /// Returns `true` if `sender` is the bot itself or a configured administrator.
    fn is_sudo(&self, sender: &Jid) -> bool;

    /// Where administrative reports go: the first administrator, or the bot's
    /// own account when no administrator is configured.
    fn admin_destination(&self) -> Option<Jid>;
}

/// The default [`IdentityResolver`], built from the raw administrator list.
#[derive(Debug, Clone, Default)]
pub struct SudoList {
    own: Option<Jid>,
    admins: Vec<String>,
}

impl SudoList {
    /// Parses the comma-separated administrator list.
    ///
    /// Entries are trimmed; empty entries are kept so that the first position
    /// keeps its meaning for [`admin_destination`](IdentityResolver::admin_destination).
    pub fn new(own: Option<Jid>, raw_admins: &str) -> Self {
        let admins = raw_admins
            .split(',')
            .map(|entry| entry.trim().to_string())
            .collect();
        Self {
            own: own.map(|jid| jid.to_non_device()),
            admins,
        }
    }

    /// The configured administrator numbers, skipping empty entries.
    pub fn admins(&self) -> impl Iterator<Item = &str> {
        self.admins
            .iter()
            .map(String::as_str)
            .filter(|admin| !admin.is_empty())
    }

    fn normalized(user: &str) -> String {
        format!("{user}@{DEFAULT_USER_SERVER}")
    }
}

impl IdentityResolver for SudoList {
    fn own_jid(&self) -> Option<&Jid> {
        self.own.as_ref()
    }

    fn is_sudo(&self, sender: &Jid) -> bool {
        let sender = sender.to_non_device().to_string();
        self.own
            .iter()
            .map(|own| own.user())
            .chain(self.admins())
            .filter(|user| !user.is_empty())
            .any(|user| Self::normalized(user) == sender)
    }

    fn admin_destination(&self) -> Option<Jid> {
        match self.admins.first().map(String::as_str) {
            Some(first) if !first.is_empty() => Some(Jid::user_jid(first)),
            _ => self.own.as_ref().map(|own| Jid::user_jid(own.user())),
        }
    }
}
