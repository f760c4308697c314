//! Chat addresses.
//!
//! A [`Jid`] names a user, a group or a broadcast list as `user@server`,
//! optionally carrying a device number (`user:3@server`). Comparisons for
//! permission checks always go through [`Jid::to_non_device`] so a message
//! sent from a linked device still belongs to the same account.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JidParseError;

/// Server used for individual accounts.
pub const DEFAULT_USER_SERVER: &str = "s.whatsapp.net";

/// Server used for group chats.
pub const GROUP_SERVER: &str = "g.us";

/// Server used for status and broadcast lists.
pub const BROADCAST_SERVER: &str = "broadcast";

/// A chat address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Jid {
    user: String,
    device: Option<u16>,
    server: String,
}

impl Jid {
    /// Creates an address from its user and server parts.
    pub fn new(user: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            device: None,
            server: server.into(),
        }
    }

    /// Creates an individual account address on [`DEFAULT_USER_SERVER`].
    pub fn user_jid(user: impl Into<String>) -> Self {
        Self::new(user, DEFAULT_USER_SERVER)
    }

    /// Sets the device number.
    pub fn with_device(mut self, device: u16) -> Self {
        self.device = Some(device);
        self
    }

    /// The user part (phone number or group id).
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The server part.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// The device number, if any.
    pub fn device(&self) -> Option<u16> {
        self.device
    }

    /// Returns `true` for the empty address.
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.server.is_empty()
    }

    /// Returns `true` if this addresses a group chat.
    pub fn is_group(&self) -> bool {
        self.server == GROUP_SERVER
    }

    /// Returns `true` if this addresses a broadcast list.
    pub fn is_broadcast(&self) -> bool {
        self.server == BROADCAST_SERVER
    }

    /// Returns the same address without the device number.
    pub fn to_non_device(&self) -> Self {
        Self {
            user: self.user.clone(),
            device: None,
            server: self.server.clone(),
        }
    }
}

impl fmt::Display for Jid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user.is_empty() {
            return f.write_str(&self.server);
        }
        match self.device {
            Some(device) => write!(f, "{}:{}@{}", self.user, device, self.server),
            None => write!(f, "{}@{}", self.user, self.server),
        }
    }
}

impl FromStr for Jid {
    type Err = JidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(JidParseError::Empty);
        }

        let Some((user_part, server)) = s.rsplit_once('@') else {
            // A bare server such as "broadcast" or "s.whatsapp.net".
            return Ok(Self::new("", s));
        };

        let (user, device) = match user_part.split_once(':') {
            Some((user, device)) => {
                let device = device
                    .parse::<u16>()
                    .map_err(|_| JidParseError::InvalidDevice(s.to_string()))?;
                (user, Some(device))
            }
            None => (user_part, None),
        };

        Ok(Self {
            user: user.to_string(),
            device,
            server: server.to_string(),
        })
    }
}

impl TryFrom<String> for Jid {
    type Error = JidParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Jid> for String {
    fn from(jid: Jid) -> Self {
        jid.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_with_device() {
        let jid: Jid = "15551234567:12@s.whatsapp.net".parse().unwrap();
        assert_eq!(jid.user(), "15551234567");
        assert_eq!(jid.device(), Some(12));
        assert_eq!(jid.server(), DEFAULT_USER_SERVER);
        assert_eq!(jid.to_non_device().to_string(), "15551234567@s.whatsapp.net");
    }

    #[test]
    fn test_parse_bare_server() {
        let jid: Jid = "status@broadcast".parse().unwrap();
        assert!(jid.is_broadcast());

        let bare: Jid = "broadcast".parse().unwrap();
        assert_eq!(bare.user(), "");
        assert_eq!(bare.to_string(), "broadcast");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<Jid>(), Err(JidParseError::Empty));
        assert!(matches!(
            "1:x@s.whatsapp.net".parse::<Jid>(),
            Err(JidParseError::InvalidDevice(_))
        ));
    }

    #[test]
    fn test_group_detection() {
        let jid: Jid = "120363000000000000@g.us".parse().unwrap();
        assert!(jid.is_group());
        assert!(!Jid::user_jid("1").is_group());
    }
}
