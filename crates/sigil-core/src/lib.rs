//! # Sigil Core
//!
//! Foundation types shared by every Sigil crate.
//!
//! - **Addresses**: [`Jid`] for users, groups and broadcast lists
//! - **Payloads**: [`MessagePayload`] and its [`ContentType`] classification
//! - **Events**: [`InboundEvent`], the stream the transport delivers
//! - **Messages**: [`Message`], the classified view handlers receive
//! - **Media**: [`MediaSource`] loads outgoing media from bytes, files or URLs
//! - **Collaborators**: the [`Transport`] and [`IdentityResolver`] traits
//!
//! ```text
//! Transport ──InboundEvent──▶ runtime loop ──Message──▶ dispatcher ──▶ handlers
//!     ▲                                                                   │
//!     └────────────────────────── send / mark_read / revoke ──────────────┘
//! ```

pub mod error;
pub mod event;
pub mod identity;
pub mod jid;
pub mod media;
pub mod message;
pub mod payload;
pub mod transport;

pub use error::{ApiError, ApiResult, JidParseError};
pub use event::{InboundEvent, MessageEvent, MessageInfo, NamedEvent, SyncPreview};
pub use identity::{IdentityResolver, SudoList};
pub use jid::{BROADCAST_SERVER, DEFAULT_USER_SERVER, GROUP_SERVER, Jid};
pub use media::MediaSource;
pub use message::{Message, QuotedMessage};
pub use payload::{ContentType, ContextInfo, ExtendedText, MediaContent, MessagePayload};
pub use transport::{
    BoxedTransport, MediaKind, MessageId, OutgoingMedia, OutgoingMessage, Quote, Transport,
};
