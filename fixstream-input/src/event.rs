/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Events produced by engine callbacks.

use fixstream_core::message::OwnedMessage;
use fixstream_session::SessionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which engine callback produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A session was created.
    Create,
    /// A session logged on.
    Logon,
    /// A session logged out.
    Logout,
    /// An admin message is about to be sent.
    ToAdmin,
    /// An application message is about to be sent.
    ToApp,
    /// An admin message was received.
    FromAdmin,
    /// An application message was received.
    FromApp,
}

impl EventKind {
    /// Returns the metadata name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Logon => "logon",
            Self::Logout => "logout",
            Self::ToAdmin => "to_admin",
            Self::ToApp => "to_app",
            Self::FromAdmin => "from_admin",
            Self::FromApp => "from_app",
        }
    }

    /// Returns true if events of this kind carry a message.
    #[must_use]
    pub const fn has_payload(&self) -> bool {
        !matches!(self, Self::Create | Self::Logon | Self::Logout)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One engine callback, detached from engine-owned memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    session_id: SessionId,
    kind: EventKind,
    payload: Option<OwnedMessage>,
}

impl Event {
    /// Creates an event without a message.
    #[must_use]
    pub const fn new(session_id: SessionId, kind: EventKind) -> Self {
        Self {
            session_id,
            kind,
            payload: None,
        }
    }

    /// Creates an event carrying `payload`.
    ///
    /// The payload must already own its bytes.
    #[must_use]
    pub const fn with_payload(session_id: SessionId, kind: EventKind, payload: OwnedMessage) -> Self {
        Self {
            session_id,
            kind,
            payload: Some(payload),
        }
    }

    /// Returns the session the event belongs to.
    #[inline]
    #[must_use]
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the callback kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the message, if any.
    #[inline]
    #[must_use]
    pub const fn payload(&self) -> Option<&OwnedMessage> {
        self.payload.as_ref()
    }
}
