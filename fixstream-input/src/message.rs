/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Pipeline messages produced by the input.

use crate::event::EventKind;
use bytes::Bytes;
use fixstream_session::SessionId;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::debug;

/// Metadata key holding the session identifier.
pub const METADATA_SESSION_ID: &str = "fix_session_id";

/// Metadata key holding the event kind.
pub const METADATA_EVENT: &str = "fix_event";

/// A rendered event with string metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    body: Bytes,
    metadata: BTreeMap<String, String>,
}

impl Message {
    /// Creates a message with no metadata.
    #[must_use]
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Sets a metadata value.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the body bytes.
    #[inline]
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error if the body is not valid JSON for `T`.
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns a metadata value.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Returns an iterator over all metadata.
    pub fn metadata_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metadata.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the session identifier metadata.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.metadata(METADATA_SESSION_ID)
    }

    /// Returns the event kind metadata.
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        self.metadata(METADATA_EVENT)
    }
}

/// Acknowledgement hook returned with every message.
///
/// Delivered events cannot be replayed, so acknowledging only records that
/// the pipeline is done with the message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an unacknowledged message is still delivered; call `ack` when done"]
pub struct Ack {
    session_id: SessionId,
    kind: EventKind,
}

impl Ack {
    pub(crate) const fn new(session_id: SessionId, kind: EventKind) -> Self {
        Self { session_id, kind }
    }

    /// Acknowledges the message. `processed` is false when the pipeline failed
    /// to handle it.
    pub fn ack(self, processed: bool) {
        debug!(
            session = %self.session_id,
            event = %self.kind,
            processed,
            "message acknowledged"
        );
    }
}
