/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Application callback interface.
//!
//! This module defines the seven callbacks an engine invokes on its
//! application, following the QuickFIX pattern with async support.
//!
//! Engines call these from their own session workers. Borrowed messages are
//! only valid for the duration of the call: an implementation that keeps a
//! message must copy it first.

use async_trait::async_trait;
use fixstream_core::message::{OwnedMessage, RawMessage};

pub use fixstream_session::SessionId;

/// Why an inbound message was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectReason {
    /// SessionRejectReason (tag 373) code.
    pub code: u32,
    /// Text (tag 58) sent with the reject.
    pub text: String,
    /// RefTagID (tag 371) of the offending field.
    pub ref_tag: Option<u32>,
}

impl RejectReason {
    /// Creates a new rejection reason.
    #[must_use]
    pub fn new(code: u32, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
            ref_tag: None,
        }
    }

    /// Sets the reference tag.
    #[must_use]
    pub const fn with_ref_tag(mut self, tag: u32) -> Self {
        self.ref_tag = Some(tag);
        self
    }
}

/// The seven callbacks an engine invokes on its application.
///
/// Calls for one session arrive in session order from that session's worker.
/// Implementations may hold the worker for as long as they need; the engine
/// does no further work on that session until the call returns.
#[async_trait]
pub trait Application: Send + Sync {
    /// A session from the settings file now exists in the engine.
    ///
    /// # Arguments
    /// * `session_id` - The created session
    async fn on_create(&self, session_id: &SessionId);

    /// The counterparty accepted the logon.
    ///
    /// # Arguments
    /// * `session_id` - The session now logged on
    async fn on_logon(&self, session_id: &SessionId);

    /// The session logged out or lost its connection.
    ///
    /// # Arguments
    /// * `session_id` - The session now logged out
    async fn on_logout(&self, session_id: &SessionId);

    /// An admin message (logon, heartbeat, resend...) is about to be sent.
    ///
    /// The engine reuses `message` after the call returns.
    ///
    /// # Arguments
    /// * `message` - Outgoing message, editable in place
    /// * `session_id` - Sending session
    async fn to_admin(&self, message: &mut OwnedMessage, session_id: &SessionId);

    /// An admin message arrived.
    ///
    /// # Arguments
    /// * `message` - View into the engine's receive buffer
    /// * `session_id` - Receiving session
    ///
    /// # Errors
    /// Returning `RejectReason` makes the engine reject the message.
    #[allow(clippy::wrong_self_convention)]
    async fn from_admin(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason>;

    /// An application message is about to be sent.
    ///
    /// The engine reuses `message` after the call returns.
    ///
    /// # Arguments
    /// * `message` - Outgoing message, editable in place
    /// * `session_id` - Sending session
    async fn to_app(&self, message: &mut OwnedMessage, session_id: &SessionId);

    /// An application message arrived.
    ///
    /// # Arguments
    /// * `message` - View into the engine's receive buffer
    /// * `session_id` - Receiving session
    ///
    /// # Errors
    /// Returning `RejectReason` makes the engine reject the message.
    #[allow(clippy::wrong_self_convention)]
    async fn from_app(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason>;
}

/// Application that accepts everything and records nothing.
#[derive(Debug, Default)]
pub struct NoOpApplication;

#[async_trait]
impl Application for NoOpApplication {
    async fn on_create(&self, _session_id: &SessionId) {}

    async fn on_logon(&self, _session_id: &SessionId) {}

    async fn on_logout(&self, _session_id: &SessionId) {}

    async fn to_admin(&self, _message: &mut OwnedMessage, _session_id: &SessionId) {}

    async fn from_admin(
        &self,
        _message: &RawMessage<'_>,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }

    async fn to_app(&self, _message: &mut OwnedMessage, _session_id: &SessionId) {}

    async fn from_app(
        &self,
        _message: &RawMessage<'_>,
        _session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use fixstream_core::message::MsgType;

    #[test]
    fn test_reject_reason() {
        let reason = RejectReason::new(1, "Invalid tag").with_ref_tag(35);
        assert_eq!(reason.code, 1);
        assert_eq!(reason.text, "Invalid tag");
        assert_eq!(reason.ref_tag, Some(35));
    }

    #[tokio::test]
    async fn test_noop_application() {
        let app = NoOpApplication;
        let session_id = SessionId::new("FIX.4.4", "SENDER", "TARGET");

        app.on_create(&session_id).await;
        app.on_logon(&session_id).await;
        app.on_logout(&session_id).await;

        let mut message = OwnedMessage::new(
            Bytes::from_static(b"8=FIX.4.4\x0135=0\x01"),
            MsgType::new("0"),
            vec![(8, 2..9), (35, 13..14)],
        );
        app.to_admin(&mut message, &session_id).await;
        app.to_app(&mut message, &session_id).await;
        assert_eq!(message.field_count(), 2);
    }
}
