/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Message types for the FIX protocol.
//!
//! This module provides:
//! - [`MsgType`]: the value of tag 35
//! - [`RawMessage`]: zero-copy view into a buffer owned by somebody else
//! - [`OwnedMessage`]: a message that owns its bytes, safe to hand to another thread
//! - [`Section`]: header/body/trailer placement of standard tags
//!
//! ## Ownership at the engine boundary
//!
//! Engines hand messages to callbacks either as a [`RawMessage`] borrowing the
//! engine's read buffer or as a `&mut OwnedMessage` the engine keeps mutating
//! before it writes to the wire. Anything that outlives the callback must be
//! taken with [`OwnedMessage::from_raw`] or [`OwnedMessage::deep_copy`], which
//! both allocate a fresh buffer.

use crate::error::DecodeError;
use crate::field::FieldRef;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::ops::Range;

/// Message type (tag 35) value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MsgType(String);

impl MsgType {
    /// Heartbeat (0).
    pub const HEARTBEAT: &'static str = "0";
    /// Test Request (1).
    pub const TEST_REQUEST: &'static str = "1";
    /// Resend Request (2).
    pub const RESEND_REQUEST: &'static str = "2";
    /// Reject (3).
    pub const REJECT: &'static str = "3";
    /// Sequence Reset (4).
    pub const SEQUENCE_RESET: &'static str = "4";
    /// Logout (5).
    pub const LOGOUT: &'static str = "5";
    /// Logon (A).
    pub const LOGON: &'static str = "A";
    /// XML Message (n), also session level in FIXT.
    pub const XML_MESSAGE: &'static str = "n";

    /// Creates a message type from its wire value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the wire value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is an administrative (session level) message.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::HEARTBEAT
                | Self::TEST_REQUEST
                | Self::RESEND_REQUEST
                | Self::REJECT
                | Self::SEQUENCE_RESET
                | Self::LOGOUT
                | Self::LOGON
                | Self::XML_MESSAGE
        )
    }

    /// Returns true if this is an application message.
    #[must_use]
    pub fn is_app(&self) -> bool {
        !self.is_admin()
    }
}

impl std::str::FromStr for MsgType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for MsgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Placement of a field within a FIX message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Standard header.
    Header,
    /// Message body.
    Body,
    /// Standard trailer.
    Trailer,
}

impl Section {
    /// Classifies a tag using the standard header and trailer of FIX 4.x / FIXT 1.1.
    ///
    /// Used when no transport dictionary is available for the session.
    #[must_use]
    pub const fn of_standard_tag(tag: u32) -> Self {
        match tag {
            8 | 9 | 35 | 34 | 43 | 49 | 50 | 52 | 56 | 57 | 90 | 91 | 97 | 115 | 116 | 122
            | 128 | 129 | 142 | 143 | 144 | 145 | 212 | 213 | 347 | 369 | 627 | 628 | 629
            | 630 | 1128 | 1129 | 1156 => Self::Header,
            10 | 89 | 93 => Self::Trailer,
            _ => Self::Body,
        }
    }

    /// Returns the JSON object key used when rendering this section.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Body => "Body",
            Self::Trailer => "Trailer",
        }
    }
}

/// Zero-copy view into a FIX message buffer.
///
/// Fields are stored as references into the original buffer, so the view is
/// only valid while the owner of that buffer keeps it alive and unchanged.
#[derive(Debug, Clone)]
pub struct RawMessage<'a> {
    /// The complete message buffer.
    buffer: &'a [u8],
    /// Range of the BeginString field value.
    begin_string: Range<usize>,
    /// The parsed message type.
    msg_type: MsgType,
    /// Parsed field references in wire order.
    fields: SmallVec<[FieldRef<'a>; 32]>,
}

impl<'a> RawMessage<'a> {
    /// Creates a new RawMessage from parsed components.
    ///
    /// # Arguments
    /// * `buffer` - The complete message buffer
    /// * `begin_string` - Range of the BeginString value
    /// * `msg_type` - The parsed message type
    /// * `fields` - Parsed field references, all borrowing from `buffer`
    #[must_use]
    pub fn new(
        buffer: &'a [u8],
        begin_string: Range<usize>,
        msg_type: MsgType,
        fields: SmallVec<[FieldRef<'a>; 32]>,
    ) -> Self {
        Self {
            buffer,
            begin_string,
            msg_type,
            fields,
        }
    }

    /// Returns the complete message buffer.
    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Returns the BeginString value (e.g., "FIX.4.4").
    #[must_use]
    pub fn begin_string(&self) -> &'a str {
        std::str::from_utf8(&self.buffer[self.begin_string.clone()]).unwrap_or("")
    }

    /// Returns the message type.
    #[inline]
    #[must_use]
    pub fn msg_type(&self) -> &MsgType {
        &self.msg_type
    }

    /// Returns an iterator over all fields in wire order.
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = &FieldRef<'a>> {
        self.fields.iter()
    }

    /// Returns the number of fields in the message.
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Gets the first field with the given tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&FieldRef<'a>> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    /// Gets a field value as a string.
    #[must_use]
    pub fn get_field_str(&self, tag: u32) -> Option<&'a str> {
        self.get_field(tag).and_then(|f| f.as_str().ok())
    }

    /// Gets a field value parsed as the specified type.
    ///
    /// # Errors
    /// Returns `DecodeError` if the field is missing or cannot be parsed.
    pub fn get_field_as<T: std::str::FromStr>(&self, tag: u32) -> Result<T, DecodeError> {
        self.get_field(tag)
            .ok_or(DecodeError::InvalidFieldValue {
                tag,
                reason: "field not present".to_string(),
            })?
            .parse()
    }

    /// Returns the message length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the message is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Copies this borrowed message into a freshly allocated owned message.
    #[must_use]
    pub fn to_owned(&self) -> OwnedMessage {
        OwnedMessage::from_raw(self)
    }
}

/// Owned FIX message for storage and cross-thread transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedMessage {
    /// The complete message buffer.
    buffer: Bytes,
    /// The parsed message type.
    msg_type: MsgType,
    /// Field offsets in wire order: (tag, value_range).
    field_offsets: Vec<(u32, Range<usize>)>,
}

impl OwnedMessage {
    /// Creates an OwnedMessage by copying the bytes a RawMessage borrows.
    ///
    /// # Arguments
    /// * `raw` - The raw message to copy
    #[must_use]
    pub fn from_raw(raw: &RawMessage<'_>) -> Self {
        let buffer = Bytes::copy_from_slice(raw.buffer);
        let base = raw.buffer.as_ptr() as usize;
        let field_offsets = raw
            .fields
            .iter()
            .map(|f| {
                let start = f.value.as_ptr() as usize - base;
                (f.tag, start..start + f.value.len())
            })
            .collect();

        Self {
            buffer,
            msg_type: raw.msg_type.clone(),
            field_offsets,
        }
    }

    /// Creates an OwnedMessage from raw bytes.
    ///
    /// # Arguments
    /// * `buffer` - The message bytes
    /// * `msg_type` - The message type
    /// * `field_offsets` - Field tag and value range pairs
    #[must_use]
    pub fn new(buffer: Bytes, msg_type: MsgType, field_offsets: Vec<(u32, Range<usize>)>) -> Self {
        Self {
            buffer,
            msg_type,
            field_offsets,
        }
    }

    /// Returns an independent copy backed by a new allocation.
    ///
    /// `Clone` shares the underlying `Bytes`; this does not, so the copy stays
    /// valid regardless of what the original's owner does next.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            buffer: Bytes::copy_from_slice(&self.buffer),
            msg_type: self.msg_type.clone(),
            field_offsets: self.field_offsets.clone(),
        }
    }

    /// Returns the message type.
    #[inline]
    #[must_use]
    pub fn msg_type(&self) -> &MsgType {
        &self.msg_type
    }

    /// Returns the message bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the message length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if the message is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the BeginString value, if present.
    #[must_use]
    pub fn begin_string(&self) -> Option<&str> {
        self.get_field_str(8)
    }

    /// Gets the first field value with the given tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&[u8]> {
        self.field_offsets
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, range)| &self.buffer[range.clone()])
    }

    /// Gets a field value as a string.
    #[must_use]
    pub fn get_field_str(&self, tag: u32) -> Option<&str> {
        self.get_field(tag)
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns an iterator over all fields in wire order, repeated tags included.
    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> {
        self.field_offsets
            .iter()
            .map(|(tag, range)| FieldRef::new(*tag, &self.buffer[range.clone()]))
    }

    /// Returns the number of fields.
    #[inline]
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.field_offsets.len()
    }

    /// Consumes the message and returns the underlying buffer.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OwnedMessage {
        // 8=FIX.4.4 (value 2..9), 35=D (value 13..14), 49=SENDER (value 18..24)
        let buffer = Bytes::from_static(b"8=FIX.4.4\x0135=D\x0149=SENDER\x01");
        let field_offsets = vec![(8, 2..9), (35, 13..14), (49, 18..24)];
        OwnedMessage::new(buffer, MsgType::new("D"), field_offsets)
    }

    #[test]
    fn test_msg_type_is_admin() {
        assert!(MsgType::new("0").is_admin());
        assert!(MsgType::new("A").is_admin());
        assert!(MsgType::new("5").is_admin());
        assert!(!MsgType::new("D").is_admin());
        assert!(MsgType::new("8").is_app());
    }

    #[test]
    fn test_msg_type_parse_and_display() {
        let msg_type: MsgType = "AE".parse().unwrap();
        assert_eq!(msg_type.as_str(), "AE");
        assert_eq!(msg_type.to_string(), "AE");
    }

    #[test]
    fn test_section_of_standard_tag() {
        assert_eq!(Section::of_standard_tag(8), Section::Header);
        assert_eq!(Section::of_standard_tag(52), Section::Header);
        assert_eq!(Section::of_standard_tag(55), Section::Body);
        assert_eq!(Section::of_standard_tag(10), Section::Trailer);
        assert_eq!(Section::Trailer.as_str(), "Trailer");
    }

    #[test]
    fn test_owned_message_field_access() {
        let msg = sample();
        assert_eq!(msg.begin_string(), Some("FIX.4.4"));
        assert_eq!(msg.get_field_str(35), Some("D"));
        assert_eq!(msg.get_field_str(49), Some("SENDER"));
        assert_eq!(msg.get_field_str(999), None);
        assert_eq!(msg.fields().count(), 3);
    }

    #[test]
    fn test_deep_copy_does_not_share_buffer() {
        let msg = sample();
        let copy = msg.deep_copy();
        assert_eq!(copy, msg);
        assert_ne!(copy.as_bytes().as_ptr(), msg.as_bytes().as_ptr());
    }

    #[test]
    fn test_from_raw_copies_buffer() {
        let mut buffer = b"8=FIX.4.4\x0135=0\x01".to_vec();
        let owned = {
            let buf: &[u8] = &buffer;
            let mut fields: SmallVec<[FieldRef<'_>; 32]> = SmallVec::new();
            fields.push(FieldRef::new(8, &buf[2..9]));
            fields.push(FieldRef::new(35, &buf[13..14]));
            let raw = RawMessage::new(buf, 2..9, MsgType::new("0"), fields);
            assert_eq!(raw.begin_string(), "FIX.4.4");
            raw.to_owned()
        };

        // The engine is free to reuse its buffer once the callback returns.
        buffer.fill(b'x');

        assert_eq!(owned.get_field_str(8), Some("FIX.4.4"));
        assert_eq!(owned.get_field_str(35), Some("0"));
    }
}
