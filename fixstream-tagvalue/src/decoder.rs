/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Zero-copy FIX message decoder.
//!
//! The decoder walks a buffer that may hold several back-to-back messages and
//! yields one [`RawMessage`] per call to [`Decoder::decode`]. Field values are
//! slices of the input; call [`RawMessage::to_owned`] or use [`decode_owned`]
//! to keep a message beyond the buffer's lifetime.

use crate::checksum::{calculate_checksum, parse_checksum};
use fixstream_core::error::DecodeError;
use fixstream_core::field::FieldRef;
use fixstream_core::message::{MsgType, OwnedMessage, RawMessage};
use memchr::memchr;
use smallvec::SmallVec;

/// SOH (Start of Header) delimiter used in FIX messages.
pub const SOH: u8 = 0x01;

/// Equals sign delimiter between tag and value.
pub const EQUALS: u8 = b'=';

/// Zero-copy FIX message decoder.
#[derive(Debug)]
pub struct Decoder<'a> {
    /// Input buffer.
    input: &'a [u8],
    /// Current position in the buffer.
    offset: usize,
    /// Whether to validate checksums.
    validate_checksum: bool,
}

impl<'a> Decoder<'a> {
    /// Creates a new decoder for the given input buffer.
    #[inline]
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            offset: 0,
            validate_checksum: true,
        }
    }

    /// Sets whether to validate checksums during decoding.
    #[inline]
    #[must_use]
    pub const fn with_checksum_validation(mut self, validate: bool) -> Self {
        self.validate_checksum = validate;
        self
    }

    /// Decodes the next complete FIX message from the buffer.
    ///
    /// # Errors
    /// Returns `DecodeError` if the message is malformed or incomplete.
    pub fn decode(&mut self) -> Result<RawMessage<'a>, DecodeError> {
        let start_offset = self.offset;

        let begin_string_field = self.next_field().ok_or(DecodeError::Incomplete)?;
        if begin_string_field.tag != 8 {
            return Err(DecodeError::InvalidBeginString);
        }
        let begin_string_start = self.offset_of(begin_string_field.value);
        let begin_string =
            begin_string_start..begin_string_start + begin_string_field.value.len();

        let body_length_field = self.next_field().ok_or(DecodeError::MissingBodyLength)?;
        if body_length_field.tag != 9 {
            return Err(DecodeError::MissingBodyLength);
        }
        body_length_field
            .as_str()?
            .parse::<usize>()
            .map_err(|_| DecodeError::InvalidBodyLength)?;

        let msg_type_field = self.next_field().ok_or(DecodeError::MissingMsgType)?;
        if msg_type_field.tag != 35 {
            return Err(DecodeError::MissingMsgType);
        }
        let msg_type = MsgType::new(msg_type_field.as_str()?);

        let mut fields: SmallVec<[FieldRef<'a>; 32]> = SmallVec::new();
        fields.push(begin_string_field);
        fields.push(body_length_field);
        fields.push(msg_type_field);

        let mut checksum_field: Option<FieldRef<'a>> = None;
        while let Some(field) = self.next_field() {
            fields.push(field);
            if field.tag == 10 {
                checksum_field = Some(field);
                break;
            }
        }

        let checksum_ref = checksum_field.ok_or(DecodeError::Incomplete)?;
        if self.validate_checksum {
            let declared =
                parse_checksum(checksum_ref.value).ok_or_else(|| DecodeError::InvalidFieldValue {
                    tag: 10,
                    reason: "invalid checksum format".to_string(),
                })?;

            // Everything before "10="
            let checksum_start = self.offset_of(checksum_ref.value) - 3;
            let calculated = calculate_checksum(&self.input[start_offset..checksum_start]);

            if calculated != declared {
                return Err(DecodeError::ChecksumMismatch {
                    calculated,
                    declared,
                });
            }
        }

        let buffer = &self.input[start_offset..self.offset];
        let begin_string = begin_string.start - start_offset..begin_string.end - start_offset;
        Ok(RawMessage::new(buffer, begin_string, msg_type, fields))
    }

    /// Parses the next field from the buffer.
    #[inline]
    pub fn next_field(&mut self) -> Option<FieldRef<'a>> {
        let remaining = self.input.get(self.offset..)?;
        if remaining.is_empty() {
            return None;
        }

        let eq_pos = memchr(EQUALS, remaining)?;
        let tag = parse_tag(&remaining[..eq_pos])?;

        let value_start = eq_pos + 1;
        let soh_pos = memchr(SOH, &remaining[value_start..])?;
        let value = &remaining[value_start..value_start + soh_pos];

        self.offset += value_start + soh_pos + 1;

        Some(FieldRef::new(tag, value))
    }

    /// Skips bytes that cannot start a message (line breaks between logged
    /// messages, for instance).
    pub fn skip_separators(&mut self) {
        while let Some(&b) = self.input.get(self.offset) {
            if b == b'8' {
                break;
            }
            self.offset += 1;
        }
    }

    /// Returns the current offset in the buffer.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns true if the buffer has been fully consumed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offset >= self.input.len()
    }

    fn offset_of(&self, value: &[u8]) -> usize {
        value.as_ptr() as usize - self.input.as_ptr() as usize
    }
}

/// Decodes a single message and copies it into an [`OwnedMessage`].
///
/// # Errors
/// Returns `DecodeError` if the buffer does not start with a complete message.
pub fn decode_owned(input: &[u8]) -> Result<OwnedMessage, DecodeError> {
    Decoder::new(input).decode().map(|raw| raw.to_owned())
}

/// Parses a tag number from ASCII bytes.
#[inline]
fn parse_tag(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 10 {
        return None;
    }

    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }

    Some(result)
}
