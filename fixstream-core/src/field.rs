/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Field primitives.
//!
//! - [`FieldTag`]: tag number newtype with standard/user-defined classification
//! - [`FieldRef`]: zero-copy view of one `tag=value` pair inside a buffer

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// FIX field tag number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct FieldTag(u32);

impl FieldTag {
    /// Creates a new field tag.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32) -> Self {
        Self(tag)
    }

    /// Returns the raw tag number.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns true if this is a user-defined tag (5001+).
    #[inline]
    #[must_use]
    pub const fn is_user_defined(self) -> bool {
        self.0 > 5000
    }
}

impl From<u32> for FieldTag {
    fn from(tag: u32) -> Self {
        Self(tag)
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-copy reference to a field within a FIX message buffer.
///
/// The value slice borrows from whoever owns the buffer; in engine callbacks
/// that is the engine itself, so a `FieldRef` must never outlive the callback.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    /// The field tag number.
    pub tag: u32,
    /// Reference to the field value bytes (without delimiters).
    pub value: &'a [u8],
}

impl<'a> FieldRef<'a> {
    /// Creates a new field reference.
    #[inline]
    #[must_use]
    pub const fn new(tag: u32, value: &'a [u8]) -> Self {
        Self { tag, value }
    }

    /// Returns the field tag.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> FieldTag {
        FieldTag(self.tag)
    }

    /// Returns the value as a string slice.
    ///
    /// # Errors
    /// Returns `DecodeError::InvalidUtf8` if the value is not valid UTF-8.
    pub fn as_str(&self) -> Result<&'a str, DecodeError> {
        std::str::from_utf8(self.value).map_err(DecodeError::from)
    }

    /// Parses the value into `T`.
    ///
    /// # Errors
    /// Returns `DecodeError` if the value is not UTF-8 or does not parse.
    pub fn parse<T: FromStr>(&self) -> Result<T, DecodeError> {
        self.as_str()?
            .parse()
            .map_err(|_| DecodeError::InvalidFieldValue {
                tag: self.tag,
                reason: format!("cannot parse {:?}", String::from_utf8_lossy(self.value)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_tag() {
        let tag = FieldTag::new(35);
        assert_eq!(tag.value(), 35);
        assert!(!tag.is_user_defined());
        assert!(FieldTag::from(5001).is_user_defined());
        assert_eq!(tag.to_string(), "35");
    }

    #[test]
    fn test_field_ref_parse() {
        let field = FieldRef::new(34, b"42");
        assert_eq!(field.parse::<u64>().unwrap(), 42);
        assert_eq!(field.tag(), FieldTag::new(34));
    }

    #[test]
    fn test_field_ref_parse_failure_names_tag() {
        let field = FieldRef::new(34, b"x");
        let err = field.parse::<u64>().unwrap_err();
        assert!(matches!(err, DecodeError::InvalidFieldValue { tag: 34, .. }));
    }

    #[test]
    fn test_field_ref_invalid_utf8() {
        let field = FieldRef::new(58, &[0xff, 0xfe]);
        assert!(field.as_str().is_err());
    }
}
