/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Error types for the FixStream input bridge.
//!
//! This module provides a unified error hierarchy using `thiserror` for typed,
//! domain-specific errors across message decoding, settings parsing,
//! dictionary loading and engine lifecycle management.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FixStream operations below the input layer.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error during message decoding.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Error reading or parsing engine settings.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Error loading a data dictionary.
    #[error("dictionary error: {0}")]
    Dictionary(#[from] DictionaryError),

    /// Error in engine construction or lifecycle.
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Errors that occur during FIX message decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Message buffer is incomplete, need more data.
    #[error("incomplete message, need more data")]
    Incomplete,

    /// Invalid BeginString field (tag 8).
    #[error("invalid begin string: expected 8=FIX.x.y")]
    InvalidBeginString,

    /// Missing BodyLength field (tag 9).
    #[error("missing body length field (tag 9)")]
    MissingBodyLength,

    /// Invalid BodyLength value.
    #[error("invalid body length value")]
    InvalidBodyLength,

    /// Missing MsgType field (tag 35).
    #[error("missing msg type field (tag 35)")]
    MissingMsgType,

    /// Checksum mismatch between calculated and declared values.
    #[error("checksum mismatch: calculated {calculated}, declared {declared}")]
    ChecksumMismatch {
        /// Calculated checksum value.
        calculated: u8,
        /// Declared checksum value in message.
        declared: u8,
    },

    /// Invalid field value for the expected type.
    #[error("invalid field value for tag {tag}: {reason}")]
    InvalidFieldValue {
        /// The tag number of the field.
        tag: u32,
        /// Description of why the value is invalid.
        reason: String,
    },

    /// Invalid UTF-8 in string field.
    #[error("invalid utf-8 in field: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors raised while reading or interpreting an engine settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("failed to read settings file {path}: {source}")]
    Io {
        /// Path of the settings file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line of the settings file is malformed.
    #[error("settings parse error at line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// A required setting is absent.
    #[error("missing required setting: {key}")]
    MissingSetting {
        /// The setting key.
        key: String,
    },

    /// A setting holds a value that cannot be interpreted.
    #[error("invalid value for setting {key}: {value}")]
    InvalidValue {
        /// The setting key.
        key: String,
        /// The offending value.
        value: String,
    },

    /// Two `[SESSION]` sections resolve to the same session identifier.
    #[error("duplicate session: {0}")]
    DuplicateSession(String),
}

/// Errors raised while loading a data dictionary.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The dictionary file could not be read.
    #[error("failed to read dictionary {path}: {source}")]
    Io {
        /// Path of the dictionary file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The dictionary is not well-formed XML.
    #[error("malformed dictionary xml: {0}")]
    Xml(String),

    /// A required attribute is missing from an element.
    #[error("element <{element}> is missing attribute '{attribute}'")]
    MissingAttribute {
        /// Element name.
        element: String,
        /// Attribute name.
        attribute: String,
    },

    /// A message, component or group references an undefined field.
    #[error("reference to undefined field '{0}'")]
    UnknownField(String),

    /// The root element does not describe a supported protocol version.
    #[error("unsupported dictionary version: {0}")]
    UnsupportedVersion(String),
}

/// Errors in engine construction and lifecycle operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration file could not be read to compute its checksum.
    #[error("failed to read engine config {path}: {source}")]
    ConfigRead {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file was read but is not valid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unrecognized application role.
    #[error("unknown application type: {0}")]
    UnknownRole(String),

    /// Unrecognized message store kind.
    #[error("cannot create message store of type {0}")]
    UnknownStoreKind(String),

    /// Unrecognized log factory kind.
    #[error("cannot create logger of type {0}")]
    UnknownLogKind(String),

    /// The external engine refused to construct.
    #[error("engine construction failed: {0}")]
    Construction(String),

    /// The external engine failed to start.
    #[error("engine start failed: {0}")]
    Start(String),

    /// The external engine failed to stop.
    #[error("engine stop failed: {0}")]
    Stop(String),

    /// Start was requested on a handle whose engine has been released.
    #[error("cannot start uninitialized engine")]
    Uninitialized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::ChecksumMismatch {
            calculated: 100,
            declared: 200,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: calculated 100, declared 200"
        );
    }

    #[test]
    fn test_fix_error_from_engine() {
        let fix_err: FixError = EngineError::Uninitialized.into();
        assert!(matches!(fix_err, FixError::Engine(EngineError::Uninitialized)));
    }

    #[test]
    fn test_engine_error_wraps_config_transparently() {
        let err: EngineError = ConfigError::MissingSetting {
            key: "FileStorePath".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "missing required setting: FileStorePath");
    }

    #[test]
    fn test_unknown_store_kind_display() {
        let err = EngineError::UnknownStoreKind("sql".to_string());
        assert_eq!(err.to_string(), "cannot create message store of type sql");
    }
}
