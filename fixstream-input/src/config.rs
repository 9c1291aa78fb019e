/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Input configuration.

use crate::error::InputError;
use fixstream_engine::engine::{LogKind, Role, StoreKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of one [`crate::FixInput`].
///
/// ```json
/// {
///   "application_type": "initiator",
///   "config_file": "config/client.cfg",
///   "message_store_type": "memory",
///   "logger_type": "screen"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    /// Role of the engine.
    pub application_type: Role,
    /// Engine settings file.
    pub config_file: PathBuf,
    /// Message store the engine uses.
    pub message_store_type: StoreKind,
    /// Log the engine writes to.
    pub logger_type: LogKind,
}

impl InputConfig {
    /// Creates a configuration.
    #[must_use]
    pub fn new(
        application_type: Role,
        config_file: impl AsRef<Path>,
        message_store_type: StoreKind,
        logger_type: LogKind,
    ) -> Self {
        Self {
            application_type,
            config_file: config_file.as_ref().to_path_buf(),
            message_store_type,
            logger_type,
        }
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    /// Returns `InputError::InvalidConfig` on missing fields, unknown fields
    /// or unknown role, store or log names.
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(InputError::InvalidConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let config = InputConfig::from_json(
            r#"{"application_type":"acceptor","config_file":"server.cfg",
                "message_store_type":"file","logger_type":"screen"}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            InputConfig::new(Role::Acceptor, "server.cfg", StoreKind::File, LogKind::Screen)
        );
    }

    #[test]
    fn test_rejects_unknown_store() {
        let err = InputConfig::from_json(
            r#"{"application_type":"acceptor","config_file":"server.cfg",
                "message_store_type":"sql","logger_type":"screen"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, InputError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_missing_field() {
        let err = InputConfig::from_json(
            r#"{"application_type":"initiator","config_file":"client.cfg","logger_type":"file"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("message_store_type"));
    }
}
