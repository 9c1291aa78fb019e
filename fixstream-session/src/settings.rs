/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Engine settings.
//!
//! QuickFIX-style settings files: a `[DEFAULT]` section whose values every
//! `[SESSION]` section inherits, `key=value` lines, and `#`/`;` comments.
//!
//! ```text
//! [DEFAULT]
//! ConnectionType=initiator
//! FileStorePath=store
//!
//! [SESSION]
//! BeginString=FIX.4.4
//! SenderCompID=CLIENT
//! TargetCompID=SERVER
//! DataDictionary=spec/FIX44.xml
//! ```

use crate::id::SessionId;
use fixstream_core::error::ConfigError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Well-known setting keys.
pub mod keys {
    /// FIX version of the session.
    pub const BEGIN_STRING: &str = "BeginString";
    /// Local CompID.
    pub const SENDER_COMP_ID: &str = "SenderCompID";
    /// Counterparty CompID.
    pub const TARGET_COMP_ID: &str = "TargetCompID";
    /// Local sub ID.
    pub const SENDER_SUB_ID: &str = "SenderSubID";
    /// Counterparty sub ID.
    pub const TARGET_SUB_ID: &str = "TargetSubID";
    /// Qualifier for otherwise identical sessions.
    pub const SESSION_QUALIFIER: &str = "SessionQualifier";
    /// `acceptor` or `initiator`.
    pub const CONNECTION_TYPE: &str = "ConnectionType";
    /// Dictionary for both application and transport messages.
    pub const DATA_DICTIONARY: &str = "DataDictionary";
    /// Transport dictionary for FIXT sessions.
    pub const TRANSPORT_DATA_DICTIONARY: &str = "TransportDataDictionary";
    /// Application dictionary for FIXT sessions.
    pub const APP_DATA_DICTIONARY: &str = "AppDataDictionary";
    /// Directory of the file message store.
    pub const FILE_STORE_PATH: &str = "FileStorePath";
    /// Directory of the file log.
    pub const FILE_LOG_PATH: &str = "FileLogPath";
}

/// Key/value settings of one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSettings {
    values: BTreeMap<String, String>,
}

impl SessionSettings {
    /// Creates an empty settings section.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Returns a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns true if the key is set.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns a value or a `MissingSetting` error.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSetting` if the key is absent.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key).ok_or_else(|| ConfigError::MissingSetting {
            key: key.to_string(),
        })
    }

    /// Returns a `Y`/`N` value as a boolean.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for anything other than `Y` or `N`.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(key) {
            None => Ok(None),
            Some("Y" | "y") => Ok(Some(true)),
            Some("N" | "n") => Ok(Some(false)),
            Some(other) => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Returns an iterator over all key/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no settings are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns these settings layered over `defaults`.
    fn over(&self, defaults: &Self) -> Self {
        let mut merged = defaults.clone();
        merged
            .values
            .extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    fn session_id(&self) -> Result<SessionId, ConfigError> {
        let mut id = SessionId::new(
            self.require(keys::BEGIN_STRING)?,
            self.require(keys::SENDER_COMP_ID)?,
            self.require(keys::TARGET_COMP_ID)?,
        );
        id.sender_sub_id = self.get(keys::SENDER_SUB_ID).map(str::to_string);
        id.target_sub_id = self.get(keys::TARGET_SUB_ID).map(str::to_string);
        id.qualifier = self.get(keys::SESSION_QUALIFIER).map(str::to_string);
        Ok(id)
    }
}

/// Parsed engine settings: defaults plus one merged section per session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    global: SessionSettings,
    sessions: BTreeMap<SessionId, SessionSettings>,
}

impl Settings {
    /// Reads and parses a settings file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parses settings from raw file bytes.
    ///
    /// # Errors
    /// Returns `ConfigError` if the bytes are not UTF-8 or not valid settings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let text = std::str::from_utf8(bytes).map_err(|e| ConfigError::Parse {
            line: 0,
            reason: format!("settings are not valid utf-8: {e}"),
        })?;
        Self::parse(text)
    }

    /// Parses settings text.
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed lines or unknown sections,
    /// `MissingSetting` when a session lacks an identity key and
    /// `DuplicateSession` when two sections describe the same session.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        enum Current {
            None,
            Default,
            Session(usize),
        }

        let mut global = SessionSettings::new();
        let mut raw_sessions: Vec<(usize, SessionSettings)> = Vec::new();
        let mut current = Current::None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = match section.trim().to_ascii_uppercase().as_str() {
                    "DEFAULT" => Current::Default,
                    "SESSION" => {
                        raw_sessions.push((line_no, SessionSettings::new()));
                        Current::Session(raw_sessions.len() - 1)
                    }
                    other => {
                        return Err(ConfigError::Parse {
                            line: line_no,
                            reason: format!("unknown section [{other}]"),
                        });
                    }
                };
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::Parse {
                line: line_no,
                reason: format!("expected key=value, found {line:?}"),
            })?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() {
                return Err(ConfigError::Parse {
                    line: line_no,
                    reason: "empty key".to_string(),
                });
            }

            match current {
                Current::None => {
                    return Err(ConfigError::Parse {
                        line: line_no,
                        reason: "setting outside of a section".to_string(),
                    });
                }
                Current::Default => global.set(key, value),
                Current::Session(i) => raw_sessions[i].1.set(key, value),
            }
        }

        let mut sessions = BTreeMap::new();
        for (line_no, raw) in raw_sessions {
            let merged = raw.over(&global);
            let id = merged.session_id()?;
            debug!(session = %id, line = line_no, "parsed session settings");
            if sessions.insert(id.clone(), merged).is_some() {
                return Err(ConfigError::DuplicateSession(id.to_string()));
            }
        }

        Ok(Self { global, sessions })
    }

    /// Returns the `[DEFAULT]` section.
    #[must_use]
    pub fn global(&self) -> &SessionSettings {
        &self.global
    }

    /// Returns the merged settings of one session.
    #[must_use]
    pub fn session(&self, id: &SessionId) -> Option<&SessionSettings> {
        self.sessions.get(id)
    }

    /// Returns an iterator over all sessions and their merged settings.
    pub fn sessions(&self) -> impl Iterator<Item = (&SessionId, &SessionSettings)> {
        self.sessions.iter()
    }

    /// Returns the number of declared sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# engine settings
[DEFAULT]
ConnectionType=initiator
FileStorePath = store
HeartBtInt=30

[SESSION]
BeginString=FIX.4.4
SenderCompID=CLIENT
TargetCompID=SERVER
DataDictionary=spec/FIX44.xml

; second session overrides the heartbeat
[session]
BeginString=FIXT.1.1
SenderCompID=CLIENT
TargetCompID=SERVER
SessionQualifier=MD
HeartBtInt=10
ResetOnLogon=Y
";

    #[test]
    fn test_parse_sessions_inherit_defaults() {
        let settings = Settings::parse(SAMPLE).unwrap();
        assert_eq!(settings.session_count(), 2);
        assert_eq!(settings.global().get(keys::FILE_STORE_PATH), Some("store"));

        let first = SessionId::new("FIX.4.4", "CLIENT", "SERVER");
        let session = settings.session(&first).unwrap();
        assert_eq!(session.get("HeartBtInt"), Some("30"));
        assert_eq!(session.get(keys::CONNECTION_TYPE), Some("initiator"));
        assert_eq!(session.get(keys::DATA_DICTIONARY), Some("spec/FIX44.xml"));

        let second = SessionId::new("FIXT.1.1", "CLIENT", "SERVER").with_qualifier("MD");
        let session = settings.session(&second).unwrap();
        assert_eq!(session.get("HeartBtInt"), Some("10"));
        assert_eq!(session.get_bool("ResetOnLogon").unwrap(), Some(true));
        assert!(!session.has(keys::DATA_DICTIONARY));
    }

    #[test]
    fn test_parse_missing_identity_key() {
        let err = Settings::parse("[SESSION]\nBeginString=FIX.4.2\nSenderCompID=A\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { key } if key == keys::TARGET_COMP_ID));
    }

    #[test]
    fn test_parse_duplicate_session() {
        let text = "[SESSION]\nBeginString=FIX.4.2\nSenderCompID=A\nTargetCompID=B\n\
                    [SESSION]\nBeginString=FIX.4.2\nSenderCompID=A\nTargetCompID=B\n";
        let err = Settings::parse(text).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateSession(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        let err = Settings::parse("[DEFAULT]\nnot a setting\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 2, .. }));

        let err = Settings::parse("Key=Value\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));

        let err = Settings::parse("[ACCEPTOR]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_get_bool_rejects_other_values() {
        let settings = SessionSettings::new().with_setting("ResetOnLogon", "maybe");
        assert!(settings.get_bool("ResetOnLogon").is_err());
        assert_eq!(settings.get_bool("Absent").unwrap(), None);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let settings = Settings::from_path(file.path()).unwrap();
        assert_eq!(settings.sessions().count(), 2);

        let err = Settings::from_path("/definitely/not/here.cfg").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
