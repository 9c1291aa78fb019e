/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Seams to the external protocol engine.
//!
//! The protocol engine (framing, sequencing, persistence, reconnection) lives
//! outside this workspace. It is reached through two traits: [`EngineFactory`]
//! builds a listener or connector from parsed settings, and [`Engine`] is the
//! running instance with synchronous `start`/`stop`.

use crate::application::Application;
use fixstream_core::error::{ConfigError, EngineError};
use fixstream_session::settings::{Settings, keys};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Session establishment role of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Listens for incoming connections.
    Acceptor,
    /// Connects out to a counterparty.
    Initiator,
}

impl Role {
    /// Returns the configuration name of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Acceptor => "acceptor",
            Self::Initiator => "initiator",
        }
    }
}

impl FromStr for Role {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "acceptor" => Ok(Self::Acceptor),
            "initiator" => Ok(Self::Initiator),
            other => Err(EngineError::UnknownRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of message store the engine persists sequence state in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// In-memory store.
    Memory,
    /// File store under `FileStorePath`.
    File,
}

impl StoreKind {
    /// Returns the configuration name of the store kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
        }
    }
}

impl FromStr for StoreKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => Err(EngineError::UnknownStoreKind(other.to_string())),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of log the engine writes session traffic to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Log to standard output.
    Screen,
    /// Log to files under `FileLogPath`.
    File,
}

impl LogKind {
    /// Returns the configuration name of the log kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::File => "file",
        }
    }
}

impl FromStr for LogKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "screen" => Ok(Self::Screen),
            "file" => Ok(Self::File),
            other => Err(EngineError::UnknownLogKind(other.to_string())),
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Message store selection handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageStoreFactory {
    /// In-memory store.
    Memory,
    /// File store rooted at a directory.
    File {
        /// Store directory.
        path: PathBuf,
    },
}

impl MessageStoreFactory {
    /// Resolves a store kind against the `[DEFAULT]` settings.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSetting` if a file store is requested
    /// without `FileStorePath`.
    pub fn from_settings(kind: StoreKind, settings: &Settings) -> Result<Self, ConfigError> {
        match kind {
            StoreKind::Memory => Ok(Self::Memory),
            StoreKind::File => Ok(Self::File {
                path: PathBuf::from(settings.global().require(keys::FILE_STORE_PATH)?),
            }),
        }
    }
}

/// Log selection handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFactory {
    /// Log to standard output.
    Screen,
    /// Log to files rooted at a directory.
    File {
        /// Log directory.
        path: PathBuf,
    },
}

impl LogFactory {
    /// Resolves a log kind against the `[DEFAULT]` settings.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSetting` if a file log is requested
    /// without `FileLogPath`.
    pub fn from_settings(kind: LogKind, settings: &Settings) -> Result<Self, ConfigError> {
        match kind {
            LogKind::Screen => Ok(Self::Screen),
            LogKind::File => Ok(Self::File {
                path: PathBuf::from(settings.global().require(keys::FILE_LOG_PATH)?),
            }),
        }
    }
}

/// A constructed protocol engine.
///
/// `start` and `stop` are synchronous and expected to be idempotent at the
/// engine layer. Once started, the engine invokes its [`Application`] from
/// its own workers until `stop` returns.
pub trait Engine: Send {
    /// Starts the engine's sessions.
    ///
    /// # Errors
    /// Returns `EngineError::Start` if the engine cannot start.
    fn start(&mut self) -> Result<(), EngineError>;

    /// Stops the engine. No callbacks are invoked after this returns.
    ///
    /// Called from async code under the handle's lock; it blocks that worker
    /// until the engine has shut down.
    ///
    /// # Errors
    /// Returns `EngineError::Stop` if the engine does not shut down cleanly.
    fn stop(&mut self) -> Result<(), EngineError>;
}

/// Builds engines for the external library.
pub trait EngineFactory: Send + Sync {
    /// Builds a listening engine.
    ///
    /// # Errors
    /// Returns `EngineError::Construction` if the engine refuses to build.
    fn new_acceptor(
        &self,
        app: Arc<dyn Application>,
        store: MessageStoreFactory,
        log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError>;

    /// Builds a connecting engine.
    ///
    /// # Errors
    /// Returns `EngineError::Construction` if the engine refuses to build.
    fn new_initiator(
        &self,
        app: Arc<dyn Application>,
        store: MessageStoreFactory,
        log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError>;

    /// Builds an engine for `role`.
    ///
    /// # Errors
    /// Propagates the error of the role-specific constructor.
    fn build(
        &self,
        role: Role,
        app: Arc<dyn Application>,
        store: MessageStoreFactory,
        log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError> {
        match role {
            Role::Acceptor => self.new_acceptor(app, store, log, settings),
            Role::Initiator => self.new_initiator(app, store, log, settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_from_str() {
        assert_eq!("acceptor".parse::<Role>().unwrap(), Role::Acceptor);
        assert_eq!("initiator".parse::<Role>().unwrap(), Role::Initiator);
        assert!(matches!(
            "listener".parse::<Role>(),
            Err(EngineError::UnknownRole(_))
        ));

        assert_eq!("memory".parse::<StoreKind>().unwrap(), StoreKind::Memory);
        assert!(matches!(
            "sql".parse::<StoreKind>(),
            Err(EngineError::UnknownStoreKind(kind)) if kind == "sql"
        ));

        assert_eq!("screen".parse::<LogKind>().unwrap(), LogKind::Screen);
        assert!(matches!(
            "syslog".parse::<LogKind>(),
            Err(EngineError::UnknownLogKind(_))
        ));
    }

    #[test]
    fn test_kind_display_matches_config_names() {
        assert_eq!(Role::Initiator.to_string(), "initiator");
        assert_eq!(StoreKind::File.to_string(), "file");
        assert_eq!(LogKind::Screen.to_string(), "screen");
    }

    #[test]
    fn test_store_factory_from_settings() {
        let settings = Settings::parse("[DEFAULT]\nFileStorePath=/var/fix/store\n").unwrap();
        assert_eq!(
            MessageStoreFactory::from_settings(StoreKind::File, &settings).unwrap(),
            MessageStoreFactory::File {
                path: PathBuf::from("/var/fix/store")
            }
        );
        assert_eq!(
            MessageStoreFactory::from_settings(StoreKind::Memory, &settings).unwrap(),
            MessageStoreFactory::Memory
        );
    }

    #[test]
    fn test_log_factory_requires_path() {
        let settings = Settings::parse("[DEFAULT]\nFileStorePath=store\n").unwrap();
        let err = LogFactory::from_settings(LogKind::File, &settings).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSetting { key } if key == keys::FILE_LOG_PATH));
        assert_eq!(
            LogFactory::from_settings(LogKind::Screen, &settings).unwrap(),
            LogFactory::Screen
        );
    }
}
