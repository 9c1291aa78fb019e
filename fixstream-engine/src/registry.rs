/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Checksum-keyed engine registry.
//!
//! Consumers whose configuration files are byte-identical share one engine,
//! and therefore one set of network sessions. The registry is an explicit
//! object: construct it once and hand an `Arc` to every consumer.
//!
//! Entries are never removed. When the last holder stops a handle its engine
//! is released, and the next lookup for that checksum builds a new engine into
//! the same handle.
//!
//! Each handle records the application its engine was built with, so a caller
//! that gets an existing handle can find the application receiving callbacks.

use crate::application::Application;
use crate::checksum::ConfigChecksum;
use crate::engine::{EngineFactory, LogFactory, LogKind, MessageStoreFactory, Role, StoreKind};
use crate::handle::EngineHandle;
use fixstream_core::error::EngineError;
use fixstream_session::Settings;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of shared engine handles keyed by configuration checksum.
pub struct ChecksumRegistry {
    factory: Arc<dyn EngineFactory>,
    handles: Mutex<HashMap<ConfigChecksum, Arc<EngineHandle>>>,
}

impl ChecksumRegistry {
    /// Creates an empty registry building engines with `factory`.
    #[must_use]
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self {
            factory,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the handle for the configuration at `config_path`, building the
    /// engine if no handle exists for its checksum.
    ///
    /// An existing handle is returned whatever `role`, `store_kind` and
    /// `log_kind` are requested; a mismatch is logged. Its engine keeps
    /// calling the application it was built with, which
    /// [`EngineHandle::application`] returns.
    ///
    /// # Arguments
    /// * `role` - Role of the engine to build
    /// * `store_kind` - Message store for the engine to build
    /// * `log_kind` - Log for the engine to build
    /// * `app` - Application the engine to build invokes
    /// * `config_path` - Settings file; its raw bytes are the identity
    ///
    /// # Errors
    /// Returns `EngineError::ConfigRead` if the file cannot be read,
    /// `EngineError::Config` if it is invalid or lacks a path the store or log
    /// needs, or the factory's construction error. The registry is unchanged
    /// on error.
    pub fn get_or_create<A>(
        &self,
        role: Role,
        store_kind: StoreKind,
        log_kind: LogKind,
        app: Arc<A>,
        config_path: impl AsRef<Path>,
    ) -> Result<Arc<EngineHandle>, EngineError>
    where
        A: Application + 'static,
    {
        let config_path = config_path.as_ref();
        let shared: Arc<dyn Any + Send + Sync> = app.clone();
        let app: Arc<dyn Application> = app;
        let bytes = std::fs::read(config_path).map_err(|source| EngineError::ConfigRead {
            path: config_path.to_path_buf(),
            source,
        })?;
        let checksum = ConfigChecksum::of(&bytes);

        let mut handles = self.handles.lock();
        if let Some(handle) = handles.get(&checksum) {
            if handle.role() != role
                || handle.store_kind() != store_kind
                || handle.log_kind() != log_kind
            {
                warn!(
                    %checksum,
                    existing_role = %handle.role(),
                    requested_role = %role,
                    existing_store = %handle.store_kind(),
                    requested_store = %store_kind,
                    existing_log = %handle.log_kind(),
                    requested_log = %log_kind,
                    "reusing engine built with different options"
                );
            }
            let rebuilt = handle.rearm(shared, || {
                self.build(handle.role(), handle.store_kind(), handle.log_kind(), app, &bytes)
            })?;
            if rebuilt {
                info!(%checksum, path = %config_path.display(), "engine rebuilt");
            } else {
                debug!(%checksum, "reusing shared engine");
            }
            return Ok(Arc::clone(handle));
        }

        let engine = self.build(role, store_kind, log_kind, app, &bytes)?;
        let handle = Arc::new(
            EngineHandle::new(checksum, role, store_kind, log_kind, engine).with_application(shared),
        );
        handles.insert(checksum, Arc::clone(&handle));
        info!(%checksum, %role, path = %config_path.display(), "engine created");
        Ok(handle)
    }

    /// Returns the handle registered for `checksum`.
    #[must_use]
    pub fn get(&self, checksum: &ConfigChecksum) -> Option<Arc<EngineHandle>> {
        self.handles.lock().get(checksum).cloned()
    }

    /// Returns the number of registered handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Returns true if no handle has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    fn build(
        &self,
        role: Role,
        store_kind: StoreKind,
        log_kind: LogKind,
        app: Arc<dyn Application>,
        bytes: &[u8],
    ) -> Result<Box<dyn crate::engine::Engine>, EngineError> {
        let settings = Settings::from_bytes(bytes)?;
        let store = MessageStoreFactory::from_settings(store_kind, &settings)?;
        let log = LogFactory::from_settings(log_kind, &settings)?;
        self.factory.build(role, app, store, log, settings)
    }
}

impl fmt::Debug for ChecksumRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChecksumRegistry")
            .field("handles", &self.handles.lock().len())
            .finish_non_exhaustive()
    }
}
