/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Refcounted engine handle.
//!
//! One [`EngineHandle`] owns one engine instance shared by every consumer whose
//! configuration has the same checksum. `start` and `stop` are refcounted: the
//! engine starts on the first `start` and stops on the last `stop`.
//!
//! A failed engine start still marks the handle `Started` and still counts the
//! caller as a holder, so the caller must `stop` to release it.
//!
//! The handle also keeps the application the current engine was built with.
//! Later holders look it up with [`EngineHandle::application`] to reach the
//! object the engine actually calls back into.

use crate::checksum::ConfigChecksum;
use crate::engine::{Engine, LogKind, Role, StoreKind};
use fixstream_core::error::EngineError;
use parking_lot::Mutex;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run state of an engine handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The engine is not running.
    Stopped,
    /// The engine has been started.
    Started,
}

type SharedApplication = Arc<dyn Any + Send + Sync>;

struct HandleState {
    engine: Option<Box<dyn Engine>>,
    application: Option<SharedApplication>,
    state: EngineState,
    refcount: usize,
}

/// Shared handle to one engine instance.
pub struct EngineHandle {
    checksum: ConfigChecksum,
    role: Role,
    store_kind: StoreKind,
    log_kind: LogKind,
    inner: Mutex<HandleState>,
}

impl EngineHandle {
    /// Creates a stopped handle owning `engine`.
    ///
    /// # Arguments
    /// * `checksum` - Identity of the configuration the engine was built from
    /// * `role` - Role the engine was built for
    /// * `store_kind` - Store kind the engine was built with
    /// * `log_kind` - Log kind the engine was built with
    /// * `engine` - The constructed engine
    #[must_use]
    pub fn new(
        checksum: ConfigChecksum,
        role: Role,
        store_kind: StoreKind,
        log_kind: LogKind,
        engine: Box<dyn Engine>,
    ) -> Self {
        Self {
            checksum,
            role,
            store_kind,
            log_kind,
            inner: Mutex::new(HandleState {
                engine: Some(engine),
                application: None,
                state: EngineState::Stopped,
                refcount: 0,
            }),
        }
    }

    /// Records the application `engine` was built with.
    #[must_use]
    pub fn with_application(self, application: SharedApplication) -> Self {
        self.inner.lock().application = Some(application);
        self
    }

    /// Returns the application of the current engine if it is an `A`.
    #[must_use]
    pub fn application<A: Any + Send + Sync>(&self) -> Option<Arc<A>> {
        let application = self.inner.lock().application.clone()?;
        application.downcast::<A>().ok()
    }

    /// Returns the configuration checksum.
    #[inline]
    #[must_use]
    pub const fn checksum(&self) -> ConfigChecksum {
        self.checksum
    }

    /// Returns the role the engine was built for.
    #[inline]
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the store kind the engine was built with.
    #[inline]
    #[must_use]
    pub const fn store_kind(&self) -> StoreKind {
        self.store_kind
    }

    /// Returns the log kind the engine was built with.
    #[inline]
    #[must_use]
    pub const fn log_kind(&self) -> LogKind {
        self.log_kind
    }

    /// Returns the current run state.
    #[must_use]
    pub fn state(&self) -> EngineState {
        self.inner.lock().state
    }

    /// Returns the number of current holders.
    #[must_use]
    pub fn refcount(&self) -> usize {
        self.inner.lock().refcount
    }

    /// Returns true while the handle owns an engine.
    #[must_use]
    pub fn has_engine(&self) -> bool {
        self.inner.lock().engine.is_some()
    }

    /// Registers a holder and starts the engine if it is stopped.
    ///
    /// The refcount is incremented on every call.
    ///
    /// # Errors
    /// Returns the engine's start error, or `EngineError::Uninitialized` if the
    /// engine has been released. In both cases the caller still holds a
    /// reference.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut inner = self.inner.lock();
        inner.refcount += 1;
        if inner.state == EngineState::Started {
            debug!(checksum = %self.checksum, refcount = inner.refcount, "engine already started");
            return Ok(());
        }

        let Some(engine) = inner.engine.as_mut() else {
            warn!(checksum = %self.checksum, "start requested on released engine");
            return Err(EngineError::Uninitialized);
        };
        let result = engine.start();
        inner.state = EngineState::Started;
        match &result {
            Ok(()) => info!(checksum = %self.checksum, role = %self.role, "engine started"),
            Err(e) => warn!(checksum = %self.checksum, error = %e, "engine start failed"),
        }
        result
    }

    /// Releases a holder and stops the engine when the last one leaves.
    ///
    /// Engine stop failures are logged and otherwise ignored. The engine's
    /// `stop` runs on the calling thread under the handle's lock, so an async
    /// caller blocks its worker until the engine has shut down.
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.state == EngineState::Stopped || inner.refcount > 1 {
            inner.refcount = inner.refcount.saturating_sub(1);
            debug!(checksum = %self.checksum, refcount = inner.refcount, "engine holder released");
            return;
        }

        if let Some(mut engine) = inner.engine.take() {
            match engine.stop() {
                Ok(()) => info!(checksum = %self.checksum, "engine stopped"),
                Err(e) => warn!(checksum = %self.checksum, error = %e, "engine stop failed"),
            }
        }
        inner.state = EngineState::Stopped;
        inner.refcount = 0;
    }

    /// Installs a freshly built engine if the previous one was released.
    ///
    /// `build` runs under the handle's lock and only when no engine is present.
    /// On success `application` replaces the recorded application. Returns
    /// `Ok(true)` if an engine was installed.
    ///
    /// # Errors
    /// Propagates the error of `build`, leaving the handle unchanged.
    pub fn rearm<F>(&self, application: SharedApplication, build: F) -> Result<bool, EngineError>
    where
        F: FnOnce() -> Result<Box<dyn Engine>, EngineError>,
    {
        let mut inner = self.inner.lock();
        if inner.engine.is_some() || inner.state == EngineState::Started {
            return Ok(false);
        }
        inner.engine = Some(build()?);
        inner.application = Some(application);
        debug!(checksum = %self.checksum, "engine rebuilt for released handle");
        Ok(true)
    }
}

impl fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EngineHandle")
            .field("checksum", &self.checksum)
            .field("role", &self.role)
            .field("store_kind", &self.store_kind)
            .field("log_kind", &self.log_kind)
            .field("state", &inner.state)
            .field("refcount", &inner.refcount)
            .field("has_engine", &inner.engine.is_some())
            .field("has_application", &inner.application.is_some())
            .finish()
    }
}
