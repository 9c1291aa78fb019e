/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! In-process engine doubles.
//!
//! [`CountingFactory`] counts constructions and keeps the application each
//! engine was built with, so tests can drive callbacks by hand.
//! [`RecordingEngine`] counts `start`/`stop` calls, can be told to fail and
//! runs an optional hook inside `stop`.

use crate::application::Application;
use crate::engine::{Engine, EngineFactory, LogFactory, MessageStoreFactory, Role};
use fixstream_core::error::EngineError;
use fixstream_session::Settings;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

type StopHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct CallsInner {
    starts: AtomicUsize,
    stops: AtomicUsize,
    fail_start: AtomicBool,
    fail_stop: AtomicBool,
    on_stop: Mutex<Option<StopHook>>,
}

impl fmt::Debug for CallsInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallsInner")
            .field("starts", &self.starts)
            .field("stops", &self.stops)
            .field("fail_start", &self.fail_start)
            .field("fail_stop", &self.fail_stop)
            .field("on_stop", &self.on_stop.lock().is_some())
            .finish()
    }
}

/// Shared counters of engine lifecycle calls.
#[derive(Debug, Clone, Default)]
pub struct EngineCalls {
    inner: Arc<CallsInner>,
}

impl EngineCalls {
    /// Returns the number of `start` calls that reached an engine.
    #[must_use]
    pub fn starts(&self) -> usize {
        self.inner.starts.load(Ordering::SeqCst)
    }

    /// Returns the number of `stop` calls that reached an engine.
    #[must_use]
    pub fn stops(&self) -> usize {
        self.inner.stops.load(Ordering::SeqCst)
    }

    /// Makes the next `start` fail.
    pub fn fail_next_start(&self) {
        self.inner.fail_start.store(true, Ordering::SeqCst);
    }

    /// Makes the next `stop` fail.
    pub fn fail_next_stop(&self) {
        self.inner.fail_stop.store(true, Ordering::SeqCst);
    }

    /// Runs `hook` at the start of every later engine `stop`.
    pub fn on_stop<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.inner.on_stop.lock() = Some(Arc::new(hook));
    }
}

/// Engine that records lifecycle calls.
#[derive(Debug)]
pub struct RecordingEngine {
    calls: EngineCalls,
}

impl RecordingEngine {
    /// Creates an engine reporting to `calls`.
    #[must_use]
    pub const fn new(calls: EngineCalls) -> Self {
        Self { calls }
    }
}

impl Engine for RecordingEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        self.calls.inner.starts.fetch_add(1, Ordering::SeqCst);
        if self.calls.inner.fail_start.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Start("listener address in use".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        let hook = self.calls.inner.on_stop.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
        self.calls.inner.stops.fetch_add(1, Ordering::SeqCst);
        if self.calls.inner.fail_stop.swap(false, Ordering::SeqCst) {
            return Err(EngineError::Stop("sessions did not log out".to_string()));
        }
        Ok(())
    }
}

/// Factory that counts constructions and remembers applications.
#[derive(Default)]
pub struct CountingFactory {
    constructions: AtomicUsize,
    fail_construction: AtomicBool,
    calls: EngineCalls,
    apps: Mutex<Vec<(Role, Arc<dyn Application>)>>,
    settings: Mutex<Vec<Settings>>,
}

impl CountingFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful constructions.
    #[must_use]
    pub fn constructions(&self) -> usize {
        self.constructions.load(Ordering::SeqCst)
    }

    /// Returns the lifecycle counters shared by every engine built.
    #[must_use]
    pub fn calls(&self) -> EngineCalls {
        self.calls.clone()
    }

    /// Makes every later construction fail until reset.
    pub fn set_fail_construction(&self, fail: bool) {
        self.fail_construction.store(fail, Ordering::SeqCst);
    }

    /// Returns the application of the most recently built engine.
    #[must_use]
    pub fn last_app(&self) -> Option<Arc<dyn Application>> {
        self.apps.lock().last().map(|(_, app)| Arc::clone(app))
    }

    /// Returns the role of the most recently built engine.
    #[must_use]
    pub fn last_role(&self) -> Option<Role> {
        self.apps.lock().last().map(|(role, _)| *role)
    }

    /// Returns the settings of the most recently built engine.
    #[must_use]
    pub fn last_settings(&self) -> Option<Settings> {
        self.settings.lock().last().cloned()
    }

    fn construct(
        &self,
        role: Role,
        app: Arc<dyn Application>,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError> {
        if self.fail_construction.load(Ordering::SeqCst) {
            return Err(EngineError::Construction(
                "no sessions configured".to_string(),
            ));
        }
        self.constructions.fetch_add(1, Ordering::SeqCst);
        self.apps.lock().push((role, app));
        self.settings.lock().push(settings);
        Ok(Box::new(RecordingEngine::new(self.calls.clone())))
    }
}

impl EngineFactory for CountingFactory {
    fn new_acceptor(
        &self,
        app: Arc<dyn Application>,
        _store: MessageStoreFactory,
        _log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError> {
        self.construct(Role::Acceptor, app, settings)
    }

    fn new_initiator(
        &self,
        app: Arc<dyn Application>,
        _store: MessageStoreFactory,
        _log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError> {
        self.construct(Role::Initiator, app, settings)
    }
}
