/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Pull-based input over a shared engine.
//!
//! [`FixInput`] moves through `Disconnected -> Connected -> Closed`:
//!
//! - `connect` obtains the shared [`EngineHandle`] for its settings file,
//!   attaches a fresh event channel to the [`EventBridge`] the engine calls
//!   and starts the handle. The engine start is synchronous and not
//!   cancellable.
//! - `read` races the next event against the caller's [`Context`]. A
//!   cancelled read claims no event.
//! - `close` stops the handle first and only then detaches its reader, so no
//!   callback can observe a half-torn-down input. The engine stop, when this
//!   is the last holder, blocks the calling worker.
//!
//! Inputs over byte-identical settings share one engine and one bridge. The
//! bridge delivers to the oldest connected input; when it closes, the next
//! one receives the engine's events.
//!
//! Engine callbacks block until `read` takes their event. A consumer that
//! stops reading stalls the engine's sessions, heartbeats included.

use crate::bridge::{EventBridge, ReaderId};
use crate::channel::{EventReceiver, event_channel};
use crate::config::InputConfig;
use crate::context::Context;
use crate::error::InputError;
use crate::event::Event;
use crate::message::{Ack, METADATA_EVENT, METADATA_SESSION_ID, Message};
use crate::render::render_event;
use async_trait::async_trait;
use fixstream_engine::{ChecksumRegistry, EngineHandle};
use fixstream_session::Settings;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A cancellable, single-consumer message source.
#[async_trait]
pub trait Input: Send + Sync {
    /// Establishes the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be established.
    async fn connect(&self, ctx: &Context) -> Result<(), InputError>;

    /// Returns the next message and its acknowledgement hook.
    ///
    /// # Errors
    /// Returns `NotConnected`, `EndOfInput`, a context error or a rendering
    /// error.
    async fn read(&self, ctx: &Context) -> Result<(Message, Ack), InputError>;

    /// Releases the source.
    ///
    /// # Errors
    /// Returns an error if the source cannot be released.
    async fn close(&self, ctx: &Context) -> Result<(), InputError>;
}

#[derive(Debug)]
enum InputState {
    Disconnected,
    Connected {
        handle: Arc<EngineHandle>,
        reader: ReaderId,
    },
    Closed,
}

type SharedReceiver = Arc<tokio::sync::Mutex<EventReceiver>>;

/// Input reading events from a FIX engine shared through a
/// [`ChecksumRegistry`].
#[derive(Debug)]
pub struct FixInput {
    config: InputConfig,
    registry: Arc<ChecksumRegistry>,
    bridge: Mutex<Arc<EventBridge>>,
    state: Mutex<InputState>,
    receiver: Mutex<Option<SharedReceiver>>,
}

impl FixInput {
    /// Creates a disconnected input.
    ///
    /// The settings file is parsed here so that misconfiguration surfaces
    /// before `connect`.
    ///
    /// # Arguments
    /// * `config` - Input configuration
    /// * `registry` - Registry shared by every input in the process
    ///
    /// # Errors
    /// Returns `InputError::Config` if the settings file cannot be read or
    /// parsed.
    pub fn new(config: InputConfig, registry: Arc<ChecksumRegistry>) -> Result<Self, InputError> {
        let settings = Settings::from_path(&config.config_file)?;
        debug!(
            path = %config.config_file.display(),
            sessions = settings.session_count(),
            "input settings loaded"
        );
        Ok(Self {
            config,
            registry,
            bridge: Mutex::new(Arc::new(EventBridge::new(settings))),
            state: Mutex::new(InputState::Disconnected),
            receiver: Mutex::new(None),
        })
    }

    /// Returns the input configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Returns the bridge this input reads from.
    ///
    /// Before `connect` this is the input's own bridge. Afterwards it is the
    /// bridge of the shared engine, which belongs to whichever input built it.
    #[must_use]
    pub fn bridge(&self) -> Arc<EventBridge> {
        Arc::clone(&self.bridge.lock())
    }

    /// Returns the engine handle while connected.
    #[must_use]
    pub fn handle(&self) -> Option<Arc<EngineHandle>> {
        match &*self.state.lock() {
            InputState::Connected { handle, .. } => Some(Arc::clone(handle)),
            InputState::Disconnected | InputState::Closed => None,
        }
    }

    /// Returns true between a `connect` and a `close`.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(*self.state.lock(), InputState::Connected { .. })
    }

    fn to_message(&self, event: &Event) -> Result<(Message, Ack), InputError> {
        let dictionaries = self.bridge().dictionaries(event.session_id());
        let body = serde_json::to_vec(&render_event(event, &dictionaries)).map_err(InputError::Render)?;
        let message = Message::new(body)
            .with_metadata(METADATA_SESSION_ID, event.session_id().to_string())
            .with_metadata(METADATA_EVENT, event.kind().as_str());
        Ok((message, Ack::new(event.session_id().clone(), event.kind())))
    }

    fn clear_receiver(&self, receiver: &SharedReceiver) {
        let mut slot = self.receiver.lock();
        if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, receiver)) {
            *slot = None;
        }
    }
}

#[async_trait]
impl Input for FixInput {
    async fn connect(&self, _ctx: &Context) -> Result<(), InputError> {
        let mut state = self.state.lock();
        match &*state {
            InputState::Connected { .. } => return Ok(()),
            InputState::Closed => return Err(InputError::Closed),
            InputState::Disconnected => {}
        }

        let own = self.bridge();
        let handle = self.registry.get_or_create(
            self.config.application_type,
            self.config.message_store_type,
            self.config.logger_type,
            Arc::clone(&own),
            &self.config.config_file,
        )?;
        let bridge = handle.application::<EventBridge>().unwrap_or_else(|| {
            warn!(checksum = %handle.checksum(), "shared engine calls a foreign application, no events will arrive");
            own
        });

        let (sender, receiver) = event_channel();
        let reader = bridge.attach(sender);
        *self.bridge.lock() = bridge;
        *self.receiver.lock() = Some(Arc::new(tokio::sync::Mutex::new(receiver)));

        let started = handle.start();
        info!(
            checksum = %handle.checksum(),
            refcount = handle.refcount(),
            %reader,
            ok = started.is_ok(),
            "input connected"
        );
        *state = InputState::Connected { handle, reader };
        started.map_err(InputError::from)
    }

    async fn read(&self, ctx: &Context) -> Result<(Message, Ack), InputError> {
        let receiver = self
            .receiver
            .lock()
            .clone()
            .ok_or(InputError::NotConnected)?;

        let next = tokio::select! {
            biased;
            reason = ctx.done() => return Err(reason.into()),
            next = async { receiver.lock().await.recv().await } => next,
        };

        let Some(event) = next else {
            self.clear_receiver(&receiver);
            debug!("event channel drained");
            return Err(InputError::EndOfInput);
        };
        self.to_message(&event)
    }

    async fn close(&self, _ctx: &Context) -> Result<(), InputError> {
        let connection = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, InputState::Closed) {
                InputState::Connected { handle, reader } => Some((handle, reader)),
                InputState::Disconnected | InputState::Closed => None,
            }
        };

        if let Some((handle, reader)) = connection {
            handle.stop();
            self.bridge().detach(reader);
            info!(checksum = %handle.checksum(), refcount = handle.refcount(), %reader, "input closed");
        }
        Ok(())
    }
}
