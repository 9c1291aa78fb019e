/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Engine callbacks turned into events.
//!
//! [`EventBridge`] is the [`Application`] handed to the engine. Every callback
//! copies its message out of engine-owned memory, wraps it in an [`Event`]
//! and waits until a reader takes it.
//!
//! Every input sharing the engine attaches its own reader to the one bridge
//! the engine was built with. Events go to the oldest live reader, so when
//! that input closes the next one takes over. A callback that fires while no
//! reader is attached (before the first `connect` or after the last `close`)
//! is logged and dropped.

use crate::channel::EventSender;
use crate::event::{Event, EventKind};
use async_trait::async_trait;
use fixstream_core::message::{OwnedMessage, RawMessage};
use fixstream_dictionary::{Dictionary, parse_file};
use fixstream_engine::application::{Application, RejectReason, SessionId};
use fixstream_session::{Settings, keys};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Identifies one reader attached to a bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderId(u64);

impl fmt::Display for ReaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reader-{}", self.0)
    }
}

/// Dictionaries resolved for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionDictionaries {
    /// Dictionary for application messages and body fields.
    pub app: Option<Arc<Dictionary>>,
    /// Dictionary for admin messages and header/trailer fields.
    pub transport: Option<Arc<Dictionary>>,
}

/// Engine application forwarding every callback to an attached reader.
pub struct EventBridge {
    settings: Settings,
    dictionaries: RwLock<HashMap<SessionId, SessionDictionaries>>,
    readers: Mutex<Vec<(ReaderId, EventSender)>>,
    next_reader: AtomicU64,
}

impl EventBridge {
    /// Creates a bridge for the sessions declared in `settings`.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            dictionaries: RwLock::new(HashMap::new()),
            readers: Mutex::new(Vec::new()),
            next_reader: AtomicU64::new(0),
        }
    }

    /// Returns the settings the bridge resolves dictionaries from.
    #[inline]
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Adds a reader behind those already attached.
    pub fn attach(&self, sender: EventSender) -> ReaderId {
        let id = ReaderId(self.next_reader.fetch_add(1, Ordering::Relaxed));
        let mut readers = self.readers.lock();
        readers.push((id, sender));
        debug!(reader = %id, readers = readers.len(), "reader attached");
        id
    }

    /// Drops the sending half of `reader`. Once in-flight callbacks finish
    /// that reader observes end of input.
    ///
    /// Returns true if the reader was attached.
    pub fn detach(&self, reader: ReaderId) -> bool {
        let mut readers = self.readers.lock();
        let before = readers.len();
        readers.retain(|(id, _)| *id != reader);
        let removed = readers.len() != before;
        if removed {
            debug!(reader = %reader, readers = readers.len(), "reader detached");
        }
        removed
    }

    /// Returns true while at least one live reader is attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.readers.lock().iter().any(|(_, s)| !s.is_closed())
    }

    /// Returns the number of attached readers, live or not.
    #[must_use]
    pub fn reader_count(&self) -> usize {
        self.readers.lock().len()
    }

    /// Returns the dictionaries resolved for `session_id`.
    #[must_use]
    pub fn dictionaries(&self, session_id: &SessionId) -> SessionDictionaries {
        self.dictionaries
            .read()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    // Reads and parses the dictionary files on the calling worker.
    fn load_dictionaries(&self, session_id: &SessionId) {
        let Some(session) = self.settings.session(session_id) else {
            debug!(session = %session_id, "no settings for session, rendering without dictionary");
            return;
        };

        let mut resolved = SessionDictionaries::default();
        if let Some(dict) = load(session_id, keys::DATA_DICTIONARY, session.get(keys::DATA_DICTIONARY)) {
            resolved.app = Some(Arc::clone(&dict));
            resolved.transport = Some(dict);
        }
        if let Some(dict) = load(
            session_id,
            keys::TRANSPORT_DATA_DICTIONARY,
            session.get(keys::TRANSPORT_DATA_DICTIONARY),
        ) {
            resolved.transport = Some(dict);
        }
        if let Some(dict) = load(
            session_id,
            keys::APP_DATA_DICTIONARY,
            session.get(keys::APP_DATA_DICTIONARY),
        ) {
            resolved.app = Some(dict);
        }

        self.dictionaries
            .write()
            .insert(session_id.clone(), resolved);
    }

    fn live_reader(&self) -> Option<(ReaderId, EventSender)> {
        let mut readers = self.readers.lock();
        readers.retain(|(_, s)| !s.is_closed());
        readers.first().cloned()
    }

    async fn dispatch(&self, event: Event) {
        let Some((reader, sender)) = self.live_reader() else {
            warn!(session = %event.session_id(), event = %event.kind(), "no reader attached, event dropped");
            return;
        };

        let (session, kind) = (event.session_id().clone(), event.kind());
        if sender.send(event).await.is_err() {
            warn!(session = %session, event = %kind, reader = %reader, "reader went away, event dropped");
        }
    }
}

fn load(session_id: &SessionId, key: &str, path: Option<&str>) -> Option<Arc<Dictionary>> {
    let path = path?;
    match parse_file(path) {
        Ok(dict) => {
            debug!(session = %session_id, setting = key, path, "dictionary loaded");
            Some(Arc::new(dict))
        }
        Err(e) => {
            warn!(session = %session_id, setting = key, path, error = %e, "failed to load dictionary");
            None
        }
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("sessions", &self.settings.session_count())
            .field("readers", &self.readers.lock().len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Application for EventBridge {
    /// Loads the session's dictionaries before handing on the event. The
    /// files are read synchronously, blocking the engine worker meanwhile.
    async fn on_create(&self, session_id: &SessionId) {
        self.load_dictionaries(session_id);
        self.dispatch(Event::new(session_id.clone(), EventKind::Create))
            .await;
    }

    async fn on_logon(&self, session_id: &SessionId) {
        self.dispatch(Event::new(session_id.clone(), EventKind::Logon))
            .await;
    }

    async fn on_logout(&self, session_id: &SessionId) {
        self.dispatch(Event::new(session_id.clone(), EventKind::Logout))
            .await;
    }

    async fn to_admin(&self, message: &mut OwnedMessage, session_id: &SessionId) {
        let event = Event::with_payload(session_id.clone(), EventKind::ToAdmin, message.deep_copy());
        self.dispatch(event).await;
    }

    async fn from_admin(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        let event = Event::with_payload(
            session_id.clone(),
            EventKind::FromAdmin,
            OwnedMessage::from_raw(message),
        );
        self.dispatch(event).await;
        Ok(())
    }

    async fn to_app(&self, message: &mut OwnedMessage, session_id: &SessionId) {
        let event = Event::with_payload(session_id.clone(), EventKind::ToApp, message.deep_copy());
        self.dispatch(event).await;
    }

    async fn from_app(
        &self,
        message: &RawMessage<'_>,
        session_id: &SessionId,
    ) -> Result<(), RejectReason> {
        let event = Event::with_payload(
            session_id.clone(),
            EventKind::FromApp,
            OwnedMessage::from_raw(message),
        );
        self.dispatch(event).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::event_channel;
    use fixstream_tagvalue::{Decoder, Encoder, decode_owned};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;
    use tokio::time::timeout;

    const DICTIONARY: &str = r#"<fix major="4" minor="4" type="FIX">
  <header><field name="BeginString" required="Y"/></header>
  <trailer><field name="CheckSum" required="Y"/></trailer>
  <messages/>
  <fields>
    <field number="8" name="BeginString" type="STRING"/>
    <field number="10" name="CheckSum" type="STRING"/>
    <field number="55" name="Symbol" type="STRING"/>
  </fields>
</fix>"#;

    fn session() -> SessionId {
        SessionId::new("FIX.4.4", "S1", "T1")
    }

    fn settings_with(extra: &str) -> Settings {
        Settings::parse(&format!(
            "[SESSION]\nBeginString=FIX.4.4\nSenderCompID=S1\nTargetCompID=T1\n{extra}"
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_callback_waits_for_reader() {
        let bridge = Arc::new(EventBridge::new(settings_with("")));
        let (tx, mut rx) = event_channel();
        bridge.attach(tx);

        let callback = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move { bridge.on_logon(&session()).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!callback.is_finished());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind(), EventKind::Logon);
        assert_eq!(event.session_id(), &session());
        timeout(Duration::from_millis(100), callback)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_inbound_payload_is_an_independent_copy() {
        let bridge = Arc::new(EventBridge::new(settings_with("")));
        let (tx, mut rx) = event_channel();
        bridge.attach(tx);

        let wire = b"8=FIX.4.4\x019=20\x0135=D\x0155=AAPL\x0154=1\x0110=000\x01".to_vec();
        let callback = {
            let bridge = Arc::clone(&bridge);
            tokio::spawn(async move {
                let mut buffer = wire;
                {
                    let raw = Decoder::new(&buffer)
                        .with_checksum_validation(false)
                        .decode()
                        .unwrap();
                    bridge.from_app(&raw, &session()).await.unwrap();
                }
                // The engine reuses its buffer as soon as the callback returns.
                buffer.fill(b'X');
            })
        };

        let event = rx.recv().await.unwrap();
        callback.await.unwrap();
        let payload = event.payload().unwrap();
        assert_eq!(event.kind(), EventKind::FromApp);
        assert_eq!(payload.get_field_str(55), Some("AAPL"));
        assert_eq!(payload.msg_type().as_str(), "D");
    }

    #[tokio::test]
    async fn test_outbound_payload_is_copied() {
        let bridge = Arc::new(EventBridge::new(settings_with("")));
        let (tx, mut rx) = event_channel();
        bridge.attach(tx);

        let mut encoder = Encoder::new("FIX.4.4");
        encoder.put_str(35, "0");
        encoder.put_str(112, "PING");
        let mut message = decode_owned(&encoder.finish()).unwrap();
        let reader = tokio::spawn(async move { rx.recv().await });
        bridge.to_admin(&mut message, &session()).await;

        let event = reader.await.unwrap().unwrap();
        assert_eq!(event.kind(), EventKind::ToAdmin);
        let payload = event.payload().unwrap();
        assert_eq!(payload, &message);
        assert_ne!(payload.as_bytes().as_ptr(), message.as_bytes().as_ptr());
    }

    #[tokio::test]
    async fn test_callback_without_reader_is_dropped() {
        let bridge = EventBridge::new(settings_with(""));
        timeout(Duration::from_millis(100), bridge.on_logout(&session()))
            .await
            .unwrap();

        let (tx, rx) = event_channel();
        let reader = bridge.attach(tx);
        drop(rx);
        assert!(!bridge.is_attached());
        timeout(Duration::from_millis(100), bridge.on_logon(&session()))
            .await
            .unwrap();
        assert!(!bridge.detach(reader));
        assert_eq!(bridge.reader_count(), 0);
    }

    #[tokio::test]
    async fn test_events_go_to_oldest_reader_until_it_detaches() {
        let bridge = Arc::new(EventBridge::new(settings_with("")));
        let (first_tx, mut first_rx) = event_channel();
        let (second_tx, mut second_rx) = event_channel();
        let first = bridge.attach(first_tx);
        let second = bridge.attach(second_tx);
        assert_ne!(first, second);
        assert_eq!(bridge.reader_count(), 2);

        let reader = tokio::spawn(async move { first_rx.recv().await });
        bridge.on_logon(&session()).await;
        assert_eq!(reader.await.unwrap().unwrap().kind(), EventKind::Logon);

        assert!(bridge.detach(first));
        assert!(!bridge.detach(first));
        assert!(bridge.is_attached());

        let reader = tokio::spawn(async move { second_rx.recv().await });
        timeout(Duration::from_millis(100), bridge.on_logout(&session()))
            .await
            .unwrap();
        assert_eq!(reader.await.unwrap().unwrap().kind(), EventKind::Logout);
    }

    #[tokio::test]
    async fn test_on_create_loads_dictionaries() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DICTIONARY.as_bytes()).unwrap();
        let path = file.path().display().to_string();

        let bridge = Arc::new(EventBridge::new(settings_with(&format!(
            "DataDictionary={path}\nAppDataDictionary=/definitely/not/here.xml\n"
        ))));
        let (tx, mut rx) = event_channel();
        bridge.attach(tx);

        let reader = tokio::spawn(async move { rx.recv().await });
        bridge.on_create(&session()).await;
        assert_eq!(reader.await.unwrap().unwrap().kind(), EventKind::Create);

        let dicts = bridge.dictionaries(&session());
        let app = dicts.app.unwrap();
        let transport = dicts.transport.unwrap();
        assert!(Arc::ptr_eq(&app, &transport));
        assert_eq!(app.field_name(55), Some("Symbol"));
    }

    #[tokio::test]
    async fn test_transport_dictionary_overrides() {
        let mut app_file = NamedTempFile::new().unwrap();
        app_file.write_all(DICTIONARY.as_bytes()).unwrap();
        let mut transport_file = NamedTempFile::new().unwrap();
        transport_file.write_all(DICTIONARY.as_bytes()).unwrap();

        let bridge = EventBridge::new(settings_with(&format!(
            "DataDictionary={}\nTransportDataDictionary={}\n",
            app_file.path().display(),
            transport_file.path().display()
        )));
        bridge.on_create(&session()).await;

        let dicts = bridge.dictionaries(&session());
        assert!(!Arc::ptr_eq(
            dicts.app.as_ref().unwrap(),
            dicts.transport.as_ref().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_broken_dictionary_degrades_to_none() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"<fix major=").unwrap();
        let bridge = EventBridge::new(settings_with(&format!(
            "DataDictionary={}\n",
            file.path().display()
        )));
        bridge.on_create(&session()).await;

        let dicts = bridge.dictionaries(&session());
        assert!(dicts.app.is_none());
        assert!(dicts.transport.is_none());
    }
}
