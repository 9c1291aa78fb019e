/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Replay input example.
//!
//! Plays a file of FIX messages through a replay engine and consumes the
//! resulting events with `FixInput::read`, printing each as JSON.
//!
//! Run with:
//! ```sh
//! cargo run -p fixstream-example --example replay_input [messages.fix]
//! ```

mod common;

use anyhow::Context as _;
use fixstream::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Builds engines that replay a message file instead of opening sockets.
struct ReplayFactory {
    messages: PathBuf,
    runtime: Handle,
}

impl ReplayFactory {
    fn engine(&self, app: Arc<dyn Application>, settings: Settings) -> Result<Box<dyn Engine>, EngineError> {
        if settings.session_count() == 0 {
            return Err(EngineError::Construction("no sessions configured".to_string()));
        }
        Ok(Box::new(ReplayEngine {
            app,
            settings,
            messages: self.messages.clone(),
            runtime: self.runtime.clone(),
            task: None,
        }))
    }
}

impl EngineFactory for ReplayFactory {
    fn new_acceptor(
        &self,
        app: Arc<dyn Application>,
        _store: MessageStoreFactory,
        _log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError> {
        self.engine(app, settings)
    }

    fn new_initiator(
        &self,
        app: Arc<dyn Application>,
        _store: MessageStoreFactory,
        _log: LogFactory,
        settings: Settings,
    ) -> Result<Box<dyn Engine>, EngineError> {
        self.engine(app, settings)
    }
}

struct ReplayEngine {
    app: Arc<dyn Application>,
    settings: Settings,
    messages: PathBuf,
    runtime: Handle,
    task: Option<JoinHandle<()>>,
}

impl Engine for ReplayEngine {
    fn start(&mut self) -> Result<(), EngineError> {
        if self.task.is_some() {
            return Ok(());
        }
        let buffer = std::fs::read(&self.messages)
            .map_err(|e| EngineError::Start(format!("{}: {e}", self.messages.display())))?;
        let sessions: Vec<SessionId> = self.settings.sessions().map(|(id, _)| id.clone()).collect();
        let app = Arc::clone(&self.app);
        self.task = Some(self.runtime.spawn(replay(app, sessions, buffer)));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }
}

async fn replay(app: Arc<dyn Application>, sessions: Vec<SessionId>, buffer: Vec<u8>) {
    for id in &sessions {
        app.on_create(id).await;
        app.on_logon(id).await;
    }

    let mut decoder = Decoder::new(&buffer);
    loop {
        decoder.skip_separators();
        if decoder.is_empty() {
            break;
        }
        let raw = match decoder.decode() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(offset = decoder.offset(), error = %e, "stopping replay at malformed message");
                break;
            }
        };

        // Inbound traffic: the counterparty's SenderCompID is our TargetCompID.
        let Some(id) = sessions
            .iter()
            .find(|id| raw.get_field_str(49) == Some(id.target_comp_id.as_str()))
            .or_else(|| sessions.first())
        else {
            break;
        };

        let result = if raw.msg_type().is_admin() {
            app.from_admin(&raw, id).await
        } else {
            app.from_app(&raw, id).await
        };
        if let Err(reason) = result {
            warn!(session = %id, code = reason.code, text = %reason.text, "message rejected");
        }
    }

    for id in &sessions {
        app.on_logout(id).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    common::init_logging();

    let data = common::data_dir();
    let messages = std::env::args()
        .nth(1)
        .map_or_else(|| data.join("session.fix"), PathBuf::from);

    let config_file = std::env::temp_dir().join("fixstream-replay.cfg");
    std::fs::write(&config_file, common::client_settings(&data.join("FIX44.xml")))
        .with_context(|| format!("writing {}", config_file.display()))?;

    let factory = ReplayFactory {
        messages,
        runtime: Handle::current(),
    };
    let registry = Arc::new(ChecksumRegistry::new(Arc::new(factory)));
    let config = InputConfig::new(Role::Initiator, &config_file, StoreKind::Memory, LogKind::Screen);
    let input = FixInput::new(config, registry)?;

    let ctx = Context::background();
    input.connect(&ctx).await?;
    info!("connected, reading events");

    loop {
        match input.read(&ctx.with_timeout(Duration::from_secs(2))).await {
            Ok((message, ack)) => {
                let body: serde_json::Value = message.body_json()?;
                println!(
                    "[{}] {} {}",
                    message.session_id().unwrap_or("-"),
                    message.event().unwrap_or("-"),
                    serde_json::to_string_pretty(&body)?
                );
                let done = message.event() == Some(EventKind::Logout.as_str());
                ack.ack(true);
                if done {
                    break;
                }
            }
            Err(InputError::DeadlineExceeded) => {
                info!("no events for 2s");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    input.close(&ctx).await?;
    info!("closed");
    Ok(())
}
