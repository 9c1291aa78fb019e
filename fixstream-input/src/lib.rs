/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream Input
//!
//! Bridges callback-driven FIX engines into a pull-based, cancellable stream.
//!
//! This crate provides:
//! - **Context**: Cancellation token plus deadline for every operation
//! - **Event**: One engine callback, copied out of engine memory
//! - **Event channel**: Rendezvous hand-off that throttles engine callbacks
//! - **EventBridge**: The `Application` handed to the engine
//! - **Rendering**: JSON rendering with optional data dictionaries
//! - **FixInput**: `connect`/`read`/`close` over a shared engine handle
//!
//! ## Example
//!
//! ```rust,ignore
//! use fixstream_input::{Context, FixInput, Input, InputConfig};
//!
//! let input = FixInput::new(config, registry)?;
//! let ctx = Context::background();
//! input.connect(&ctx).await?;
//! let (message, ack) = input.read(&ctx.with_timeout(timeout)).await?;
//! ack.ack(true);
//! input.close(&ctx).await?;
//! ```

pub mod bridge;
pub mod channel;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod input;
pub mod message;
pub mod render;

pub use bridge::{EventBridge, ReaderId, SessionDictionaries};
pub use channel::{ChannelClosed, EventReceiver, EventSender, event_channel};
pub use config::InputConfig;
pub use context::{Context, ContextError};
pub use error::InputError;
pub use event::{Event, EventKind};
pub use input::{FixInput, Input};
pub use message::{Ack, METADATA_EVENT, METADATA_SESSION_ID, Message};
pub use render::{render_event, render_message};
