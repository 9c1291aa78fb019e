/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream
//!
//! Turns a callback-driven FIX engine into a pull-based, cancellable message
//! stream, sharing one engine between every consumer of the same settings.
//!
//! ## Features
//!
//! - **Checksum-keyed sharing**: Byte-identical settings files share one engine
//! - **Refcounted lifecycle**: The engine starts with the first consumer and stops with the last
//! - **Backpressure**: Engine callbacks wait until the consumer takes their event
//! - **Cancellable reads**: Every read races a context; a cancelled read claims nothing
//! - **Structured output**: JSON rendering with optional data dictionaries
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixstream::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ChecksumRegistry::new(Arc::new(MyEngineFactory)));
//! let config = InputConfig::new(Role::Initiator, "client.cfg", StoreKind::Memory, LogKind::Screen);
//! let input = FixInput::new(config, registry)?;
//!
//! let ctx = Context::background();
//! input.connect(&ctx).await?;
//! loop {
//!     match input.read(&ctx).await {
//!         Ok((message, ack)) => { /* ... */ ack.ack(true); }
//!         Err(InputError::EndOfInput) => break,
//!         Err(e) => return Err(e.into()),
//!     }
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Message types and error definitions
//! - [`dictionary`]: Data dictionary schema and XML parsing
//! - [`tagvalue`]: tag=value decoding and encoding
//! - [`session`]: Session identity and settings files
//! - [`engine`]: Engine seams, handles and the checksum registry
//! - [`input`]: Event bridge and the pull-based input

pub mod core {
    //! Message types and error definitions.
    pub use fixstream_core::*;
}

pub mod dictionary {
    //! Data dictionary schema and XML parsing.
    pub use fixstream_dictionary::*;
}

pub mod tagvalue {
    //! tag=value decoding and encoding.
    pub use fixstream_tagvalue::*;
}

pub mod session {
    //! Session identity and settings files.
    pub use fixstream_session::*;
}

pub mod engine {
    //! Engine seams, handles and the checksum registry.
    pub use fixstream_engine::*;
}

pub mod input {
    //! Event bridge and the pull-based input.
    pub use fixstream_input::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use fixstream_core::{
        ConfigError, DecodeError, DictionaryError, EngineError, FieldRef, FixError, MsgType,
        OwnedMessage, RawMessage, Section,
    };

    // Dictionary
    pub use fixstream_dictionary::{Dictionary, Version};

    // Tag-value encoding
    pub use fixstream_tagvalue::{Decoder, Encoder, decode_owned};

    // Session
    pub use fixstream_session::{SessionId, SessionSettings, Settings};

    // Engine
    pub use fixstream_engine::{
        Application, ChecksumRegistry, ConfigChecksum, Engine, EngineFactory, EngineHandle,
        EngineState, LogFactory, LogKind, MessageStoreFactory, RejectReason, Role, StoreKind,
    };

    // Input
    pub use fixstream_input::{
        Ack, Context, Event, EventBridge, EventKind, FixInput, Input, InputConfig, InputError,
        Message,
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let id = SessionId::new("FIX.4.4", "SENDER", "TARGET");
        assert_eq!(id.to_string(), "FIX.4.4:SENDER->TARGET");
        assert_eq!(EventKind::FromApp.as_str(), "from_app");
        assert_eq!(Role::Acceptor.as_str(), "acceptor");
    }

    #[test]
    fn test_version() {
        let version = Version::Fix44;
        assert_eq!(version.begin_string(), "FIX.4.4");
    }

    #[tokio::test]
    async fn test_background_context_is_live() {
        let ctx = Context::background();
        assert!(ctx.err().is_none());
        ctx.cancel();
        assert!(ctx.err().is_some());
    }
}
