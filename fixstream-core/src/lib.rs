/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream Core
//!
//! Core message types and error definitions shared by every FixStream crate.
//!
//! This crate provides:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Field types**: `FieldTag` and the zero-copy `FieldRef`
//! - **Message types**: `RawMessage`, `OwnedMessage`, `MsgType`, `Section`
//!
//! ## Borrowed vs owned
//!
//! `RawMessage` borrows a buffer owned by the protocol engine and is only valid
//! inside the callback that received it. `OwnedMessage` owns its bytes and is
//! what crosses into the consumer side of the bridge.

pub mod error;
pub mod field;
pub mod message;

pub use error::{ConfigError, DecodeError, DictionaryError, EngineError, FixError, Result};
pub use field::{FieldRef, FieldTag};
pub use message::{MsgType, OwnedMessage, RawMessage, Section};
