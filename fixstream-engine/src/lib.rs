/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream Engine
//!
//! Lifecycle management for external FIX engines shared between consumers.
//!
//! This crate provides:
//! - **Application trait**: The seven callbacks an engine invokes
//! - **Engine seams**: `Engine` and `EngineFactory` traits, roles, store and log selection
//! - **ConfigChecksum**: Content identity of a settings file
//! - **EngineHandle**: Refcounted `start`/`stop` over one engine instance
//! - **ChecksumRegistry**: At most one handle per configuration checksum
//!
//! ## Sharing
//!
//! Every consumer whose settings file is byte-identical gets the same
//! [`EngineHandle`]. The engine starts with the first holder and stops with
//! the last.

pub mod application;
pub mod checksum;
pub mod engine;
pub mod handle;
pub mod registry;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use application::{Application, NoOpApplication, RejectReason, SessionId};
pub use checksum::ConfigChecksum;
pub use engine::{Engine, EngineFactory, LogFactory, LogKind, MessageStoreFactory, Role, StoreKind};
pub use handle::{EngineHandle, EngineState};
pub use registry::ChecksumRegistry;
