/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream Session
//!
//! Session identity and engine settings.
//!
//! This crate provides:
//! - **SessionId**: Identity of a FIX session (BeginString, CompIDs, sub IDs, qualifier)
//! - **Settings**: QuickFIX-style settings files with `[DEFAULT]` inheritance

pub mod id;
pub mod settings;

pub use id::SessionId;
pub use settings::{SessionSettings, Settings, keys};
