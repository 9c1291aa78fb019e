/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream Tag-Value
//!
//! FIX tag=value decoding and encoding.
//!
//! The bridge itself never frames wire traffic; that belongs to the engine.
//! This crate exists so engines, replay tools and tests can turn bytes into
//! [`RawMessage`]/[`OwnedMessage`] values and back.

pub mod checksum;
pub mod decoder;
pub mod encoder;

pub use checksum::calculate_checksum;
pub use decoder::{Decoder, decode_owned};
pub use encoder::Encoder;
pub use fixstream_core::message::{OwnedMessage, RawMessage};
