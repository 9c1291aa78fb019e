/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! # FixStream Dictionary
//!
//! FIX data dictionaries for structured message rendering.
//!
//! This crate provides:
//! - **Schema definitions**: Field, message, component and group definitions
//! - **Dictionary parsing**: QuickFIX XML format parser built on `roxmltree`
//! - **Section lookup**: header/body/trailer placement of a tag

pub mod parser;
pub mod schema;

pub use parser::{parse_file, parse_str};
pub use schema::{
    ComponentDef, Dictionary, FieldDef, FieldMember, FieldType, GroupDef, Layout, MessageCategory,
    MessageDef, Version,
};
