/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Schema definitions for FIX dictionaries.
//!
//! This module defines the structures that represent a FIX specification:
//! - [`FieldDef`]: Field definitions with tag, name, type and enumerated values
//! - [`Layout`]: The ordered members of a message, component, group or header
//! - [`MessageDef`] / [`ComponentDef`] / [`GroupDef`]
//! - [`Dictionary`]: Complete dictionary for one protocol version

use fixstream_core::message::Section;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Nesting limit when expanding components; QuickFIX dictionaries stay far below it.
const MAX_COMPONENT_DEPTH: usize = 32;

/// FIX protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    /// FIX 4.0
    Fix40,
    /// FIX 4.1
    Fix41,
    /// FIX 4.2
    Fix42,
    /// FIX 4.3
    Fix43,
    /// FIX 4.4
    Fix44,
    /// FIX 5.0
    Fix50,
    /// FIX 5.0 SP1
    Fix50Sp1,
    /// FIX 5.0 SP2
    Fix50Sp2,
    /// FIXT 1.1 (transport layer for FIX 5.0+)
    Fixt11,
}

impl Version {
    /// Resolves the version declared on a dictionary's root element.
    ///
    /// # Arguments
    /// * `kind` - The `type` attribute (`FIX` or `FIXT`)
    /// * `major` / `minor` / `service_pack` - Numeric version attributes
    #[must_use]
    pub fn from_parts(kind: &str, major: u32, minor: u32, service_pack: u32) -> Option<Self> {
        Some(match (kind, major, minor, service_pack) {
            ("FIX", 4, 0, _) => Self::Fix40,
            ("FIX", 4, 1, _) => Self::Fix41,
            ("FIX", 4, 2, _) => Self::Fix42,
            ("FIX", 4, 3, _) => Self::Fix43,
            ("FIX", 4, 4, _) => Self::Fix44,
            ("FIX", 5, 0, 0) => Self::Fix50,
            ("FIX", 5, 0, 1) => Self::Fix50Sp1,
            ("FIX", 5, 0, 2) => Self::Fix50Sp2,
            ("FIXT", 1, 1, _) => Self::Fixt11,
            _ => return None,
        })
    }

    /// Returns the BeginString value for this version.
    #[must_use]
    pub const fn begin_string(&self) -> &'static str {
        match self {
            Self::Fix40 => "FIX.4.0",
            Self::Fix41 => "FIX.4.1",
            Self::Fix42 => "FIX.4.2",
            Self::Fix43 => "FIX.4.3",
            Self::Fix44 => "FIX.4.4",
            Self::Fix50 | Self::Fix50Sp1 | Self::Fix50Sp2 | Self::Fixt11 => "FIXT.1.1",
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.begin_string())
    }
}

/// FIX field data type, as far as rendering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Integer-like values (INT, LENGTH, SEQNUM, NUMINGROUP, TAGNUM, DAYOFMONTH).
    Int,
    /// Decimal values (FLOAT, QTY, PRICE, PRICEOFFSET, AMT, PERCENTAGE).
    Float,
    /// Single character.
    Char,
    /// Boolean (Y/N).
    Boolean,
    /// Date and time types.
    Timestamp,
    /// Raw data (DATA, XMLDATA).
    Data,
    /// Anything else is carried as a string.
    String,
}

impl std::str::FromStr for FieldType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_uppercase().as_str() {
            "INT" | "LENGTH" | "SEQNUM" | "NUMINGROUP" | "TAGNUM" | "DAYOFMONTH" => Self::Int,
            "FLOAT" | "QTY" | "QUANTITY" | "PRICE" | "PRICEOFFSET" | "AMT" | "AMOUNT"
            | "PERCENTAGE" => Self::Float,
            "CHAR" => Self::Char,
            "BOOLEAN" => Self::Boolean,
            "UTCTIMESTAMP" | "UTCTIMEONLY" | "UTCDATEONLY" | "UTCDATE" | "LOCALMKTDATE"
            | "LOCALMKTTIME" | "TZTIMEONLY" | "TZTIMESTAMP" | "MONTHYEAR" | "TIME" | "DATE" => {
                Self::Timestamp
            }
            "DATA" | "XMLDATA" => Self::Data,
            _ => Self::String,
        })
    }
}

/// Definition of a FIX field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Field data type.
    pub field_type: FieldType,
    /// Enumerated values: wire value to description.
    pub values: BTreeMap<String, String>,
}

impl FieldDef {
    /// Creates a new field definition without enumerated values.
    #[must_use]
    pub fn new(tag: u32, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            tag,
            name: name.into(),
            field_type,
            values: BTreeMap::new(),
        }
    }
}

/// Reference to a field from a layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMember {
    /// Field tag number.
    pub tag: u32,
    /// Field name.
    pub name: String,
    /// Whether the field is required.
    pub required: bool,
}

/// Ordered members of a message, component, group, header or trailer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    /// Plain fields.
    pub fields: Vec<FieldMember>,
    /// Repeating groups.
    pub groups: Vec<GroupDef>,
    /// Names of referenced components.
    pub components: Vec<String>,
}

/// Definition of a repeating group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    /// Tag of the count field (NumInGroup).
    pub count_tag: u32,
    /// Name of the group.
    pub name: String,
    /// Tag of the first field in each group entry.
    pub delimiter_tag: u32,
    /// Whether the group is required.
    pub required: bool,
    /// Members of each entry.
    pub layout: Layout,
}

/// Definition of a reusable component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Component name.
    pub name: String,
    /// Members of the component.
    pub layout: Layout,
}

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageCategory {
    /// Administrative message (session level).
    Admin,
    /// Application message.
    App,
}

/// Definition of a FIX message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDef {
    /// Message type value (tag 35).
    pub msg_type: String,
    /// Message name.
    pub name: String,
    /// Message category (admin or app).
    pub category: MessageCategory,
    /// Members of the message body.
    pub layout: Layout,
}

/// Complete FIX dictionary for a specific version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    /// FIX version.
    pub version: Version,
    /// Field definitions indexed by tag.
    pub fields: HashMap<u32, FieldDef>,
    /// Field tags indexed by name.
    pub fields_by_name: HashMap<String, u32>,
    /// Message definitions indexed by msg_type.
    pub messages: HashMap<String, MessageDef>,
    /// Component definitions indexed by name.
    pub components: HashMap<String, ComponentDef>,
    /// Standard header layout.
    pub header: Layout,
    /// Standard trailer layout.
    pub trailer: Layout,
    /// Every tag reachable from the header, groups and components included.
    header_tags: HashSet<u32>,
    /// Every tag reachable from the trailer.
    trailer_tags: HashSet<u32>,
}

impl Dictionary {
    /// Creates a new empty dictionary for the specified version.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            fields: HashMap::new(),
            fields_by_name: HashMap::new(),
            messages: HashMap::new(),
            components: HashMap::new(),
            header: Layout::default(),
            trailer: Layout::default(),
            header_tags: HashSet::new(),
            trailer_tags: HashSet::new(),
        }
    }

    /// Adds a field definition.
    pub fn add_field(&mut self, field: FieldDef) {
        self.fields_by_name.insert(field.name.clone(), field.tag);
        self.fields.insert(field.tag, field);
    }

    /// Adds a message definition.
    pub fn add_message(&mut self, message: MessageDef) {
        self.messages.insert(message.msg_type.clone(), message);
    }

    /// Adds a component definition.
    pub fn add_component(&mut self, component: ComponentDef) {
        self.components.insert(component.name.clone(), component);
    }

    /// Replaces the header and trailer layouts and recomputes tag membership.
    pub fn set_header_trailer(&mut self, header: Layout, trailer: Layout) {
        let mut header_tags = HashSet::new();
        self.collect_tags(&header, &mut header_tags, 0);
        let mut trailer_tags = HashSet::new();
        self.collect_tags(&trailer, &mut trailer_tags, 0);
        self.header = header;
        self.trailer = trailer;
        self.header_tags = header_tags;
        self.trailer_tags = trailer_tags;
    }

    /// Gets a field definition by tag.
    #[must_use]
    pub fn get_field(&self, tag: u32) -> Option<&FieldDef> {
        self.fields.get(&tag)
    }

    /// Gets a field definition by name.
    #[must_use]
    pub fn get_field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields_by_name
            .get(name)
            .and_then(|tag| self.fields.get(tag))
    }

    /// Returns the name of a field, if the dictionary defines it.
    #[must_use]
    pub fn field_name(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(|f| f.name.as_str())
    }

    /// Gets a message definition by type.
    #[must_use]
    pub fn get_message(&self, msg_type: &str) -> Option<&MessageDef> {
        self.messages.get(msg_type)
    }

    /// Gets a component definition by name.
    #[must_use]
    pub fn get_component(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    /// Classifies a tag as header, body or trailer.
    ///
    /// Falls back to the standard FIX placement when this dictionary declares
    /// no header (application-only dictionaries of FIX 5.0+).
    #[must_use]
    pub fn section_of(&self, tag: u32) -> Section {
        if self.header_tags.is_empty() && self.trailer_tags.is_empty() {
            return Section::of_standard_tag(tag);
        }
        if self.header_tags.contains(&tag) {
            Section::Header
        } else if self.trailer_tags.contains(&tag) {
            Section::Trailer
        } else {
            Section::Body
        }
    }

    fn collect_tags(&self, layout: &Layout, out: &mut HashSet<u32>, depth: usize) {
        if depth > MAX_COMPONENT_DEPTH {
            return;
        }
        out.extend(layout.fields.iter().map(|f| f.tag));
        for group in &layout.groups {
            out.insert(group.count_tag);
            self.collect_tags(&group.layout, out, depth + 1);
        }
        for name in &layout.components {
            if let Some(component) = self.components.get(name) {
                self.collect_tags(&component.layout, out, depth + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(tag: u32, name: &str) -> FieldMember {
        FieldMember {
            tag,
            name: name.to_string(),
            required: true,
        }
    }

    #[test]
    fn test_version_from_parts() {
        assert_eq!(Version::from_parts("FIX", 4, 4, 0), Some(Version::Fix44));
        assert_eq!(Version::from_parts("FIX", 5, 0, 2), Some(Version::Fix50Sp2));
        assert_eq!(Version::from_parts("FIXT", 1, 1, 0), Some(Version::Fixt11));
        assert_eq!(Version::from_parts("FIX", 3, 0, 0), None);
        assert_eq!(Version::Fix50Sp2.begin_string(), "FIXT.1.1");
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("SEQNUM".parse::<FieldType>().unwrap(), FieldType::Int);
        assert_eq!("price".parse::<FieldType>().unwrap(), FieldType::Float);
        assert_eq!(
            "UTCTIMESTAMP".parse::<FieldType>().unwrap(),
            FieldType::Timestamp
        );
        assert_eq!("unknown".parse::<FieldType>().unwrap(), FieldType::String);
    }

    #[test]
    fn test_section_of_uses_components_and_groups() {
        let mut dict = Dictionary::new(Version::Fix44);
        dict.add_component(ComponentDef {
            name: "Routing".to_string(),
            layout: Layout {
                fields: vec![member(128, "DeliverToCompID")],
                ..Layout::default()
            },
        });
        let header = Layout {
            fields: vec![member(8, "BeginString"), member(35, "MsgType")],
            groups: vec![GroupDef {
                count_tag: 627,
                name: "NoHops".to_string(),
                delimiter_tag: 628,
                required: false,
                layout: Layout {
                    fields: vec![member(628, "HopCompID")],
                    ..Layout::default()
                },
            }],
            components: vec!["Routing".to_string()],
        };
        let trailer = Layout {
            fields: vec![member(10, "CheckSum")],
            ..Layout::default()
        };
        dict.set_header_trailer(header, trailer);

        assert_eq!(dict.section_of(35), Section::Header);
        assert_eq!(dict.section_of(627), Section::Header);
        assert_eq!(dict.section_of(628), Section::Header);
        assert_eq!(dict.section_of(128), Section::Header);
        assert_eq!(dict.section_of(10), Section::Trailer);
        assert_eq!(dict.section_of(55), Section::Body);
    }

    #[test]
    fn test_section_of_without_header_falls_back() {
        let dict = Dictionary::new(Version::Fix50Sp2);
        assert_eq!(dict.section_of(49), Section::Header);
        assert_eq!(dict.section_of(55), Section::Body);
    }

    #[test]
    fn test_dictionary_field_operations() {
        let mut dict = Dictionary::new(Version::Fix44);
        dict.add_field(FieldDef::new(35, "MsgType", FieldType::String));

        assert_eq!(dict.field_name(35), Some("MsgType"));
        assert!(dict.get_field_by_name("MsgType").is_some());
        assert!(dict.get_field(999).is_none());
    }
}
