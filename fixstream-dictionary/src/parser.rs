/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! QuickFIX XML dictionary parser.
//!
//! Reads the `<fix>` documents shipped with QuickFIX engines (`FIX44.xml`,
//! `FIXT11.xml`, ...). Fields are read first so that header, trailer, message,
//! component and group members can be resolved from name to tag.

use crate::schema::{
    ComponentDef, Dictionary, FieldDef, FieldMember, FieldType, GroupDef, Layout, MessageCategory,
    MessageDef, Version,
};
use fixstream_core::error::DictionaryError;
use roxmltree::{Document, Node};
use std::collections::HashMap;
use std::path::Path;

/// Reads and parses a dictionary file.
///
/// # Errors
/// Returns `DictionaryError` if the file cannot be read or is not a valid
/// QuickFIX dictionary.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Dictionary, DictionaryError> {
    let path = path.as_ref();
    let xml = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&xml)
}

/// Parses a dictionary from an XML string.
///
/// # Errors
/// Returns `DictionaryError` on malformed XML, missing attributes, references
/// to undefined fields or an unsupported version.
pub fn parse_str(xml: &str) -> Result<Dictionary, DictionaryError> {
    let doc = Document::parse(xml).map_err(|e| DictionaryError::Xml(e.to_string()))?;
    let root = doc.root_element();
    if root.tag_name().name() != "fix" {
        return Err(DictionaryError::Xml(format!(
            "expected <fix> root element, found <{}>",
            root.tag_name().name()
        )));
    }

    let version = parse_version(root)?;
    let mut dict = Dictionary::new(version);

    if let Some(fields) = child(root, "fields") {
        for node in elements(fields, "field") {
            dict.add_field(parse_field_def(node)?);
        }
    }

    let names = dict.fields_by_name.clone();

    if let Some(components) = child(root, "components") {
        for node in elements(components, "component") {
            dict.add_component(ComponentDef {
                name: attr(node, "name")?.to_string(),
                layout: parse_layout(node, &names)?,
            });
        }
    }

    if let Some(messages) = child(root, "messages") {
        for node in elements(messages, "message") {
            let category = match node.attribute("msgcat") {
                Some("admin") => MessageCategory::Admin,
                _ => MessageCategory::App,
            };
            dict.add_message(MessageDef {
                msg_type: attr(node, "msgtype")?.to_string(),
                name: attr(node, "name")?.to_string(),
                category,
                layout: parse_layout(node, &names)?,
            });
        }
    }

    let header = match child(root, "header") {
        Some(node) => parse_layout(node, &names)?,
        None => Layout::default(),
    };
    let trailer = match child(root, "trailer") {
        Some(node) => parse_layout(node, &names)?,
        None => Layout::default(),
    };
    dict.set_header_trailer(header, trailer);

    Ok(dict)
}

fn parse_version(root: Node<'_, '_>) -> Result<Version, DictionaryError> {
    let kind = root.attribute("type").unwrap_or("FIX");
    let major = numeric_attr(root, "major")?;
    let minor = numeric_attr(root, "minor")?;
    let service_pack = match root.attribute("servicepack") {
        Some(_) => numeric_attr(root, "servicepack")?,
        None => 0,
    };
    Version::from_parts(kind, major, minor, service_pack).ok_or_else(|| {
        DictionaryError::UnsupportedVersion(format!("{kind} {major}.{minor} SP{service_pack}"))
    })
}

fn parse_field_def(node: Node<'_, '_>) -> Result<FieldDef, DictionaryError> {
    let tag = numeric_attr(node, "number")?;
    let name = attr(node, "name")?;
    let field_type: FieldType = attr(node, "type")?.parse().unwrap_or(FieldType::String);

    let mut field = FieldDef::new(tag, name, field_type);
    for value in elements(node, "value") {
        let wire = attr(value, "enum")?;
        let description = value.attribute("description").unwrap_or(wire);
        field.values.insert(wire.to_string(), description.to_string());
    }
    Ok(field)
}

fn parse_layout(
    node: Node<'_, '_>,
    names: &HashMap<String, u32>,
) -> Result<Layout, DictionaryError> {
    let mut layout = Layout::default();
    for member in node.children().filter(Node::is_element) {
        match member.tag_name().name() {
            "field" => layout.fields.push(parse_member(member, names)?),
            "group" => {
                let count = parse_member(member, names)?;
                let inner = parse_layout(member, names)?;
                let delimiter_tag = inner.fields.first().map_or(count.tag, |f| f.tag);
                layout.groups.push(GroupDef {
                    count_tag: count.tag,
                    name: count.name,
                    delimiter_tag,
                    required: count.required,
                    layout: inner,
                });
            }
            "component" => layout.components.push(attr(member, "name")?.to_string()),
            _ => {}
        }
    }
    Ok(layout)
}

fn parse_member(
    node: Node<'_, '_>,
    names: &HashMap<String, u32>,
) -> Result<FieldMember, DictionaryError> {
    let name = attr(node, "name")?;
    let tag = *names
        .get(name)
        .ok_or_else(|| DictionaryError::UnknownField(name.to_string()))?;
    Ok(FieldMember {
        tag,
        name: name.to_string(),
        required: node.attribute("required") == Some("Y"),
    })
}

fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

fn elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

fn attr<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, DictionaryError> {
    node.attribute(name)
        .ok_or_else(|| DictionaryError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: name.to_string(),
        })
}

fn numeric_attr(node: Node<'_, '_>, name: &str) -> Result<u32, DictionaryError> {
    let raw = attr(node, name)?;
    raw.trim().parse().map_err(|_| {
        DictionaryError::Xml(format!(
            "attribute '{name}' of <{}> is not a number: {raw}",
            node.tag_name().name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixstream_core::message::Section;
    use std::io::Write;

    pub(crate) const FIX44_SUBSET: &str = r#"<fix major="4" minor="4" servicepack="0" type="FIX">
  <header>
    <field name="BeginString" required="Y"/>
    <field name="BodyLength" required="Y"/>
    <field name="MsgType" required="Y"/>
    <field name="SenderCompID" required="Y"/>
    <field name="TargetCompID" required="Y"/>
    <field name="MsgSeqNum" required="Y"/>
    <field name="SendingTime" required="Y"/>
  </header>
  <trailer>
    <field name="CheckSum" required="Y"/>
  </trailer>
  <messages>
    <message name="Heartbeat" msgtype="0" msgcat="admin">
      <field name="TestReqID" required="N"/>
    </message>
    <message name="NewOrderSingle" msgtype="D" msgcat="app">
      <field name="ClOrdID" required="Y"/>
      <component name="Instrument" required="Y"/>
      <field name="Side" required="Y"/>
      <group name="NoPartyIDs" required="N">
        <field name="PartyID" required="N"/>
      </group>
    </message>
  </messages>
  <components>
    <component name="Instrument">
      <field name="Symbol" required="N"/>
    </component>
  </components>
  <fields>
    <field number="8" name="BeginString" type="STRING"/>
    <field number="9" name="BodyLength" type="LENGTH"/>
    <field number="10" name="CheckSum" type="STRING"/>
    <field number="11" name="ClOrdID" type="STRING"/>
    <field number="34" name="MsgSeqNum" type="SEQNUM"/>
    <field number="35" name="MsgType" type="STRING">
      <value enum="0" description="HEARTBEAT"/>
      <value enum="D" description="ORDER_SINGLE"/>
    </field>
    <field number="49" name="SenderCompID" type="STRING"/>
    <field number="52" name="SendingTime" type="UTCTIMESTAMP"/>
    <field number="54" name="Side" type="CHAR">
      <value enum="1" description="BUY"/>
      <value enum="2" description="SELL"/>
    </field>
    <field number="55" name="Symbol" type="STRING"/>
    <field number="56" name="TargetCompID" type="STRING"/>
    <field number="112" name="TestReqID" type="STRING"/>
    <field number="448" name="PartyID" type="STRING"/>
    <field number="453" name="NoPartyIDs" type="NUMINGROUP"/>
  </fields>
</fix>"#;

    #[test]
    fn test_parse_fix44_subset() {
        let dict = parse_str(FIX44_SUBSET).unwrap();

        assert_eq!(dict.version, Version::Fix44);
        assert_eq!(dict.field_name(55), Some("Symbol"));
        assert_eq!(dict.get_field(54).unwrap().values.get("1").unwrap(), "BUY");
        assert_eq!(dict.get_field(34).unwrap().field_type, FieldType::Int);

        let order = dict.get_message("D").unwrap();
        assert_eq!(order.name, "NewOrderSingle");
        assert_eq!(order.category, MessageCategory::App);
        assert_eq!(order.layout.components, vec!["Instrument".to_string()]);
        assert_eq!(order.layout.groups[0].count_tag, 453);
        assert_eq!(order.layout.groups[0].delimiter_tag, 448);
        assert_eq!(
            dict.get_message("0").unwrap().category,
            MessageCategory::Admin
        );

        assert_eq!(dict.section_of(52), Section::Header);
        assert_eq!(dict.section_of(10), Section::Trailer);
        assert_eq!(dict.section_of(55), Section::Body);
    }

    #[test]
    fn test_parse_rejects_unknown_field_reference() {
        let xml = r#"<fix major="4" minor="2" type="FIX">
  <header><field name="Nope" required="Y"/></header>
  <fields><field number="8" name="BeginString" type="STRING"/></fields>
</fix>"#;
        let err = parse_str(xml).unwrap_err();
        assert!(matches!(err, DictionaryError::UnknownField(name) if name == "Nope"));
    }

    #[test]
    fn test_parse_rejects_unsupported_version() {
        let err = parse_str(r#"<fix major="9" minor="9" type="FIX"/>"#).unwrap_err();
        assert!(matches!(err, DictionaryError::UnsupportedVersion(_)));
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let err = parse_str("<fix major=").unwrap_err();
        assert!(matches!(err, DictionaryError::Xml(_)));
    }

    #[test]
    fn test_parse_file_reports_missing_file() {
        let err = parse_file("/definitely/not/here/FIX44.xml").unwrap_err();
        assert!(matches!(err, DictionaryError::Io { .. }));
    }

    #[test]
    fn test_parse_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIX44_SUBSET.as_bytes()).unwrap();
        let dict = parse_file(file.path()).unwrap();
        assert_eq!(dict.messages.len(), 2);
    }
}
