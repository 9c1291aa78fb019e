/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! JSON rendering of event payloads.
//!
//! A payload renders as `{"Header": {...}, "Body": {...}, "Trailer": {...}}`.
//! With dictionaries, keys are field names; without, they are tag numbers.
//! Values are strings, and a tag that occurs more than once (repeating
//! groups) becomes an array in wire order. A value that is not valid UTF-8
//! (raw data or encoded text) renders as `{"hex": "..."}` holding its exact
//! bytes. Events without a payload render as an empty object.

use crate::bridge::SessionDictionaries;
use crate::event::Event;
use fixstream_core::message::{OwnedMessage, Section};
use serde_json::{Map, Value};

/// Renders the payload of `event` using `dictionaries` where available.
#[must_use]
pub fn render_event(event: &Event, dictionaries: &SessionDictionaries) -> Value {
    match event.payload() {
        Some(message) => render_message(message, dictionaries),
        None => Value::Object(Map::new()),
    }
}

/// Renders one message into header, body and trailer objects.
#[must_use]
pub fn render_message(message: &OwnedMessage, dictionaries: &SessionDictionaries) -> Value {
    let mut header = Map::new();
    let mut body = Map::new();
    let mut trailer = Map::new();

    for field in message.fields() {
        let section = dictionaries
            .transport
            .as_ref()
            .map_or_else(|| Section::of_standard_tag(field.tag), |d| d.section_of(field.tag));
        let dictionary = match section {
            Section::Body => dictionaries.app.as_ref(),
            Section::Header | Section::Trailer => dictionaries.transport.as_ref(),
        };
        let key = dictionary
            .and_then(|d| d.field_name(field.tag))
            .map_or_else(|| field.tag.to_string(), str::to_string);
        let value = render_value(field.value);

        let target = match section {
            Section::Header => &mut header,
            Section::Body => &mut body,
            Section::Trailer => &mut trailer,
        };
        insert(target, key, value);
    }

    let mut root = Map::new();
    root.insert(Section::Header.as_str().to_string(), Value::Object(header));
    root.insert(Section::Body.as_str().to_string(), Value::Object(body));
    root.insert(Section::Trailer.as_str().to_string(), Value::Object(trailer));
    Value::Object(root)
}

fn render_value(value: &[u8]) -> Value {
    match std::str::from_utf8(value) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => {
            let mut encoded = Map::new();
            encoded.insert("hex".to_string(), Value::String(hex::encode(value)));
            Value::Object(encoded)
        }
    }
}

fn insert(target: &mut Map<String, Value>, key: String, value: Value) {
    match target.get_mut(&key) {
        None => {
            target.insert(key, value);
        }
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use fixstream_dictionary::parse_str;
    use fixstream_session::SessionId;
    use fixstream_tagvalue::{Encoder, decode_owned};
    use serde_json::json;
    use std::sync::Arc;

    const DICTIONARY: &str = r#"<fix major="4" minor="4" type="FIX">
  <header>
    <field name="BeginString" required="Y"/>
    <field name="BodyLength" required="Y"/>
    <field name="MsgType" required="Y"/>
    <field name="SenderCompID" required="Y"/>
  </header>
  <trailer><field name="CheckSum" required="Y"/></trailer>
  <messages/>
  <fields>
    <field number="8" name="BeginString" type="STRING"/>
    <field number="9" name="BodyLength" type="LENGTH"/>
    <field number="10" name="CheckSum" type="STRING"/>
    <field number="35" name="MsgType" type="STRING"/>
    <field number="49" name="SenderCompID" type="STRING"/>
    <field number="55" name="Symbol" type="STRING"/>
    <field number="448" name="PartyID" type="STRING"/>
    <field number="453" name="NoPartyIDs" type="NUMINGROUP"/>
  </fields>
</fix>"#;

    fn order() -> OwnedMessage {
        let mut encoder = Encoder::new("FIX.4.4");
        encoder.put_str(35, "D");
        encoder.put_str(49, "S1");
        encoder.put_str(55, "AAPL");
        encoder.put_uint(453, 2);
        encoder.put_str(448, "P1");
        encoder.put_str(448, "P2");
        decode_owned(&encoder.finish()).unwrap()
    }

    #[test]
    fn test_render_without_dictionary_uses_tags() {
        let value = render_message(&order(), &SessionDictionaries::default());

        assert_eq!(value["Header"]["8"], json!("FIX.4.4"));
        assert_eq!(value["Header"]["35"], json!("D"));
        assert_eq!(value["Header"]["49"], json!("S1"));
        assert_eq!(value["Body"]["55"], json!("AAPL"));
        assert_eq!(value["Body"]["453"], json!("2"));
        assert_eq!(value["Body"]["448"], json!(["P1", "P2"]));
        assert!(value["Trailer"]["10"].is_string());
    }

    #[test]
    fn test_render_with_dictionary_uses_names() {
        let dict = Arc::new(parse_str(DICTIONARY).unwrap());
        let dictionaries = SessionDictionaries {
            app: Some(Arc::clone(&dict)),
            transport: Some(dict),
        };
        let value = render_message(&order(), &dictionaries);

        assert_eq!(value["Header"]["BeginString"], json!("FIX.4.4"));
        assert_eq!(value["Header"]["SenderCompID"], json!("S1"));
        assert_eq!(value["Body"]["Symbol"], json!("AAPL"));
        assert_eq!(value["Body"]["PartyID"], json!(["P1", "P2"]));
        assert!(value["Trailer"]["CheckSum"].is_string());
    }

    #[test]
    fn test_render_with_transport_only() {
        let dictionaries = SessionDictionaries {
            app: None,
            transport: Some(Arc::new(parse_str(DICTIONARY).unwrap())),
        };
        let value = render_message(&order(), &dictionaries);

        assert_eq!(value["Header"]["MsgType"], json!("D"));
        assert_eq!(value["Body"]["55"], json!("AAPL"));
    }

    #[test]
    fn test_render_binary_value_as_hex() {
        let mut encoder = Encoder::new("FIX.4.4");
        encoder.put_str(35, "B");
        encoder.put_uint(95, 4);
        encoder.put_raw(96, &[0xde, 0xad, 0xbe, 0xef]);
        encoder.put_str(58, "caf\u{e9}");
        let message = decode_owned(&encoder.finish()).unwrap();

        let value = render_message(&message, &SessionDictionaries::default());
        assert_eq!(value["Body"]["96"], json!({"hex": "deadbeef"}));
        assert_eq!(value["Body"]["58"], json!("caf\u{e9}"));
    }

    #[test]
    fn test_render_event_without_payload() {
        let event = Event::new(SessionId::new("FIX.4.4", "S1", "T1"), EventKind::Logon);
        let value = render_event(&event, &SessionDictionaries::default());
        assert_eq!(value, json!({}));
    }
}
