//! JSON to XML rendering
//!
//! Objects become nested elements, arrays become repeated elements named after
//! their key, scalars become text and `null` becomes an empty element. Keys are
//! emitted in document order.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};

/// Provider metadata attached to every record; never part of the output
pub const METADATA_ELEMENT: &str = "attributes";

/// Render `object` as a single element named `root`
pub fn render(root: &str, object: &Map<String, Value>) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    write_object(&mut writer, &encode_name(root)?, object)?;
    String::from_utf8(writer.into_inner()).map_err(|e| Error::normalize(e.to_string()))
}

fn write_object(writer: &mut Writer<Vec<u8>>, name: &str, object: &Map<String, Value>) -> Result<()> {
    let mut members = object
        .iter()
        .filter(|(key, _)| key.as_str() != METADATA_ELEMENT)
        .peekable();

    if members.peek().is_none() {
        return write(writer, Event::Empty(BytesStart::new(name)));
    }

    write(writer, Event::Start(BytesStart::new(name)))?;
    for (key, value) in members {
        write_member(writer, &encode_name(key)?, value)?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}

/// An array member expands to one element per item; anything else is one element
fn write_member(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(writer, name, item)?;
            }
            Ok(())
        }
        _ => write_element(writer, name, value),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Null => write(writer, Event::Empty(BytesStart::new(name))),
        Value::Object(object) => write_object(writer, name, object),
        Value::Array(items) => {
            // nested array: wrap the inner items in an element of the same name
            write(writer, Event::Start(BytesStart::new(name)))?;
            for item in items {
                write_element(writer, name, item)?;
            }
            write(writer, Event::End(BytesEnd::new(name)))
        }
        Value::Bool(b) => write_text(writer, name, if *b { "true" } else { "false" }),
        Value::Number(n) => write_text(writer, name, &n.to_string()),
        Value::String(s) => write_text(writer, name, s),
    }
}

fn write_text(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    if !text.is_empty() {
        write(writer, Event::Text(BytesText::new(text)))?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::normalize(e.to_string()))
}

/// Encode a JSON key as an XML element name.
///
/// Characters that are not allowed in an XML name are replaced with
/// `_xHHHH_` (their UTF-16 code units in hex), the convention used by .NET
/// `XmlConvert.EncodeName`, so keys like `Account Name` or `3rdParty` still
/// produce well-formed XML.
pub fn encode_name(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(Error::normalize("empty JSON key cannot be used as an XML element name"));
    }

    let mut encoded = String::with_capacity(key.len());
    for (i, c) in key.chars().enumerate() {
        let allowed = if i == 0 {
            is_name_start(c)
        } else {
            is_name_char(c)
        };
        if allowed {
            encoded.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                encoded.push_str(&format!("_x{unit:04X}_"));
            }
        }
    }
    Ok(encoded)
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_numeric() || matches!(c, '-' | '.')
}
