//! XML codec.
//!
//! Trees render under a single root element (default `response`). Mapping
//! keys become element names, array values repeat their parent key as
//! sibling elements, keys starting with `@` become attributes and numeric
//! keys render as `<item key="N">`. Decoding mirrors this: repeated sibling
//! names promote to an array, attributes come back as `@`-prefixed keys and
//! mixed attribute-and-text elements keep their text under `#`.
//!
//! The rendering is deliberately lossy for scalars: booleans come back as
//! the strings `"true"`/`"false"` and numbers as digit strings.

use crate::context::Context;
use crate::encoder::{Decoder, Encoder};
use crate::error::ReissueError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde_json::{Map, Value};
use std::io;

/// The format name both halves of the codec claim.
pub const FORMAT: &str = "xml";

/// Root element used when the context does not name one.
pub const DEFAULT_ROOT: &str = "response";

fn encode_error(message: impl ToString) -> ReissueError {
	ReissueError::Encode {
		format: FORMAT.to_string(),
		message: message.to_string(),
	}
}

fn decode_error(message: impl ToString) -> ReissueError {
	ReissueError::Decode {
		format: FORMAT.to_string(),
		message: message.to_string(),
	}
}

/// Renders trees as XML documents.
///
/// # Examples
///
/// ```
/// use reissue::context::Context;
/// use reissue::context::builder::XmlEncoderContextBuilder;
/// use reissue::encoder::Encoder;
/// use reissue::encoder::xml::XmlEncoder;
/// use serde_json::json;
///
/// let context = XmlEncoderContextBuilder::new()
/// 	.with_root_node_name("user")
/// 	.with_format_output(false)
/// 	.build();
/// let rendered = XmlEncoder
/// 	.encode(&json!({ "name": "Ada" }), "xml", &context)
/// 	.unwrap();
/// assert_eq!(
/// 	rendered,
/// 	r#"<?xml version="1.0" encoding="UTF-8"?><user><name>Ada</name></user>"#
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlEncoder;

impl XmlEncoder {
	fn scalar_text(value: &Value) -> Option<String> {
		match value {
			Value::Bool(b) => Some(b.to_string()),
			Value::Number(n) => Some(n.to_string()),
			Value::String(s) => Some(s.clone()),
			_ => None,
		}
	}

	fn write_children<W: io::Write>(
		writer: &mut Writer<W>,
		entries: &Map<String, Value>,
	) -> io::Result<()> {
		for (key, value) in entries {
			if key.starts_with('@') {
				continue;
			}
			match value {
				// Sibling repetition: the key repeats once per item
				Value::Array(items) => {
					for item in items {
						Self::write_element(writer, key, item)?;
					}
				}
				_ => Self::write_element(writer, key, value)?,
			}
		}
		Ok(())
	}

	fn write_element<W: io::Write>(
		writer: &mut Writer<W>,
		name: &str,
		value: &Value,
	) -> io::Result<()> {
		// Numeric keys are not valid element names
		let (name, key_attribute) = if name.chars().all(|c| c.is_ascii_digit()) {
			("item", Some(name))
		} else {
			(name, None)
		};

		let mut start = BytesStart::new(name);
		if let Some(key) = key_attribute {
			start.push_attribute(("key", key));
		}
		if let Value::Object(entries) = value {
			for (key, attr) in entries {
				if let Some(rest) = key.strip_prefix('@') {
					if let Some(text) = Self::scalar_text(attr) {
						start.push_attribute((rest, text.as_str()));
					}
				}
			}
		}

		match value {
			Value::Null => writer.write_event(Event::Empty(start)),
			Value::Bool(_) | Value::Number(_) | Value::String(_) => {
				let text = Self::scalar_text(value).unwrap_or_default();
				if text.is_empty() {
					writer.write_event(Event::Empty(start))
				} else {
					writer.write_event(Event::Start(start))?;
					writer.write_event(Event::Text(BytesText::new(&text)))?;
					writer.write_event(Event::End(BytesEnd::new(name)))
				}
			}
			Value::Array(items) => {
				// An array reached directly (root or nested array) falls
				// back to "item" elements
				writer.write_event(Event::Start(start))?;
				for item in items {
					Self::write_element(writer, "item", item)?;
				}
				writer.write_event(Event::End(BytesEnd::new(name)))
			}
			Value::Object(entries) => {
				let has_children = entries.keys().any(|k| !k.starts_with('@'));
				if !has_children {
					return writer.write_event(Event::Empty(start));
				}
				writer.write_event(Event::Start(start))?;
				Self::write_children(writer, entries)?;
				writer.write_event(Event::End(BytesEnd::new(name)))
			}
		}
	}
}

impl Encoder for XmlEncoder {
	fn supports_encoding(&self, format: &str) -> bool {
		format == FORMAT
	}

	fn encode(
		&self,
		data: &Value,
		_format: &str,
		context: &Context,
	) -> Result<String, ReissueError> {
		let root = context.xml_root_node_name().unwrap_or(DEFAULT_ROOT);
		let version = context.xml_version().unwrap_or("1.0");
		let encoding = context.xml_encoding().unwrap_or("UTF-8");
		let standalone = context
			.xml_standalone()
			.map(|s| if s { "yes" } else { "no" });

		let mut writer = if context.xml_format_output() {
			Writer::new_with_indent(Vec::new(), b' ', 2)
		} else {
			Writer::new(Vec::new())
		};

		writer
			.write_event(Event::Decl(BytesDecl::new(
				version,
				Some(encoding),
				standalone,
			)))
			.map_err(encode_error)?;
		Self::write_element(&mut writer, root, data).map_err(encode_error)?;

		String::from_utf8(writer.into_inner()).map_err(encode_error)
	}
}

/// Parses XML documents into trees.
///
/// The root element is discarded; its contents become the tree. An element
/// with neither attributes nor children decodes to its text, or to null when
/// empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlDecoder;

impl XmlDecoder {
	fn insert_promoting(entries: &mut Map<String, Value>, key: String, value: Value) {
		match entries.get_mut(&key) {
			// Repeated sibling: promote to an array
			Some(Value::Array(items)) => items.push(value),
			Some(existing) => {
				let first = existing.take();
				*existing = Value::Array(vec![first, value]);
			}
			None => {
				entries.insert(key, value);
			}
		}
	}

	fn element_name(start: &BytesStart) -> Result<String, ReissueError> {
		std::str::from_utf8(start.name().as_ref())
			.map(str::to_string)
			.map_err(decode_error)
	}

	fn attributes(start: &BytesStart) -> Result<Map<String, Value>, ReissueError> {
		let mut entries = Map::new();
		for attribute in start.attributes() {
			let attribute = attribute.map_err(decode_error)?;
			let key = std::str::from_utf8(attribute.key.as_ref())
				.map_err(decode_error)?
				.to_string();
			let value = attribute
				.unescape_value()
				.map_err(decode_error)?
				.into_owned();
			entries.insert(format!("@{key}"), Value::String(value));
		}
		Ok(entries)
	}

	fn read_element(
		reader: &mut Reader<&[u8]>,
		start: &BytesStart,
	) -> Result<Value, ReissueError> {
		let mut entries = Self::attributes(start)?;
		let mut text: Option<String> = None;

		loop {
			match reader.read_event().map_err(decode_error)? {
				Event::Start(child) => {
					let name = Self::element_name(&child)?;
					let value = Self::read_element(reader, &child)?;
					Self::insert_promoting(&mut entries, name, value);
				}
				Event::Empty(child) => {
					let name = Self::element_name(&child)?;
					let attributes = Self::attributes(&child)?;
					let value = if attributes.is_empty() {
						Value::Null
					} else {
						Value::Object(attributes)
					};
					Self::insert_promoting(&mut entries, name, value);
				}
				Event::Text(t) => {
					let unescaped = t.unescape().map_err(decode_error)?;
					if !unescaped.trim().is_empty() {
						text = Some(unescaped.into_owned());
					}
				}
				Event::CData(t) => {
					let raw = String::from_utf8(t.into_inner().into_owned())
						.map_err(decode_error)?;
					text = Some(raw);
				}
				Event::End(_) => break,
				Event::Eof => return Err(decode_error("unexpected end of document")),
				_ => {}
			}
		}

		if entries.is_empty() {
			return Ok(match text {
				Some(text) => Value::String(text),
				None => Value::Null,
			});
		}
		if let Some(text) = text {
			entries.insert("#".to_string(), Value::String(text));
		}
		Ok(Value::Object(entries))
	}
}

impl Decoder for XmlDecoder {
	fn supports_decoding(&self, format: &str) -> bool {
		format == FORMAT
	}

	fn decode(&self, input: &str, _format: &str, _context: &Context) -> Result<Value, ReissueError> {
		let mut reader = Reader::from_str(input);

		loop {
			match reader.read_event().map_err(decode_error)? {
				Event::Start(root) => {
					let root = root.into_owned();
					return Self::read_element(&mut reader, &root);
				}
				Event::Empty(root) => {
					let attributes = Self::attributes(&root)?;
					return Ok(if attributes.is_empty() {
						Value::Null
					} else {
						Value::Object(attributes)
					});
				}
				Event::Eof => return Err(decode_error("no root element")),
				// Declarations, comments and whitespace before the root
				_ => {}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::context::builder::XmlEncoderContextBuilder;
	use serde_json::json;

	fn compact() -> Context {
		XmlEncoderContextBuilder::new()
			.with_format_output(false)
			.build()
	}

	#[test]
	fn test_encode_defaults_to_response_root() {
		let rendered = XmlEncoder
			.encode(&json!({ "name": "Ada" }), FORMAT, &compact())
			.unwrap();
		assert_eq!(
			rendered,
			r#"<?xml version="1.0" encoding="UTF-8"?><response><name>Ada</name></response>"#
		);
	}

	#[test]
	fn test_encode_declaration_options() {
		let context = XmlEncoderContextBuilder::new()
			.with_xml_version("1.1")
			.with_xml_encoding("ISO-8859-1")
			.with_standalone(true)
			.with_format_output(false)
			.build();
		let rendered = XmlEncoder.encode(&json!(null), FORMAT, &context).unwrap();
		assert_eq!(
			rendered,
			r#"<?xml version="1.1" encoding="ISO-8859-1" standalone="yes"?><response/>"#
		);
	}

	#[test]
	fn test_encode_array_repeats_parent_key() {
		let rendered = XmlEncoder
			.encode(&json!({ "tag": ["a", "b"] }), FORMAT, &compact())
			.unwrap();
		assert!(rendered.ends_with("<response><tag>a</tag><tag>b</tag></response>"));
	}

	#[test]
	fn test_encode_root_array_uses_item_elements() {
		let rendered = XmlEncoder
			.encode(&json!([1, 2]), FORMAT, &compact())
			.unwrap();
		assert!(rendered.ends_with("<response><item>1</item><item>2</item></response>"));
	}

	#[test]
	fn test_encode_numeric_keys_become_keyed_items() {
		let rendered = XmlEncoder
			.encode(&json!({ "0": "zero" }), FORMAT, &compact())
			.unwrap();
		assert!(rendered.ends_with(r#"<response><item key="0">zero</item></response>"#));
	}

	#[test]
	fn test_encode_attribute_keys_and_scalars() {
		let rendered = XmlEncoder
			.encode(
				&json!({ "user": { "@id": 7, "name": "Ada", "active": true, "bio": null } }),
				FORMAT,
				&compact(),
			)
			.unwrap();
		assert!(rendered.ends_with(
			r#"<response><user id="7"><name>Ada</name><active>true</active><bio/></user></response>"#
		));
	}

	#[test]
	fn test_decode_discards_root_and_promotes_siblings() {
		let tree = XmlDecoder
			.decode(
				r#"<?xml version="1.0"?><response><tag>a</tag><tag>b</tag><tag>c</tag></response>"#,
				FORMAT,
				&Context::new(),
			)
			.unwrap();
		assert_eq!(tree, json!({ "tag": ["a", "b", "c"] }));
	}

	#[test]
	fn test_decode_attributes_and_mixed_text() {
		let tree = XmlDecoder
			.decode(
				r#"<response><user id="7">Ada</user><empty/></response>"#,
				FORMAT,
				&Context::new(),
			)
			.unwrap();
		assert_eq!(
			tree,
			json!({ "user": { "@id": "7", "#": "Ada" }, "empty": null })
		);
	}

	#[test]
	fn test_decode_malformed_input_is_input_shape() {
		let err = XmlDecoder
			.decode("<response><open></response>", FORMAT, &Context::new())
			.unwrap_err();
		assert!(err.is_input_shape());

		let err = XmlDecoder
			.decode("   ", FORMAT, &Context::new())
			.unwrap_err();
		assert!(err.is_input_shape());
	}

	#[test]
	fn test_scalar_round_trip_is_stringly() {
		let rendered = XmlEncoder
			.encode(&json!({ "count": 3, "active": true }), FORMAT, &compact())
			.unwrap();
		let tree = XmlDecoder.decode(&rendered, FORMAT, &Context::new()).unwrap();
		assert_eq!(tree, json!({ "count": "3", "active": "true" }));
	}
}
