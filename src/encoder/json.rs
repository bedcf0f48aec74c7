//! JSON codec.
//!
//! Encoding behavior is controlled by an option word in the context (see
//! [`crate::context::keys::JSON_ENCODE_OPTIONS`]); the flags here OR into it.

use crate::context::Context;
use crate::encoder::{Decoder, Encoder};
use crate::error::ReissueError;
use serde_json::Value;

/// The format name both halves of the codec claim.
pub const FORMAT: &str = "json";

/// Indent output for human readers.
pub const PRETTY_PRINT: u64 = 1;
/// Escape non-ASCII characters as `\uXXXX` sequences.
pub const ESCAPE_UNICODE: u64 = 1 << 1;

/// Renders trees as JSON text.
///
/// # Examples
///
/// ```
/// use reissue::context::builder::JsonEncoderContextBuilder;
/// use reissue::encoder::Encoder;
/// use reissue::encoder::json::JsonEncoder;
/// use serde_json::json;
///
/// let context = JsonEncoderContextBuilder::new()
/// 	.with_escape_unicode(true)
/// 	.build();
/// let rendered = JsonEncoder
/// 	.encode(&json!({ "city": "Zürich" }), "json", &context)
/// 	.unwrap();
/// assert_eq!(rendered, "{\"city\":\"Z\\u00fcrich\"}");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
	fn supports_encoding(&self, format: &str) -> bool {
		format == FORMAT
	}

	fn encode(
		&self,
		data: &Value,
		_format: &str,
		context: &Context,
	) -> Result<String, ReissueError> {
		let options = context.json_encode_options();
		let rendered = if options & PRETTY_PRINT != 0 {
			serde_json::to_string_pretty(data)
		} else {
			serde_json::to_string(data)
		}
		.map_err(|e| ReissueError::Encode {
			format: FORMAT.to_string(),
			message: e.to_string(),
		})?;

		if options & ESCAPE_UNICODE != 0 {
			Ok(escape_unicode(&rendered))
		} else {
			Ok(rendered)
		}
	}
}

// Valid JSON text carries non-ASCII only inside string literals, so a
// whole-document pass is safe.
fn escape_unicode(rendered: &str) -> String {
	let mut out = String::with_capacity(rendered.len());
	for ch in rendered.chars() {
		if ch.is_ascii() {
			out.push(ch);
		} else {
			let mut units = [0u16; 2];
			for unit in ch.encode_utf16(&mut units) {
				out.push_str(&format!("\\u{unit:04x}"));
			}
		}
	}
	out
}

/// Parses JSON text into trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl Decoder for JsonDecoder {
	fn supports_decoding(&self, format: &str) -> bool {
		format == FORMAT
	}

	fn decode(&self, input: &str, _format: &str, _context: &Context) -> Result<Value, ReissueError> {
		serde_json::from_str(input).map_err(|e| ReissueError::Decode {
			format: FORMAT.to_string(),
			message: e.to_string(),
		})
	}
}
