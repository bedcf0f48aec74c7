//! Fluent builders producing [`Context`] option maps.
//!
//! Three builders are provided: [`ReissueContextBuilder`] covers every
//! recognized option, while [`JsonEncoderContextBuilder`] and
//! [`XmlEncoderContextBuilder`] focus on one codec each. Granular flag
//! toggles (e.g. [`JsonEncoderContextBuilder::with_pretty_print`]) OR their
//! flag into any previously set option word; the bulk setters
//! (`with_json_encode_options`) always overwrite the whole word.

use super::{Context, keys};
use crate::encoder::json;
use serde_json::Value;

/// General-purpose context builder.
///
/// # Examples
///
/// ```
/// use reissue::context::builder::ReissueContextBuilder;
///
/// let context = ReissueContextBuilder::new()
///     .with_groups(["public", "admin"])
///     .with_skip_null_values(true)
///     .with_datetime_format("%Y-%m-%d")
///     .build();
///
/// assert!(context.skip_null_values());
/// assert_eq!(context.datetime_format(), Some("%Y-%m-%d"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReissueContextBuilder {
	context: Context,
}

impl ReissueContextBuilder {
	/// Creates a new builder over an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an arbitrary option. Escape hatch for third-party converters.
	pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
		self.context.insert(key, value);
		self
	}

	/// Sets the group filter.
	pub fn with_groups<I, S>(self, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let groups: Vec<Value> = groups
			.into_iter()
			.map(|g| Value::String(g.into()))
			.collect();
		self.with(keys::GROUPS, Value::Array(groups))
	}

	/// Sets the maximum recursion depth.
	pub fn with_max_depth(self, depth: u32) -> Self {
		self.with(keys::MAX_DEPTH, Value::from(depth as u64))
	}

	/// Sets whether null-valued attributes are dropped.
	pub fn with_skip_null_values(self, skip: bool) -> Self {
		self.with(keys::SKIP_NULL_VALUES, Value::Bool(skip))
	}

	/// Sets the starting recursion depth. Internal use; the engine derives
	/// deeper contexts itself.
	pub fn with_current_depth(self, depth: u32) -> Self {
		self.with(keys::CURRENT_DEPTH, Value::from(depth as u64))
	}

	/// Sets the chrono format string used for temporal values.
	pub fn with_datetime_format(self, format: impl Into<String>) -> Self {
		self.with(keys::DATETIME_FORMAT, Value::String(format.into()))
	}

	/// Sets the whole JSON encoder option word, overwriting any flags.
	pub fn with_json_encode_options(self, options: u64) -> Self {
		self.with(keys::JSON_ENCODE_OPTIONS, Value::from(options))
	}

	/// Sets the whole JSON decoder option word, overwriting any flags.
	pub fn with_json_decode_options(self, options: u64) -> Self {
		self.with(keys::JSON_DECODE_OPTIONS, Value::from(options))
	}

	/// Sets the XML root element name.
	pub fn with_xml_root_node_name(self, name: impl Into<String>) -> Self {
		self.with(keys::XML_ROOT_NODE_NAME, Value::String(name.into()))
	}

	/// Sets the XML version.
	pub fn with_xml_version(self, version: impl Into<String>) -> Self {
		self.with(keys::XML_VERSION, Value::String(version.into()))
	}

	/// Sets the XML encoding.
	pub fn with_xml_encoding(self, encoding: impl Into<String>) -> Self {
		self.with(keys::XML_ENCODING, Value::String(encoding.into()))
	}

	/// Sets the XML standalone declaration flag.
	pub fn with_xml_standalone(self, standalone: bool) -> Self {
		self.with(keys::XML_STANDALONE, Value::Bool(standalone))
	}

	/// Sets whether XML output is indented.
	pub fn with_xml_format_output(self, format: bool) -> Self {
		self.with(keys::XML_FORMAT_OUTPUT, Value::Bool(format))
	}

	/// Produces the context.
	pub fn build(self) -> Context {
		self.context
	}
}

/// Context builder for JSON codec options.
///
/// Granular toggles accumulate into the option word; the bulk setter
/// replaces it.
///
/// # Examples
///
/// ```
/// use reissue::context::builder::JsonEncoderContextBuilder;
/// use reissue::encoder::json;
///
/// let context = JsonEncoderContextBuilder::new()
///     .with_pretty_print(true)
///     .with_escape_unicode(true)
///     .build();
///
/// assert_eq!(
///     context.json_encode_options(),
///     json::PRETTY_PRINT | json::ESCAPE_UNICODE
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonEncoderContextBuilder {
	context: Context,
}

impl JsonEncoderContextBuilder {
	/// Creates a new builder over an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an arbitrary option.
	pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
		self.context.insert(key, value);
		self
	}

	/// Replaces the whole JSON encoder option word.
	pub fn with_json_encode_options(self, options: u64) -> Self {
		self.with(keys::JSON_ENCODE_OPTIONS, Value::from(options))
	}

	/// Replaces the whole JSON decoder option word.
	pub fn with_json_decode_options(self, options: u64) -> Self {
		self.with(keys::JSON_DECODE_OPTIONS, Value::from(options))
	}

	/// Toggles pretty-printed output, ORing into the current option word.
	pub fn with_pretty_print(self, enable: bool) -> Self {
		if enable {
			let options = self.context.json_encode_options();
			self.with_json_encode_options(options | json::PRETTY_PRINT)
		} else {
			self
		}
	}

	/// Toggles `\uXXXX` escaping of non-ASCII characters, ORing into the
	/// current option word.
	pub fn with_escape_unicode(self, enable: bool) -> Self {
		if enable {
			let options = self.context.json_encode_options();
			self.with_json_encode_options(options | json::ESCAPE_UNICODE)
		} else {
			self
		}
	}

	/// Produces the context.
	pub fn build(self) -> Context {
		self.context
	}
}

/// Context builder for XML codec options.
#[derive(Debug, Clone, Default)]
pub struct XmlEncoderContextBuilder {
	context: Context,
}

impl XmlEncoderContextBuilder {
	/// Creates a new builder over an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets an arbitrary option.
	pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
		self.context.insert(key, value);
		self
	}

	/// Sets the root element name.
	pub fn with_root_node_name(self, name: impl Into<String>) -> Self {
		self.with(keys::XML_ROOT_NODE_NAME, Value::String(name.into()))
	}

	/// Sets the XML version in the declaration.
	pub fn with_xml_version(self, version: impl Into<String>) -> Self {
		self.with(keys::XML_VERSION, Value::String(version.into()))
	}

	/// Sets the encoding in the declaration.
	pub fn with_xml_encoding(self, encoding: impl Into<String>) -> Self {
		self.with(keys::XML_ENCODING, Value::String(encoding.into()))
	}

	/// Sets the standalone flag in the declaration.
	pub fn with_standalone(self, standalone: bool) -> Self {
		self.with(keys::XML_STANDALONE, Value::Bool(standalone))
	}

	/// Sets whether output is indented.
	pub fn with_format_output(self, format: bool) -> Self {
		self.with(keys::XML_FORMAT_OUTPUT, Value::Bool(format))
	}

	/// Produces the context.
	pub fn build(self) -> Context {
		self.context
	}
}
