//! Per-call operation context.
//!
//! A [`Context`] is a flat map from option key to option value, built fresh
//! for each public call through one of the builders in [`builder`]. The
//! engine never mutates a caller's context; recursive traversal derives child
//! contexts with [`Context::child`], which increments the current depth and
//! leaves everything else untouched.

pub mod builder;

use serde_json::Value;
use std::collections::HashMap;

/// Well-known context option keys.
pub mod keys {
	/// Groups used for attribute filtering (array of strings).
	pub const GROUPS: &str = "groups";
	/// Maximum recursion depth (unsigned integer).
	pub const MAX_DEPTH: &str = "max_depth";
	/// Whether null-valued attributes are dropped (bool, default false).
	pub const SKIP_NULL_VALUES: &str = "skip_null_values";
	/// Current recursion depth (unsigned integer, default 0).
	pub const CURRENT_DEPTH: &str = "current_depth";
	/// chrono format string for temporal values (default RFC 3339).
	pub const DATETIME_FORMAT: &str = "datetime_format";
	/// JSON encoder option word (see [`crate::encoder::json`]).
	pub const JSON_ENCODE_OPTIONS: &str = "json_encode_options";
	/// JSON decoder option word.
	pub const JSON_DECODE_OPTIONS: &str = "json_decode_options";
	/// XML root element name (default "response").
	pub const XML_ROOT_NODE_NAME: &str = "xml_root_node_name";
	/// XML version in the declaration (default "1.0").
	pub const XML_VERSION: &str = "xml_version";
	/// XML encoding in the declaration (default "UTF-8").
	pub const XML_ENCODING: &str = "xml_encoding";
	/// XML standalone declaration flag.
	pub const XML_STANDALONE: &str = "xml_standalone";
	/// Whether XML output is indented (default true).
	pub const XML_FORMAT_OUTPUT: &str = "xml_format_output";
}

/// Options bag consulted by normalizers and codecs.
///
/// # Examples
///
/// ```
/// use reissue::context::builder::ReissueContextBuilder;
///
/// let context = ReissueContextBuilder::new()
///     .with_groups(["public"])
///     .with_max_depth(2)
///     .build();
///
/// assert_eq!(context.groups(), vec!["public".to_string()]);
/// assert_eq!(context.max_depth(), Some(2));
/// assert_eq!(context.current_depth(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
	options: HashMap<String, Value>,
}

impl Context {
	/// Creates an empty context.
	pub fn new() -> Self {
		Self::default()
	}

	/// Gets a raw option value.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.options.get(key)
	}

	/// Sets a raw option value, replacing any previous one.
	pub fn insert(&mut self, key: impl Into<String>, value: Value) {
		self.options.insert(key.into(), value);
	}

	/// Returns the group filter, empty when unset.
	pub fn groups(&self) -> Vec<String> {
		match self.options.get(keys::GROUPS) {
			Some(Value::Array(items)) => items
				.iter()
				.filter_map(|v| v.as_str().map(str::to_string))
				.collect(),
			_ => Vec::new(),
		}
	}

	/// Returns the context-level maximum depth, if set.
	pub fn max_depth(&self) -> Option<u32> {
		self.options
			.get(keys::MAX_DEPTH)
			.and_then(Value::as_u64)
			.map(|d| d as u32)
	}

	/// Whether null-valued attributes are dropped during normalization.
	pub fn skip_null_values(&self) -> bool {
		self.options
			.get(keys::SKIP_NULL_VALUES)
			.and_then(Value::as_bool)
			.unwrap_or(false)
	}

	/// Current recursion depth. Defaults to 0 at the root of a call.
	pub fn current_depth(&self) -> u32 {
		self.options
			.get(keys::CURRENT_DEPTH)
			.and_then(Value::as_u64)
			.map(|d| d as u32)
			.unwrap_or(0)
	}

	/// The chrono format string for temporal values, if set.
	pub fn datetime_format(&self) -> Option<&str> {
		self.options.get(keys::DATETIME_FORMAT).and_then(Value::as_str)
	}

	/// JSON encoder option word (0 when unset).
	pub fn json_encode_options(&self) -> u64 {
		self.options
			.get(keys::JSON_ENCODE_OPTIONS)
			.and_then(Value::as_u64)
			.unwrap_or(0)
	}

	/// JSON decoder option word (0 when unset).
	pub fn json_decode_options(&self) -> u64 {
		self.options
			.get(keys::JSON_DECODE_OPTIONS)
			.and_then(Value::as_u64)
			.unwrap_or(0)
	}

	/// XML root element name override.
	pub fn xml_root_node_name(&self) -> Option<&str> {
		self.options.get(keys::XML_ROOT_NODE_NAME).and_then(Value::as_str)
	}

	/// XML version override.
	pub fn xml_version(&self) -> Option<&str> {
		self.options.get(keys::XML_VERSION).and_then(Value::as_str)
	}

	/// XML encoding override.
	pub fn xml_encoding(&self) -> Option<&str> {
		self.options.get(keys::XML_ENCODING).and_then(Value::as_str)
	}

	/// XML standalone declaration flag, if set.
	pub fn xml_standalone(&self) -> Option<bool> {
		self.options.get(keys::XML_STANDALONE).and_then(Value::as_bool)
	}

	/// Whether XML output is indented. Defaults to true.
	pub fn xml_format_output(&self) -> bool {
		self.options
			.get(keys::XML_FORMAT_OUTPUT)
			.and_then(Value::as_bool)
			.unwrap_or(true)
	}

	/// Derives the context for one recursion step deeper.
	///
	/// The child is a copy with `current_depth` incremented; sibling
	/// recursive calls never share a mutable context.
	///
	/// # Examples
	///
	/// ```
	/// use reissue::context::Context;
	///
	/// let context = Context::new();
	/// let child = context.child();
	/// assert_eq!(context.current_depth(), 0);
	/// assert_eq!(child.current_depth(), 1);
	/// ```
	pub fn child(&self) -> Self {
		let mut child = self.clone();
		child.insert(
			keys::CURRENT_DEPTH,
			Value::from(self.current_depth() as u64 + 1),
		);
		child
	}
}
