//! Conversion between typed values and the format-neutral tree.
//!
//! [`Normalizer`] projects a live value into a [`serde_json::Value`] tree;
//! [`Denormalizer`] rebuilds a typed value from one. The façade keeps an
//! ordered list of each and dispatches every call to the first handler that
//! claims support; a call nothing claims is a configuration error, never a
//! silent fallback.

pub mod date_time;
pub mod object;
pub mod sequence;

use crate::context::Context;
use crate::error::ReissueError;
use crate::reflect::Reflect;
use serde_json::Value;
use std::any::Any;

/// Projects typed values into the format-neutral tree.
pub trait Normalizer: Send + Sync {
	/// Whether this normalizer handles the given value for the given format.
	fn supports_normalization(&self, value: &dyn Reflect, format: Option<&str>) -> bool;

	/// Projects the value.
	fn normalize(
		&self,
		value: &dyn Reflect,
		format: Option<&str>,
		context: &Context,
	) -> Result<Value, ReissueError>;
}

/// Rebuilds typed values from the format-neutral tree.
///
/// The output is type-erased; the façade's typed entry points downcast it.
pub trait Denormalizer: Send + Sync {
	/// Whether this denormalizer handles the named target type for the given
	/// format.
	fn supports_denormalization(&self, type_name: &str, format: Option<&str>) -> bool;

	/// Rebuilds a value of the named type from the tree.
	fn denormalize(
		&self,
		data: Value,
		type_name: &str,
		format: Option<&str>,
		context: &Context,
	) -> Result<Box<dyn Any>, ReissueError>;
}

/// Human-readable shape of a tree node, for error messages.
pub(crate) fn shape_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "a sequence",
		Value::Object(_) => "a mapping",
	}
}
