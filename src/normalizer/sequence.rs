//! Homogeneous collection conversion.
//!
//! Sequences are addressed with a `[]` suffix on the element type name, so
//! `"User[]"` denormalizes into a vector of `User`. Elements are delegated
//! one by one to the object normalizer with the same context.

use crate::context::Context;
use crate::error::ReissueError;
use crate::normalizer::object::MetadataAwareObjectNormalizer;
use crate::normalizer::{Denormalizer, Normalizer, shape_of};
use crate::reflect::Reflect;
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;

/// Converts top-level sequences of objects.
pub struct SequenceNormalizer {
	object: Arc<MetadataAwareObjectNormalizer>,
}

impl SequenceNormalizer {
	/// Creates a sequence normalizer delegating elements to `object`.
	pub fn new(object: Arc<MetadataAwareObjectNormalizer>) -> Self {
		Self { object }
	}

	/// Strips the sequence marker, when present.
	pub fn element_type(type_name: &str) -> Option<&str> {
		type_name.strip_suffix("[]")
	}

	/// Normalizes a sequence of values into a tree array.
	pub fn normalize_seq(
		&self,
		values: &[&dyn Reflect],
		format: Option<&str>,
		context: &Context,
	) -> Result<Value, ReissueError> {
		let mut out = Vec::with_capacity(values.len());
		for value in values {
			out.push(self.object.normalize(*value, format, context)?);
		}
		Ok(Value::Array(out))
	}
}

impl Denormalizer for SequenceNormalizer {
	fn supports_denormalization(&self, type_name: &str, format: Option<&str>) -> bool {
		Self::element_type(type_name)
			.is_some_and(|element| self.object.supports_denormalization(element, format))
	}

	fn denormalize(
		&self,
		data: Value,
		type_name: &str,
		format: Option<&str>,
		context: &Context,
	) -> Result<Box<dyn Any>, ReissueError> {
		let element = Self::element_type(type_name)
			.ok_or_else(|| ReissueError::NoDenormalizer(type_name.to_string()))?;

		let Value::Array(items) = data else {
			return Err(ReissueError::InvalidShape {
				expected: "a sequence",
				found: shape_of(&data).to_string(),
			});
		};

		let mut out: Vec<Box<dyn Any>> = Vec::with_capacity(items.len());
		for item in items {
			out.push(self.object.denormalize(item, element, format, context)?);
		}
		Ok(Box::new(out))
	}
}
