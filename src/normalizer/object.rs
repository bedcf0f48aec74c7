//! Metadata-aware object conversion.
//!
//! [`MetadataAwareObjectNormalizer`] is the engine's workhorse. It walks a
//! value's fields through [`Reflect`], consults the atelier's rules for each
//! one and emits a key-ordered mapping; the reverse direction resolves wire
//! keys back to typed fields and fills a [`Construct`]-built value.

use crate::context::Context;
use crate::error::ReissueError;
use crate::mapping::atelier::MetadataAtelier;
use crate::name_recast::NameRecast;
use crate::normalizer::date_time::DateTimeNormalizer;
use crate::normalizer::{Denormalizer, Normalizer, shape_of};
use crate::reflect::{Construct, Denest, FieldValue, Reflect};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

type ConstructorFn =
	Box<dyn Fn(Vec<(String, Value)>, &dyn Denest) -> Result<Box<dyn Any>, ReissueError> + Send + Sync>;

/// Normalizes and denormalizes objects according to their metadata.
///
/// Normalization emits fields in [`Reflect::fields`] order, skipping a field
/// when it is not materialized, marked ignored, filtered out by groups, null
/// while nulls are skipped, or past the effective depth limit. Depth
/// truncation is silent. The emitted key is the metadata's serialized name
/// when present, otherwise the configured name recast (or the field name
/// itself).
///
/// Denormalization resolves each wire key back to a typed field with the
/// same precedence (metadata rename first, recast second), applies the same
/// ignore and group rules, then builds the target through its registered
/// [`Construct`] implementation. That construction path bypasses the type's
/// own constructors by design.
pub struct MetadataAwareObjectNormalizer {
	atelier: Arc<dyn MetadataAtelier>,
	name_recast: Option<Arc<dyn NameRecast>>,
	date_time: DateTimeNormalizer,
	targets: HashMap<String, ConstructorFn>,
}

impl MetadataAwareObjectNormalizer {
	/// Creates a normalizer over the given metadata registry.
	pub fn new(atelier: Arc<dyn MetadataAtelier>) -> Self {
		Self {
			atelier,
			name_recast: None,
			date_time: DateTimeNormalizer,
			targets: HashMap::new(),
		}
	}

	/// Installs a wire-name transform for fields without a metadata rename.
	pub fn with_name_recast(mut self, recast: Arc<dyn NameRecast>) -> Self {
		self.name_recast = Some(recast);
		self
	}

	/// Registers a denormalization target under its type name.
	pub fn register_target<T: Construct + Any>(&mut self, type_name: &str) {
		self.targets.insert(
			type_name.to_string(),
			Box::new(|fields, nested| {
				let mut value = T::empty();
				for (name, field) in fields {
					value.assign(&name, field, nested)?;
				}
				Ok(Box::new(value))
			}),
		);
	}

	/// Fluent form of [`Self::register_target`].
	pub fn with_target<T: Construct + Any>(mut self, type_name: &str) -> Self {
		self.register_target::<T>(type_name);
		self
	}

	fn wire_name(&self, metadata: &crate::mapping::ClassMetadata, field: &str) -> String {
		if let Some(serialized) = metadata
			.attribute_metadata(field)
			.and_then(|a| a.serialized_name())
		{
			return serialized.to_string();
		}
		match &self.name_recast {
			Some(recast) => recast.recast(field),
			None => field.to_string(),
		}
	}

	fn normalize_field(
		&self,
		field: FieldValue<'_>,
		format: Option<&str>,
		context: &Context,
	) -> Result<Value, ReissueError> {
		Ok(match field {
			FieldValue::Null => Value::Null,
			FieldValue::Bool(b) => Value::Bool(b),
			FieldValue::Int(i) => Value::from(i),
			FieldValue::UInt(u) => Value::from(u),
			FieldValue::Float(f) => Value::from(f),
			FieldValue::Str(s) => Value::from(s),
			FieldValue::DateTime(dt) => self.date_time.normalize(&dt, context),
			FieldValue::Seq(items) => {
				let mut out = Vec::with_capacity(items.len());
				for item in items {
					out.push(self.normalize_field(item, format, context)?);
				}
				Value::Array(out)
			}
			FieldValue::Map(entries) => {
				let mut out = Map::new();
				for (key, item) in entries {
					out.insert(key, self.normalize_field(item, format, context)?);
				}
				Value::Object(out)
			}
			FieldValue::Object(inner) => self.normalize(inner, format, &context.child())?,
		})
	}
}

impl Normalizer for MetadataAwareObjectNormalizer {
	fn supports_normalization(&self, _value: &dyn Reflect, _format: Option<&str>) -> bool {
		true
	}

	fn normalize(
		&self,
		value: &dyn Reflect,
		format: Option<&str>,
		context: &Context,
	) -> Result<Value, ReissueError> {
		let metadata = self.atelier.metadata_for(value.type_name())?;
		let groups = context.groups();
		let mut out = Map::new();

		for field in value.fields() {
			let attribute = metadata.attribute_metadata(field);
			if attribute.is_some_and(|a| a.is_ignored()) {
				continue;
			}
			if !metadata.should_serialize_attribute(field, &groups) {
				continue;
			}
			let Some(projected) = value.field(field) else {
				continue;
			};
			if matches!(projected, FieldValue::Null) && context.skip_null_values() {
				continue;
			}

			// Field rule wins over class rule wins over context rule;
			// truncation past the limit is silent.
			let effective_max = attribute
				.and_then(|a| a.max_depth())
				.or(metadata.max_depth())
				.or(context.max_depth());
			if let Some(max) = effective_max {
				if context.current_depth() >= max {
					tracing::trace!(
						type_name = value.type_name(),
						field,
						depth = context.current_depth(),
						"depth limit reached, omitting field"
					);
					continue;
				}
			}

			let key = self.wire_name(&metadata, field);
			let rendered = self.normalize_field(projected, format, context)?;
			out.insert(key, rendered);
		}

		Ok(Value::Object(out))
	}
}

impl Denormalizer for MetadataAwareObjectNormalizer {
	fn supports_denormalization(&self, type_name: &str, _format: Option<&str>) -> bool {
		self.targets.contains_key(type_name)
	}

	fn denormalize(
		&self,
		data: Value,
		type_name: &str,
		format: Option<&str>,
		context: &Context,
	) -> Result<Box<dyn Any>, ReissueError> {
		let constructor = self
			.targets
			.get(type_name)
			.ok_or_else(|| ReissueError::NoDenormalizer(type_name.to_string()))?;

		let Value::Object(input) = data else {
			return Err(ReissueError::InvalidShape {
				expected: "a mapping",
				found: shape_of(&data).to_string(),
			});
		};

		let metadata = self.atelier.metadata_for(type_name)?;
		let groups = context.groups();

		// Metadata renames take precedence over the reverse recast.
		let mut renamed: HashMap<&str, &str> = HashMap::new();
		for attribute in metadata.attributes_metadata() {
			if let Some(serialized) = attribute.serialized_name() {
				renamed.insert(serialized, attribute.name());
			}
		}

		let mut fields = Vec::with_capacity(input.len());
		for (key, value) in input {
			let field = match renamed.get(key.as_str()) {
				Some(name) => (*name).to_string(),
				None => match &self.name_recast {
					Some(recast) => recast.revert(&key),
					None => key,
				},
			};
			if metadata
				.attribute_metadata(&field)
				.is_some_and(|a| a.is_ignored())
			{
				continue;
			}
			if !metadata.should_serialize_attribute(&field, &groups) {
				continue;
			}
			fields.push((field, value));
		}

		let nested = NestedDenormalizer {
			engine: self,
			format,
			context,
		};
		constructor(fields, &nested)
	}
}

/// [`Denest`] handle the object normalizer passes into [`Construct::assign`].
struct NestedDenormalizer<'a> {
	engine: &'a MetadataAwareObjectNormalizer,
	format: Option<&'a str>,
	context: &'a Context,
}

impl Denest for NestedDenormalizer<'_> {
	fn denormalize(&self, data: Value, type_name: &str) -> Result<Box<dyn Any>, ReissueError> {
		self.engine
			.denormalize(data, type_name, self.format, &self.context.child())
	}

	fn datetime(&self, data: &Value) -> Result<DateTime<FixedOffset>, ReissueError> {
		self.engine.date_time.denormalize(data, self.context)
	}
}
