//! Temporal value conversion.

use crate::context::Context;
use crate::error::ReissueError;
use crate::normalizer::{Denormalizer, shape_of};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde_json::Value;
use std::any::Any;

/// Formats and parses temporal values per context.
///
/// Without a configured format, values render as RFC 3339 strings. With a
/// [`crate::context::keys::DATETIME_FORMAT`] option, the chrono format string
/// applies in both directions.
///
/// # Examples
///
/// ```
/// use chrono::DateTime;
/// use reissue::context::builder::ReissueContextBuilder;
/// use reissue::normalizer::date_time::DateTimeNormalizer;
///
/// let context = ReissueContextBuilder::new()
/// 	.with_datetime_format("%Y-%m-%d")
/// 	.build();
/// let when = DateTime::parse_from_rfc3339("2024-06-01T12:00:00+00:00").unwrap();
///
/// let normalizer = DateTimeNormalizer;
/// assert_eq!(normalizer.normalize(&when, &context), "2024-06-01");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeNormalizer;

impl DateTimeNormalizer {
	/// Renders a temporal value as a tree string.
	pub fn normalize(&self, value: &DateTime<FixedOffset>, context: &Context) -> Value {
		let rendered = match context.datetime_format() {
			Some(format) => value.format(format).to_string(),
			None => value.to_rfc3339(),
		};
		Value::String(rendered)
	}

	/// Parses a tree string back into a temporal value.
	///
	/// When the configured format carries no timezone, the value is read as
	/// naive and anchored to UTC.
	pub fn denormalize(
		&self,
		data: &Value,
		context: &Context,
	) -> Result<DateTime<FixedOffset>, ReissueError> {
		let raw = data.as_str().ok_or_else(|| ReissueError::InvalidShape {
			expected: "a date string",
			found: shape_of(data).to_string(),
		})?;

		match context.datetime_format() {
			Some(format) => DateTime::parse_from_str(raw, format).or_else(|zoned_err| {
				NaiveDateTime::parse_from_str(raw, format)
					.map(|naive| naive.and_utc().fixed_offset())
					.map_err(|_| ReissueError::InvalidDate {
						value: raw.to_string(),
						message: zoned_err.to_string(),
					})
			}),
			None => {
				DateTime::parse_from_rfc3339(raw).map_err(|e| ReissueError::InvalidDate {
					value: raw.to_string(),
					message: e.to_string(),
				})
			}
		}
	}
}

/// Standalone chain membership under the target name `DateTime`, for callers
/// deserializing a bare temporal value rather than a field of one.
impl Denormalizer for DateTimeNormalizer {
	fn supports_denormalization(&self, type_name: &str, _format: Option<&str>) -> bool {
		type_name == "DateTime"
	}

	fn denormalize(
		&self,
		data: Value,
		_type_name: &str,
		_format: Option<&str>,
		context: &Context,
	) -> Result<Box<dyn Any>, ReissueError> {
		Ok(Box::new(DateTimeNormalizer::denormalize(
			self, &data, context,
		)?))
	}
}

/// Shorthand for "now, as the engine's canonical offset type". Used by tests
/// and demos.
pub fn now_fixed() -> DateTime<FixedOffset> {
	Utc::now().fixed_offset()
}
