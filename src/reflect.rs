//! Type descriptor capability.
//!
//! Types opt into the engine by implementing up to three traits. [`Reflect`]
//! exposes a value's fields for normalization, [`Construct`] lets the engine
//! build and fill a value during denormalization, and [`Describe`] lets a
//! type declare its own serialization rules for
//! [`crate::mapping::loader::ReflectLoader`]. Registration is explicit in
//! all three directions; nothing is discovered implicitly.

use crate::error::ReissueError;
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::any::Any;

/// A field's value, projected for normalization.
///
/// Borrowed where possible so reading a field never clones the object graph.
/// Composite values carry live references that the object normalizer
/// recurses into with a deeper context.
pub enum FieldValue<'a> {
	/// An explicit null (e.g. a `None` the type chose to materialize).
	Null,
	Bool(bool),
	Int(i64),
	UInt(u64),
	Float(f64),
	Str(&'a str),
	/// A temporal value, formatted by the engine per context.
	DateTime(DateTime<FixedOffset>),
	/// An ordered collection; items may themselves be composite.
	Seq(Vec<FieldValue<'a>>),
	/// A string-keyed collection, in iteration order.
	Map(Vec<(String, FieldValue<'a>)>),
	/// A nested object the engine normalizes recursively.
	Object(&'a dyn Reflect),
}

/// Read access to a value's fields.
///
/// `fields` lists the materialized field names in declaration order; `field`
/// projects one of them. Returning `None` from `field` marks the field as
/// not materialized and the engine omits it silently.
///
/// # Examples
///
/// ```
/// use reissue::reflect::{FieldValue, Reflect};
///
/// struct Point { x: i64, y: i64 }
///
/// impl Reflect for Point {
/// 	fn type_name(&self) -> &'static str {
/// 		"Point"
/// 	}
///
/// 	fn fields(&self) -> Vec<&'static str> {
/// 		vec!["x", "y"]
/// 	}
///
/// 	fn field(&self, name: &str) -> Option<FieldValue<'_>> {
/// 		match name {
/// 			"x" => Some(FieldValue::Int(self.x)),
/// 			"y" => Some(FieldValue::Int(self.y)),
/// 			_ => None,
/// 		}
/// 	}
/// }
/// ```
pub trait Reflect {
	/// Stable type identifier, used as the metadata key.
	fn type_name(&self) -> &'static str;

	/// Materialized field names, in declaration order.
	fn fields(&self) -> Vec<&'static str>;

	/// Projects one field. `None` means the field is not materialized.
	fn field(&self, name: &str) -> Option<FieldValue<'_>>;

	/// Hook run once per top-level serialization, before any field is read.
	/// Default is a no-op.
	fn before_reissue(&mut self) {}
}

/// Nested conversion handle passed to [`Construct::assign`].
///
/// Lets a field assignment hand composite subtrees back to the engine, and
/// parse temporal strings with the format the current call configured.
pub trait Denest {
	/// Denormalizes a subtree into the named type.
	fn denormalize(&self, data: Value, type_name: &str) -> Result<Box<dyn Any>, ReissueError>;

	/// Parses a temporal value using the context's format (RFC 3339 when
	/// unset).
	fn datetime(&self, data: &Value) -> Result<DateTime<FixedOffset>, ReissueError>;
}

/// Downcasting wrapper around [`Denest::denormalize`].
///
/// # Examples
///
/// ```no_run
/// # use reissue::reflect::{denest, Denest};
/// # use serde_json::Value;
/// # struct Address;
/// # fn example(nested: &dyn Denest, data: Value) -> Result<(), reissue::error::ReissueError> {
/// let address: Address = denest(nested, data, "Address")?;
/// # Ok(())
/// # }
/// ```
pub fn denest<T: 'static>(
	nested: &dyn Denest,
	data: Value,
	type_name: &str,
) -> Result<T, ReissueError> {
	nested
		.denormalize(data, type_name)?
		.downcast::<T>()
		.map(|boxed| *boxed)
		.map_err(|_| ReissueError::UnknownType(type_name.to_string()))
}

/// Write access for denormalization.
///
/// The engine creates the value with [`Construct::empty`] and assigns the
/// decoded fields one by one, bypassing whatever invariants the type's own
/// constructors enforce. Implementations that need those invariants should
/// re-check them in [`Construct::after_deissue`].
pub trait Construct: Sized {
	/// Builds the raw value every assignment starts from.
	fn empty() -> Self;

	/// Assigns one decoded field. Unknown field names should be ignored by
	/// returning `Ok(())`.
	fn assign(
		&mut self,
		field: &str,
		value: Value,
		nested: &dyn Denest,
	) -> Result<(), ReissueError>;

	/// Hook run once per top-level deserialization, after every field has
	/// been assigned. Default is a no-op.
	fn after_deissue(&mut self) {}
}

/// Self-declared serialization rules, consumed by
/// [`crate::mapping::loader::ReflectLoader`].
pub trait Describe {
	/// Stable type identifier. Must match [`Reflect::type_name`] for types
	/// implementing both.
	fn type_name() -> &'static str;

	/// The rules this type declares about itself.
	fn class_metadata() -> crate::mapping::ClassMetadata;
}
