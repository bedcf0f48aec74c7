//! Per-type serialization rules.
//!
//! A [`ClassMetadata`] collects one [`AttributeMetadata`] per field of a
//! type, in discovery order, plus class-level defaults. Metadata is produced
//! by a source (see [`loader`]), memoized by the registry (see [`atelier`])
//! and consulted read-only by the normalizer; it is never mutated after
//! construction.

pub mod atelier;
pub mod loader;

use indexmap::IndexMap;

/// Serialization rules for one field of a type.
///
/// Built fluently, then frozen inside its owning [`ClassMetadata`]:
///
/// ```
/// use reissue::mapping::AttributeMetadata;
///
/// let attr = AttributeMetadata::new("email")
///     .with_serialized_name("emailAddress")
///     .with_groups(["public", "admin"])
///     .with_max_depth(2);
///
/// assert_eq!(attr.name(), "email");
/// assert_eq!(attr.serialized_name(), Some("emailAddress"));
/// assert!(!attr.is_ignored());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMetadata {
	name: String,
	serialized_name: Option<String>,
	ignored: bool,
	groups: Vec<String>,
	max_depth: Option<u32>,
}

impl AttributeMetadata {
	/// Creates metadata for the named field with default rules.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			serialized_name: None,
			ignored: false,
			groups: Vec::new(),
			max_depth: None,
		}
	}

	/// Overrides the emitted key for this field.
	pub fn with_serialized_name(mut self, name: impl Into<String>) -> Self {
		self.serialized_name = Some(name.into());
		self
	}

	/// Excludes this field from both normalization directions.
	pub fn with_ignored(mut self, ignored: bool) -> Self {
		self.ignored = ignored;
		self
	}

	/// Restricts this field to the given groups. An empty set means
	/// "always included".
	pub fn with_groups<I, S>(mut self, groups: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.groups = groups.into_iter().map(Into::into).collect();
		self
	}

	/// Sets a field-level recursion depth limit.
	pub fn with_max_depth(mut self, depth: u32) -> Self {
		self.max_depth = Some(depth);
		self
	}

	/// The field identifier.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The emitted-key override, if any.
	pub fn serialized_name(&self) -> Option<&str> {
		self.serialized_name.as_deref()
	}

	/// Whether this field is excluded.
	pub fn is_ignored(&self) -> bool {
		self.ignored
	}

	/// The field's group memberships.
	pub fn groups(&self) -> &[String] {
		&self.groups
	}

	/// The field-level depth limit, if any.
	pub fn max_depth(&self) -> Option<u32> {
		self.max_depth
	}
}

/// Serialization rules for one type.
///
/// Field order is discovery order; adding metadata for an already-present
/// field replaces the previous rules (last writer wins), which is what the
/// merging loader chain relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
	class_name: String,
	attributes: IndexMap<String, AttributeMetadata>,
	groups: Vec<String>,
	max_depth: Option<u32>,
}

impl ClassMetadata {
	/// Creates empty metadata for the named type.
	pub fn new(class_name: impl Into<String>) -> Self {
		Self {
			class_name: class_name.into(),
			attributes: IndexMap::new(),
			groups: Vec::new(),
			max_depth: None,
		}
	}

	/// The type identifier this metadata belongs to.
	pub fn class_name(&self) -> &str {
		&self.class_name
	}

	/// Adds or replaces the rules for one field.
	pub fn add_attribute_metadata(&mut self, metadata: AttributeMetadata) {
		self.attributes.insert(metadata.name().to_string(), metadata);
	}

	/// Fluent form of [`Self::add_attribute_metadata`], handy for sources.
	pub fn with_attribute(mut self, metadata: AttributeMetadata) -> Self {
		self.add_attribute_metadata(metadata);
		self
	}

	/// Looks up the rules for one field.
	pub fn attribute_metadata(&self, name: &str) -> Option<&AttributeMetadata> {
		self.attributes.get(name)
	}

	/// All field rules, in discovery order.
	pub fn attributes_metadata(&self) -> impl Iterator<Item = &AttributeMetadata> {
		self.attributes.values()
	}

	/// Sets class-level default groups.
	pub fn set_groups<I, S>(&mut self, groups: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.groups = groups.into_iter().map(Into::into).collect();
	}

	/// Class-level default groups.
	pub fn groups(&self) -> &[String] {
		&self.groups
	}

	/// Sets the class-level depth limit.
	pub fn set_max_depth(&mut self, depth: Option<u32>) {
		self.max_depth = depth;
	}

	/// Class-level depth limit, if any.
	pub fn max_depth(&self) -> Option<u32> {
		self.max_depth
	}

	/// Group-membership predicate for one field.
	///
	/// A field is serialized when the context requests no groups, when the
	/// field declares no groups (always included) or when the two sets
	/// intersect. Unknown fields are serialized.
	///
	/// # Examples
	///
	/// ```
	/// use reissue::mapping::{AttributeMetadata, ClassMetadata};
	///
	/// let metadata = ClassMetadata::new("User")
	///     .with_attribute(AttributeMetadata::new("name").with_groups(["public", "admin"]));
	///
	/// assert!(metadata.should_serialize_attribute("name", &[]));
	/// assert!(metadata.should_serialize_attribute("name", &["public".to_string()]));
	/// assert!(!metadata.should_serialize_attribute("name", &["internal".to_string()]));
	/// ```
	pub fn should_serialize_attribute(&self, name: &str, context_groups: &[String]) -> bool {
		if context_groups.is_empty() {
			return true;
		}

		let Some(metadata) = self.attribute_metadata(name) else {
			return true;
		};

		if metadata.groups().is_empty() {
			return true;
		}

		metadata
			.groups()
			.iter()
			.any(|g| context_groups.iter().any(|c| c == g))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_attribute_defaults() {
		let attr = AttributeMetadata::new("name");
		assert_eq!(attr.name(), "name");
		assert_eq!(attr.serialized_name(), None);
		assert!(!attr.is_ignored());
		assert!(attr.groups().is_empty());
		assert_eq!(attr.max_depth(), None);
	}

	#[test]
	fn test_class_metadata_preserves_insertion_order() {
		let metadata = ClassMetadata::new("User")
			.with_attribute(AttributeMetadata::new("id"))
			.with_attribute(AttributeMetadata::new("name"))
			.with_attribute(AttributeMetadata::new("email"));

		let names: Vec<&str> = metadata.attributes_metadata().map(|a| a.name()).collect();
		assert_eq!(names, vec!["id", "name", "email"]);
	}

	#[test]
	fn test_last_writer_wins_on_duplicate_fields() {
		let metadata = ClassMetadata::new("User")
			.with_attribute(AttributeMetadata::new("name"))
			.with_attribute(AttributeMetadata::new("name").with_ignored(true));

		let attr = metadata.attribute_metadata("name").unwrap();
		assert!(attr.is_ignored());
		assert_eq!(metadata.attributes_metadata().count(), 1);
	}

	#[test]
	fn test_group_predicate() {
		let metadata = ClassMetadata::new("User")
			.with_attribute(AttributeMetadata::new("name").with_groups(["public", "admin"]))
			.with_attribute(AttributeMetadata::new("bio"));

		let internal = vec!["internal".to_string()];
		let public = vec!["public".to_string()];

		// Empty context groups: everything serializes
		assert!(metadata.should_serialize_attribute("name", &[]));
		// Intersection required when both sides declare groups
		assert!(metadata.should_serialize_attribute("name", &public));
		assert!(!metadata.should_serialize_attribute("name", &internal));
		// No field groups: always included
		assert!(metadata.should_serialize_attribute("bio", &internal));
		// Unknown fields are included
		assert!(metadata.should_serialize_attribute("missing", &internal));
	}

	#[test]
	fn test_class_level_defaults() {
		let mut metadata = ClassMetadata::new("User");
		metadata.set_groups(["default"]);
		metadata.set_max_depth(Some(3));

		assert_eq!(metadata.groups(), &["default".to_string()]);
		assert_eq!(metadata.max_depth(), Some(3));
	}
}
