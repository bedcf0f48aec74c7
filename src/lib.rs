//! Metadata-driven serializer.
//!
//! `reissue` converts typed values to and from wire formats in two distinct
//! stages. A normalizer projects a value into a format-neutral tree
//! ([`serde_json::Value`]) guided by per-type metadata: renames, ignores,
//! group filters and depth limits. A codec then renders that tree as JSON or
//! XML text, or parses text back into it. Both stages are pluggable and
//! dispatch to the first registered handler that claims a call.
//!
//! Types opt in explicitly through the traits in [`reflect`]; metadata comes
//! from the sources in [`mapping::loader`] and is memoized by the registry
//! in [`mapping::atelier`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use reissue::Reissue;
//! use reissue::context::Context;
//! use reissue::error::ReissueError;
//! use reissue::mapping::atelier::ClassMetadataAtelier;
//! use reissue::mapping::loader::ReflectLoader;
//! use reissue::mapping::{AttributeMetadata, ClassMetadata};
//! use reissue::normalizer::object::MetadataAwareObjectNormalizer;
//! use reissue::reflect::{Construct, Denest, Describe, FieldValue, Reflect};
//! use serde_json::Value;
//!
//! #[derive(Default)]
//! struct User {
//! 	name: String,
//! 	password: String,
//! }
//!
//! impl Reflect for User {
//! 	fn type_name(&self) -> &'static str {
//! 		"User"
//! 	}
//!
//! 	fn fields(&self) -> Vec<&'static str> {
//! 		vec!["name", "password"]
//! 	}
//!
//! 	fn field(&self, name: &str) -> Option<FieldValue<'_>> {
//! 		match name {
//! 			"name" => Some(FieldValue::Str(&self.name)),
//! 			"password" => Some(FieldValue::Str(&self.password)),
//! 			_ => None,
//! 		}
//! 	}
//! }
//!
//! impl Construct for User {
//! 	fn empty() -> Self {
//! 		Self::default()
//! 	}
//!
//! 	fn assign(
//! 		&mut self,
//! 		field: &str,
//! 		value: Value,
//! 		_nested: &dyn Denest,
//! 	) -> Result<(), ReissueError> {
//! 		if field == "name" {
//! 			self.name = value.as_str().unwrap_or_default().to_string();
//! 		}
//! 		Ok(())
//! 	}
//! }
//!
//! impl Describe for User {
//! 	fn type_name() -> &'static str {
//! 		"User"
//! 	}
//!
//! 	fn class_metadata() -> ClassMetadata {
//! 		ClassMetadata::new("User")
//! 			.with_attribute(AttributeMetadata::new("password").with_ignored(true))
//! 	}
//! }
//!
//! let atelier = Arc::new(ClassMetadataAtelier::new(Box::new(
//! 	ReflectLoader::new().with::<User>(),
//! )));
//! let object = Arc::new(
//! 	MetadataAwareObjectNormalizer::new(atelier).with_target::<User>("User"),
//! );
//! let reissue = Reissue::builder()
//! 	.with_normalizer(object.clone())
//! 	.with_denormalizer(object)
//! 	.with_default_codecs()
//! 	.build();
//!
//! let mut user = User {
//! 	name: "Ada".to_string(),
//! 	password: "hunter2".to_string(),
//! };
//! let rendered = reissue.reissue(&mut user, "json", &Context::new()).unwrap();
//! assert_eq!(rendered, r#"{"name":"Ada"}"#);
//!
//! let parsed: User = reissue
//! 	.deissue(&rendered, "User", "json", &Context::new())
//! 	.unwrap();
//! assert_eq!(parsed.name, "Ada");
//! ```

pub mod collector;
pub mod context;
pub mod encoder;
pub mod error;
pub mod mapping;
pub mod name_recast;
pub mod normalizer;
pub mod reflect;
mod reissue;

pub use error::{ErrorKind, ReissueError};
pub use reissue::{Reissue, ReissueBuilder};
