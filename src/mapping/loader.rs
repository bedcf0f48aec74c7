//! Metadata sources.
//!
//! A [`MetadataLoader`] contributes serialization rules into a mutable
//! [`ClassMetadata`] and reports whether it had anything to say. Sources
//! compose through [`LoaderChain`], which runs every member in order over the
//! same metadata so later sources override earlier ones field by field.

use super::{AttributeMetadata, ClassMetadata};
use crate::error::ReissueError;
use crate::reflect::Describe;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A source of serialization rules for types.
pub trait MetadataLoader: Send + Sync {
	/// Merges this source's rules for `metadata.class_name()` into
	/// `metadata`. Returns `true` when the source knew the type.
	fn load_class_metadata(&self, metadata: &mut ClassMetadata) -> Result<bool, ReissueError>;
}

/// Runs several sources in registration order over the same metadata.
///
/// Every member sees the accumulated state, so a later source replaces the
/// rules an earlier one set for the same field while untouched fields
/// survive. The chain reports success when any member did.
#[derive(Default)]
pub struct LoaderChain {
	loaders: Vec<Box<dyn MetadataLoader>>,
}

impl LoaderChain {
	/// Creates a chain over the given sources.
	pub fn new(loaders: Vec<Box<dyn MetadataLoader>>) -> Self {
		Self { loaders }
	}
}

impl MetadataLoader for LoaderChain {
	fn load_class_metadata(&self, metadata: &mut ClassMetadata) -> Result<bool, ReissueError> {
		let mut loaded = false;
		for loader in &self.loaders {
			loaded |= loader.load_class_metadata(metadata)?;
		}
		Ok(loaded)
	}
}

/// Source backed by in-process [`Describe`] registrations.
///
/// Types opt in explicitly:
///
/// ```no_run
/// use reissue::mapping::loader::ReflectLoader;
/// # use reissue::mapping::ClassMetadata;
/// # use reissue::reflect::Describe;
/// # struct User;
/// # impl Describe for User {
/// # 	fn type_name() -> &'static str { "User" }
/// # 	fn class_metadata() -> ClassMetadata { ClassMetadata::new("User") }
/// # }
///
/// let mut loader = ReflectLoader::new();
/// loader.register::<User>();
/// ```
#[derive(Default)]
pub struct ReflectLoader {
	classes: HashMap<String, ClassMetadata>,
}

impl ReflectLoader {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the rules a type declares about itself.
	pub fn register<T: Describe>(&mut self) {
		self.classes
			.insert(T::type_name().to_string(), T::class_metadata());
	}

	/// Fluent form of [`Self::register`].
	pub fn with<T: Describe>(mut self) -> Self {
		self.register::<T>();
		self
	}
}

impl MetadataLoader for ReflectLoader {
	fn load_class_metadata(&self, metadata: &mut ClassMetadata) -> Result<bool, ReissueError> {
		let Some(declared) = self.classes.get(metadata.class_name()) else {
			return Ok(false);
		};

		if !declared.groups().is_empty() {
			metadata.set_groups(declared.groups().iter().cloned());
		}
		if declared.max_depth().is_some() {
			metadata.set_max_depth(declared.max_depth());
		}
		for attribute in declared.attributes_metadata() {
			metadata.add_attribute_metadata(attribute.clone());
		}
		Ok(true)
	}
}

#[derive(Debug, Deserialize)]
struct FileAttribute {
	serialized_name: Option<String>,
	#[serde(default)]
	ignored: bool,
	#[serde(default)]
	groups: Vec<String>,
	max_depth: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct FileClass {
	#[serde(default)]
	groups: Vec<String>,
	max_depth: Option<u32>,
	#[serde(default)]
	attributes: IndexMap<String, FileAttribute>,
}

/// Source backed by a JSON mapping file.
///
/// The file maps type names to rules:
///
/// ```json
/// {
/// 	"User": {
/// 		"groups": ["default"],
/// 		"attributes": {
/// 			"email": { "serialized_name": "emailAddress", "groups": ["admin"] },
/// 			"password": { "ignored": true }
/// 		}
/// 	}
/// }
/// ```
///
/// The path is validated at construction; the file itself is read and parsed
/// on first use, then kept.
#[derive(Debug)]
pub struct JsonFileLoader {
	path: PathBuf,
	parsed: RwLock<Option<HashMap<String, FileClass>>>,
}

impl JsonFileLoader {
	/// Creates a source over the given mapping file.
	///
	/// Fails when the path does not point at a file.
	pub fn new(path: impl AsRef<Path>) -> Result<Self, ReissueError> {
		let path = path.as_ref().to_path_buf();
		if !path.is_file() {
			return Err(ReissueError::MetadataLoad {
				class_name: String::new(),
				message: format!("mapping file \"{}\" does not exist", path.display()),
			});
		}
		Ok(Self {
			path,
			parsed: RwLock::new(None),
		})
	}

	fn ensure_parsed(&self, class_name: &str) -> Result<(), ReissueError> {
		if self.parsed.read().is_some() {
			return Ok(());
		}

		let raw =
			std::fs::read_to_string(&self.path).map_err(|e| ReissueError::MetadataLoad {
				class_name: class_name.to_string(),
				message: format!("could not read \"{}\": {e}", self.path.display()),
			})?;
		let classes: HashMap<String, FileClass> =
			serde_json::from_str(&raw).map_err(|e| ReissueError::MetadataLoad {
				class_name: class_name.to_string(),
				message: format!("could not parse \"{}\": {e}", self.path.display()),
			})?;

		*self.parsed.write() = Some(classes);
		Ok(())
	}
}

impl MetadataLoader for JsonFileLoader {
	fn load_class_metadata(&self, metadata: &mut ClassMetadata) -> Result<bool, ReissueError> {
		self.ensure_parsed(metadata.class_name())?;

		let parsed = self.parsed.read();
		let Some(class) = parsed
			.as_ref()
			.and_then(|classes| classes.get(metadata.class_name()))
		else {
			return Ok(false);
		};

		if !class.groups.is_empty() {
			metadata.set_groups(class.groups.iter().cloned());
		}
		if class.max_depth.is_some() {
			metadata.set_max_depth(class.max_depth);
		}
		for (name, rules) in &class.attributes {
			let mut attribute = AttributeMetadata::new(name).with_ignored(rules.ignored);
			if let Some(serialized) = &rules.serialized_name {
				attribute = attribute.with_serialized_name(serialized);
			}
			if !rules.groups.is_empty() {
				attribute = attribute.with_groups(rules.groups.iter().cloned());
			}
			if let Some(depth) = rules.max_depth {
				attribute = attribute.with_max_depth(depth);
			}
			metadata.add_attribute_metadata(attribute);
		}
		Ok(true)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write as _;

	struct Account;

	impl Describe for Account {
		fn type_name() -> &'static str {
			"Account"
		}

		fn class_metadata() -> ClassMetadata {
			ClassMetadata::new("Account")
				.with_attribute(AttributeMetadata::new("id"))
				.with_attribute(AttributeMetadata::new("secret").with_ignored(true))
		}
	}

	#[test]
	fn test_reflect_loader_merges_declared_rules() {
		let loader = ReflectLoader::new().with::<Account>();

		let mut metadata = ClassMetadata::new("Account");
		assert!(loader.load_class_metadata(&mut metadata).unwrap());
		assert!(metadata.attribute_metadata("secret").unwrap().is_ignored());

		let mut unknown = ClassMetadata::new("Elsewhere");
		assert!(!loader.load_class_metadata(&mut unknown).unwrap());
		assert_eq!(unknown.attributes_metadata().count(), 0);
	}

	#[test]
	fn test_json_file_loader_rejects_missing_file() {
		let err = JsonFileLoader::new("/nonexistent/mapping.json").unwrap_err();
		assert!(err.is_configuration());
	}

	#[test]
	fn test_json_file_loader_reads_rules() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"{{
				"User": {{
					"groups": ["default"],
					"max_depth": 2,
					"attributes": {{
						"email": {{ "serialized_name": "emailAddress", "groups": ["admin"] }},
						"password": {{ "ignored": true }}
					}}
				}}
			}}"#
		)
		.unwrap();

		let loader = JsonFileLoader::new(file.path()).unwrap();
		let mut metadata = ClassMetadata::new("User");
		assert!(loader.load_class_metadata(&mut metadata).unwrap());

		assert_eq!(metadata.groups(), &["default".to_string()]);
		assert_eq!(metadata.max_depth(), Some(2));
		let email = metadata.attribute_metadata("email").unwrap();
		assert_eq!(email.serialized_name(), Some("emailAddress"));
		assert_eq!(email.groups(), &["admin".to_string()]);
		assert!(metadata.attribute_metadata("password").unwrap().is_ignored());
	}

	#[test]
	fn test_json_file_loader_returns_false_for_unknown_class() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, r#"{{ "User": {{}} }}"#).unwrap();

		let loader = JsonFileLoader::new(file.path()).unwrap();
		let mut metadata = ClassMetadata::new("Order");
		assert!(!loader.load_class_metadata(&mut metadata).unwrap());
	}

	#[test]
	fn test_chain_merges_in_order() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"{{
				"Account": {{
					"attributes": {{
						"secret": {{ "ignored": false, "serialized_name": "secretValue" }}
					}}
				}}
			}}"#
		)
		.unwrap();

		// File source runs after the declared rules and wins on "secret"
		let chain = LoaderChain::new(vec![
			Box::new(ReflectLoader::new().with::<Account>()),
			Box::new(JsonFileLoader::new(file.path()).unwrap()),
		]);

		let mut metadata = ClassMetadata::new("Account");
		assert!(chain.load_class_metadata(&mut metadata).unwrap());

		let secret = metadata.attribute_metadata("secret").unwrap();
		assert!(!secret.is_ignored());
		assert_eq!(secret.serialized_name(), Some("secretValue"));
		// Field untouched by the second source survives
		assert!(metadata.attribute_metadata("id").is_some());
	}

	#[test]
	fn test_empty_chain_loads_nothing() {
		let chain = LoaderChain::default();
		let mut metadata = ClassMetadata::new("User");
		assert!(!chain.load_class_metadata(&mut metadata).unwrap());
	}
}
