//! End-to-end coverage of the serializer: metadata loading, normalization
//! rules, codec round trips and façade dispatch.

use std::io::Write as _;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use reissue::Reissue;
use reissue::ReissueError;
use reissue::collector::{Operation, ReissueDataCollector};
use reissue::context::Context;
use reissue::context::builder::{JsonEncoderContextBuilder, ReissueContextBuilder};
use reissue::mapping::atelier::{
	CachedClassMetadataAtelier, ClassMetadataAtelier, InMemoryMetadataCache, MetadataAtelier,
};
use reissue::mapping::loader::{JsonFileLoader, LoaderChain, ReflectLoader};
use reissue::mapping::{AttributeMetadata, ClassMetadata};
use reissue::name_recast::CamelToSnakeRecast;
use reissue::normalizer::object::MetadataAwareObjectNormalizer;
use reissue::normalizer::sequence::SequenceNormalizer;
use reissue::reflect::{Construct, Denest, Describe, FieldValue, Reflect, denest};
use serde_json::{Value, json};

#[derive(Debug, Default, PartialEq)]
struct Author {
	pen_name: String,
	email: Option<String>,
}

impl Reflect for Author {
	fn type_name(&self) -> &'static str {
		"Author"
	}

	fn fields(&self) -> Vec<&'static str> {
		vec!["penName", "email"]
	}

	fn field(&self, name: &str) -> Option<FieldValue<'_>> {
		match name {
			"penName" => Some(FieldValue::Str(&self.pen_name)),
			"email" => Some(match &self.email {
				Some(email) => FieldValue::Str(email),
				None => FieldValue::Null,
			}),
			_ => None,
		}
	}
}

impl Construct for Author {
	fn empty() -> Self {
		Self::default()
	}

	fn assign(
		&mut self,
		field: &str,
		value: Value,
		_nested: &dyn Denest,
	) -> Result<(), ReissueError> {
		match field {
			"penName" => self.pen_name = value.as_str().unwrap_or_default().to_string(),
			"email" => self.email = value.as_str().map(str::to_string),
			_ => {}
		}
		Ok(())
	}
}

impl Describe for Author {
	fn type_name() -> &'static str {
		"Author"
	}

	fn class_metadata() -> ClassMetadata {
		ClassMetadata::new("Author")
			.with_attribute(AttributeMetadata::new("email").with_groups(["contact"]))
	}
}

#[derive(Debug, Default, PartialEq)]
struct Article {
	title: String,
	secret_note: String,
	published_at: Option<DateTime<FixedOffset>>,
	tags: Vec<String>,
	author: Option<Author>,
	related: Option<Box<Article>>,
	hooks_fired: u32,
}

impl Reflect for Article {
	fn type_name(&self) -> &'static str {
		"Article"
	}

	fn fields(&self) -> Vec<&'static str> {
		vec![
			"title",
			"secretNote",
			"publishedAt",
			"tags",
			"author",
			"related",
		]
	}

	fn field(&self, name: &str) -> Option<FieldValue<'_>> {
		match name {
			"title" => Some(FieldValue::Str(&self.title)),
			"secretNote" => Some(FieldValue::Str(&self.secret_note)),
			"publishedAt" => Some(match self.published_at {
				Some(at) => FieldValue::DateTime(at),
				None => FieldValue::Null,
			}),
			"tags" => Some(FieldValue::Seq(
				self.tags.iter().map(|t| FieldValue::Str(t)).collect(),
			)),
			"author" => self
				.author
				.as_ref()
				.map(|a| FieldValue::Object(a as &dyn Reflect)),
			"related" => self
				.related
				.as_deref()
				.map(|r| FieldValue::Object(r as &dyn Reflect)),
			_ => None,
		}
	}

	fn before_reissue(&mut self) {
		self.hooks_fired += 1;
	}
}

impl Construct for Article {
	fn empty() -> Self {
		Self::default()
	}

	fn assign(
		&mut self,
		field: &str,
		value: Value,
		nested: &dyn Denest,
	) -> Result<(), ReissueError> {
		match field {
			"title" => self.title = value.as_str().unwrap_or_default().to_string(),
			"secretNote" => self.secret_note = value.as_str().unwrap_or_default().to_string(),
			"publishedAt" if !value.is_null() => {
				self.published_at = Some(nested.datetime(&value)?);
			}
			"tags" => {
				if let Value::Array(items) = value {
					self.tags = items
						.into_iter()
						.filter_map(|v| v.as_str().map(str::to_string))
						.collect();
				}
			}
			"author" if !value.is_null() => {
				self.author = Some(denest(nested, value, "Author")?);
			}
			"related" if !value.is_null() => {
				self.related = Some(Box::new(denest(nested, value, "Article")?));
			}
			_ => {}
		}
		Ok(())
	}

	fn after_deissue(&mut self) {
		self.hooks_fired += 1;
	}
}

impl Describe for Article {
	fn type_name() -> &'static str {
		"Article"
	}

	fn class_metadata() -> ClassMetadata {
		ClassMetadata::new("Article")
			.with_attribute(AttributeMetadata::new("title").with_serialized_name("headline"))
			.with_attribute(AttributeMetadata::new("secretNote").with_ignored(true))
			.with_attribute(AttributeMetadata::new("related").with_max_depth(1))
	}
}

fn object_normalizer() -> Arc<MetadataAwareObjectNormalizer> {
	let atelier = Arc::new(ClassMetadataAtelier::new(Box::new(
		ReflectLoader::new().with::<Article>().with::<Author>(),
	)));
	Arc::new(
		MetadataAwareObjectNormalizer::new(atelier)
			.with_name_recast(Arc::new(CamelToSnakeRecast))
			.with_target::<Article>("Article")
			.with_target::<Author>("Author"),
	)
}

fn serializer() -> Reissue {
	let object = object_normalizer();
	let sequence = Arc::new(SequenceNormalizer::new(object.clone()));
	Reissue::builder()
		.with_normalizer(object.clone())
		.with_denormalizer(object)
		.with_denormalizer(sequence)
		.with_default_codecs()
		.build()
}

fn sample_article() -> Article {
	Article {
		title: "Borrow checking".to_string(),
		secret_note: "draft".to_string(),
		published_at: Some(DateTime::parse_from_rfc3339("2024-06-01T10:00:00+00:00").unwrap()),
		tags: vec!["rust".to_string(), "memory".to_string()],
		author: Some(Author {
			pen_name: "ada".to_string(),
			email: Some("ada@example.com".to_string()),
		}),
		related: None,
		hooks_fired: 0,
	}
}

#[test]
fn test_json_round_trip_applies_metadata() {
	let reissue = serializer();
	let mut article = sample_article();

	let rendered = reissue
		.reissue(&mut article, "json", &Context::new())
		.unwrap();
	let tree: Value = serde_json::from_str(&rendered).unwrap();

	// Rename, recast, ignore
	assert_eq!(tree["headline"], json!("Borrow checking"));
	assert_eq!(tree["published_at"], json!("2024-06-01T10:00:00+00:00"));
	assert_eq!(tree["author"]["pen_name"], json!("ada"));
	assert_eq!(tree.get("secret_note"), None);
	assert_eq!(tree.get("secretNote"), None);

	let parsed: Article = reissue
		.deissue(&rendered, "Article", "json", &Context::new())
		.unwrap();
	assert_eq!(parsed.title, "Borrow checking");
	assert_eq!(parsed.published_at, article.published_at);
	assert_eq!(parsed.tags, vec!["rust", "memory"]);
	assert_eq!(parsed.author.as_ref().unwrap().pen_name, "ada");
	// Ignored in both directions
	assert_eq!(parsed.secret_note, "");
}

#[test]
fn test_group_filtering_both_directions() {
	let reissue = serializer();
	let context = ReissueContextBuilder::new().with_groups(["public"]).build();

	let tree = reissue
		.normalize(&sample_article(), Some("json"), &context)
		.unwrap();
	// "email" requires the "contact" group
	assert_eq!(tree["author"].get("email"), None);
	assert_eq!(tree["author"]["pen_name"], json!("ada"));

	let contact = ReissueContextBuilder::new().with_groups(["contact"]).build();
	let tree = reissue
		.normalize(&sample_article(), Some("json"), &contact)
		.unwrap();
	assert_eq!(tree["author"]["email"], json!("ada@example.com"));
}

#[test]
fn test_skip_null_values() {
	let reissue = serializer();
	let mut article = sample_article();
	article.published_at = None;

	let tree = reissue
		.normalize(&article, Some("json"), &Context::new())
		.unwrap();
	assert_eq!(tree["published_at"], Value::Null);

	let context = ReissueContextBuilder::new()
		.with_skip_null_values(true)
		.build();
	let tree = reissue.normalize(&article, Some("json"), &context).unwrap();
	assert_eq!(tree.get("published_at"), None);
}

#[test]
fn test_depth_truncation_is_silent() {
	let reissue = serializer();
	let mut article = sample_article();
	let mut inner = sample_article();
	inner.related = Some(Box::new(sample_article()));
	article.related = Some(Box::new(inner));

	let tree = reissue
		.normalize(&article, Some("json"), &Context::new())
		.unwrap();
	// "related" carries max_depth 1: kept at the root, dropped one level in
	let related = tree.get("related").unwrap();
	assert_eq!(related["headline"], json!("Borrow checking"));
	assert_eq!(related.get("related"), None);
}

#[test]
fn test_custom_datetime_format() {
	let reissue = serializer();
	let context = ReissueContextBuilder::new()
		.with_datetime_format("%Y-%m-%d")
		.build();
	let tree = reissue
		.normalize(&sample_article(), Some("json"), &context)
		.unwrap();
	assert_eq!(tree["published_at"], json!("2024-06-01"));
}

#[test]
fn test_sequence_round_trip() {
	let reissue = serializer();
	let mut first = sample_article();
	let mut second = sample_article();
	second.title = "Lifetimes".to_string();

	let rendered = {
		let mut values: Vec<&mut dyn Reflect> = vec![&mut first, &mut second];
		reissue
			.reissue_all(&mut values, "json", &Context::new())
			.unwrap()
	};

	let parsed: Vec<Article> = reissue
		.deissue_all(&rendered, "Article", "json", &Context::new())
		.unwrap();
	assert_eq!(parsed.len(), 2);
	assert_eq!(parsed[0].title, "Borrow checking");
	assert_eq!(parsed[1].title, "Lifetimes");
	// Deserialization hook fired once per element
	assert!(parsed.iter().all(|a| a.hooks_fired == 1));
}

#[test]
fn test_xml_round_trip_shape() {
	let reissue = serializer();
	let mut article = sample_article();

	let rendered = reissue.reissue(&mut article, "xml", &Context::new()).unwrap();
	assert!(rendered.starts_with("<?xml"));
	assert!(rendered.contains("<headline>Borrow checking</headline>"));
	// Arrays repeat the parent key as siblings
	assert!(rendered.contains("<tags>rust</tags>"));
	assert!(rendered.contains("<tags>memory</tags>"));

	let tree = reissue.decode(&rendered, "xml", &Context::new()).unwrap();
	assert_eq!(tree["headline"], json!("Borrow checking"));
	assert_eq!(tree["tags"], json!(["rust", "memory"]));
}

#[test]
fn test_json_pretty_print_option() {
	let reissue = serializer();
	let context = JsonEncoderContextBuilder::new()
		.with_pretty_print(true)
		.build();
	let rendered = reissue
		.encode(&json!({ "a": 1 }), "json", &context)
		.unwrap();
	assert!(rendered.contains('\n'));
}

#[test]
fn test_unconfigured_format_and_type_fail() {
	let reissue = serializer();
	let mut article = sample_article();

	let err = reissue
		.reissue(&mut article, "yaml", &Context::new())
		.unwrap_err();
	assert!(matches!(err, ReissueError::NoEncoder(_)));

	let err = reissue
		.deissue::<Article>("{}", "Order", "json", &Context::new())
		.unwrap_err();
	assert!(matches!(err, ReissueError::NoDenormalizer(_)));
	assert!(err.is_configuration());
}

#[test]
fn test_malformed_input_is_input_shape_error() {
	let reissue = serializer();
	let err = reissue
		.deissue::<Article>("{ nope", "Article", "json", &Context::new())
		.unwrap_err();
	assert!(err.is_input_shape());

	let err = reissue
		.deissue::<Article>("[1,2]", "Article", "json", &Context::new())
		.unwrap_err();
	assert!(err.is_input_shape());
}

#[test]
fn test_serialization_hook_fires_once_per_call() {
	let reissue = serializer();
	let mut article = sample_article();
	// Nested author also implements the hook but is reached through
	// recursion, not through the façade
	reissue.reissue(&mut article, "json", &Context::new()).unwrap();
	assert_eq!(article.hooks_fired, 1);
}

#[test]
fn test_file_loader_overrides_declared_rules() {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	write!(
		file,
		r#"{{
			"Article": {{
				"attributes": {{
					"title": {{ "serialized_name": "displayTitle" }}
				}}
			}}
		}}"#
	)
	.unwrap();

	let chain = LoaderChain::new(vec![
		Box::new(ReflectLoader::new().with::<Article>().with::<Author>()),
		Box::new(JsonFileLoader::new(file.path()).unwrap()),
	]);
	let atelier = Arc::new(ClassMetadataAtelier::new(Box::new(chain)));
	let object = Arc::new(
		MetadataAwareObjectNormalizer::new(atelier)
			.with_name_recast(Arc::new(CamelToSnakeRecast))
			.with_target::<Article>("Article")
			.with_target::<Author>("Author"),
	);
	let reissue = Reissue::builder()
		.with_normalizer(object.clone())
		.with_denormalizer(object)
		.with_default_codecs()
		.build();

	let tree = reissue
		.normalize(&sample_article(), Some("json"), &Context::new())
		.unwrap();
	assert_eq!(tree["displayTitle"], json!("Borrow checking"));
	assert_eq!(tree.get("headline"), None);
	// Rules the file did not touch survive from the declared metadata
	assert_eq!(tree.get("secret_note"), None);
}

#[test]
fn test_cached_atelier_serves_repeat_lookups_from_cache() {
	let atelier = CachedClassMetadataAtelier::new(
		ClassMetadataAtelier::new(Box::new(ReflectLoader::new().with::<Article>())),
		InMemoryMetadataCache::new(),
	);

	let first = atelier.metadata_for("Article").unwrap();
	let second = atelier.metadata_for("Article").unwrap();
	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(atelier.cache().misses(), 1);
	assert_eq!(atelier.cache().hits(), 1);
	assert!(atelier.has_metadata_for("Article"));
}

#[test]
fn test_collector_records_facade_steps() {
	let collector = Arc::new(ReissueDataCollector::new());
	let object = object_normalizer();
	let reissue = Reissue::builder()
		.with_normalizer(object.clone())
		.with_denormalizer(object)
		.with_default_codecs()
		.with_collector(collector.clone())
		.build();

	let mut article = sample_article();
	let rendered = reissue.reissue(&mut article, "json", &Context::new()).unwrap();
	let _: Article = reissue
		.deissue(&rendered, "Article", "json", &Context::new())
		.unwrap();

	assert_eq!(collector.count(Operation::Normalize), 1);
	assert_eq!(collector.count(Operation::Encode), 1);
	assert_eq!(collector.count(Operation::Decode), 1);
	assert_eq!(collector.count(Operation::Denormalize), 1);

	let entries = collector.entries();
	assert!(entries.iter().all(|e| e.succeeded));
	assert!(entries.iter().any(|e| e.subject == "Article"));
}
