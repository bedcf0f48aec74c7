//! Metadata registry.
//!
//! The atelier hands out reference-stable [`Arc<ClassMetadata>`] per type
//! name. [`ClassMetadataAtelier`] memoizes in-process so each source runs at
//! most once per type per instance; [`CachedClassMetadataAtelier`] decorates
//! any atelier with an external key-value cache so expensive sources (file
//! parses) survive across instances.

use super::ClassMetadata;
use crate::error::ReissueError;
use crate::reflect::Reflect;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out serialization rules per type name.
pub trait MetadataAtelier: Send + Sync {
	/// Returns the metadata for the named type, building it on first use.
	///
	/// A type no source knows still gets (empty) metadata; only a failing
	/// source is an error.
	fn metadata_for(&self, class_name: &str) -> Result<Arc<ClassMetadata>, ReissueError>;

	/// Whether metadata can be produced for the named type. Source failures
	/// are reported as `false` rather than surfaced.
	fn has_metadata_for(&self, class_name: &str) -> bool {
		match self.metadata_for(class_name) {
			Ok(_) => true,
			Err(e) => {
				tracing::debug!(class_name, error = %e, "metadata lookup failed");
				false
			}
		}
	}

	/// Convenience lookup keyed by a live value's type name.
	fn metadata_for_value(&self, value: &dyn Reflect) -> Result<Arc<ClassMetadata>, ReissueError> {
		self.metadata_for(value.type_name())
	}

	/// [`Self::has_metadata_for`], keyed by a live value's type name.
	fn has_metadata_for_value(&self, value: &dyn Reflect) -> bool {
		self.has_metadata_for(value.type_name())
	}
}

/// Memoizing atelier over one metadata source.
///
/// Repeated lookups for the same type return the same `Arc`; the source runs
/// exactly once per type for the lifetime of the atelier.
pub struct ClassMetadataAtelier {
	loader: Box<dyn crate::mapping::loader::MetadataLoader>,
	memoized: RwLock<HashMap<String, Arc<ClassMetadata>>>,
}

impl ClassMetadataAtelier {
	/// Creates an atelier over the given source. Compose sources with
	/// [`crate::mapping::loader::LoaderChain`] first when there are several.
	pub fn new(loader: Box<dyn crate::mapping::loader::MetadataLoader>) -> Self {
		Self {
			loader,
			memoized: RwLock::new(HashMap::new()),
		}
	}
}

impl MetadataAtelier for ClassMetadataAtelier {
	fn metadata_for(&self, class_name: &str) -> Result<Arc<ClassMetadata>, ReissueError> {
		if let Some(metadata) = self.memoized.read().get(class_name) {
			return Ok(Arc::clone(metadata));
		}

		let mut metadata = ClassMetadata::new(class_name);
		self.loader.load_class_metadata(&mut metadata)?;
		let metadata = Arc::new(metadata);

		// A racing builder may have won; keep whichever landed first so the
		// returned Arc stays reference-stable.
		let mut memoized = self.memoized.write();
		Ok(Arc::clone(
			memoized
				.entry(class_name.to_string())
				.or_insert(metadata),
		))
	}
}

/// External key-value store for built metadata.
pub trait MetadataCache: Send + Sync {
	/// Fetches a previously stored entry.
	fn fetch(&self, key: &str) -> Option<Arc<ClassMetadata>>;

	/// Stores an entry under the key.
	fn store(&self, key: &str, metadata: Arc<ClassMetadata>);
}

/// In-memory [`MetadataCache`] with hit and miss counters.
#[derive(Default)]
pub struct InMemoryMetadataCache {
	entries: RwLock<HashMap<String, Arc<ClassMetadata>>>,
	hits: AtomicU64,
	misses: AtomicU64,
}

impl InMemoryMetadataCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of fetches that found an entry.
	pub fn hits(&self) -> u64 {
		self.hits.load(Ordering::Relaxed)
	}

	/// Number of fetches that found nothing.
	pub fn misses(&self) -> u64 {
		self.misses.load(Ordering::Relaxed)
	}
}

impl MetadataCache for InMemoryMetadataCache {
	fn fetch(&self, key: &str) -> Option<Arc<ClassMetadata>> {
		let found = self.entries.read().get(key).cloned();
		match &found {
			Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
			None => self.misses.fetch_add(1, Ordering::Relaxed),
		};
		found
	}

	fn store(&self, key: &str, metadata: Arc<ClassMetadata>) {
		self.entries.write().insert(key.to_string(), metadata);
	}
}

/// Decorates an atelier with an external cache.
///
/// Cache keys are prefixed with `reissue.metadata.` and path separators in
/// the type name are flattened so keys stay portable across cache backends.
pub struct CachedClassMetadataAtelier<A, C> {
	inner: A,
	cache: C,
}

impl<A: MetadataAtelier, C: MetadataCache> CachedClassMetadataAtelier<A, C> {
	/// Wraps an atelier with a cache.
	pub fn new(inner: A, cache: C) -> Self {
		Self { inner, cache }
	}

	/// Access to the cache, mainly for inspection in tests and tooling.
	pub fn cache(&self) -> &C {
		&self.cache
	}

	fn cache_key(class_name: &str) -> String {
		format!("reissue.metadata.{}", class_name.replace("::", "."))
	}
}

impl<A: MetadataAtelier, C: MetadataCache> MetadataAtelier for CachedClassMetadataAtelier<A, C> {
	fn metadata_for(&self, class_name: &str) -> Result<Arc<ClassMetadata>, ReissueError> {
		let key = Self::cache_key(class_name);
		if let Some(metadata) = self.cache.fetch(&key) {
			return Ok(metadata);
		}

		tracing::debug!(class_name, "metadata cache miss");
		let metadata = self.inner.metadata_for(class_name)?;
		self.cache.store(&key, Arc::clone(&metadata));
		Ok(metadata)
	}

	fn has_metadata_for(&self, class_name: &str) -> bool {
		self.inner.has_metadata_for(class_name)
	}
}
