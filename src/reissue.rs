//! The serializer façade.
//!
//! [`Reissue`] ties the pieces together: ordered normalizer and denormalizer
//! lists, the codec chains and an optional collector. Every public call
//! dispatches to the first handler claiming support; lifecycle hooks fire
//! here, once per top-level call, never inside recursion.

use crate::collector::{CollectEntry, CollectorSink, Operation};
use crate::context::Context;
use crate::encoder::{ChainDecoder, ChainEncoder, Decoder, Encoder};
use crate::error::ReissueError;
use crate::normalizer::{Denormalizer, Normalizer};
use crate::reflect::{Construct, Reflect};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

/// Metadata-driven serializer.
///
/// # Examples
///
/// ```no_run
/// use reissue::Reissue;
/// use reissue::context::Context;
/// use reissue::encoder::json::{JsonDecoder, JsonEncoder};
/// # use std::sync::Arc;
/// # use reissue::mapping::atelier::ClassMetadataAtelier;
/// # use reissue::mapping::loader::LoaderChain;
/// # use reissue::normalizer::object::MetadataAwareObjectNormalizer;
///
/// # let atelier = Arc::new(ClassMetadataAtelier::new(Box::new(LoaderChain::default())));
/// # let object = Arc::new(MetadataAwareObjectNormalizer::new(atelier));
/// let reissue = Reissue::builder()
/// 	.with_normalizer(object.clone())
/// 	.with_denormalizer(object)
/// 	.with_encoder(Box::new(JsonEncoder))
/// 	.with_decoder(Box::new(JsonDecoder))
/// 	.build();
/// ```
pub struct Reissue {
	normalizers: Vec<Arc<dyn Normalizer>>,
	denormalizers: Vec<Arc<dyn Denormalizer>>,
	encoder: ChainEncoder,
	decoder: ChainDecoder,
	collector: Option<Arc<dyn CollectorSink>>,
}

impl Reissue {
	/// Starts an empty configuration.
	pub fn builder() -> ReissueBuilder {
		ReissueBuilder::default()
	}

	fn collect(
		&self,
		operation: Operation,
		subject: &str,
		format: Option<&str>,
		context: &Context,
		started: Instant,
		succeeded: bool,
	) {
		if let Some(collector) = &self.collector {
			collector.record(CollectEntry {
				operation,
				subject: subject.to_string(),
				format: format.map(str::to_string),
				context: context.clone(),
				duration: started.elapsed(),
				succeeded,
			});
		}
	}

	/// Projects a value into the format-neutral tree through the first
	/// claiming normalizer.
	pub fn normalize(
		&self,
		value: &dyn Reflect,
		format: Option<&str>,
		context: &Context,
	) -> Result<Value, ReissueError> {
		let started = Instant::now();
		let result = self
			.normalizers
			.iter()
			.find(|n| n.supports_normalization(value, format))
			.ok_or_else(|| ReissueError::NoNormalizer(value.type_name().to_string()))
			.and_then(|n| n.normalize(value, format, context));
		self.collect(
			Operation::Normalize,
			value.type_name(),
			format,
			context,
			started,
			result.is_ok(),
		);
		result
	}

	/// Rebuilds a type-erased value from the tree through the first claiming
	/// denormalizer.
	pub fn denormalize(
		&self,
		data: Value,
		type_name: &str,
		format: Option<&str>,
		context: &Context,
	) -> Result<Box<dyn Any>, ReissueError> {
		let started = Instant::now();
		let result = self
			.denormalizers
			.iter()
			.find(|d| d.supports_denormalization(type_name, format))
			.ok_or_else(|| ReissueError::NoDenormalizer(type_name.to_string()))
			.and_then(|d| d.denormalize(data, type_name, format, context));
		self.collect(
			Operation::Denormalize,
			type_name,
			format,
			context,
			started,
			result.is_ok(),
		);
		result
	}

	/// Renders a tree into the named format.
	pub fn encode(
		&self,
		data: &Value,
		format: &str,
		context: &Context,
	) -> Result<String, ReissueError> {
		let started = Instant::now();
		let result = self.encoder.encode(data, format, context);
		self.collect(
			Operation::Encode,
			format,
			Some(format),
			context,
			started,
			result.is_ok(),
		);
		result
	}

	/// Parses wire input in the named format into a tree.
	pub fn decode(
		&self,
		input: &str,
		format: &str,
		context: &Context,
	) -> Result<Value, ReissueError> {
		let started = Instant::now();
		let result = self.decoder.decode(input, format, context);
		self.collect(
			Operation::Decode,
			format,
			Some(format),
			context,
			started,
			result.is_ok(),
		);
		result
	}

	/// Whether a [`Self::reissue`] call for this format can find an encoder.
	pub fn supports_reissue(&self, format: &str) -> bool {
		self.encoder.supports_encoding(format)
	}

	/// Whether a [`Self::deissue`] call for this format can find a decoder.
	pub fn supports_deissue(&self, format: &str) -> bool {
		self.decoder.supports_decoding(format)
	}

	/// Serializes one value: hook, normalize, encode.
	pub fn reissue(
		&self,
		value: &mut dyn Reflect,
		format: &str,
		context: &Context,
	) -> Result<String, ReissueError> {
		tracing::debug!(type_name = value.type_name(), format, "serializing");
		value.before_reissue();
		let tree = self.normalize(value, Some(format), context)?;
		self.encode(&tree, format, context)
	}

	/// Serializes a sequence of values under one document.
	pub fn reissue_all(
		&self,
		values: &mut [&mut dyn Reflect],
		format: &str,
		context: &Context,
	) -> Result<String, ReissueError> {
		let mut trees = Vec::with_capacity(values.len());
		for value in values.iter_mut() {
			value.before_reissue();
			trees.push(self.normalize(*value, Some(format), context)?);
		}
		self.encode(&Value::Array(trees), format, context)
	}

	/// Deserializes one value: decode, denormalize, hook.
	pub fn deissue<T: Construct + Any>(
		&self,
		input: &str,
		type_name: &str,
		format: &str,
		context: &Context,
	) -> Result<T, ReissueError> {
		tracing::debug!(type_name, format, "deserializing");
		let tree = self.decode(input, format, context)?;
		let mut value = self
			.denormalize(tree, type_name, Some(format), context)?
			.downcast::<T>()
			.map(|boxed| *boxed)
			.map_err(|_| ReissueError::UnknownType(type_name.to_string()))?;
		value.after_deissue();
		Ok(value)
	}

	/// Deserializes a sequence, addressed as `type_name` plus `[]`.
	pub fn deissue_all<T: Construct + Any>(
		&self,
		input: &str,
		type_name: &str,
		format: &str,
		context: &Context,
	) -> Result<Vec<T>, ReissueError> {
		let tree = self.decode(input, format, context)?;
		let sequence_name = format!("{type_name}[]");
		let items = self
			.denormalize(tree, &sequence_name, Some(format), context)?
			.downcast::<Vec<Box<dyn Any>>>()
			.map_err(|_| ReissueError::UnknownType(sequence_name.clone()))?;

		let mut out = Vec::with_capacity(items.len());
		for item in *items {
			let mut value = item
				.downcast::<T>()
				.map(|boxed| *boxed)
				.map_err(|_| ReissueError::UnknownType(type_name.to_string()))?;
			value.after_deissue();
			out.push(value);
		}
		Ok(out)
	}
}

/// Step-by-step [`Reissue`] configuration.
#[derive(Default)]
pub struct ReissueBuilder {
	normalizers: Vec<Arc<dyn Normalizer>>,
	denormalizers: Vec<Arc<dyn Denormalizer>>,
	encoders: Vec<Box<dyn Encoder>>,
	decoders: Vec<Box<dyn Decoder>>,
	collector: Option<Arc<dyn CollectorSink>>,
}

impl ReissueBuilder {
	/// Appends a normalizer; earlier registrations win ties.
	pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
		self.normalizers.push(normalizer);
		self
	}

	/// Appends a denormalizer; earlier registrations win ties.
	pub fn with_denormalizer(mut self, denormalizer: Arc<dyn Denormalizer>) -> Self {
		self.denormalizers.push(denormalizer);
		self
	}

	/// Appends an encoder.
	pub fn with_encoder(mut self, encoder: Box<dyn Encoder>) -> Self {
		self.encoders.push(encoder);
		self
	}

	/// Appends a decoder.
	pub fn with_decoder(mut self, decoder: Box<dyn Decoder>) -> Self {
		self.decoders.push(decoder);
		self
	}

	/// Registers the bundled JSON and XML codecs.
	pub fn with_default_codecs(self) -> Self {
		self.with_encoder(Box::new(crate::encoder::json::JsonEncoder))
			.with_decoder(Box::new(crate::encoder::json::JsonDecoder))
			.with_encoder(Box::new(crate::encoder::xml::XmlEncoder))
			.with_decoder(Box::new(crate::encoder::xml::XmlDecoder))
	}

	/// Installs a collector receiving one entry per conversion step.
	pub fn with_collector(mut self, collector: Arc<dyn CollectorSink>) -> Self {
		self.collector = Some(collector);
		self
	}

	/// Produces the configured façade.
	pub fn build(self) -> Reissue {
		Reissue {
			normalizers: self.normalizers,
			denormalizers: self.denormalizers,
			encoder: ChainEncoder::new(self.encoders),
			decoder: ChainDecoder::new(self.decoders),
			collector: self.collector,
		}
	}
}
