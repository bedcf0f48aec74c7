//! Wire format codecs.
//!
//! An [`Encoder`] renders the format-neutral tree into text; a [`Decoder`]
//! parses text back into the tree. [`ChainEncoder`] and [`ChainDecoder`]
//! dispatch by format name to the first member that claims it and fail with
//! a configuration error when none does.

pub mod json;
pub mod xml;

use crate::context::Context;
use crate::error::ReissueError;
use serde_json::Value;

/// Renders the tree into one or more wire formats.
pub trait Encoder: Send + Sync {
	/// Whether this encoder handles the named format.
	fn supports_encoding(&self, format: &str) -> bool;

	/// Renders the tree.
	fn encode(&self, data: &Value, format: &str, context: &Context)
	-> Result<String, ReissueError>;
}

/// Parses one or more wire formats into the tree.
pub trait Decoder: Send + Sync {
	/// Whether this decoder handles the named format.
	fn supports_decoding(&self, format: &str) -> bool;

	/// Parses the input.
	fn decode(&self, input: &str, format: &str, context: &Context)
	-> Result<Value, ReissueError>;
}

/// First-match dispatch over an ordered set of encoders.
#[derive(Default)]
pub struct ChainEncoder {
	encoders: Vec<Box<dyn Encoder>>,
}

impl ChainEncoder {
	/// Creates a chain over the given encoders, consulted in order.
	pub fn new(encoders: Vec<Box<dyn Encoder>>) -> Self {
		Self { encoders }
	}
}

impl Encoder for ChainEncoder {
	fn supports_encoding(&self, format: &str) -> bool {
		self.encoders.iter().any(|e| e.supports_encoding(format))
	}

	fn encode(
		&self,
		data: &Value,
		format: &str,
		context: &Context,
	) -> Result<String, ReissueError> {
		self.encoders
			.iter()
			.find(|e| e.supports_encoding(format))
			.ok_or_else(|| ReissueError::NoEncoder(format.to_string()))?
			.encode(data, format, context)
	}
}

/// First-match dispatch over an ordered set of decoders.
#[derive(Default)]
pub struct ChainDecoder {
	decoders: Vec<Box<dyn Decoder>>,
}

impl ChainDecoder {
	/// Creates a chain over the given decoders, consulted in order.
	pub fn new(decoders: Vec<Box<dyn Decoder>>) -> Self {
		Self { decoders }
	}
}

impl Decoder for ChainDecoder {
	fn supports_decoding(&self, format: &str) -> bool {
		self.decoders.iter().any(|d| d.supports_decoding(format))
	}

	fn decode(&self, input: &str, format: &str, context: &Context) -> Result<Value, ReissueError> {
		self.decoders
			.iter()
			.find(|d| d.supports_decoding(format))
			.ok_or_else(|| ReissueError::NoDecoder(format.to_string()))?
			.decode(input, format, context)
	}
}
