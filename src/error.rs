//! Error types for normalization, denormalization and codec operations.
//!
//! Every failure surfaces as a [`ReissueError`]. The variants fall into three
//! groups that callers can discriminate without matching on individual
//! variants: configuration errors (missing converters, unknown types),
//! input-shape errors (malformed wire input, wrong tree shape) and value
//! errors (a value failed an internal invariant, e.g. an unparsable date).

/// Classification of a [`ReissueError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// The engine was asked for something it was never configured to do.
	Configuration,
	/// The input data had the wrong shape or could not be parsed.
	InputShape,
	/// A value failed an invariant during conversion.
	Value,
}

/// Errors produced by the serializer.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReissueError {
	#[error("No encoder found for format \"{0}\"")]
	NoEncoder(String),

	#[error("No decoder found for format \"{0}\"")]
	NoDecoder(String),

	#[error("No normalizer found for value of type \"{0}\"")]
	NoNormalizer(String),

	#[error("No denormalizer found for type \"{0}\"")]
	NoDenormalizer(String),

	#[error("Unknown type \"{0}\"")]
	UnknownType(String),

	#[error("Failed to load metadata for \"{class_name}\": {message}")]
	MetadataLoad { class_name: String, message: String },

	#[error("Expected {expected}, got {found}")]
	InvalidShape {
		expected: &'static str,
		found: String,
	},

	#[error("Failed to decode {format}: {message}")]
	Decode { format: String, message: String },

	#[error("Failed to encode {format}: {message}")]
	Encode { format: String, message: String },

	#[error("Invalid value: {0}")]
	InvalidValue(String),

	#[error("Failed to parse date \"{value}\": {message}")]
	InvalidDate { value: String, message: String },
}

impl ReissueError {
	/// Returns the error classification.
	///
	/// # Examples
	///
	/// ```
	/// use reissue::error::{ErrorKind, ReissueError};
	///
	/// let err = ReissueError::NoEncoder("yaml".to_string());
	/// assert_eq!(err.kind(), ErrorKind::Configuration);
	/// ```
	pub fn kind(&self) -> ErrorKind {
		match self {
			ReissueError::NoEncoder(_)
			| ReissueError::NoDecoder(_)
			| ReissueError::NoNormalizer(_)
			| ReissueError::NoDenormalizer(_)
			| ReissueError::UnknownType(_)
			| ReissueError::MetadataLoad { .. } => ErrorKind::Configuration,
			ReissueError::InvalidShape { .. } | ReissueError::Decode { .. } => ErrorKind::InputShape,
			ReissueError::Encode { .. }
			| ReissueError::InvalidValue(_)
			| ReissueError::InvalidDate { .. } => ErrorKind::Value,
		}
	}

	/// Check if this is a configuration error.
	pub fn is_configuration(&self) -> bool {
		self.kind() == ErrorKind::Configuration
	}

	/// Check if this is an input-shape error.
	pub fn is_input_shape(&self) -> bool {
		self.kind() == ErrorKind::InputShape
	}

	/// Check if this is a value error.
	pub fn is_value(&self) -> bool {
		self.kind() == ErrorKind::Value
	}
}
