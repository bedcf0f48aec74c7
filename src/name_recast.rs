//! Wire-name conversion.
//!
//! A [`NameRecast`] maps typed field names to wire keys and back. It only
//! applies to fields without an explicit serialized-name override; metadata
//! renames always win in both directions.

use heck::{ToLowerCamelCase, ToSnakeCase};

/// Bidirectional field-name transform.
pub trait NameRecast: Send + Sync {
	/// Typed field name to wire key.
	fn recast(&self, name: &str) -> String;

	/// Wire key back to typed field name.
	fn revert(&self, name: &str) -> String;
}

/// Converts `camelCase` field names to `snake_case` wire keys.
///
/// # Examples
///
/// ```
/// use reissue::name_recast::{CamelToSnakeRecast, NameRecast};
///
/// let recast = CamelToSnakeRecast;
/// assert_eq!(recast.recast("firstName"), "first_name");
/// assert_eq!(recast.revert("first_name"), "firstName");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelToSnakeRecast;

impl NameRecast for CamelToSnakeRecast {
	fn recast(&self, name: &str) -> String {
		name.to_snake_case()
	}

	fn revert(&self, name: &str) -> String {
		name.to_lower_camel_case()
	}
}
