//! Uniform outcome of publish operations.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;

/// Well-known keys of [`OperationResult::extra`].
pub mod extra_keys {
    /// Wall-clock duration of the operation, in seconds.
    pub const EXECUTION_TIME: &str = "executionTime";
    /// Products visited by a bulk update.
    pub const PRODUCTS: &str = "products";
    /// Products a bulk update refreshed successfully.
    pub const PRODUCTS_UPDATED: &str = "productsUpdated";
    /// Tags materialized during the operation.
    pub const VERSIONS_PUBLISHED: &str = "versionsPublished";
}

/// Outcome of a publish or update.
///
/// Success is derived: a result succeeds exactly when it carries no error.
///
/// # Example
///
/// ```
/// use dw_product::OperationResult;
///
/// let result = OperationResult::new()
///     .with_message("Published version v1.0 of test-product.")
///     .with_extra("executionTime", 0.25);
/// assert!(result.is_success());
/// assert_eq!(result.execution_time(), Some(0.25));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationResult {
    messages: Vec<String>,
    error: Option<String>,
    extra: BTreeMap<String, Value>,
}

impl OperationResult {
    /// Empty, successful result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failed result carrying `error`.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::new().with_error(error)
    }

    /// Append a message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    /// Append several messages, preserving order.
    #[must_use]
    pub fn with_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages.extend(messages.into_iter().map(Into::into));
        self
    }

    /// Mark the result as failed.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach an auxiliary value, replacing any previous value for `key`.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Progress messages, in emission order.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Failure description.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Auxiliary values.
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    /// Duration stored under `executionTime`, in seconds.
    pub fn execution_time(&self) -> Option<f64> {
        self.extra
            .get(extra_keys::EXECUTION_TIME)
            .and_then(Value::as_f64)
    }

    /// Names stored under `products`.
    pub fn products(&self) -> Vec<String> {
        self.string_list(extra_keys::PRODUCTS)
    }

    /// Names stored under `productsUpdated`.
    pub fn products_updated(&self) -> Vec<String> {
        self.string_list(extra_keys::PRODUCTS_UPDATED)
    }

    /// Tags stored under `versionsPublished`.
    pub fn versions_published(&self) -> Vec<String> {
        self.string_list(extra_keys::VERSIONS_PUBLISHED)
    }

    fn string_list(&self, key: &str) -> Vec<String> {
        self.extra
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Serialize for OperationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OperationResult", 4)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("messages", &self.messages)?;
        state.serialize_field("error", &self.error)?;
        state.serialize_field("extra", &self.extra)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_success_is_absence_of_error() {
        assert!(OperationResult::new().is_success());
        assert!(!OperationResult::failure("boom").is_success());
        let result = OperationResult::new().with_message("Cloned.").with_error("boom");
        assert!(!result.is_success());
        assert_eq!(result.messages(), ["Cloned."]);
        assert_eq!(result.error(), Some("boom"));
    }

    #[test]
    fn test_typed_extra_accessors() {
        let result = OperationResult::new()
            .with_extra(extra_keys::EXECUTION_TIME, 1.5)
            .with_extra(extra_keys::PRODUCTS, json!(["a", "b", "c"]))
            .with_extra(extra_keys::PRODUCTS_UPDATED, json!(["a", "c"]));

        assert_eq!(result.execution_time(), Some(1.5));
        assert_eq!(result.products(), vec!["a", "b", "c"]);
        assert_eq!(result.products_updated(), vec!["a", "c"]);
        assert!(result.versions_published().is_empty());
    }

    #[test]
    fn test_with_extra_replaces() {
        let result = OperationResult::new()
            .with_extra("executionTime", 1.0)
            .with_extra("executionTime", 2.0);
        assert_eq!(result.execution_time(), Some(2.0));
    }

    #[test]
    fn test_serialize() {
        let result = OperationResult::failure("Product directory /x is not writable.")
            .with_extra("executionTime", 0.5);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "messages": [],
                "error": "Product directory /x is not writable.",
                "extra": { "executionTime": 0.5 },
            })
        );
    }
}
