use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReconcileError, Result};
use crate::literal;

/// Document body as supplied by the caller.
///
/// Configuration files and command lines usually deliver a string; API
/// callers can hand over a value directly. Text is parsed with the
/// literal grammar in [`crate::literal`], never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentPayload {
    Text(String),
    Structured(Value),
}

impl DocumentPayload {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// Produce the JSON object to post. Text is parsed here and only here.
    pub fn resolve(&self) -> Result<Value> {
        let value = match self {
            Self::Structured(value) => value.clone(),
            Self::Text(text) => literal::parse(text)
                .map_err(|e| ReconcileError::invalid_payload(e.to_string()))?,
        };

        if !value.is_object() {
            return Err(ReconcileError::invalid_payload(format!(
                "document must be a mapping, got {}",
                type_name(&value)
            )));
        }
        Ok(value)
    }
}

impl From<Value> for DocumentPayload {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

impl From<&str> for DocumentPayload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_payload_is_used_as_is() {
        let payload = DocumentPayload::from(json!({ "user": "kimchy" }));
        assert!(payload.is_structured());
        assert_eq!(payload.resolve().unwrap(), json!({ "user": "kimchy" }));
    }

    #[test]
    fn test_text_payload_is_parsed() {
        let payload = DocumentPayload::from("{'user': 'kimchy', 'active': True}");
        assert!(!payload.is_structured());
        assert_eq!(
            payload.resolve().unwrap(),
            json!({ "user": "kimchy", "active": true })
        );
    }

    #[test]
    fn test_string_value_becomes_text() {
        let payload = DocumentPayload::from(json!("{'a': 1}"));
        assert_eq!(payload, DocumentPayload::Text("{'a': 1}".to_string()));
    }

    #[test]
    fn test_untagged_deserialization() {
        let text: DocumentPayload = serde_json::from_value(json!("{'a': 1}")).unwrap();
        assert!(!text.is_structured());
        let structured: DocumentPayload = serde_json::from_value(json!({ "a": 1 })).unwrap();
        assert!(structured.is_structured());
    }

    #[test]
    fn test_non_mapping_is_rejected() {
        let err = DocumentPayload::from("[1, 2]").resolve().unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidPayload(_)));
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_unparsable_text_is_rejected() {
        let err = DocumentPayload::from("{'a': }").resolve().unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidPayload(_)));
    }

    #[test]
    fn test_deeply_nested_text_is_rejected() {
        let text = format!("{{'a': {}", "[".repeat(200_000));
        let err = DocumentPayload::from(text.as_str()).resolve().unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidPayload(_)));
        assert!(err.to_string().contains("nesting too deep"));
    }
}
