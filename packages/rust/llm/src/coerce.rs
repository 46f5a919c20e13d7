//! Tolerant reading of model output into typed fields.
//!
//! Models are asked for bare JSON but often wrap it in Markdown fences or
//! drop fields. [`strip_fences`] removes the wrapper and [`FieldReader`]
//! reads each field with a default so absence never fails the caller.

use serde_json::{Map, Value};

use topiclens_shared::{Result, TopicLensError};

/// Trim `raw` and remove a leading ```` ```json ```` / ```` ``` ```` fence and a
/// trailing ```` ``` ```` fence.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Read-only view over a JSON object with defaulting accessors.
#[derive(Debug)]
pub struct FieldReader {
    fields: Map<String, Value>,
}

impl FieldReader {
    /// Parse fenced or bare model output. Fails unless the payload is a JSON object.
    pub fn parse(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(strip_fences(raw))
            .map_err(|e| TopicLensError::parse(format!("model output is not JSON: {e}")))?;

        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(TopicLensError::parse(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Scalar field as text, or `default` when missing, null, blank or a container.
    pub fn text_or(&self, field: &str, default: &str) -> String {
        self.fields
            .get(field)
            .and_then(scalar_text)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Array field as a list of texts. Anything but an array reads as empty;
    /// non-scalar items are skipped.
    pub fn array_or_empty(&self, field: &str) -> Vec<String> {
        match self.fields.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            _ => Vec::new(),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"title\": \"x\"}\n```";
        assert_eq!(strip_fences(raw), "{\"title\": \"x\"}");
    }

    #[test]
    fn strips_bare_fence_and_whitespace() {
        assert_eq!(strip_fences("  ```\n{}\n```  \n"), "{}");
        assert_eq!(strip_fences("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn reads_scalars_with_defaults() {
        let reader = FieldReader::parse(
            r#"{"title": "Rust", "count": 3, "flag": true, "empty": "  ", "nested": {"a": 1}, "none": null}"#,
        )
        .expect("parse");
        assert_eq!(reader.text_or("title", "d"), "Rust");
        assert_eq!(reader.text_or("count", "d"), "3");
        assert_eq!(reader.text_or("flag", "d"), "true");
        assert_eq!(reader.text_or("empty", "d"), "d");
        assert_eq!(reader.text_or("nested", "d"), "d");
        assert_eq!(reader.text_or("none", "d"), "d");
        assert_eq!(reader.text_or("missing", "d"), "d");
    }

    #[test]
    fn reads_arrays_leniently() {
        let reader = FieldReader::parse(
            r#"{"ideas": ["a", 2, null, {"x": 1}, "b"], "notes": "not an array"}"#,
        )
        .expect("parse");
        assert_eq!(reader.array_or_empty("ideas"), vec!["a", "2", "b"]);
        assert!(reader.array_or_empty("notes").is_empty());
        assert!(reader.array_or_empty("missing").is_empty());
    }

    #[test]
    fn rejects_non_objects() {
        assert!(FieldReader::parse("[1, 2]").is_err());
        assert!(FieldReader::parse("Sure! Here is your JSON").is_err());
    }
}
