//! Per-item parameter access.
//!
//! The host resolves node parameters (including expressions) per item index;
//! `ParameterSource` is the seam. `FieldReader` layers the typed getters the
//! request builder needs on top of it: declared defaults, coercion of the
//! loose types hosts tend to produce, and configuration errors that name the
//! offending parameter.

use crate::errors::NodeError;
use crate::utils::feature_flags::is_truthy;
use serde::Deserialize;
use serde_json::{Map, Value};

pub trait ParameterSource: Send + Sync {
    /// Resolves `name` (a dotted path such as `additionalFields.fileName`)
    /// for the item at `item_index`.
    fn get(&self, name: &str, item_index: usize) -> Option<Value>;
}

/// Static parameter set: one base object plus optional per-item overrides
/// that shadow top-level keys for their item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeParameters {
    #[serde(default)]
    base: Map<String, Value>,
    #[serde(default)]
    per_item: Vec<Map<String, Value>>,
}

impl NodeParameters {
    pub fn new(base: Value) -> Self {
        Self {
            base: base.as_object().cloned().unwrap_or_default(),
            per_item: Vec::new(),
        }
    }

    pub fn with_item_overrides(mut self, overrides: Vec<Value>) -> Self {
        self.per_item = overrides
            .into_iter()
            .map(|value| value.as_object().cloned().unwrap_or_default())
            .collect();
        self
    }
}

impl ParameterSource for NodeParameters {
    fn get(&self, name: &str, item_index: usize) -> Option<Value> {
        let mut segments = name.split('.');
        let head = segments.next()?;
        let root = self
            .per_item
            .get(item_index)
            .and_then(|overrides| overrides.get(head))
            .or_else(|| self.base.get(head))?;
        let mut current = root;
        for segment in segments {
            current = current.get(segment)?;
        }
        if current.is_null() {
            return None;
        }
        Some(current.clone())
    }
}

pub type DefaultLookup = fn(&str) -> Option<Value>;

fn no_defaults(_: &str) -> Option<Value> {
    None
}

#[derive(Clone, Copy)]
pub struct FieldReader<'a> {
    source: &'a dyn ParameterSource,
    index: usize,
    defaults: DefaultLookup,
}

impl<'a> FieldReader<'a> {
    pub fn new(source: &'a dyn ParameterSource, index: usize) -> Self {
        Self {
            source,
            index,
            defaults: no_defaults,
        }
    }

    pub fn with_defaults(mut self, defaults: DefaultLookup) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Reader for the same parameters at another item index.
    pub fn at(&self, index: usize) -> Self {
        Self { index, ..*self }
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.source
            .get(name, self.index)
            .or_else(|| (self.defaults)(name))
    }

    fn missing(&self, name: &str) -> NodeError {
        NodeError::configuration(format!("Missing required parameter '{}'", name))
            .at_item(self.index)
    }

    fn wrong_type(&self, name: &str, expected: &str) -> NodeError {
        NodeError::configuration(format!("Parameter '{}' must be {}", name, expected))
            .at_item(self.index)
    }

    pub fn string(&self, name: &str) -> Result<String, NodeError> {
        match self.value(name) {
            None => Err(self.missing(name)),
            Some(Value::String(text)) => Ok(text),
            Some(Value::Number(num)) => Ok(num.to_string()),
            Some(Value::Bool(flag)) => Ok(flag.to_string()),
            Some(_) => Err(self.wrong_type(name, "a string")),
        }
    }

    pub fn string_or(&self, name: &str, fallback: &str) -> Result<String, NodeError> {
        match self.value(name) {
            None => Ok(fallback.to_string()),
            Some(_) => self.string(name),
        }
    }

    /// Empty strings read as absent.
    pub fn non_empty_string(&self, name: &str) -> Result<Option<String>, NodeError> {
        let text = self.string_or(name, "")?;
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    pub fn bool_or(&self, name: &str, fallback: bool) -> Result<bool, NodeError> {
        match self.value(name) {
            None => Ok(fallback),
            Some(Value::Bool(flag)) => Ok(flag),
            Some(Value::String(text)) => Ok(is_truthy(&text)),
            Some(Value::Number(num)) => Ok(num.as_f64().map(|n| n != 0.0).unwrap_or(false)),
            Some(_) => Err(self.wrong_type(name, "a boolean")),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, NodeError> {
        match self.value(name) {
            None => Err(self.missing(name)),
            Some(Value::Number(num)) => num
                .as_f64()
                .ok_or_else(|| self.wrong_type(name, "a number")),
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| self.wrong_type(name, "a number")),
            Some(_) => Err(self.wrong_type(name, "a number")),
        }
    }

    pub fn number_or(&self, name: &str, fallback: f64) -> Result<f64, NodeError> {
        match self.value(name) {
            None => Ok(fallback),
            Some(_) => self.number(name),
        }
    }

    pub fn collection(&self, name: &str) -> Result<Map<String, Value>, NodeError> {
        match self.value(name) {
            None => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(self.wrong_type(name, "an object")),
        }
    }
}

/// JSON number for a parameter that arrived as float; integral values stay
/// integers on the wire.
pub fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NodeErrorKind;

    fn params() -> NodeParameters {
        NodeParameters::new(serde_json::json!({
            "chatId": 12345,
            "text": "hello",
            "additionalFields": { "fileName": "a.png", "caption": "" },
            "download": "false"
        }))
        .with_item_overrides(vec![
            serde_json::json!({}),
            serde_json::json!({ "text": "second" }),
        ])
    }

    #[test]
    fn per_item_overrides_shadow_base() {
        let params = params();
        let first = FieldReader::new(&params, 0);
        assert_eq!(first.string("text").unwrap(), "hello");
        assert_eq!(first.at(1).string("text").unwrap(), "second");
        assert_eq!(first.at(7).string("text").unwrap(), "hello");
    }

    #[test]
    fn coerces_numbers_and_flags() {
        let params = params();
        let reader = FieldReader::new(&params, 0);
        assert_eq!(reader.string("chatId").unwrap(), "12345");
        assert!(!reader.bool_or("download", true).unwrap());
        assert_eq!(
            reader.string("additionalFields.fileName").unwrap(),
            "a.png"
        );
        assert_eq!(reader.non_empty_string("additionalFields.caption").unwrap(), None);
    }

    #[test]
    fn missing_required_is_configuration_error_with_index() {
        let params = params();
        let err = FieldReader::new(&params, 1).string("messageId").unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::Configuration);
        assert_eq!(err.item_index, Some(1));
        assert!(err.message.contains("messageId"));
    }

    #[test]
    fn defaults_fill_missing_values() {
        fn defaults(name: &str) -> Option<Value> {
            (name == "binaryPropertyName").then(|| Value::String("data".to_string()))
        }
        let params = params();
        let reader = FieldReader::new(&params, 0).with_defaults(defaults);
        assert_eq!(reader.string("binaryPropertyName").unwrap(), "data");
    }

    #[test]
    fn number_value_keeps_integers_integral() {
        assert_eq!(number_value(3.0), serde_json::json!(3));
        assert_eq!(number_value(52.52), serde_json::json!(52.52));
    }
}
