//! Runner payloads and their schema validation.

use crate::errors::{ErrorCode, RpcError};
use crate::managers::telegram::context::NodeContext;
use crate::services::credentials::TelegramCredentials;
use crate::services::items::Item;
use crate::services::parameters::NodeParameters;
use jsonschema::JSONSchema;
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

static JOB_SCHEMAS: Lazy<Value> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/job_schema.json"));
    serde_json::from_str(raw).expect("job_schema.json must be valid JSON")
});

static JOB_VALIDATORS: Lazy<HashMap<String, JSONSchema>> = Lazy::new(|| {
    let mut map = HashMap::new();
    if let Some(schemas) = JOB_SCHEMAS.as_object() {
        for (method, schema) in schemas {
            if let Ok(compiled) = JSONSchema::compile(schema) {
                map.insert(method.clone(), compiled);
            }
        }
    }
    map
});

pub fn validate_params(method: &str, params: &Value) -> Result<(), RpcError> {
    let Some(validator) = JOB_VALIDATORS.get(method) else {
        return Ok(());
    };
    if let Err(errors) = validator.validate(params) {
        let rendered: Vec<String> = errors
            .take(10)
            .map(|err| {
                let path = err.instance_path.to_string();
                let path = if path.is_empty() { "(root)".to_string() } else { path };
                format!("{}: {}", path, err)
            })
            .collect();
        return Err(RpcError::new(
            ErrorCode::InvalidParams,
            format!("Invalid params for {}: {}", method, rendered.join("; ")),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteJob {
    #[serde(default)]
    pub items: Vec<Item>,
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub item_parameters: Vec<Value>,
    #[serde(default)]
    pub context: NodeContext,
    #[serde(default)]
    pub credentials: Option<TelegramCredentials>,
}

impl ExecuteJob {
    pub fn node_parameters(&self) -> NodeParameters {
        NodeParameters::new(Value::Object(self.parameters.clone()))
            .with_item_overrides(self.item_parameters.clone())
    }

    /// Items to run; a job without items runs once on an empty item.
    pub fn input_items(&self) -> Vec<Item> {
        if self.items.is_empty() {
            vec![Item::default()]
        } else {
            self.items.clone()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribeRequest {
    pub resource: String,
    pub operation: String,
    #[serde(default)]
    pub binary_data: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_rejects_unknown_resource() {
        let params = serde_json::json!({ "parameters": { "resource": "bot" } });
        let err = validate_params("execute", &params).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParams);
        assert!(err.message.contains("/parameters/resource"));
    }

    #[test]
    fn schema_requires_access_token_in_credentials() {
        let params = serde_json::json!({
            "parameters": { "resource": "chat", "operation": "get" },
            "credentials": { "baseUrl": "https://api.telegram.org" }
        });
        assert!(validate_params("execute", &params).is_err());
    }

    #[test]
    fn execute_job_defaults() {
        let params = serde_json::json!({
            "parameters": { "resource": "chat", "operation": "get", "chatId": "1" }
        });
        validate_params("execute", &params).unwrap();
        let job: ExecuteJob = serde_json::from_value(params).unwrap();
        assert_eq!(job.input_items().len(), 1);
        assert!(job.context.attribution_allowed);
        assert!(job.credentials.is_none());
    }
}
