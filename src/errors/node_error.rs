use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeErrorKind {
    /// A required or derived parameter is missing or has the wrong shape.
    Configuration,
    UnknownResource,
    UnknownOperation,
    /// The Telegram API rejected the request.
    Api,
    Timeout,
    Internal,
}

#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct NodeError {
    pub kind: NodeErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl NodeError {
    pub fn new(kind: NodeErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            description: None,
            item_index: None,
            hint: None,
            details: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Tags the error with the item it was raised for. An index that is
    /// already set wins, so nested helpers can tag early.
    pub fn at_item(mut self, index: usize) -> Self {
        if self.item_index.is_none() {
            self.item_index = Some(index);
        }
        self
    }

    /// Text recorded on an error output item: the remote description when
    /// there is one, the message otherwise.
    pub fn display_message(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Configuration, "CONFIGURATION", message)
    }

    pub fn unknown_resource(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::UnknownResource, "UNKNOWN_RESOURCE", message)
    }

    pub fn unknown_operation(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::UnknownOperation, "UNKNOWN_OPERATION", message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Api, "API", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Internal, "INTERNAL", message)
    }
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::internal(err.to_string())
    }
}
