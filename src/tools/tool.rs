//! Tool trait and shared helpers.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Error;

/// Errors a tool reports to the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),
}

impl From<Error> for ToolError {
    fn from(e: Error) -> Self {
        match e {
            Error::AuthenticationRequired => ToolError::NotAuthorized(e.to_string()),
            Error::Validation(_) => ToolError::InvalidParameters(e.to_string()),
            other => ToolError::ExecutionFailed(other.to_string()),
        }
    }
}

/// Text result of a tool call.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: String,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>, duration: Duration) -> Self {
        Self {
            content: content.into(),
            duration,
        }
    }
}

/// Name, description and JSON schema advertised for a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub parameters: serde_json::Value,
}

/// An operation callable through the dispatcher.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameters_schema(&self) -> serde_json::Value;

    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Extract a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, name: &str) -> Result<&'a str, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::InvalidParameters(format!("missing '{name}' parameter")))
}

/// Extract a required non-negative integer parameter.
pub fn require_u64(params: &serde_json::Value, name: &str) -> Result<u64, ToolError> {
    params
        .get(name)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| {
            ToolError::InvalidParameters(format!("missing or non-integer '{name}' parameter"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::validate::{FieldError, ValidationErrors};

    #[test]
    fn require_helpers() {
        let params = serde_json::json!({"company_id": 12, "phase": "staff", "bad": -1});
        assert_eq!(require_u64(&params, "company_id").unwrap(), 12);
        assert_eq!(require_str(&params, "phase").unwrap(), "staff");
        assert!(require_u64(&params, "bad").is_err());
        assert!(require_str(&params, "missing").is_err());
    }

    #[test]
    fn engine_errors_map_to_tool_errors() {
        assert!(matches!(
            ToolError::from(Error::AuthenticationRequired),
            ToolError::NotAuthorized(_)
        ));
        assert!(matches!(
            ToolError::from(Error::Validation(ValidationErrors(vec![FieldError::new(
                None, "count", "too big"
            )]))),
            ToolError::InvalidParameters(_)
        ));
        assert!(matches!(
            ToolError::from(Error::NoSessionFound { tenant_id: 1 }),
            ToolError::ExecutionFailed(_)
        ));
    }
}
