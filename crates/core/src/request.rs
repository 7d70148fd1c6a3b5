//! Tool requests and permission decisions — the runtime boundary.
//!
//! The agent runtime hands a [`ToolRequest`] to a [`PermissionHandler`] and
//! waits for a [`PermissionDecision`] before it executes anything.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A capability invocation the agent wants to perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Name of the tool (e.g. "write-file", "Bash", "mcp__github__create_issue")
    pub name: String,

    /// Parameters in the order the agent supplied them
    #[serde(default, alias = "input", alias = "arguments")]
    pub parameters: Map<String, Value>,
}

impl ToolRequest {
    /// Build a request from any JSON value.
    ///
    /// Non-object parameters are replaced by an empty map; classification
    /// then reports the missing fields instead of failing.
    pub fn new(name: impl Into<String>, parameters: Value) -> Self {
        let parameters = match parameters {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            name: name.into(),
            parameters,
        }
    }

    /// Parse a request from a JSON document (`{"name": ..., "parameters": {...}}`).
    pub fn from_json(text: &str) -> Result<Self> {
        let request: Self = serde_json::from_str(text)?;
        if request.name.trim().is_empty() {
            return Err(Error::InvalidRequest("tool name cannot be empty".into()));
        }
        Ok(request)
    }

    /// Get a string parameter, if present and actually a string.
    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }
}

/// The answer returned to the agent runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "behavior", rename_all = "snake_case")]
pub enum PermissionDecision {
    /// Run the tool with these parameters (normally the originals).
    Allow { parameters: Map<String, Value> },
    /// Do not run the tool; the reason is surfaced back into the agent's context.
    Deny { reason: String },
}

impl PermissionDecision {
    pub fn allow(parameters: Map<String, Value>) -> Self {
        Self::Allow { parameters }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }

    /// The denial reason, if this is a deny.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allow { .. } => None,
            Self::Deny { reason } => Some(reason),
        }
    }
}

/// Anything that can rule on a tool request.
///
/// Requests are issued strictly one at a time; the runtime awaits each
/// decision before sending the next request.
#[async_trait]
pub trait PermissionHandler: Send {
    async fn evaluate(&mut self, request: &ToolRequest) -> PermissionDecision;
}
