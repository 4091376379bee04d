//! Response documents written by the `shell_gate` binary.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::adapter::{CommandRequest, ExecutionResult};
use crate::service::Denial;

/// One line of input in `serve` mode: a request plus an optional correlation id.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeRequest {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub request: CommandRequest,
}

/// What the host gets back for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Executed {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        result: ExecutionResult,
    },
    Denied {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        command: String,
        reason: &'static str,
        error: String,
    },
    Invalid {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Value>,
        error: String,
    },
}

impl Response {
    pub fn denied(id: Option<Value>, command: &str, denial: &Denial) -> Self {
        Response::Denied {
            id,
            command: command.to_string(),
            reason: denial.kind(),
            error: denial.to_string(),
        }
    }
}
