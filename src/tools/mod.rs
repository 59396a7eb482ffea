//! Tool handlers for the design-planner MCP server

pub mod analyze_and_plan;
pub mod design_block;
pub mod integrate;
pub mod query_component;

use rmcp::model::{CallToolRequestParam, CallToolResult, Content};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DesignError, Result};

/// Deserialize tool arguments, reporting failures as validation errors.
pub(crate) fn parse_params<T: DeserializeOwned>(request: CallToolRequestParam) -> Result<T> {
    // Absent arguments are treated as an empty object
    let args = request.arguments.unwrap_or_default();
    serde_json::from_value(Value::Object(args))
        .map_err(|e| DesignError::validation(format!("Invalid parameters: {}", e)))
}

/// Summary text first, then the JSON payload (also carried as structured content).
pub(crate) fn tool_result(summary: String, payload: Value) -> CallToolResult {
    let mut result = CallToolResult::structured(payload);
    result.content.insert(0, Content::text(summary));
    result
}
