//! query_component tool handler: catalog documentation lookup

use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::formatters::format_component_doc;
use crate::server::DesignServer;
use crate::tools::{parse_params, tool_result};

/// Parameters for the query_component tool
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryComponentParams {
    #[serde(default)]
    pub component_name: String,
}

impl DesignServer {
    /// Handle the query_component tool call
    pub async fn handle_query_component(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: QueryComponentParams = parse_params(request)?;
        let doc = self.pipeline.query_component(&params.component_name)?;

        let summary = format_component_doc(params.component_name.trim(), &doc);
        Ok(tool_result(summary, Value::Object(doc)))
    }
}
