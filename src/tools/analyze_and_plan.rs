//! analyze_and_plan tool handler: complexity estimate plus block strategy

use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

use crate::catalog::CodegenRule;
use crate::design::Prompt;
use crate::error::Result;
use crate::formatters::format_plan;
use crate::server::DesignServer;
use crate::tools::{parse_params, tool_result};

/// Parameters for the analyze_and_plan tool
#[derive(Debug, Deserialize)]
pub struct AnalyzeAndPlanParams {
    #[serde(default)]
    pub prompt: Vec<Prompt>,
    #[serde(default)]
    pub rules: Vec<CodegenRule>,
}

impl DesignServer {
    /// Handle the analyze_and_plan tool call
    pub async fn handle_analyze_and_plan(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: AnalyzeAndPlanParams = parse_params(request)?;
        info!("analyze_and_plan: {} prompt segments", params.prompt.len());

        let outcome = self
            .pipeline
            .analyze_and_plan(&params.prompt, &params.rules)
            .await?;

        let summary = format_plan(&outcome);
        Ok(tool_result(summary, serde_json::to_value(&outcome)?))
    }
}
