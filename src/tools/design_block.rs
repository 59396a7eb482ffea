//! design_block tool handler: one component design per call

use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

use crate::catalog::CodegenRule;
use crate::design::{DesignBlock, IntegratedContext, Prompt};
use crate::error::Result;
use crate::formatters::format_block_design;
use crate::server::DesignServer;
use crate::tools::{parse_params, tool_result};

/// Parameters for the design_block tool
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignBlockParams {
    #[serde(default)]
    pub block_id: String,
    #[serde(default)]
    pub prompt: Vec<Prompt>,
    #[serde(default)]
    pub block_info: Option<DesignBlock>,
    #[serde(default)]
    pub integrated_context: Option<IntegratedContext>,
    #[serde(default)]
    pub rules: Vec<CodegenRule>,
}

impl DesignServer {
    /// Handle the design_block tool call
    pub async fn handle_design_block(&self, request: CallToolRequestParam) -> Result<CallToolResult> {
        let params: DesignBlockParams = parse_params(request)?;
        info!(
            "design_block: {} (context: {})",
            params.block_id,
            params.integrated_context.is_some()
        );

        let outcome = self
            .pipeline
            .design_block(
                &params.block_id,
                &params.prompt,
                params.block_info.as_ref(),
                params.integrated_context.as_ref(),
                &params.rules,
            )
            .await?;

        let summary = format_block_design(&outcome);
        Ok(tool_result(summary, serde_json::to_value(&outcome)?))
    }
}
