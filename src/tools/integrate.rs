//! integrate tool handler

use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

use crate::catalog::CodegenRule;
use crate::design::{BlockDesign, DesignStrategy};
use crate::error::Result;
use crate::formatters::format_integrated;
use crate::server::DesignServer;
use crate::tools::{parse_params, tool_result};

/// Parameters for the integrate tool
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrateParams {
    pub strategy: DesignStrategy,
    pub block_designs: Vec<BlockDesign>,
    #[serde(default)]
    pub rules: Vec<CodegenRule>,
}

impl DesignServer {
    /// Handle the integrate tool call
    pub async fn handle_integrate(&self, request: CallToolRequestParam) -> Result<CallToolResult> {
        let params: IntegrateParams = parse_params(request)?;
        info!(
            "integrate: {} blocks, {} designs",
            params.strategy.blocks.len(),
            params.block_designs.len()
        );

        let integrated = self
            .pipeline
            .integrate(params.strategy, params.block_designs, &params.rules);

        let summary = format_integrated(&integrated);
        Ok(tool_result(summary, serde_json::to_value(&integrated)?))
    }
}
