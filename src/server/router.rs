use crate::error::DesignError;
use crate::resources::{
    COMPONENT_TEMPLATES_URI, DESIGN_RULES_URI, component_templates, design_rules,
};
use crate::server::DesignServer;
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        AnnotateAble, CallToolRequestParam, CallToolResult, Content, Implementation,
        InitializeRequestParam, InitializeResult, ListResourcesResult, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, RawResource, ReadResourceRequestParam,
        ReadResourceResult, ResourceContents, ResourcesCapability, ServerCapabilities, ServerInfo,
        Tool, ToolsCapability,
    },
    service::{RequestContext, RoleServer},
};
use tracing::{info, warn};

/// Canonical tool name for a requested name, resolving aliases.
pub fn canonical_tool_name(name: &str) -> Option<&'static str> {
    match name {
        "analyze_and_plan" | "design_component" => Some("analyze_and_plan"),
        "design_block" => Some("design_block"),
        "integrate" | "integrate_design" => Some("integrate"),
        "query_component" => Some("query_component"),
        _ => None,
    }
}

/// Caller-visible failure content for a boundary operation.
pub fn failure_result(operation: &str, err: &DesignError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(format!("❌ {} failed: {}", operation, err))])
}

pub fn tool_list() -> Vec<Tool> {
    let output = crate::schemas::tool_output_schema();
    vec![
        Tool {
            name: "analyze_and_plan".into(),
            title: Some("Analyze and Plan".into()),
            description: Some(
                "Estimate requirement complexity and split it into design blocks with implementation steps"
                    .into(),
            ),
            input_schema: crate::schemas::analyze_and_plan_schema(),
            icons: None,
            annotations: None,
            output_schema: Some(output.clone()),
            meta: None,
        },
        Tool {
            name: "design_block".into(),
            title: Some("Design Block".into()),
            description: Some(
                "Design the component for one block; pass integratedContext to get an integrated snapshot"
                    .into(),
            ),
            input_schema: crate::schemas::design_block_schema(),
            icons: None,
            annotations: None,
            output_schema: Some(output.clone()),
            meta: None,
        },
        Tool {
            name: "integrate".into(),
            title: Some("Integrate Design".into()),
            description: Some(
                "Combine a strategy and its block designs into props, private components and a composition plan"
                    .into(),
            ),
            input_schema: crate::schemas::integrate_schema(),
            icons: None,
            annotations: None,
            output_schema: Some(output.clone()),
            meta: None,
        },
        Tool {
            name: "query_component".into(),
            title: Some("Query Component".into()),
            description: Some("Look up a private component's documentation in the catalog".into()),
            input_schema: crate::schemas::query_component_schema(),
            icons: None,
            annotations: None,
            output_schema: Some(output),
            meta: None,
        },
    ]
}

impl ServerHandler for DesignServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                resources: Some(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "design-planner".to_string(),
                title: Some("Design Planner".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, McpError> {
        let mut info = self.get_info();
        info.protocol_version = request.protocol_version.clone();
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("tools/list requested");
        Ok(ListToolsResult {
            tools: tool_list(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        let Some(tool) = canonical_tool_name(request.name.as_ref()) else {
            return Err(McpError {
                code: rmcp::model::ErrorCode::METHOD_NOT_FOUND,
                message: format!("Unknown tool: {}", request.name).into(),
                data: None,
            });
        };

        let result = match tool {
            "analyze_and_plan" => self.handle_analyze_and_plan(request).await,
            "design_block" => self.handle_design_block(request).await,
            "integrate" => self.handle_integrate(request).await,
            _ => self.handle_query_component(request).await,
        };

        // Boundary failures are tool results, not protocol errors
        Ok(result.unwrap_or_else(|e| {
            warn!("{} failed: {}", tool, e);
            failure_result(tool, &e)
        }))
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListResourcesResult, McpError> {
        let mut rules = RawResource::new(DESIGN_RULES_URI, "design-rules");
        rules.description = Some("Component design rules and constraints".to_string());
        rules.mime_type = Some("application/json".to_string());

        let mut templates = RawResource::new(COMPONENT_TEMPLATES_URI, "component-templates");
        templates.description = Some("Component composition templates".to_string());
        templates.mime_type = Some("text/markdown".to_string());

        Ok(ListResourcesResult {
            resources: vec![rules.no_annotation(), templates.no_annotation()],
            ..Default::default()
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ReadResourceResult, McpError> {
        let text = match request.uri.as_str() {
            DESIGN_RULES_URI => serde_json::to_string_pretty(&design_rules())
                .map_err(|e| McpError::internal_error(e.to_string(), None))?,
            COMPONENT_TEMPLATES_URI => component_templates().to_string(),
            other => {
                return Err(McpError::resource_not_found(
                    format!("Unknown resource: {}", other),
                    None,
                ));
            }
        };
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(canonical_tool_name("design_component"), Some("analyze_and_plan"));
        assert_eq!(canonical_tool_name("integrate_design"), Some("integrate"));
        assert_eq!(canonical_tool_name("design_block"), Some("design_block"));
        assert_eq!(canonical_tool_name("nope"), None);
    }

    #[test]
    fn failure_is_tagged() {
        let result = failure_result("query_component", &DesignError::validation("bad"));
        assert_eq!(result.is_error, Some(true));
        let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
        assert_eq!(text, "❌ query_component failed: Validation error: bad");
    }
}
