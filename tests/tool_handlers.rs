//! Tool surface: schemas, handler results and tagged failures.

mod common;

use common::{ScriptedGenerator, catalog, rules_config};
use design_planner::server::DesignServer;
use design_planner::server::router::{canonical_tool_name, failure_result, tool_list};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde_json::{Value, json};
use std::sync::Arc;

fn server() -> DesignServer {
    DesignServer::with_parts(
        rules_config(),
        Arc::new(catalog()),
        Arc::new(ScriptedGenerator::failing()),
    )
}

fn request(name: &'static str, args: Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.into(),
        arguments: Some(args.as_object().unwrap().clone()),
    }
}

fn text_at(result: &CallToolResult, index: usize) -> String {
    result.content[index]
        .as_text()
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

#[test]
fn test_list_tools_exposes_four_operations() {
    let tools = tool_list();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(names, ["analyze_and_plan", "design_block", "integrate", "query_component"]);
    for tool in &tools {
        assert_eq!(tool.input_schema["type"], "object");
        assert!(tool.output_schema.is_some());
    }
}

#[test]
fn test_required_parameters_in_schemas() {
    let tools = tool_list();
    let required = |name: &str| -> Vec<String> {
        let tool = tools.iter().find(|t| t.name == name).unwrap();
        serde_json::from_value(tool.input_schema["required"].clone()).unwrap()
    };
    assert_eq!(required("analyze_and_plan"), ["prompt"]);
    assert_eq!(required("design_block"), ["blockId", "prompt"]);
    assert_eq!(required("integrate"), ["strategy", "blockDesigns"]);
    assert_eq!(required("query_component"), ["componentName"]);
}

#[test]
fn test_legacy_aliases_route_to_operations() {
    assert_eq!(canonical_tool_name("design_component"), Some("analyze_and_plan"));
    assert_eq!(canonical_tool_name("integrate_design"), Some("integrate"));
    assert_eq!(canonical_tool_name("generate_code"), None);
}

#[tokio::test]
async fn test_analyze_and_plan_returns_summary_and_payload() {
    let server = server();

    let result = server
        .handle_analyze_and_plan(request(
            "analyze_and_plan",
            json!({"prompt": [{"type": "text", "text": "需要一个表格和搜索表单"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(result.content.len(), 2);
    assert!(text_at(&result, 0).starts_with("## Design Strategy"));
    let payload: Value = serde_json::from_str(&text_at(&result, 1)).unwrap();
    assert_eq!(payload["strategy"]["complexityLevel"], "medium");
    assert_eq!(payload["strategy"]["blocks"].as_array().map(Vec::len), Some(2));
    assert_eq!(result.structured_content, Some(payload));
}

#[tokio::test]
async fn test_integrate_handler_reports_private_components() {
    let server = server();
    let args = json!({
        "strategy": {
            "blocks": [{"blockId": "b1", "title": "Button"}],
            "implementationSteps": [{"stepNumber": 1, "blockId": "b1"}]
        },
        "blockDesigns": [{
            "blockId": "b1",
            "component": {
                "componentName": "SubmitButton",
                "library": [{"name": "private", "components": ["cat-button"]}]
            }
        }]
    });

    let result = server.handle_integrate(request("integrate", args)).await.unwrap();

    let payload = result.structured_content.as_ref().unwrap();
    assert_eq!(payload["aggregated"]["privateComponentsUsed"], json!(["cat-button"]));
    assert_eq!(payload["aggregated"]["propsByBlock"], json!({}));
    assert!(text_at(&result, 0).contains("**Private components used:** cat-button"));
}

#[tokio::test]
async fn test_query_component_failure_is_tagged() {
    let server = server();

    let err = server
        .handle_query_component(request(
            "query_component",
            json!({"componentName": "cat-slider"}),
        ))
        .await
        .unwrap_err();
    let result = failure_result("query_component", &err);

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text_at(&result, 0),
        "❌ query_component failed: Component 'cat-slider' not found. Available components: cat-button, cat-table"
    );
}

#[tokio::test]
async fn test_design_block_without_generator_fails_with_content() {
    let server = server();

    let err = server
        .handle_design_block(request(
            "design_block",
            json!({"blockId": "b1", "prompt": [{"type": "text", "text": "a button"}]}),
        ))
        .await
        .unwrap_err();
    let result = failure_result("design_block", &err);

    assert_eq!(result.is_error, Some(true));
    assert!(text_at(&result, 0).starts_with("❌ design_block failed: Generation error"));
}

#[tokio::test]
async fn test_missing_prompt_is_a_validation_failure() {
    let server = server();

    let err = server
        .handle_analyze_and_plan(request("analyze_and_plan", json!({})))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("prompt must be a non-empty array"));
}
