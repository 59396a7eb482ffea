//! End-to-end flow over the pipeline: plan, design blocks, integrate, query.

mod common;

use common::{ScriptedGenerator, catalog, prompt, rules_config};
use design_planner::design::integrator::integrate;
use design_planner::design::{
    BlockDesign, Complexity, ComponentDesign, DesignPipeline, DesignStrategy, IntegratedContext,
    LibraryComponent, LibraryUsage, PropSpec,
};
use design_planner::error::DesignError;
use serde_json::json;
use std::sync::Arc;

fn pipeline(generator: Arc<ScriptedGenerator>) -> DesignPipeline {
    DesignPipeline::new(&rules_config(), Arc::new(catalog()), generator)
}

fn prop(name: &str, ty: &str) -> PropSpec {
    PropSpec {
        name: name.to_string(),
        prop_type: ty.to_string(),
        required: Some(true),
        default: None,
        description: None,
    }
}

fn design(block_id: &str, components: &[&str], props: Option<Vec<PropSpec>>) -> BlockDesign {
    BlockDesign {
        block_id: block_id.to_string(),
        component: ComponentDesign {
            component_name: format!("{block_id}-view"),
            component_description: String::new(),
            library: vec![LibraryUsage {
                name: "ui".to_string(),
                components: components
                    .iter()
                    .map(|c| LibraryComponent {
                        name: c.to_string(),
                        info: serde_json::Value::Null,
                        is_private: false,
                    })
                    .collect(),
                description: String::new(),
            }],
            props,
        },
    }
}

fn single_block_strategy() -> DesignStrategy {
    serde_json::from_value(json!({
        "requirementSummary": "A button",
        "complexityLevel": "simple",
        "designStrategy": "Design single component directly",
        "blocks": [{"blockId": "b1", "title": "Button"}],
        "implementationSteps": [{"stepNumber": 1, "blockId": "b1"}]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_table_and_search_form_plan() {
    let generator = Arc::new(ScriptedGenerator::failing());
    let pipeline = pipeline(generator.clone());

    let outcome = pipeline
        .analyze_and_plan(&prompt("需要一个表格和搜索表单"), &[])
        .await
        .unwrap();

    assert_eq!(outcome.complexity_analysis.complexity, Complexity::Medium);
    assert_eq!(outcome.complexity_analysis.estimated_blocks, 2);
    assert_eq!(
        outcome.complexity_analysis.reasoning,
        "Two UI areas: Table area, Search area"
    );

    // Smart analysis was attempted once and fell back to keywords
    assert_eq!(generator.calls(), 1);
    assert!(outcome.smart_analysis.is_some());

    let strategy = &outcome.strategy;
    assert_eq!(strategy.complexity_level, Complexity::Medium);
    let ids: Vec<&str> = strategy.blocks.iter().map(|b| b.block_id.as_str()).collect();
    assert_eq!(ids, ["content-area-1", "content-area-2"]);
    assert_eq!(strategy.blocks[0].title, "Table area");
    assert_eq!(strategy.blocks[1].title, "Search area");

    let steps: Vec<&str> = strategy
        .implementation_steps
        .iter()
        .map(|s| s.block_id.as_str())
        .collect();
    assert_eq!(steps, ["content-area-1", "content-area-2"]);

    let next = outcome.next_action.unwrap();
    assert_eq!(next.tool, "design_block");
    assert_eq!(next.arguments["blockId"], "content-area-1");
}

#[tokio::test]
async fn test_simple_requirement_gets_single_block() {
    let pipeline = pipeline(Arc::new(ScriptedGenerator::failing()));

    let outcome = pipeline.analyze_and_plan(&prompt("a login form"), &[]).await.unwrap();

    assert!(outcome.smart_analysis.is_none());
    assert_eq!(outcome.strategy.design_strategy, "Design single component directly");
    assert_eq!(outcome.strategy.blocks.len(), 1);
    assert_eq!(outcome.strategy.blocks[0].block_id, "main-component");
    assert_eq!(outcome.strategy.implementation_steps.len(), 1);
}

#[tokio::test]
async fn test_empty_prompt_is_rejected() {
    let pipeline = pipeline(Arc::new(ScriptedGenerator::failing()));

    let err = pipeline.analyze_and_plan(&[], &[]).await.unwrap_err();

    assert!(matches!(err, DesignError::Validation { .. }));
    assert!(err.to_string().contains("prompt must be a non-empty array"));
}

#[tokio::test]
async fn test_design_block_enriches_catalog_components() {
    let response = r#"```json
{
  "componentName": "ActionBar",
  "componentDescription": "Primary actions",
  "library": [{"name": "private", "components": ["cat-button", "el-tooltip"], "description": "buttons"}],
  "props": [{"name": "label", "type": "string", "required": true}, {"type": "number"}]
}
```"#;
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(response.to_string())]));
    let pipeline = pipeline(generator.clone());
    let context = IntegratedContext {
        strategy: single_block_strategy(),
        block_designs: Vec::new(),
    };

    let outcome = pipeline
        .design_block("b1", &prompt("a button"), None, Some(&context), &[])
        .await
        .unwrap();

    assert_eq!(generator.calls(), 1);
    assert_eq!(outcome.design.component_name, "ActionBar");
    let components = &outcome.design.library[0].components;
    assert!(components[0].is_private);
    assert_eq!(components[0].info["purpose"], "button");
    assert!(!components[1].is_private);
    // The prop without a name is dropped
    assert_eq!(outcome.design.props.as_ref().map(Vec::len), Some(1));

    let integrated = outcome.integrated.unwrap();
    assert_eq!(integrated.aggregated.private_components_used, ["cat-button"]);
    let next = outcome.next_action.unwrap();
    assert_eq!(next.tool, "integrate");
    assert_eq!(outcome.metadata.block_id, "b1");
}

#[tokio::test]
async fn test_design_block_points_at_next_undesigned_block() {
    let generator = Arc::new(ScriptedGenerator::new(vec![Ok(
        r#"{"componentName": "TableView"}"#.to_string(),
    )]));
    let pipeline = pipeline(generator);
    let strategy: DesignStrategy = serde_json::from_value(json!({
        "blocks": [{"blockId": "a", "priority": "high"}, {"blockId": "b"}],
        "implementationSteps": [{"stepNumber": 1, "blockId": "a"}, {"stepNumber": 2, "blockId": "b"}]
    }))
    .unwrap();
    let context = IntegratedContext {
        strategy,
        block_designs: Vec::new(),
    };

    let outcome = pipeline
        .design_block("a", &prompt("table"), None, Some(&context), &[])
        .await
        .unwrap();

    let next = outcome.next_action.unwrap();
    assert_eq!(next.tool, "design_block");
    assert_eq!(next.arguments["blockId"], "b");
    assert_eq!(
        next.arguments["integratedContext"]["blockDesigns"][0]["blockId"],
        "a"
    );
}

#[tokio::test]
async fn test_design_block_generation_failure_propagates() {
    let pipeline = pipeline(Arc::new(ScriptedGenerator::failing()));

    let err = pipeline
        .design_block("b1", &prompt("a button"), None, None, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, DesignError::Generation { .. }));
}

#[tokio::test]
async fn test_design_block_requires_block_id() {
    let generator = Arc::new(ScriptedGenerator::failing());
    let pipeline = pipeline(generator.clone());

    let err = pipeline
        .design_block("  ", &prompt("a button"), None, None, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, DesignError::Validation { .. }));
    assert_eq!(generator.calls(), 0);
}

#[test]
fn test_integrate_cat_button_scenario() {
    let designs = vec![design("b1", &["cat-button"], None)];

    let integrated = integrate(single_block_strategy(), designs, &catalog());

    assert_eq!(integrated.aggregated.private_components_used, ["cat-button"]);
    assert!(integrated.aggregated.props_by_block.is_empty());
    assert!(integrated.composition_plan.starts_with("# Component Integration Plan"));
    assert!(integrated.composition_plan.contains("cat-button"));
}

#[test]
fn test_integrate_is_order_independent_without_duplicates() {
    let strategy: DesignStrategy = serde_json::from_value(json!({
        "blocks": [{"blockId": "a"}, {"blockId": "b"}, {"blockId": "c"}]
    }))
    .unwrap();
    let designs = vec![
        design("a", &["cat-table", "cat-button"], Some(vec![prop("rows", "Row[]")])),
        design("b", &["cat-button", "el-input"], Some(Vec::new())),
        design("c", &["cat-table"], None),
    ];
    let mut reversed = designs.clone();
    reversed.reverse();

    let forward = integrate(strategy.clone(), designs, &catalog());
    let backward = integrate(strategy, reversed, &catalog());

    assert_eq!(forward.aggregated, backward.aggregated);
    assert_eq!(
        forward.aggregated.private_components_used,
        ["cat-button", "cat-table"]
    );
    // Only blocks with non-empty props appear
    let keys: Vec<&String> = forward.aggregated.props_by_block.keys().collect();
    assert_eq!(keys, ["a"]);
}

#[test]
fn test_query_component_lists_available_names() {
    let pipeline = pipeline(Arc::new(ScriptedGenerator::failing()));

    let doc = pipeline.query_component("cat-button").unwrap();
    assert!(doc.contains_key("api"));

    let err = pipeline.query_component("cat-slider").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Component 'cat-slider' not found. Available components: cat-button, cat-table"
    );
}
