use serde_json::{Map, Value, json};
use std::sync::Arc;

fn prompt_items() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "items": {
            "type": "object",
            "properties": {
                "type": {"type": "string", "enum": ["text", "image"]},
                "text": {"type": "string"},
                "image": {"type": "string"}
            },
            "required": ["type"]
        }
    })
}

fn rules_items() -> Value {
    json!({
        "type": "array",
        "description": "Codegen rules; a private-components rule supplies the component catalog when none is configured",
        "items": {
            "type": "object",
            "properties": {
                "type": {"type": "string"},
                "description": {"type": "string"},
                "docs": {"type": "object"}
            },
            "required": ["type"]
        }
    })
}

fn block_info() -> Value {
    json!({
        "type": "object",
        "properties": {
            "blockId": {"type": "string"},
            "blockType": {"type": "string", "enum": ["layout", "component", "logic"]},
            "title": {"type": "string"},
            "description": {"type": "string"},
            "components": {"type": "array", "items": {"type": "string"}},
            "dependencies": {"type": "array", "items": {"type": "string"}},
            "estimatedTokens": {"type": "integer"},
            "priority": {"type": "string", "enum": ["high", "medium", "low"]}
        },
        "required": ["blockId"]
    })
}

pub fn analyze_and_plan_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "prompt": prompt_items(),
            "rules": rules_items()
        },
        "required": ["prompt"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn design_block_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "blockId": {"type": "string", "minLength": 1},
            "prompt": prompt_items(),
            "blockInfo": block_info(),
            "integratedContext": {
                "type": "object",
                "properties": {
                    "strategy": {"type": "object"},
                    "blockDesigns": {"type": "array", "items": {"type": "object"}}
                },
                "required": ["strategy"]
            },
            "rules": rules_items()
        },
        "required": ["blockId", "prompt"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn integrate_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "strategy": {
                "type": "object",
                "properties": {
                    "requirementSummary": {"type": "string"},
                    "complexityLevel": {"type": "string", "enum": ["simple", "medium", "complex"]},
                    "designStrategy": {"type": "string"},
                    "blocks": {"type": "array", "items": block_info()},
                    "implementationSteps": {"type": "array", "items": {"type": "object"}}
                },
                "required": ["blocks"]
            },
            "blockDesigns": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "blockId": {"type": "string"},
                        "component": {"type": "object"}
                    },
                    "required": ["blockId", "component"]
                }
            },
            "rules": rules_items()
        },
        "required": ["strategy", "blockDesigns"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn query_component_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "componentName": {"type": "string", "minLength": 1}
        },
        "required": ["componentName"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

/// Output schema shared by all tools: the structured payload is always a JSON object.
pub fn tool_output_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "additionalProperties": true
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}
