//! Shared data model for the requirement → blocks → designs pipeline.
//!
//! Wire names are camelCase because callers resubmit these records verbatim
//! between tool calls. Enumerated labels deserialize leniently: anything
//! unrecognized falls back to the documented default instead of failing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One segment of a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    #[serde(rename = "type", default)]
    pub kind: PromptKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Prompt {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: PromptKind::Text,
            text: Some(text.into()),
            image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    #[default]
    Text,
    Image,
}

/// Text segments joined with `sep`, in order. Image segments are skipped.
pub fn prompt_text(prompt: &[Prompt], sep: &str) -> String {
    prompt
        .iter()
        .filter(|p| p.kind == PromptKind::Text)
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join(sep)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Complexity {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "medium" => Some(Self::Medium),
            "complex" => Some(Self::Complex),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Medium => "medium",
            Self::Complex => "complex",
        }
    }
}

/// Null, non-string and unknown labels fall back to the default.
impl From<Value> for Complexity {
    fn from(v: Value) -> Self {
        v.as_str().map(|s| Self::from(s.to_string())).unwrap_or_default()
    }
}

impl From<String> for Complexity {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Null, non-string and unknown labels fall back to the default.
impl From<Value> for Priority {
    fn from(v: Value) -> Self {
        v.as_str().map(|s| Self::from(s.to_string())).unwrap_or_default()
    }
}

impl From<String> for Priority {
    fn from(s: String) -> Self {
        Self::parse(&s).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "Value")]
pub enum BlockType {
    Layout,
    #[default]
    Component,
    Logic,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Layout => "layout",
            Self::Component => "component",
            Self::Logic => "logic",
        }
    }
}

/// Null, non-string and unknown labels fall back to the default.
impl From<Value> for BlockType {
    fn from(v: Value) -> Self {
        v.as_str().map(|s| Self::from(s.to_string())).unwrap_or_default()
    }
}

impl From<String> for BlockType {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "layout" => Self::Layout,
            "logic" => Self::Logic,
            _ => Self::Component,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignBlock {
    pub block_id: String,
    #[serde(default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "crate::deserializers::de_string_list_forgiving")]
    pub components: Vec<String>,
    #[serde(default, deserialize_with = "crate::deserializers::de_string_list_forgiving")]
    pub dependencies: Vec<String>,
    #[serde(default = "default_estimated_tokens")]
    pub estimated_tokens: u32,
    #[serde(default)]
    pub priority: Priority,
}

fn default_estimated_tokens() -> u32 {
    1000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityAnalysis {
    pub complexity: Complexity,
    pub estimated_blocks: u32,
    pub reasoning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplementationStep {
    pub step_number: u32,
    pub block_id: String,
    #[serde(default)]
    pub action: String,
    #[serde(default = "default_tool_call")]
    pub tool_call: String,
}

fn default_tool_call() -> String {
    "design_block".to_string()
}

/// The session artifact callers carry between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignStrategy {
    #[serde(default)]
    pub requirement_summary: String,
    #[serde(default)]
    pub complexity_level: Complexity,
    #[serde(default)]
    pub design_strategy: String,
    #[serde(default)]
    pub blocks: Vec<DesignBlock>,
    #[serde(default)]
    pub implementation_steps: Vec<ImplementationStep>,
}

impl DesignStrategy {
    pub fn block(&self, block_id: &str) -> Option<&DesignBlock> {
        self.blocks.iter().find(|b| b.block_id == block_id)
    }

    /// `(blockId, dependency)` pairs whose dependency names no block in this strategy.
    pub fn dangling_dependencies(&self) -> Vec<(String, String)> {
        self.blocks
            .iter()
            .flat_map(|b| {
                b.dependencies
                    .iter()
                    .filter(|dep| self.block(dep).is_none())
                    .map(|dep| (b.block_id.clone(), dep.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropSpec {
    pub name: String,
    #[serde(rename = "type", default = "default_prop_type")]
    pub prop_type: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::deserializers::de_option_bool_forgiving"
    )]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::deserializers::de_option_string_forgiving"
    )]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_prop_type() -> String {
    "any".to_string()
}

/// A component referenced by a library recommendation.
///
/// Accepts either a bare name string or the enriched object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LibraryComponentRepr")]
pub struct LibraryComponent {
    pub name: String,
    #[serde(default)]
    pub info: Value,
    #[serde(rename = "isPrivate", default)]
    pub is_private: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LibraryComponentRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        info: Value,
        #[serde(rename = "isPrivate", default)]
        is_private: bool,
    },
}

impl From<LibraryComponentRepr> for LibraryComponent {
    fn from(repr: LibraryComponentRepr) -> Self {
        match repr {
            LibraryComponentRepr::Name(name) => Self {
                name,
                info: Value::Null,
                is_private: false,
            },
            LibraryComponentRepr::Full {
                name,
                info,
                is_private,
            } => Self {
                name,
                info,
                is_private,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryUsage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<LibraryComponent>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDesign {
    #[serde(default)]
    pub component_name: String,
    #[serde(default)]
    pub component_description: String,
    #[serde(default)]
    pub library: Vec<LibraryUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<Vec<PropSpec>>,
}

impl ComponentDesign {
    /// The placeholder design used when the model output carries no usable payload.
    pub fn placeholder(block_id: &str) -> Self {
        Self {
            component_name: format!("{block_id}-component"),
            component_description: String::new(),
            library: Vec::new(),
            props: None,
        }
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.library
            .iter()
            .flat_map(|lib| lib.components.iter().map(|c| c.name.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDesign {
    pub block_id: String,
    pub component: ComponentDesign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedDesign {
    pub props_by_block: BTreeMap<String, Vec<PropSpec>>,
    pub private_components_used: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedDesign {
    pub strategy: DesignStrategy,
    pub block_designs: Vec<BlockDesign>,
    pub aggregated: AggregatedDesign,
    pub composition_plan: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_labels_fall_back_to_defaults() {
        let block: DesignBlock = serde_json::from_value(json!({
            "blockId": "b1",
            "blockType": "business-domain",
            "priority": "urgent"
        }))
        .unwrap();
        assert_eq!(block.block_type, BlockType::Component);
        assert_eq!(block.priority, Priority::Medium);
        assert_eq!(block.estimated_tokens, 1000);
    }

    #[test]
    fn library_components_accept_names_or_objects() {
        let design: ComponentDesign = serde_json::from_value(json!({
            "componentName": "X",
            "library": [{"name": "lib", "components": [
                "cat-button",
                {"name": "cat-table", "info": {"purpose": "t"}, "isPrivate": true}
            ]}]
        }))
        .unwrap();
        let comps = &design.library[0].components;
        assert_eq!(comps[0].name, "cat-button");
        assert!(!comps[0].is_private);
        assert!(comps[1].is_private);
        assert_eq!(comps[1].info["purpose"], "t");
    }

    #[test]
    fn prompt_text_skips_images() {
        let prompt = vec![
            Prompt::text("A table"),
            Prompt {
                kind: PromptKind::Image,
                text: None,
                image: Some("data:".into()),
            },
            Prompt::text("with search"),
        ];
        assert_eq!(prompt_text(&prompt, " "), "A table with search");
    }

    #[test]
    fn dangling_dependencies_are_reported() {
        let strategy: DesignStrategy = serde_json::from_value(json!({
            "blocks": [
                {"blockId": "a"},
                {"blockId": "b", "dependencies": ["a", "ghost"]}
            ]
        }))
        .unwrap();
        assert_eq!(
            strategy.dangling_dependencies(),
            vec![("b".to_string(), "ghost".to_string())]
        );
    }
}
