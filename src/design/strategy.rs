//! Model-assisted business-domain decomposition, with a keyword fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::ComponentCatalog;
use crate::clients::{ChatMessage, GenerationRequest, TextGenerator};
use crate::deserializers::{
    de_f32_forgiving, de_option_string_forgiving, de_option_u32_forgiving, de_string_forgiving,
    de_string_list_forgiving, de_vec_skip_invalid,
};
use crate::design::classifier::{detect_areas, requirement_text};
use crate::design::extract::{ParseError, extract_json_payload};
use crate::design::planner::plan_blocks;
use crate::design::types::{
    BlockType, Complexity, DesignBlock, DesignStrategy, ImplementationStep, Priority, Prompt,
    prompt_text,
};

const FALLBACK_MATCH_SCORE: f32 = 0.6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPattern {
    #[serde(rename = "type", default, deserialize_with = "de_string_forgiving")]
    pub pattern_type: String,
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub description: String,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub components: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_option_string_forgiving"
    )]
    pub data_flow: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMatch {
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub component_name: String,
    #[serde(default, deserialize_with = "de_f32_forgiving")]
    pub match_score: f32,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub capabilities: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub can_handle: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub limitations: Vec<String>,
}

/// A block as recommended by the model; richer than `DesignBlock`.
///
/// Every field defaults on null or a wrong type, so one sloppy field never
/// discards the block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartBlock {
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub block_id: String,
    /// business-domain, interaction-group, reusable-component or layout
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub block_type: String,
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub title: String,
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub description: String,
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub business_domain: String,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub components: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub dependencies: Vec<String>,
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub interaction_patterns: Vec<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_option_u32_forgiving"
    )]
    pub estimated_tokens: Option<u32>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub reuse_potential: Priority,
    #[serde(default, deserialize_with = "de_vec_skip_invalid")]
    pub existing_component_matches: Vec<ComponentMatch>,
}

const DEFAULT_BLOCK_TOKENS: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAnalysis {
    #[serde(default, deserialize_with = "de_string_list_forgiving")]
    pub business_domains: Vec<String>,
    #[serde(default, deserialize_with = "de_vec_skip_invalid")]
    pub interaction_patterns: Vec<InteractionPattern>,
    #[serde(default, deserialize_with = "de_vec_skip_invalid")]
    pub existing_component_matches: Vec<ComponentMatch>,
    #[serde(default, deserialize_with = "de_vec_skip_invalid")]
    pub recommended_blocks: Vec<SmartBlock>,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default, deserialize_with = "de_string_forgiving")]
    pub reasoning: String,
}

const DEFAULT_REASONING: &str = "Smart analysis completed";

static DATA_MANAGEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"表格|列表|数据|table|list|crud").expect("valid regex"));
static USER_INTERACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"表单|输入|form|input").expect("valid regex"));
static DATA_DISPLAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"图表|统计|chart|statistics").expect("valid regex"));
static MODAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"弹窗|modal|drawer").expect("valid regex"));

const STRATEGY_SYSTEM_PROMPT: &str = r#"You are a senior front-end architect responsible for component decomposition and design strategy.

## Principles
1. Business logic first: identify business domains and functional modules instead of splitting purely by UI region. Consider data flow and state management.
2. Know the existing component library: analyze what the private components can do, prefer them and avoid reinventing them.
3. Recognize interaction patterns: relationships between components, data direction, user operation flow.
4. Optimize reuse: identify reusable patterns and keep dependencies between blocks simple.

## Business domains
data management (CRUD), user interaction (forms, modals, navigation), data display (tables, charts, lists), business process (approval, state transitions), system functions (configuration, permissions, settings)

## Interaction pattern types
- parent-child: e.g. expanding a table row into details
- sibling: independent functional modules side by side
- modal: edit, create or detail dialogs
- form-flow: multi-step forms
- data-flow: query, filter, sort

## Output format
Respond with one JSON object:
```json
{
  "businessDomains": ["data management", "user interaction"],
  "interactionPatterns": [
    {"type": "parent-child", "description": "row click opens details", "components": ["data table", "detail modal"], "dataFlow": "row data -> detail data"}
  ],
  "existingComponentMatches": [
    {"componentName": "SmartTable", "matchScore": 0.8, "capabilities": ["display", "sorting", "paging"], "canHandle": ["table display"], "limitations": ["no complex filtering"]}
  ],
  "recommendedBlocks": [
    {"blockId": "data-management", "blockType": "business-domain", "title": "Data management", "description": "CRUD over records", "businessDomain": "data management", "components": ["data table", "action buttons", "filter form"], "dependencies": [], "interactionPatterns": ["data-flow", "modal"], "estimatedTokens": 2000, "priority": "high", "reusePotential": "high", "existingComponentMatches": []}
  ],
  "complexity": "simple|medium|complex",
  "reasoning": "why this decomposition"
}
```

## Existing component library
{{CATALOG}}

## Notes
- Do not over-split; keep blocks cohesive.
- More blocks mean more maintenance.
- Keep data flow between blocks explicit and interaction patterns consistent."#;

pub struct SmartStrategyEngine {
    generator: Arc<dyn TextGenerator>,
}

impl SmartStrategyEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// One model call; any failure yields the keyword analysis instead.
    pub async fn analyze(
        &self,
        prompt: &[Prompt],
        catalog: &ComponentCatalog,
        model: &str,
    ) -> SmartAnalysis {
        let request = strategy_request(prompt, catalog, model);
        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Smart analysis generation failed, using keyword analysis: {}", e);
                return keyword_analysis(prompt, catalog);
            }
        };
        match parse_smart_analysis(&text) {
            Ok(analysis) => {
                info!(
                    "Smart analysis: {} domains, {} recommended blocks",
                    analysis.business_domains.len(),
                    analysis.recommended_blocks.len()
                );
                analysis
            }
            Err(e) => {
                warn!("Smart analysis response unusable ({}), using keyword analysis", e);
                debug!("Unparsed smart analysis response: {} chars", text.len());
                keyword_analysis(prompt, catalog)
            }
        }
    }

    /// Analyze and map into a strategy. `tier` sizes planner blocks when the
    /// analysis recommends none.
    pub async fn generate_strategy(
        &self,
        prompt: &[Prompt],
        catalog: &ComponentCatalog,
        model: &str,
        tier: Complexity,
    ) -> (DesignStrategy, SmartAnalysis) {
        let analysis = self.analyze(prompt, catalog, model).await;
        let strategy = strategy_from_analysis(prompt, &analysis, tier);
        (strategy, analysis)
    }
}

fn strategy_request(prompt: &[Prompt], catalog: &ComponentCatalog, model: &str) -> GenerationRequest {
    let catalog_text = if catalog.is_empty() {
        "No existing component library information.".to_string()
    } else {
        catalog.describe()
    };
    let user = format!(
        "Analyze the component decomposition strategy for this front-end requirement:\n\n{}\n\nConsider business logic, interaction patterns and matches against the existing component library.",
        prompt_text(prompt, "\n")
    );
    GenerationRequest {
        model: model.to_string(),
        system_instructions: STRATEGY_SYSTEM_PROMPT.replace("{{CATALOG}}", &catalog_text),
        messages: vec![ChatMessage::user(user)],
    }
}

pub fn parse_smart_analysis(text: &str) -> Result<SmartAnalysis, ParseError> {
    let payload = extract_json_payload(text)?;
    let mut analysis: SmartAnalysis = serde_json::from_value(Value::Object(payload))
        .map_err(|e| ParseError::Malformed(e.to_string()))?;
    if analysis.reasoning.trim().is_empty() {
        analysis.reasoning = DEFAULT_REASONING.to_string();
    }
    Ok(analysis)
}

/// Keyword-group domains, a modal pattern, and catalog entries whose purpose
/// appears in the requirement.
pub fn keyword_analysis(prompt: &[Prompt], catalog: &ComponentCatalog) -> SmartAnalysis {
    let text = requirement_text(prompt);

    let mut business_domains = Vec::new();
    if DATA_MANAGEMENT.is_match(&text) {
        business_domains.push("data management".to_string());
    }
    if USER_INTERACTION.is_match(&text) {
        business_domains.push("user interaction".to_string());
    }
    if DATA_DISPLAY.is_match(&text) {
        business_domains.push("data display".to_string());
    }

    let mut interaction_patterns = Vec::new();
    if MODAL.is_match(&text) {
        interaction_patterns.push(InteractionPattern {
            pattern_type: "modal".to_string(),
            description: "Modal interaction".to_string(),
            components: vec!["main component".to_string(), "modal component".to_string()],
            data_flow: None,
        });
    }

    let existing_component_matches = catalog
        .iter()
        .filter_map(|(name, entry)| {
            let purpose = entry.purpose.as_deref()?.trim();
            (!purpose.is_empty() && text.contains(&purpose.to_lowercase())).then(|| ComponentMatch {
                component_name: name.clone(),
                match_score: FALLBACK_MATCH_SCORE,
                capabilities: vec![purpose.to_string()],
                can_handle: vec![purpose.to_string()],
                limitations: Vec::new(),
            })
        })
        .collect();

    let complexity = match business_domains.len() {
        0 | 1 => Complexity::Simple,
        2 => Complexity::Medium,
        _ => Complexity::Complex,
    };

    SmartAnalysis {
        business_domains,
        interaction_patterns,
        existing_component_matches,
        recommended_blocks: Vec::new(),
        complexity,
        reasoning: "Basic analysis: business domains identified from keywords".to_string(),
    }
}

pub fn strategy_from_analysis(
    prompt: &[Prompt],
    analysis: &SmartAnalysis,
    tier: Complexity,
) -> DesignStrategy {
    let (blocks, complexity_level) = if analysis.recommended_blocks.is_empty() {
        let areas = detect_areas(&requirement_text(prompt));
        debug!("No recommended blocks, planning {} areas at {} tier", areas.len(), tier.as_str());
        (plan_blocks(&areas, tier), tier)
    } else {
        (map_blocks(&analysis.recommended_blocks), analysis.complexity)
    };

    let requirement_summary = if analysis.business_domains.is_empty() {
        "Smart analysis".to_string()
    } else {
        format!(
            "Smart analysis: covers {} business domains",
            analysis.business_domains.join(", ")
        )
    };

    let implementation_steps = implementation_steps(&blocks);
    DesignStrategy {
        requirement_summary,
        complexity_level,
        design_strategy: analysis.reasoning.clone(),
        blocks,
        implementation_steps,
    }
}

/// Map recommended blocks, making ids unique within the strategy.
fn map_blocks(recommended: &[SmartBlock]) -> Vec<DesignBlock> {
    let mut seen: HashSet<String> = HashSet::new();
    recommended
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let base = if b.block_id.trim().is_empty() {
                format!("block-{}", i + 1)
            } else {
                b.block_id.trim().to_string()
            };
            let mut id = base.clone();
            let mut suffix = 2;
            while !seen.insert(id.clone()) {
                id = format!("{base}-{suffix}");
                suffix += 1;
            }
            DesignBlock {
                block_id: id,
                block_type: BlockType::from(b.block_type.clone()),
                title: b.title.clone(),
                description: b.description.clone(),
                components: b.components.clone(),
                dependencies: b.dependencies.clone(),
                estimated_tokens: b.estimated_tokens.unwrap_or(DEFAULT_BLOCK_TOKENS),
                priority: b.priority,
            }
        })
        .collect()
}

/// High priority first, then fewer dependencies; stable otherwise.
pub fn implementation_steps(blocks: &[DesignBlock]) -> Vec<ImplementationStep> {
    let mut ordered: Vec<&DesignBlock> = blocks.iter().collect();
    ordered.sort_by_key(|b| (b.priority != Priority::High, b.dependencies.len()));
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, b)| ImplementationStep {
            step_number: i as u32 + 1,
            block_id: b.block_id.clone(),
            action: format!("Design {}", b.title),
            tool_call: "design_block".to_string(),
        })
        .collect()
}
