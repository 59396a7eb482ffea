//! Requirement complexity estimation: model-assisted with bounded retries,
//! falling back to the keyword rules.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clients::{ChatMessage, GenerationRequest, TextGenerator};
use crate::design::classifier::{UiArea, describe_areas, detect_prompt_areas};
use crate::design::extract::{
    FieldDefault, FieldKind, FieldRule, ParseError, apply_rules, extract_json_payload,
};
use crate::design::types::{Complexity, ComplexityAnalysis, Prompt, prompt_text};
use crate::error::{DesignError, Result};

const MAX_COMPLEX_BLOCKS: u32 = 4;

const ANALYSIS_RULES: &[FieldRule] = &[
    FieldRule {
        field: "complexity",
        keys: &["complexity", "complexityLevel"],
        kind: FieldKind::Text,
        default: FieldDefault::Text("medium"),
    },
    FieldRule {
        field: "estimatedBlocks",
        keys: &["estimatedBlocks", "estimated_blocks"],
        kind: FieldKind::Integer,
        default: FieldDefault::Integer(2),
    },
    FieldRule {
        field: "reasoning",
        keys: &["reasoning"],
        kind: FieldKind::Text,
        default: FieldDefault::Text("AI analysis completed"),
    },
    FieldRule {
        field: "confidence",
        keys: &["confidence"],
        kind: FieldKind::Number,
        default: FieldDefault::Number(0.8),
    },
    FieldRule {
        field: "aiAnalysis",
        keys: &["aiAnalysis", "analysis"],
        kind: FieldKind::Text,
        default: FieldDefault::Raw,
    },
];

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an experienced front-end UI architect who analyzes the complexity of UI requirements.

## Task
Analyze the user's front-end requirement and determine its complexity level from how it divides into UI areas.

## Complexity levels
- simple: a single UI area or component (one table, one form, one button). 1 design block.
- medium: two UI areas combined (table + search form, header + main content, form + detail modal). 2 design blocks.
- complex: three or more UI areas (header + sidebar + content + footer, table + search + detail + actions). 3 or more design blocks.

## UI area types
- Data display: table, list, chart, card list
- Forms: search form, input form, filter form
- Navigation: header, sidebar, breadcrumb, pagination
- Detail: modal, drawer, detail page
- Operations: button group, action bar, toolbar
- Layout: container, wrapper, grid

## Output format
Respond with one JSON object:
```json
{
  "complexity": "simple|medium|complex",
  "estimatedBlocks": 1,
  "reasoning": "why this level",
  "confidence": 0.8,
  "aiAnalysis": "details"
}
```

Focus on UI area division, not business logic. Count the independent UI components needed."#;

#[derive(Debug, Clone)]
pub struct EstimateOptions {
    pub use_ai: bool,
    pub model: String,
    pub max_retries: u32,
}

/// Progress of the model-assisted estimate.
#[derive(Debug)]
enum RetryState {
    Attempting(u32),
    Succeeded(ComplexityAnalysis),
    Exhausted { last_error: String },
}

pub struct ComplexityEstimator {
    generator: Arc<dyn TextGenerator>,
}

impl ComplexityEstimator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Top-level estimate. Never fails: AI exhaustion falls back to the rules.
    pub async fn estimate(&self, prompt: &[Prompt], options: &EstimateOptions) -> ComplexityAnalysis {
        if !options.use_ai {
            return estimate_by_rules(prompt);
        }
        match self
            .estimate_with_ai(prompt, &options.model, options.max_retries)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!("AI complexity analysis failed, falling back to rules: {}", e);
                estimate_by_rules(prompt)
            }
        }
    }

    /// Model-only estimate. Fails once every attempt has failed.
    pub async fn estimate_with_ai(
        &self,
        prompt: &[Prompt],
        model: &str,
        max_retries: u32,
    ) -> Result<ComplexityAnalysis> {
        let max_attempts = max_retries.max(1);
        let request = analysis_request(prompt, model);

        let mut state = RetryState::Attempting(1);
        let mut last_error = String::new();
        loop {
            state = match state {
                RetryState::Attempting(n) if n > max_attempts => RetryState::Exhausted {
                    last_error: std::mem::take(&mut last_error),
                },
                RetryState::Attempting(n) => {
                    debug!("Complexity analysis attempt {}/{}", n, max_attempts);
                    match self.attempt(&request).await {
                        Ok(result) => {
                            info!("Complexity analysis attempt {} succeeded", n);
                            RetryState::Succeeded(result)
                        }
                        Err(e) => {
                            warn!("Complexity analysis attempt {} failed: {}", n, e);
                            last_error = e.to_string();
                            RetryState::Attempting(n + 1)
                        }
                    }
                }
                RetryState::Succeeded(result) => return Ok(result),
                RetryState::Exhausted { last_error } => {
                    error!(
                        "All {} complexity analysis attempts failed. Last error: {}",
                        max_attempts, last_error
                    );
                    return Err(DesignError::Generation {
                        message: format!(
                            "AI analysis failed after {max_attempts} attempts: {last_error}"
                        ),
                    });
                }
            };
        }
    }

    async fn attempt(&self, request: &GenerationRequest) -> Result<ComplexityAnalysis> {
        let text = self.generator.generate(request).await?;
        parse_analysis(&text).map_err(|e| DesignError::Parse {
            message: e.to_string(),
        })
    }
}

fn analysis_request(prompt: &[Prompt], model: &str) -> GenerationRequest {
    let user = format!(
        "Please analyze the complexity of the following front-end requirement:\n\n{}\n\nDetermine the complexity level and explain your analysis.",
        prompt_text(prompt, "\n")
    );
    GenerationRequest {
        model: model.to_string(),
        system_instructions: ANALYSIS_SYSTEM_PROMPT.to_string(),
        messages: vec![ChatMessage::user(user)],
    }
}

/// Parse one model response into an analysis, defaulting missing fields.
pub fn parse_analysis(text: &str) -> std::result::Result<ComplexityAnalysis, ParseError> {
    let payload = extract_json_payload(text)?;
    let fields = apply_rules(&payload, ANALYSIS_RULES, text);

    let complexity = fields
        .get("complexity")
        .and_then(Value::as_str)
        .and_then(Complexity::parse)
        .unwrap_or_default();
    let mut estimated_blocks = fields
        .get("estimatedBlocks")
        .and_then(Value::as_i64)
        .unwrap_or(2)
        .clamp(1, i64::from(u32::MAX)) as u32;
    if complexity == Complexity::Complex {
        estimated_blocks = estimated_blocks.min(MAX_COMPLEX_BLOCKS);
    }
    let confidence = fields
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(0.8)
        .clamp(0.0, 1.0) as f32;

    Ok(ComplexityAnalysis {
        complexity,
        estimated_blocks,
        reasoning: fields
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        confidence: Some(confidence),
        ai_analysis: fields
            .get("aiAnalysis")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

pub fn estimate_by_rules(prompt: &[Prompt]) -> ComplexityAnalysis {
    rule_analysis(&detect_prompt_areas(prompt))
}

/// Area-count thresholds: 0-1 simple, 2 medium, 3+ complex (capped at 4 blocks).
pub fn rule_analysis(areas: &[UiArea]) -> ComplexityAnalysis {
    let count = areas.len() as u32;
    let described = describe_areas(areas);
    let (complexity, estimated_blocks, reasoning) = match count {
        0 => (
            Complexity::Simple,
            1,
            "Single UI component requirement".to_string(),
        ),
        1 => (Complexity::Simple, 1, format!("Single UI area: {described}")),
        2 => (Complexity::Medium, 2, format!("Two UI areas: {described}")),
        n => (
            Complexity::Complex,
            n.min(MAX_COMPLEX_BLOCKS),
            format!("Multiple UI areas ({n} blocks): {described}"),
        ),
    };
    ComplexityAnalysis {
        complexity,
        estimated_blocks,
        reasoning,
        confidence: None,
        ai_analysis: None,
    }
}
