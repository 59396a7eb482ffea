//! The four boundary operations wired over the pipeline stages.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::catalog::{CodegenRule, ComponentCatalog};
use crate::clients::TextGenerator;
use crate::config::{ComplexityConfig, Config, ModelConfig};
use crate::design::block_designer::{BlockDesignInput, BlockDesigner};
use crate::design::classifier::detect_prompt_areas;
use crate::design::complexity::{ComplexityEstimator, EstimateOptions};
use crate::design::integrator;
use crate::design::planner::plan_blocks;
use crate::design::strategy::{SmartAnalysis, SmartStrategyEngine, implementation_steps};
use crate::design::types::{
    BlockDesign, Complexity, ComplexityAnalysis, ComponentDesign, DesignBlock, DesignStrategy,
    IntegratedDesign, Prompt,
};
use crate::error::{DesignError, Result};

/// Prior session state a caller resubmits with `design_block`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedContext {
    pub strategy: DesignStrategy,
    #[serde(default)]
    pub block_designs: Vec<BlockDesign>,
}

/// The suggested follow-up tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub tool: String,
    pub description: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutcome {
    pub strategy: DesignStrategy,
    pub complexity_analysis: ComplexityAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_analysis: Option<SmartAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<NextAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignMetadata {
    pub processing_time_ms: u64,
    pub model: String,
    pub timestamp: String,
    pub block_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockOutcome {
    pub block_id: String,
    pub design: ComponentDesign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integrated: Option<IntegratedDesign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<NextAction>,
    pub metadata: DesignMetadata,
}

pub struct DesignPipeline {
    catalog: Arc<ComponentCatalog>,
    estimator: ComplexityEstimator,
    strategy_engine: SmartStrategyEngine,
    designer: BlockDesigner,
    models: ModelConfig,
    complexity: ComplexityConfig,
}

impl DesignPipeline {
    pub fn new(config: &Config, catalog: Arc<ComponentCatalog>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            catalog,
            estimator: ComplexityEstimator::new(generator.clone()),
            strategy_engine: SmartStrategyEngine::new(generator.clone()),
            designer: BlockDesigner::new(generator),
            models: config.models.clone(),
            complexity: config.complexity.clone(),
        }
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.catalog
    }

    /// Request rules only apply when no catalog was found at startup.
    fn catalog_for(&self, rules: &[CodegenRule]) -> Arc<ComponentCatalog> {
        if self.catalog.is_empty() && !rules.is_empty() {
            let from_rules = ComponentCatalog::from_rules(rules);
            if !from_rules.is_empty() {
                debug!("Using {} components from request rules", from_rules.len());
                return Arc::new(from_rules);
            }
        }
        self.catalog.clone()
    }

    pub async fn analyze_and_plan(&self, prompt: &[Prompt], rules: &[CodegenRule]) -> Result<PlanOutcome> {
        require_prompt(prompt)?;
        let catalog = self.catalog_for(rules);

        let options = EstimateOptions {
            use_ai: self.complexity.use_ai,
            model: self.models.analysis.clone(),
            max_retries: self.complexity.max_retries,
        };
        let analysis = self.estimator.estimate(prompt, &options).await;
        info!(
            "Complexity {} ({} blocks): {}",
            analysis.complexity.as_str(),
            analysis.estimated_blocks,
            analysis.reasoning
        );

        let (strategy, smart_analysis) = if analysis.complexity == Complexity::Simple {
            let blocks = plan_blocks(&detect_prompt_areas(prompt), Complexity::Simple);
            let implementation_steps = implementation_steps(&blocks);
            let strategy = DesignStrategy {
                requirement_summary: analysis.reasoning.clone(),
                complexity_level: Complexity::Simple,
                design_strategy: "Design single component directly".to_string(),
                blocks,
                implementation_steps,
            };
            (strategy, None)
        } else {
            let (strategy, smart) = self
                .strategy_engine
                .generate_strategy(prompt, &catalog, &self.models.analysis, analysis.complexity)
                .await;
            (strategy, Some(smart))
        };

        let next_action = strategy
            .implementation_steps
            .first()
            .and_then(|step| strategy.block(&step.block_id))
            .map(|block| design_block_action(block, prompt, &strategy, &[]));

        Ok(PlanOutcome {
            strategy,
            complexity_analysis: analysis,
            smart_analysis,
            next_action,
        })
    }

    pub async fn design_block(
        &self,
        block_id: &str,
        prompt: &[Prompt],
        block_info: Option<&DesignBlock>,
        context: Option<&IntegratedContext>,
        rules: &[CodegenRule],
    ) -> Result<BlockOutcome> {
        let started = Instant::now();
        let block_id = block_id.trim();
        if block_id.is_empty() {
            return Err(DesignError::validation("Missing required parameter: blockId is required"));
        }
        require_prompt(prompt)?;
        let catalog = self.catalog_for(rules);

        let design = self
            .designer
            .design(&BlockDesignInput {
                prompt,
                block_id,
                block_info,
                strategy: context.map(|c| &c.strategy),
                catalog: &catalog,
                model: &self.models.design,
            })
            .await?;

        let (integrated, next_action) = match context {
            Some(ctx) => {
                let mut designs = ctx.block_designs.clone();
                designs.push(BlockDesign {
                    block_id: block_id.to_string(),
                    component: design.clone(),
                });
                let next = next_after(&ctx.strategy, &designs, prompt);
                let integrated = integrator::integrate(ctx.strategy.clone(), designs, &catalog);
                (Some(integrated), Some(next))
            }
            None => (None, None),
        };

        Ok(BlockOutcome {
            block_id: block_id.to_string(),
            design,
            integrated,
            next_action,
            metadata: DesignMetadata {
                processing_time_ms: started.elapsed().as_millis() as u64,
                model: self.models.design.clone(),
                timestamp: Utc::now().to_rfc3339(),
                block_id: block_id.to_string(),
            },
        })
    }

    pub fn integrate(
        &self,
        strategy: DesignStrategy,
        block_designs: Vec<BlockDesign>,
        rules: &[CodegenRule],
    ) -> IntegratedDesign {
        let catalog = self.catalog_for(rules);
        integrator::integrate(strategy, block_designs, &catalog)
    }

    pub fn query_component(&self, name: &str) -> Result<Map<String, Value>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DesignError::validation("componentName is required"));
        }
        self.catalog.query(name)
    }
}

fn require_prompt(prompt: &[Prompt]) -> Result<()> {
    if prompt.is_empty() {
        return Err(DesignError::validation(
            "Missing required parameter: prompt must be a non-empty array",
        ));
    }
    Ok(())
}

fn design_block_action(
    block: &DesignBlock,
    prompt: &[Prompt],
    strategy: &DesignStrategy,
    designs: &[BlockDesign],
) -> NextAction {
    NextAction {
        tool: "design_block".to_string(),
        description: format!("Design block '{}' ({})", block.block_id, block.title),
        arguments: json!({
            "blockId": block.block_id,
            "prompt": prompt,
            "blockInfo": block,
            "integratedContext": {
                "strategy": strategy,
                "blockDesigns": designs,
            }
        }),
    }
}

/// The first undesigned step, or integration once every block has a design.
fn next_after(strategy: &DesignStrategy, designs: &[BlockDesign], prompt: &[Prompt]) -> NextAction {
    let pending = strategy
        .implementation_steps
        .iter()
        .filter(|step| !designs.iter().any(|d| d.block_id == step.block_id))
        .find_map(|step| strategy.block(&step.block_id));

    match pending {
        Some(block) => design_block_action(block, prompt, strategy, designs),
        None => NextAction {
            tool: "integrate".to_string(),
            description: "All blocks designed; integrate them".to_string(),
            arguments: json!({
                "strategy": strategy,
                "blockDesigns": designs,
            }),
        },
    }
}
