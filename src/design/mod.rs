//! Requirement → blocks → designs → integration.

pub mod block_designer;
pub mod classifier;
pub mod complexity;
pub mod extract;
pub mod integrator;
pub mod pipeline;
pub mod planner;
pub mod strategy;
pub mod types;

pub use pipeline::{BlockOutcome, DesignPipeline, IntegratedContext, NextAction, PlanOutcome};
pub use types::*;
