//! Shared fixtures: a scripted text generator and a small component catalog.
#![allow(dead_code)]

use async_trait::async_trait;
use design_planner::catalog::{CatalogEntry, ComponentCatalog, Usage};
use design_planner::clients::{GenerationError, GenerationRequest, TextGenerator};
use design_planner::config::Config;
use design_planner::design::Prompt;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays queued responses in order; an empty queue answers with a transport error.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Transport("script exhausted".into())))
    }
}

pub fn catalog() -> ComponentCatalog {
    let mut entries = BTreeMap::new();
    entries.insert(
        "cat-button".to_string(),
        CatalogEntry {
            purpose: Some("button".to_string()),
            usage: Some(Usage::Text("<cat-button type=\"primary\" />".to_string())),
            extra: serde_json::json!({"api": {"type": "primary | ghost"}})
                .as_object()
                .cloned()
                .unwrap(),
        },
    );
    entries.insert(
        "cat-table".to_string(),
        CatalogEntry {
            purpose: Some("table".to_string()),
            usage: Some(Usage::Lines(vec!["<cat-table :rows=\"rows\" />".to_string()])),
            extra: serde_json::Map::new(),
        },
    );
    ComponentCatalog::new(entries)
}

/// Rule-only configuration: the estimator never calls the generator.
pub fn rules_config() -> Config {
    let mut config = Config::default();
    config.complexity.use_ai = false;
    config
}

pub fn prompt(text: &str) -> Vec<Prompt> {
    vec![Prompt::text(text)]
}
