//! Component catalog: the read-only name → documentation mapping shared by every
//! pipeline stage.
//!
//! The on-disk source is a codegen rules file (a JSON array of rule groups). The
//! first `private-components` rule carrying a `docs` object is the catalog.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{DesignError, Result};

const PRIVATE_COMPONENTS_RULE: &str = "private-components";
const CATALOG_FILE: &str = "codegens.json";

/// `usage` appears both as a single sentence and as a list of bullet lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Usage {
    Text(String),
    Lines(Vec<String>),
}

impl Usage {
    pub fn joined(&self) -> String {
        match self {
            Usage::Text(s) => s.clone(),
            Usage::Lines(lines) => lines.join(" "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    /// api, examples, notes and anything else, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One rule inside a rule group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenRule {
    #[serde(rename = "type", default)]
    pub rule_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub rules: Vec<CodegenRule>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ComponentCatalog {
    pub fn new(entries: BTreeMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Resolve the catalog once at startup. Never fails: any problem degrades
    /// to an empty catalog with a warning.
    pub fn load(config: &CatalogConfig) -> Self {
        let candidates = candidate_paths(config.path.as_deref());
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            warn!(
                "No component catalog found (searched {} locations), continuing with empty catalog",
                candidates.len()
            );
            return Self::empty();
        };

        match Self::from_path(path) {
            Ok(catalog) => {
                info!(
                    "Loaded component catalog from {} ({} components)",
                    path.display(),
                    catalog.len()
                );
                catalog
            }
            Err(e) => {
                warn!("{}; continuing with empty catalog", e);
                Self::empty()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DesignError::CatalogLoad {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let groups: Vec<RuleGroup> =
            serde_json::from_str(&content).map_err(|e| DesignError::CatalogLoad {
                message: format!("failed to parse {}: {}", path.display(), e),
            })?;
        Ok(Self::from_rule_groups(&groups))
    }

    pub fn from_rule_groups(groups: &[RuleGroup]) -> Self {
        let rules: Vec<CodegenRule> = groups.iter().flat_map(|g| g.rules.clone()).collect();
        Self::from_rules(&rules)
    }

    /// Build from a flat rule list, as supplied per request by callers.
    pub fn from_rules(rules: &[CodegenRule]) -> Self {
        let docs = rules.iter().find_map(|r| {
            (r.rule_type == PRIVATE_COMPONENTS_RULE)
                .then_some(r.docs.as_ref())
                .flatten()
                .and_then(Value::as_object)
        });
        let Some(docs) = docs else {
            return Self::empty();
        };

        let mut entries = BTreeMap::new();
        for (name, doc) in docs {
            match serde_json::from_value::<CatalogEntry>(doc.clone()) {
                Ok(entry) => {
                    entries.insert(name.clone(), entry);
                }
                Err(e) => debug!("Skipping catalog entry '{}': {}", name, e),
            }
        }
        Self { entries }
    }

    /// The single private-component membership test.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CatalogEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One `name: purpose usage` line per documented entry, for prompt embedding.
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .filter(|(_, e)| e.purpose.is_some() || e.usage.is_some())
            .map(|(name, e)| {
                let purpose = e.purpose.as_deref().unwrap_or_default();
                let usage = e.usage.as_ref().map(Usage::joined).unwrap_or_default();
                format!("{name}: {purpose} {usage}").trim_end().to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The entry's documentation without `purpose`/`usage`.
    pub fn query(&self, name: &str) -> Result<Map<String, Value>> {
        self.entries
            .get(name)
            .map(|e| e.extra.clone())
            .ok_or_else(|| DesignError::ComponentNotFound {
                name: name.to_string(),
                available: self.keys().join(", "),
            })
    }

    /// A JSON view of one entry, used when tagging library components.
    pub fn entry_value(&self, name: &str) -> Option<Value> {
        self.entries
            .get(name)
            .and_then(|e| serde_json::to_value(e).ok())
    }
}

/// Search order: explicit override, working dir, parent dir, next to the
/// executable, then the user config dir.
pub fn candidate_paths(override_path: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(p) = override_path {
        paths.push(p.to_path_buf());
    }
    paths.push(PathBuf::from("data").join(CATALOG_FILE));
    paths.push(PathBuf::from("..").join("data").join(CATALOG_FILE));
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf))
    {
        paths.push(exe_dir.join("..").join("data").join(CATALOG_FILE));
    }
    if let Some(cfg) = dirs::config_dir() {
        paths.push(cfg.join("design-planner").join(CATALOG_FILE));
    }
    paths
}
