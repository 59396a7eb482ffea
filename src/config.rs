use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_LOG_LEVEL: &str = "design_planner=info,rmcp=info";
const MAX_RETRIES_CEILING: u32 = 10;

/// Main configuration structure loaded from design_planner.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub models: ModelConfig,
    pub complexity: ComplexityConfig,
    pub catalog: CatalogConfig,
    /// Runtime configuration loaded from environment variables
    #[serde(skip)]
    pub runtime: RuntimeConfig,
}

/// Outbound text-generation endpoint (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.2,
        }
    }
}

/// Model choice per pipeline purpose
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Complexity estimation and smart strategy analysis
    pub analysis: String,
    /// Per-block component design
    pub design: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            analysis: "gpt-4o-mini".to_string(),
            design: "gpt-4o".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ComplexityConfig {
    pub use_ai: bool,
    pub max_retries: u32,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            use_ai: true,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Explicit catalog file; searched before the built-in candidate locations
    pub path: Option<PathBuf>,
}

/// Runtime configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub api_key: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_key: None,
        }
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables
    pub fn load_from_env(generation: &GenerationConfig) -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string()),
            api_key: std::env::var(&generation.api_key_env).ok(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses DESIGN_PLANNER_CONFIG environment variable or defaults to "design_planner.toml"
    pub fn load() -> anyhow::Result<Self> {
        // Env files: DESIGN_ENV_FILE if set, else ./.env then ../.env
        if let Ok(env_path) = std::env::var("DESIGN_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
            let _ = dotenvy::from_path("../.env");
        }

        let config_path = std::env::var("DESIGN_PLANNER_CONFIG")
            .unwrap_or_else(|_| "design_planner.toml".to_string());

        let mut config: Config = if let Ok(content) = std::fs::read_to_string(&config_path) {
            toml::from_str(&content)?
        } else {
            tracing::warn!("Config file {} not found, using defaults", config_path);
            Self::default()
        };

        config.apply_env_overrides();
        config.runtime = RuntimeConfig::load_from_env(&config.generation);
        config.validate();

        Ok(config)
    }

    /// Parse a TOML document and apply validation, without touching the environment.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DESIGN_GENERATION_BASE_URL") {
            self.generation.base_url = url;
        }
        if let Ok(model) = std::env::var("DESIGN_ANALYSIS_MODEL") {
            self.models.analysis = model;
        }
        if let Ok(model) = std::env::var("DESIGN_DESIGN_MODEL") {
            self.models.design = model;
        }
        if let Ok(use_ai) = std::env::var("DESIGN_COMPLEXITY_USE_AI") {
            if use_ai == "0" || use_ai.eq_ignore_ascii_case("false") {
                self.complexity.use_ai = false;
            } else if use_ai == "1" || use_ai.eq_ignore_ascii_case("true") {
                self.complexity.use_ai = true;
            }
        }
        if let Some(retries) = std::env::var("DESIGN_COMPLEXITY_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            self.complexity.max_retries = retries;
        }
        if let Ok(path) = std::env::var("DESIGN_CATALOG_PATH") {
            tracing::debug!("DESIGN_CATALOG_PATH env override applied");
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    /// Clamp out-of-range values, warning instead of failing.
    fn validate(&mut self) {
        if self.complexity.max_retries == 0 {
            tracing::warn!("complexity.max_retries 0 is below min 1, clamping to 1");
            self.complexity.max_retries = 1;
        } else if self.complexity.max_retries > MAX_RETRIES_CEILING {
            tracing::warn!(
                "complexity.max_retries {} exceeds max {}, clamping",
                self.complexity.max_retries,
                MAX_RETRIES_CEILING
            );
            self.complexity.max_retries = MAX_RETRIES_CEILING;
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            tracing::warn!(
                "generation.temperature {} out of range 0.0-2.0, resetting to 0.2",
                self.generation.temperature
            );
            self.generation.temperature = 0.2;
        }

        if !self.generation.base_url.starts_with("http://")
            && !self.generation.base_url.starts_with("https://")
        {
            tracing::warn!(
                "Generation base URL '{}' doesn't start with http:// or https://",
                self.generation.base_url
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_missing() {
        let config = Config::from_toml_str("").unwrap();
        assert!(config.complexity.use_ai);
        assert_eq!(config.complexity.max_retries, 3);
        assert_eq!(config.generation.api_key_env, "OPENAI_API_KEY");
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn retries_are_clamped() {
        let config = Config::from_toml_str("[complexity]\nmax_retries = 99\n").unwrap();
        assert_eq!(config.complexity.max_retries, 10);

        let config = Config::from_toml_str("[complexity]\nmax_retries = 0\n").unwrap();
        assert_eq!(config.complexity.max_retries, 1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml_str(
            "[models]\ndesign = \"claude-sonnet\"\n[catalog]\npath = \"/tmp/codegens.json\"\n",
        )
        .unwrap();
        assert_eq!(config.models.design, "claude-sonnet");
        assert_eq!(config.models.analysis, "gpt-4o-mini");
        assert_eq!(
            config.catalog.path.as_deref(),
            Some(std::path::Path::new("/tmp/codegens.json"))
        );
    }

    #[test]
    fn bad_temperature_resets() {
        let config = Config::from_toml_str("[generation]\ntemperature = 7.5\n").unwrap();
        assert_eq!(config.generation.temperature, 0.2);
    }
}
