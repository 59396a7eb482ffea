//! Domain-specific error types for design-planner

use serde_json::json;
use thiserror::Error;

use crate::clients::GenerationError;

/// Main error type for the design-planner MCP server
#[derive(Error, Debug)]
pub enum DesignError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Generation error: {message}")]
    Generation { message: String },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("Catalog load error: {message}")]
    CatalogLoad { message: String },

    #[error("Component '{name}' not found. Available components: {available}")]
    ComponentNotFound { name: String, available: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("MCP protocol error: {message}")]
    Mcp { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DesignError {
    pub fn validation(message: impl Into<String>) -> Self {
        DesignError::Validation {
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DesignError {
    fn from(err: anyhow::Error) -> Self {
        DesignError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DesignError {
    fn from(err: serde_json::Error) -> Self {
        DesignError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<GenerationError> for DesignError {
    fn from(err: GenerationError) -> Self {
        DesignError::Generation {
            message: err.to_string(),
        }
    }
}

impl From<rmcp::ErrorData> for DesignError {
    fn from(err: rmcp::ErrorData) -> Self {
        DesignError::Mcp {
            message: err.message.to_string(),
        }
    }
}

/// Convert DesignError to MCP error
impl From<DesignError> for rmcp::ErrorData {
    fn from(err: DesignError) -> Self {
        let code = match &err {
            DesignError::Config { .. }
            | DesignError::Validation { .. }
            | DesignError::ComponentNotFound { .. }
            | DesignError::Mcp { .. } => rmcp::model::ErrorCode::INVALID_PARAMS,
            DesignError::Generation { .. }
            | DesignError::Parse { .. }
            | DesignError::CatalogLoad { .. }
            | DesignError::Serialization { .. }
            | DesignError::Internal { .. } => rmcp::model::ErrorCode::INTERNAL_ERROR,
        };
        let details = err.to_string();

        rmcp::ErrorData {
            code,
            message: details.clone().into(),
            data: Some(json!({ "details": details })),
        }
    }
}

/// Result type alias for design-planner operations
pub type Result<T> = std::result::Result<T, DesignError>;
