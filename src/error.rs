//! Error types for type generation
//!
//! Everything in here aborts a run. Recoverable problems are reported
//! through [`crate::diagnostics::Diagnostics`] instead.

use thiserror::Error;

/// Result type for typegen operations
pub type Result<T> = std::result::Result<T, TypegenError>;

/// Fatal typegen errors
#[derive(Error, Debug)]
pub enum TypegenError {
    #[error("Invalid type {type_name} for property {property} in schema {schema}")]
    InvalidType {
        schema: String,
        property: String,
        type_name: String,
    },

    #[error("No items defined for array {property} in schema {schema}")]
    MissingItems { schema: String, property: String },

    #[error("Property {property} in schema {schema} is not an object")]
    MalformedProperty { schema: String, property: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl TypegenError {
    /// Whether the error comes from the catalog contents rather than I/O
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::InvalidType { .. } | Self::MissingItems { .. } | Self::MalformedProperty { .. }
        )
    }
}
