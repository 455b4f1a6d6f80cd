//! Configuration management for the generator CLI
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (typegen.toml)
//! - Environment variables (TYPEGEN__*)
//!
//! ## Example config file (typegen.toml):
//! ```toml
//! [server]
//! url = "https://example.ftrackapp.com"
//! version = "4.13.8"
//!
//! [input]
//! schemas = "responses/query_schemas.json"
//! custom_attributes = "responses/query_custom_attribute_configurations.json"
//!
//! [output]
//! path = "__generated__"
//! filename = "schema.ts"
//!
//! [generation]
//! legacy_schemas = ["Conversation", "Message", "Participant"]
//! timestamp = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codegen::{GenerateOptions, LEGACY_SCHEMAS};

/// Main configuration for the generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypegenConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Server the catalogs were taken from, echoed into the header
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub version: Option<String>,
}

/// Saved catalog responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_schemas_path")]
    pub schemas: PathBuf,

    #[serde(default)]
    pub custom_attributes: Option<PathBuf>,
}

/// Where the artifact is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    #[serde(default = "default_output_filename")]
    pub filename: String,
}

/// Generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Schema ids left out of the output
    #[serde(default = "default_legacy_schemas")]
    pub legacy_schemas: Vec<String>,

    /// Stamp the header with the generation time
    #[serde(default = "default_true")]
    pub timestamp: bool,
}

// Default value functions
fn default_schemas_path() -> PathBuf {
    PathBuf::from("query_schemas.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("__generated__")
}

fn default_output_filename() -> String {
    "schema.ts".to_string()
}

fn default_legacy_schemas() -> Vec<String> {
    LEGACY_SCHEMAS.iter().map(|s| s.to_string()).collect()
}

fn default_true() -> bool {
    true
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            schemas: default_schemas_path(),
            custom_attributes: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_output_filename(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            legacy_schemas: default_legacy_schemas(),
            timestamp: true,
        }
    }
}

impl TypegenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["typegen.toml", ".typegen.toml", "config/typegen.toml"];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "ftrack", "typegen") {
            let xdg_config = config_dir.config_dir().join("typegen.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // TYPEGEN__SERVER__URL, TYPEGEN__OUTPUT__PATH, ...
        builder = builder.add_source(
            Environment::with_prefix("TYPEGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Full path of the generated file
    pub fn output_file(&self) -> PathBuf {
        self.output.path.join(&self.output.filename)
    }

    /// Engine options for this configuration, stamped with `now` when
    /// timestamps are enabled
    pub fn generate_options(&self, now: chrono::DateTime<chrono::Utc>) -> GenerateOptions {
        GenerateOptions {
            server_version: self.server.version.clone(),
            server_url: self.server.url.clone(),
            generated_at: self.generation.timestamp.then_some(now),
            skip_schemas: self.generation.legacy_schemas.clone(),
        }
    }
}
