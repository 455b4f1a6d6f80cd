//! Code Generation
//!
//! Translates a schema catalog plus a custom attribute catalog into one
//! TypeScript source text.
//!
//! Architecture:
//! - SchemaCatalog: id-indexed, read-only lookup over the input schemas
//! - Emitter: run-scoped buffer threaded through every emission step
//! - declarations: per-schema and auxiliary declaration writers
//!
//! A run either completes, with recoverable diagnostics echoed at the end
//! of the artifact, or aborts on the first fatal error.

pub mod declarations;
pub mod emitter;
pub mod properties;
pub mod types;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::attributes::{AttributeTypes, CustomAttributeConfiguration};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::schema::{Schema, SchemaCatalog};

use emitter::Emitter;

/// Schemas the server still reports but that are not generated by default
pub const LEGACY_SCHEMAS: &[&str] = &["Conversation", "Message", "Participant"];

// =============================================================================
// Options
// =============================================================================

/// Per-run inputs besides the two catalogs
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Server version echoed into the header
    pub server_version: Option<String>,
    /// Server URL echoed into the header
    pub server_url: Option<String>,
    /// Timestamp for the header; `None` keeps the output reproducible
    pub generated_at: Option<DateTime<Utc>>,
    /// Schema ids to leave out entirely
    pub skip_schemas: Vec<String>,
}

impl GenerateOptions {
    /// Options that skip the [`LEGACY_SCHEMAS`]
    pub fn with_legacy_skipped() -> Self {
        Self {
            skip_schemas: LEGACY_SCHEMAS.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn skips(&self, id: &str) -> bool {
        self.skip_schemas.iter().any(|s| s == id)
    }
}

// =============================================================================
// Generated Output
// =============================================================================

/// Output from one generation run
#[derive(Debug, Clone)]
pub struct GenerateOutput {
    /// Generated TypeScript source; empty when nothing could be generated
    pub artifact: String,
    /// Recoverable error messages, in the order they were found
    pub errors: Vec<String>,
    /// The same errors with codes and schema ids
    pub diagnostics: Diagnostics,
    /// Number of schema declarations emitted
    pub schema_count: usize,
}

impl GenerateOutput {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// =============================================================================
// Generator
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Run the whole translation.
    ///
    /// Returns `Err` only for fatal catalog contract violations. An empty
    /// schema catalog yields an empty artifact with a single error.
    pub fn generate(
        &self,
        schemas: &[Schema],
        custom_attributes: &[CustomAttributeConfiguration],
    ) -> Result<GenerateOutput> {
        if schemas.is_empty() {
            let mut diagnostics = Diagnostics::new();
            diagnostics.no_schemas();
            warn!("no schemas found");
            return Ok(GenerateOutput {
                artifact: String::new(),
                errors: diagnostics.messages(),
                diagnostics,
                schema_count: 0,
            });
        }

        let catalog = SchemaCatalog::new(schemas);
        let mut emitter = Emitter::new();

        declarations::emit_preamble(
            &mut emitter,
            self.options.generated_at.as_ref(),
            self.options.server_version.as_deref(),
            self.options.server_url.as_deref(),
        );

        let mut emitted: Vec<&Schema> = Vec::with_capacity(schemas.len());
        for schema in catalog.schemas() {
            let Some(id) = schema.id() else {
                warn!("schema without id skipped");
                emitter.diagnostics_mut().missing_schema_id();
                continue;
            };
            if self.options.skips(id) {
                debug!(schema = id, "skipping legacy schema");
                continue;
            }

            debug!(schema = id, "emitting schema");
            declarations::emit_schema(&mut emitter, &catalog, schema)?;
            emitter.blank();
            emitted.push(schema);
        }

        declarations::emit_basic_link(&mut emitter);
        emitter.blank();

        let ids: Vec<&str> = emitted.iter().filter_map(|s| s.id()).collect();
        declarations::emit_entity_map(&mut emitter, &ids);
        emitter.blank();

        let subtype_ids: Vec<&str> = emitted
            .iter()
            .filter(|s| s.is_typed_context_member())
            .filter_map(|s| s.id())
            .collect();
        declarations::emit_subtype_map(&mut emitter, &subtype_ids);
        emitter.blank();

        let attribute_types = AttributeTypes::derive(custom_attributes);
        declarations::emit_custom_attributes(&mut emitter, custom_attributes, &attribute_types, &emitted)?;

        let (artifact, diagnostics) = emitter.finish();
        info!(
            schemas = emitted.len(),
            attributes = attribute_types.keys().len(),
            errors = diagnostics.len(),
            "generation finished"
        );

        Ok(GenerateOutput {
            artifact,
            errors: diagnostics.messages(),
            diagnostics,
            schema_count: emitted.len(),
        })
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Generate with default options (no header timestamp, nothing skipped)
pub fn generate(
    schemas: &[Schema],
    custom_attributes: &[CustomAttributeConfiguration],
) -> Result<GenerateOutput> {
    Generator::default().generate(schemas, custom_attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schemas(value: serde_json::Value) -> Vec<Schema> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_skipped_schemas_leave_no_trace() {
        let all = schemas(json!([
            {"id": "Message", "properties": {"text": {"type": "string"}}},
            {"id": "User", "properties": {"name": {"type": "string"}}}
        ]));
        let output = Generator::new(GenerateOptions::with_legacy_skipped())
            .generate(&all, &[])
            .unwrap();
        assert_eq!(output.schema_count, 1);
        assert!(!output.artifact.contains("Message"));
    }

    #[test]
    fn test_subtype_map_lists_family_only() {
        let all = schemas(json!([
            {"id": "Shot", "alias_for": {"id": "Task"}},
            {"id": "TypedContext", "properties": {}},
            {"id": "User", "properties": {}}
        ]));
        let output = generate(&all, &[]).unwrap();
        assert!(output
            .artifact
            .contains("export interface TypedContextSubtypeMap {\n  Shot: Shot;\n  TypedContext: TypedContext;\n}\n"));
    }

    #[test]
    fn test_options_default_skips_nothing() {
        let options = GenerateOptions::default();
        assert!(!options.skips("Conversation"));
        assert!(GenerateOptions::with_legacy_skipped().skips("Conversation"));
    }
}
