//! Schema Typegen
//!
//! Generates TypeScript declarations for every entity type a server
//! describes in its schema catalog, plus typed custom attribute values.
//!
//! ## Features
//!
//! - **Inheritance**: `$mixin` bases become `extends Omit<Base, ...>` clauses
//! - **Typed context family**: one generic `TypedContext<K>` aliased by every subtype
//! - **Custom attributes**: per-key value unions and a per-schema lookup map
//! - **Error collection**: recoverable problems are reported alongside the output
//!
//! ## Pipeline
//!
//! ```text
//! query_schemas.json ──┐
//!                      ├─> SchemaCatalog ─> codegen::generate ─> schema.ts
//! custom attributes ───┘                        │
//!                                               └─> errors
//! ```

pub mod attributes;
pub mod catalog;
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod schema;

pub use attributes::{AttributeTypes, CustomAttributeConfiguration};
pub use catalog::{Catalog, CatalogSource, FileCatalog};
pub use codegen::{generate, GenerateOptions, GenerateOutput, Generator};
pub use config::TypegenConfig;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Result, TypegenError};
pub use schema::{PropertyDescriptor, Schema, SchemaCatalog};
