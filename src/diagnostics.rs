//! Diagnostics
//!
//! Collects recoverable problems found while generating. A run with
//! diagnostics still produces output; the messages are echoed at the end
//! of the artifact and returned to the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Schema has no id; it is skipped
    MissingSchemaId,
    /// Property has neither `$ref` nor `type`; it is skipped
    UntypedProperty,
    /// The schema catalog is empty; nothing is generated
    NoSchemas,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingSchemaId => "W001",
            Self::UntypedProperty => "W002",
            Self::NoSchemas => "E001",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::NoSchemas => Severity::Error,
            Self::MissingSchemaId | Self::UntypedProperty => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Schema that caused this diagnostic (empty when unknown)
    pub schema_id: String,
    pub code: DiagnosticCode,
    /// Human-readable message, as echoed into the artifact
    pub message: String,
}

impl DiagnosticItem {
    pub fn new(schema_id: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            code,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.code.severity(), self.message)
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Ordered collection of diagnostics from one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Schema without an id
    pub fn missing_schema_id(&mut self) {
        self.push(DiagnosticItem::new(
            "",
            DiagnosticCode::MissingSchemaId,
            "No id defined for schema",
        ));
    }

    /// Property without `$ref` or `type`
    pub fn untyped_property(&mut self, schema_id: &str, property: &str) {
        self.push(DiagnosticItem::new(
            schema_id,
            DiagnosticCode::UntypedProperty,
            format!("No type or $ref defined for property {} in schema {}", property, schema_id),
        ));
    }

    /// Empty schema catalog
    pub fn no_schemas(&mut self) {
        self.push(DiagnosticItem::new("", DiagnosticCode::NoSchemas, "No schemas found!"));
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Plain messages in the order they were recorded
    pub fn messages(&self) -> Vec<String> {
        self.items.iter().map(|i| i.message.clone()).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::NoSchemas.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::UntypedProperty.severity(), Severity::Warning);
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.untyped_property("User", "email");
        diags.missing_schema_id();

        assert_eq!(diags.len(), 2);
        assert!(!diags.has_errors());
        assert_eq!(
            diags.messages(),
            vec![
                "No type or $ref defined for property email in schema User".to_string(),
                "No id defined for schema".to_string(),
            ]
        );
        assert_eq!(diags.all()[0].schema_id, "User");
    }

    #[test]
    fn test_display_includes_code() {
        let mut diags = Diagnostics::new();
        diags.no_schemas();
        assert!(diags.has_errors());
        assert_eq!(diags.to_string(), "[E001] error: No schemas found!\n");
    }
}
