//! Property Resolution
//!
//! Produces the ordered list of properties one schema declares itself:
//! deprecated names dropped, inherited names suppressed, each property
//! typed and tagged with its modifiers.

use std::collections::HashSet;

use tracing::warn;

use super::types::{map_property, TsType};
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::schema::{
    is_deprecated_property, PropertyDescriptor, Schema, SchemaCatalog, CUSTOM_ATTRIBUTES,
};

/// Name of the generated per-schema custom attribute lookup
pub const CUSTOM_ATTRIBUTES_MAP: &str = "TypedContextCustomAttributesMap";

/// One property ready for emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProperty {
    pub name: String,
    pub ty: TsType,
    pub readonly: bool,
    pub optional: bool,
}

impl ResolvedProperty {
    /// `readonly name?: type;`
    pub fn render(&self) -> String {
        format!(
            "{}{}{}: {};",
            if self.readonly { "readonly " } else { "" },
            self.name,
            if self.optional { "?" } else { "" },
            self.ty
        )
    }
}

/// Property names a schema inherits and must not redeclare.
///
/// Typed context subtypes inherit from the root; everything else
/// (the root included) inherits from its whole `$mixin` chain.
pub fn inherited_names<'a>(catalog: &SchemaCatalog<'a>, schema: &Schema) -> HashSet<&'a str> {
    if schema.is_typed_context_subtype() {
        if let Some(root) = catalog.typed_context() {
            return root.properties.keys().map(String::as_str).collect();
        }
    }
    catalog.inherited_property_names(schema)
}

/// Narrowed type of the `custom_attributes` collection for `schema`
pub fn custom_attributes_type(schema: &Schema) -> TsType {
    let key = if schema.is_typed_context() {
        "K".to_string()
    } else {
        format!("\"{}\"", schema.id().unwrap_or_default())
    };
    TsType::named(format!("Array<{}[{}]>", CUSTOM_ATTRIBUTES_MAP, key))
}

/// Resolve the properties `schema` declares itself, sorted by name.
///
/// Untyped properties are reported to `diagnostics` and skipped; malformed
/// descriptors and vocabulary violations abort with an error.
pub fn resolve_properties(
    catalog: &SchemaCatalog<'_>,
    schema: &Schema,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ResolvedProperty>> {
    let schema_id = schema.id().unwrap_or_default();
    let inherited = inherited_names(catalog, schema);

    let mut candidates: Vec<(&String, &serde_json::Value)> = schema
        .properties
        .iter()
        .filter(|(name, _)| !is_deprecated_property(name))
        .filter(|(name, _)| name.as_str() == CUSTOM_ATTRIBUTES || !inherited.contains(name.as_str()))
        .collect();
    candidates.sort_by(|a, b| a.0.cmp(b.0));

    let mut resolved = Vec::with_capacity(candidates.len());
    for (name, value) in candidates {
        let descriptor = PropertyDescriptor::parse(schema_id, name, value)?;
        let ty = if name == CUSTOM_ATTRIBUTES {
            custom_attributes_type(schema)
        } else {
            match map_property(name, &descriptor) {
                Some(ty) => ty,
                None => {
                    warn!(schema = schema_id, property = %name, "property has no type or $ref");
                    diagnostics.untyped_property(schema_id, name);
                    continue;
                }
            }
        };

        resolved.push(ResolvedProperty {
            name: name.clone(),
            ty,
            readonly: schema.is_immutable(name),
            optional: !schema.is_required(name),
        });
    }

    Ok(resolved)
}
