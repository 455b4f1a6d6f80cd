//! Declaration emission
//!
//! Writes TypeScript declarations into an [`Emitter`]: one per schema, then
//! the auxiliary lookups and the custom attribute types.

use chrono::{DateTime, SecondsFormat, Utc};

use super::emitter::Emitter;
use super::properties::{resolve_properties, CUSTOM_ATTRIBUTES_MAP};
use super::types::BASIC_LINK;
use crate::attributes::{AttributeTypes, CustomAttributeConfiguration};
use crate::error::Result;
use crate::schema::{
    Schema, SchemaCatalog, CUSTOM_ATTRIBUTES, ENTITY_TYPE_PROPERTY, PERMISSIONS_PROPERTY,
    TYPED_CONTEXT,
};

/// Type parameter of the typed context root
const SUBTYPE_PARAM: &str = "K";
const SUBTYPE_MAP: &str = "TypedContextSubtypeMap";
const SUBTYPE: &str = "TypedContextSubtype";

/// Header comment block
pub fn emit_preamble(
    emitter: &mut Emitter,
    generated_at: Option<&DateTime<Utc>>,
    server_version: Option<&str>,
    server_url: Option<&str>,
) {
    if let Some(at) = generated_at {
        emitter.line(format!(
            "// Generated on {} using schema",
            at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ));
    }
    if server_version.is_some() || server_url.is_some() {
        emitter.line(format!(
            "// from an instance running version {} using server on {}",
            server_version.unwrap_or("unknown"),
            server_url.unwrap_or("unknown")
        ));
    }
    emitter.line("// Not intended to modify manually");
    emitter.blank();
}

/// Emit the declaration for one schema. The schema must have an id.
pub fn emit_schema(emitter: &mut Emitter, catalog: &SchemaCatalog<'_>, schema: &Schema) -> Result<()> {
    let id = schema.id().unwrap_or_default();

    if schema.is_typed_context_subtype() {
        emitter.line(format!("export type {} = {}<\"{}\">;", id, TYPED_CONTEXT, id));
        return Ok(());
    }

    let properties = resolve_properties(catalog, schema, emitter.diagnostics_mut())?;

    let name = if schema.is_typed_context() {
        format!("{}<{} extends {} = {}>", id, SUBTYPE_PARAM, SUBTYPE, SUBTYPE)
    } else {
        id.to_string()
    };

    let header = match catalog.base_of(schema).and_then(Schema::id) {
        Some(base_id) => {
            let mut omitted = vec![ENTITY_TYPE_PROPERTY, PERMISSIONS_PROPERTY];
            if catalog.inherited_property_names(schema).contains(CUSTOM_ATTRIBUTES) {
                omitted.push(CUSTOM_ATTRIBUTES);
            }
            let omitted: Vec<String> = omitted.iter().map(|n| format!("\"{}\"", n)).collect();
            format!(
                "export interface {} extends Omit<{}, {}>",
                name,
                base_id,
                omitted.join(" | ")
            )
        }
        None => format!("export interface {}", name),
    };

    emitter.open(header);
    for property in &properties {
        emitter.line(property.render());
    }
    if schema.is_typed_context() {
        emitter.line(format!("{}?: {};", ENTITY_TYPE_PROPERTY, SUBTYPE_PARAM));
    } else {
        emitter.line(format!("{}?: \"{}\";", ENTITY_TYPE_PROPERTY, id));
    }
    emitter.line(format!("{}?: Record<string, any>;", PERMISSIONS_PROPERTY));
    emitter.close("");
    Ok(())
}

/// Link record the server sends for `link` properties
pub fn emit_basic_link(emitter: &mut Emitter) {
    emitter.open(format!("export interface {}", BASIC_LINK));
    emitter.line("id: string;");
    emitter.line("type: string;");
    emitter.line("name: string;");
    emitter.close("");
}

/// `EntityTypeMap` plus the `EntityType` and `EntityData` helpers
pub fn emit_entity_map(emitter: &mut Emitter, ids: &[&str]) {
    emit_identity_map(emitter, "EntityTypeMap", ids);
    emitter.line("export type EntityType = keyof EntityTypeMap;");
    emitter.line(
        "export type EntityData<TEntityType extends EntityType = EntityType> = EntityTypeMap[TEntityType];",
    );
}

/// Lookup over the typed context family members
pub fn emit_subtype_map(emitter: &mut Emitter, ids: &[&str]) {
    emit_identity_map(emitter, SUBTYPE_MAP, ids);
    emitter.line(format!("export type {} = keyof {};", SUBTYPE, SUBTYPE_MAP));
}

fn emit_identity_map(emitter: &mut Emitter, name: &str, ids: &[&str]) {
    emitter.open(format!("export interface {}", name));
    for id in ids {
        emitter.line(format!("{}: {};", id, id));
    }
    emitter.close("");
}

/// Runtime attribute list, per-key value types and the per-schema map
pub fn emit_custom_attributes(
    emitter: &mut Emitter,
    configurations: &[CustomAttributeConfiguration],
    attribute_types: &AttributeTypes<'_>,
    schemas: &[&Schema],
) -> Result<()> {
    emitter.open("export function getAttributeConfigurations()");
    emitter.line("return [");
    emitter.indent();
    for config in configurations {
        emit_runtime_configuration(emitter, config)?;
    }
    emitter.dedent();
    emitter.line("] as const;");
    emitter.close("");

    emitter.line(
        "export type RuntimeCustomAttributeConfiguration = ReturnType<typeof getAttributeConfigurations>[number];",
    );
    emitter.line(
        "export type RuntimeCustomAttributeConfigurationName = RuntimeCustomAttributeConfiguration[\"name\"];",
    );
    emitter.line(
        "export type RuntimeCustomAttributeConfigurationLabel = RuntimeCustomAttributeConfiguration[\"label\"];",
    );

    for key in attribute_types.keys() {
        let Some(value_type) = attribute_types.value_type(key) else {
            continue;
        };
        emitter.open(format!(
            "export type {} = Omit<ContextCustomAttributeValue, \"key\" | \"value\"> &",
            attribute_types.type_name(key)
        ));
        emitter.line(format!("key: {};", serde_json::to_string(key)?));
        emitter.line(format!("value: {};", value_type));
        emitter.close(";");
    }

    emitter.open(format!("export interface {}", CUSTOM_ATTRIBUTES_MAP));
    for schema in schemas {
        let id = schema.id().unwrap_or_default();
        emitter.line(format!("{}: {};", id, attribute_types.schema_type(schema)));
    }
    emitter.close("");
    Ok(())
}

fn emit_runtime_configuration(emitter: &mut Emitter, config: &CustomAttributeConfiguration) -> Result<()> {
    let object_type = match config.object_type_name() {
        Some(name) => serde_json::to_string(name)?,
        None => "undefined".to_string(),
    };

    emitter.open("");
    emitter.line(format!("name: {},", serde_json::to_string(&config.key)?));
    emitter.line(format!("type: {},", serde_json::to_string(&config.value_type.name)?));
    emitter.line(format!("label: {},", serde_json::to_string(&config.label)?));
    emitter.line(format!("entityType: {},", serde_json::to_string(&config.entity_type)?));
    emitter.line(format!("default: {},", serde_json::to_string(&config.default)?));
    emitter.line(format!("objectType: {},", object_type));
    emitter.line(format!("isHierarchical: {},", config.is_hierarchical));
    emitter.close(",");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn schemas(value: serde_json::Value) -> Vec<Schema> {
        serde_json::from_value(value).unwrap()
    }

    fn render(f: impl FnOnce(&mut Emitter)) -> String {
        let mut emitter = Emitter::new();
        f(&mut emitter);
        emitter.finish().0
    }

    #[test]
    fn test_preamble() {
        let at = Utc.with_ymd_and_hms(2023, 2, 1, 0, 0, 0).unwrap();
        let text = render(|e| emit_preamble(e, Some(&at), Some("4.13.8"), Some("https://example.com")));
        assert_eq!(
            text,
            "// Generated on 2023-02-01T00:00:00.000Z using schema\n\
             // from an instance running version 4.13.8 using server on https://example.com\n\
             // Not intended to modify manually\n\n"
        );

        let bare = render(|e| emit_preamble(e, None, None, None));
        assert_eq!(bare, "// Not intended to modify manually\n\n");
    }

    #[test]
    fn test_subtype_is_alias() {
        let all = schemas(json!([
            {"id": "TypedContext", "properties": {}},
            {"id": "Shot", "alias_for": {"id": "Task"}, "properties": {"fps": {"type": "number"}}}
        ]));
        let catalog = SchemaCatalog::new(&all);
        let text = render(|e| emit_schema(e, &catalog, &all[1]).unwrap());
        assert_eq!(text, "export type Shot = TypedContext<\"Shot\">;\n");
    }

    #[test]
    fn test_root_is_generic() {
        let all = schemas(json!([
            {"id": "TypedContext", "properties": {"name": {"type": "string"}}}
        ]));
        let catalog = SchemaCatalog::new(&all);
        let text = render(|e| emit_schema(e, &catalog, &all[0]).unwrap());
        assert_eq!(
            text,
            "export interface TypedContext<K extends TypedContextSubtype = TypedContextSubtype> {\n  \
             name?: string;\n  \
             __entity_type__?: K;\n  \
             __permissions?: Record<string, any>;\n\
             }\n"
        );
    }

    #[test]
    fn test_extends_base_with_omit() {
        let all = schemas(json!([
            {"id": "Base", "properties": {"custom_attributes": {"type": "array", "items": {"$ref": "V"}}, "a": {"type": "string"}}},
            {"id": "Child", "$mixin": {"$ref": "Base"}, "properties": {"a": {"type": "string"}, "b": {"type": "integer"}}}
        ]));
        let catalog = SchemaCatalog::new(&all);
        let text = render(|e| emit_schema(e, &catalog, &all[1]).unwrap());
        assert_eq!(
            text,
            "export interface Child extends Omit<Base, \"__entity_type__\" | \"__permissions\" | \"custom_attributes\"> {\n  \
             b?: number;\n  \
             __entity_type__?: \"Child\";\n  \
             __permissions?: Record<string, any>;\n\
             }\n"
        );
    }

    #[test]
    fn test_entity_and_subtype_maps() {
        let text = render(|e| {
            emit_entity_map(e, &["Note", "User"]);
            emit_subtype_map(e, &["Shot"]);
        });
        assert!(text.contains("export interface EntityTypeMap {\n  Note: Note;\n  User: User;\n}\n"));
        assert!(text.contains("export type EntityType = keyof EntityTypeMap;"));
        assert!(text.contains("export interface TypedContextSubtypeMap {\n  Shot: Shot;\n}\n"));
        assert!(text.contains("export type TypedContextSubtype = keyof TypedContextSubtypeMap;"));
    }

    #[test]
    fn test_custom_attribute_declarations() {
        let configs: Vec<CustomAttributeConfiguration> = serde_json::from_value(json!([
            {"key": "status", "label": "Status", "entity_type": "task", "type": {"name": "text"}, "default": "", "object_type": {"name": "Shot"}},
            {"key": "status", "label": "Status", "entity_type": "show", "type": {"name": "enumerator"}, "default": ["a"]}
        ]))
        .unwrap();
        let all = schemas(json!([
            {"id": "Shot", "alias_for": {"id": "Task"}},
            {"id": "User"}
        ]));
        let types = AttributeTypes::derive(&configs);
        let refs: Vec<&Schema> = all.iter().collect();
        let text = render(|e| emit_custom_attributes(e, &configs, &types, &refs).unwrap());

        assert!(text.contains("      name: \"status\",\n"));
        assert!(text.contains("      objectType: \"Shot\",\n"));
        assert!(text.contains("      objectType: undefined,\n"));
        assert!(text.contains("      default: [\"a\"],\n"));
        assert!(text.contains(
            "export type CustomAttributeValue_status = Omit<ContextCustomAttributeValue, \"key\" | \"value\"> & {\n  \
             key: \"status\";\n  \
             value: string | string[];\n\
             };\n"
        ));
        assert!(text.contains(
            "export interface TypedContextCustomAttributesMap {\n  \
             Shot: CustomAttributeValue_status;\n  \
             User: never;\n\
             }\n"
        ));
    }
}
