//! Custom attribute configurations
//!
//! Models the server's `CustomAttributeConfiguration` records and derives
//! the value types the generated code uses for `custom_attributes`:
//! one union per distinct key, and per schema the set of keys that apply.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::codegen::types::TsType;
use crate::schema::{Schema, CUSTOM_ATTRIBUTES};

/// Entity type of project-level attributes
pub const SHOW_ENTITY_TYPE: &str = "show";

/// Prefix of the per-key value type declarations
pub const VALUE_TYPE_PREFIX: &str = "CustomAttributeValue_";

/// `{"name": "..."}` reference used for `object_type` and `type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

/// One attribute definable on entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttributeConfiguration {
    pub key: String,

    #[serde(default)]
    pub label: String,

    /// Coarse owner category (`task`, `show`, `user`, ...)
    #[serde(default)]
    pub entity_type: String,

    /// Specific owner type, when the attribute is bound to one object type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<NamedRef>,

    #[serde(default)]
    pub is_hierarchical: bool,

    #[serde(rename = "type")]
    pub value_type: NamedRef,

    #[serde(default)]
    pub default: serde_json::Value,
}

impl CustomAttributeConfiguration {
    pub fn object_type_name(&self) -> Option<&str> {
        self.object_type.as_ref().map(|o| o.name.as_str())
    }

    /// TypeScript type of this attribute's value
    pub fn value_ts_type(&self) -> TsType {
        map_value_type(&self.value_type.name)
    }

    /// Whether this configuration applies to `schema`
    pub fn applies_to(&self, schema: &Schema) -> bool {
        if self.is_hierarchical && is_context_bearing(schema) {
            return true;
        }

        let Some(id) = schema.id() else {
            return false;
        };
        if self.object_type_name() == Some(id) {
            return true;
        }

        self.entity_type == SHOW_ENTITY_TYPE
            && schema
                .alias_target()
                .is_some_and(|target| target.to_lowercase() == SHOW_ENTITY_TYPE)
    }
}

/// Map an attribute value kind onto a TypeScript type; unknown kinds pass
/// through as type names.
pub fn map_value_type(kind: &str) -> TsType {
    match kind {
        "date" | "text" | "url" | "expression" => TsType::string(),
        "enumerator" | "dynamic enumerator" => TsType::array_of(TsType::string()),
        other => TsType::named(other),
    }
}

/// Schemas that can carry custom attributes: the typed context family and
/// anything declaring a `custom_attributes` collection.
pub fn is_context_bearing(schema: &Schema) -> bool {
    schema.is_typed_context_member() || schema.has_property(CUSTOM_ATTRIBUTES)
}

/// Value type name for `key` with non-identifier characters replaced.
/// Distinct keys may sanitise to the same name; [`AttributeTypes`]
/// disambiguates those.
pub fn value_type_name(key: &str) -> String {
    static NON_IDENT: OnceLock<Regex> = OnceLock::new();
    let re = NON_IDENT.get_or_init(|| Regex::new(r"[^A-Za-z0-9_$]").expect("valid pattern"));
    format!("{}{}", VALUE_TYPE_PREFIX, re.replace_all(key, "_"))
}

// =============================================================================
// Derived types
// =============================================================================

/// Per-key value unions, in first-seen key order
#[derive(Debug, Clone, Default)]
pub struct AttributeTypes<'a> {
    configurations: &'a [CustomAttributeConfiguration],
    keys: Vec<&'a str>,
    unions: HashMap<&'a str, TsType>,
    names: HashMap<&'a str, String>,
}

impl<'a> AttributeTypes<'a> {
    /// Group configurations by key and union their value types
    pub fn derive(configurations: &'a [CustomAttributeConfiguration]) -> Self {
        let mut keys: Vec<&'a str> = Vec::new();
        let mut members: HashMap<&'a str, Vec<TsType>> = HashMap::new();

        for config in configurations {
            let key = config.key.as_str();
            if !members.contains_key(key) {
                keys.push(key);
            }
            members.entry(key).or_default().push(config.value_ts_type());
        }

        let unions = members
            .into_iter()
            .map(|(key, types)| (key, TsType::union_of(types)))
            .collect();

        let names = unique_type_names(&keys);

        Self {
            configurations,
            keys,
            unions,
            names,
        }
    }

    /// Distinct keys in first-seen order
    pub fn keys(&self) -> &[&'a str] {
        &self.keys
    }

    /// Union of value types for `key`
    pub fn value_type(&self, key: &str) -> Option<&TsType> {
        self.unions.get(key)
    }

    /// Declared type name for `key`, unique across all keys
    pub fn type_name(&self, key: &str) -> String {
        self.names
            .get(key)
            .cloned()
            .unwrap_or_else(|| value_type_name(key))
    }

    /// Keys with at least one configuration applying to `schema`
    pub fn applicable_keys(&self, schema: &Schema) -> Vec<&'a str> {
        let mut keys: Vec<&'a str> = Vec::new();
        for config in self.configurations {
            let key = config.key.as_str();
            if !keys.contains(&key) && config.applies_to(schema) {
                keys.push(key);
            }
        }
        keys
    }

    /// Discriminated union of the value types applicable to `schema`,
    /// `never` when nothing applies
    pub fn schema_type(&self, schema: &Schema) -> TsType {
        TsType::union_of(
            self.applicable_keys(schema)
                .into_iter()
                .map(|key| TsType::named(self.type_name(key))),
        )
    }
}

/// Sanitised names in key order; a name already taken gets a `_2`, `_3`, ...
/// suffix
fn unique_type_names<'a>(keys: &[&'a str]) -> HashMap<&'a str, String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = HashMap::with_capacity(keys.len());

    for &key in keys {
        let base = value_type_name(key);
        let mut name = base.clone();
        let mut suffix = 2;
        while !taken.insert(name.clone()) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }
        if name != base {
            warn!(key, name = %name, "custom attribute key collides with another after sanitising");
        }
        names.insert(key, name);
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: serde_json::Value) -> CustomAttributeConfiguration {
        serde_json::from_value(value).unwrap()
    }

    fn schema(value: serde_json::Value) -> Schema {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_value_type_mapping() {
        assert_eq!(map_value_type("date").to_string(), "string");
        assert_eq!(map_value_type("text").to_string(), "string");
        assert_eq!(map_value_type("url").to_string(), "string");
        assert_eq!(map_value_type("expression").to_string(), "string");
        assert_eq!(map_value_type("enumerator").to_string(), "string[]");
        assert_eq!(map_value_type("dynamic enumerator").to_string(), "string[]");
        assert_eq!(map_value_type("number").to_string(), "number");
        assert_eq!(map_value_type("boolean").to_string(), "boolean");
    }

    #[test]
    fn test_shared_key_union() {
        let configs = vec![
            config(json!({"key": "status", "type": {"name": "text"}, "entity_type": "task"})),
            config(json!({"key": "fps", "type": {"name": "number"}, "entity_type": "task"})),
            config(json!({"key": "status", "type": {"name": "enumerator"}, "entity_type": "show"})),
            config(json!({"key": "status", "type": {"name": "url"}, "entity_type": "asset"})),
        ];
        let types = AttributeTypes::derive(&configs);
        assert_eq!(types.keys(), &["status", "fps"]);
        assert_eq!(types.value_type("status").unwrap().to_string(), "string | string[]");
        assert_eq!(types.value_type("fps").unwrap().to_string(), "number");
        assert!(types.value_type("missing").is_none());
    }

    #[test]
    fn test_applicability_rules() {
        let hierarchical = config(json!({"key": "h", "type": {"name": "text"}, "is_hierarchical": true}));
        let bound = config(json!({"key": "b", "type": {"name": "text"}, "object_type": {"name": "Shot"}}));
        let show = config(json!({"key": "s", "type": {"name": "text"}, "entity_type": "show"}));

        let shot = schema(json!({"id": "Shot", "alias_for": {"id": "Task"}}));
        let project = schema(json!({"id": "Project", "alias_for": "Show", "properties": {"custom_attributes": {}}}));
        let user = schema(json!({"id": "User", "properties": {"name": {"type": "string"}}}));

        assert!(hierarchical.applies_to(&shot));
        assert!(hierarchical.applies_to(&project));
        assert!(!hierarchical.applies_to(&user));

        assert!(bound.applies_to(&shot));
        assert!(!bound.applies_to(&project));

        assert!(show.applies_to(&project));
        assert!(!show.applies_to(&shot));
        assert!(!show.applies_to(&user));
    }

    #[test]
    fn test_schema_type() {
        let configs = vec![
            config(json!({"key": "a", "type": {"name": "text"}, "is_hierarchical": true})),
            config(json!({"key": "b", "type": {"name": "text"}, "object_type": {"name": "Shot"}})),
            config(json!({"key": "a", "type": {"name": "date"}, "object_type": {"name": "Shot"}})),
        ];
        let types = AttributeTypes::derive(&configs);

        let shot = schema(json!({"id": "Shot", "alias_for": {"id": "Task"}}));
        assert_eq!(types.applicable_keys(&shot), vec!["a", "b"]);
        assert_eq!(
            types.schema_type(&shot).to_string(),
            "CustomAttributeValue_a | CustomAttributeValue_b"
        );

        let user = schema(json!({"id": "User"}));
        assert_eq!(types.schema_type(&user).to_string(), "never");
    }

    #[test]
    fn test_colliding_keys_get_distinct_names() {
        let configs = vec![
            config(json!({"key": "a_b", "type": {"name": "text"}, "object_type": {"name": "Shot"}})),
            config(json!({"key": "a-b", "type": {"name": "number"}, "object_type": {"name": "Shot"}})),
            config(json!({"key": "a.b", "type": {"name": "boolean"}, "object_type": {"name": "Shot"}})),
        ];
        let types = AttributeTypes::derive(&configs);
        assert_eq!(types.type_name("a_b"), "CustomAttributeValue_a_b");
        assert_eq!(types.type_name("a-b"), "CustomAttributeValue_a_b_2");
        assert_eq!(types.type_name("a.b"), "CustomAttributeValue_a_b_3");

        let shot = schema(json!({"id": "Shot", "alias_for": {"id": "Task"}}));
        assert_eq!(
            types.schema_type(&shot).to_string(),
            "CustomAttributeValue_a_b | CustomAttributeValue_a_b_2 | CustomAttributeValue_a_b_3"
        );
    }

    #[test]
    fn test_value_type_name_sanitizes_key() {
        assert_eq!(value_type_name("fstart"), "CustomAttributeValue_fstart");
        assert_eq!(value_type_name("my-key.x"), "CustomAttributeValue_my_key_x");
    }
}
