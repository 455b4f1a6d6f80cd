//! Schema catalog types
//!
//! Mirrors the server's `query_schemas` response: a flat list of entity
//! schemas, each with a property map, an optional `$mixin` base reference
//! and an optional `alias_for` marker.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TypegenError};

/// Id of the polymorphic root schema
pub const TYPED_CONTEXT: &str = "TypedContext";

/// Alias target that marks a schema as a typed context subtype
pub const TASK_MARKER: &str = "Task";

/// Synthesized property holding custom attribute values
pub const CUSTOM_ATTRIBUTES: &str = "custom_attributes";

/// Synthesized entity type tag
pub const ENTITY_TYPE_PROPERTY: &str = "__entity_type__";

/// Synthesized permission map
pub const PERMISSIONS_PROPERTY: &str = "__permissions";

/// Reference to another schema (`{"$ref": "Id"}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    #[serde(rename = "$ref")]
    pub ref_id: String,
}

/// `alias_for` marker; the server sends either a bare id or an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AliasFor {
    Named(String),
    Object { id: String },
}

impl AliasFor {
    pub fn id(&self) -> &str {
        match self {
            AliasFor::Named(id) => id,
            AliasFor::Object { id } => id,
        }
    }
}

/// One entity schema from the catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub id: Option<String>,

    /// Raw property values, kept as JSON until resolution so that a
    /// malformed descriptor is reported against its schema
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: BTreeMap<String, serde_json::Value>,

    #[serde(rename = "$mixin", default, skip_serializing_if = "Option::is_none")]
    pub mixin: Option<SchemaRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_for: Option<AliasFor>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub immutable: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub computed: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub required: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_key: Vec<String>,
}

impl Schema {
    /// The schema id, if present and non-empty
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn alias_target(&self) -> Option<&str> {
        self.alias_for.as_ref().map(AliasFor::id)
    }

    /// The polymorphic root itself
    pub fn is_typed_context(&self) -> bool {
        self.id() == Some(TYPED_CONTEXT)
    }

    /// Aliased onto the root through an object-form `Task` marker; the bare
    /// string form only names a sentinel such as `Show`
    pub fn is_typed_context_subtype(&self) -> bool {
        matches!(&self.alias_for, Some(AliasFor::Object { id }) if id == TASK_MARKER)
            && !self.is_typed_context()
    }

    /// Member of the typed context family (root or subtype)
    pub fn is_typed_context_member(&self) -> bool {
        self.is_typed_context() || self.is_typed_context_subtype()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn is_immutable(&self, name: &str) -> bool {
        self.immutable.iter().any(|n| n == name) || self.computed.iter().any(|n| n == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name) || self.primary_key.iter().any(|n| n == name)
    }

    fn display_id(&self) -> String {
        self.id.clone().unwrap_or_default()
    }
}

/// Treats an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Names with a single leading underscore are deprecated; double
/// underscore names are synthesized and always kept.
pub fn is_deprecated_property(name: &str) -> bool {
    name.starts_with('_') && !name.starts_with("__")
}

// =============================================================================
// Property Descriptors
// =============================================================================

/// The fixed primitive vocabulary of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Object,
    Array,
    MappedArray,
    String,
    Number,
    Boolean,
    Integer,
    Variable,
}

impl PrimitiveKind {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "object" => Self::Object,
            "array" => Self::Array,
            "mapped_array" => Self::MappedArray,
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "variable" => Self::Variable,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::MappedArray => "mapped_array",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Variable => "variable",
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::Array | Self::MappedArray)
    }
}

/// A parsed property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyDescriptor {
    /// `{"$ref": "Id"}`
    Ref(String),
    /// `{"type": "..."}`; `items` is always set for sequence kinds
    Primitive {
        kind: PrimitiveKind,
        items: Option<Box<PropertyDescriptor>>,
    },
    /// Neither `$ref` nor `type` present
    Untyped,
}

impl PropertyDescriptor {
    /// Parse a raw property value.
    ///
    /// `schema` and `property` are only used for error messages.
    pub fn parse(schema: &str, property: &str, value: &serde_json::Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| TypegenError::MalformedProperty {
            schema: schema.to_string(),
            property: property.to_string(),
        })?;

        if let Some(target) = non_empty_str(schema, property, object.get("$ref"))? {
            return Ok(Self::Ref(target.to_string()));
        }

        let Some(type_name) = non_empty_str(schema, property, object.get("type"))? else {
            return Ok(Self::Untyped);
        };

        let kind = PrimitiveKind::parse(type_name).ok_or_else(|| TypegenError::InvalidType {
            schema: schema.to_string(),
            property: property.to_string(),
            type_name: type_name.to_string(),
        })?;

        if !kind.is_sequence() {
            return Ok(Self::Primitive { kind, items: None });
        }

        let missing_items = || TypegenError::MissingItems {
            schema: schema.to_string(),
            property: property.to_string(),
        };
        let items_value = object
            .get("items")
            .filter(|v| !v.is_null())
            .ok_or_else(missing_items)?;
        let items = Self::parse(schema, property, items_value)?;
        if items == Self::Untyped {
            return Err(missing_items());
        }

        Ok(Self::Primitive {
            kind,
            items: Some(Box::new(items)),
        })
    }
}

/// Reads an optional string field; any non-string, non-null value is malformed
fn non_empty_str<'a>(
    schema: &str,
    property: &str,
    value: Option<&'a serde_json::Value>,
) -> Result<Option<&'a str>> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(TypegenError::MalformedProperty {
            schema: schema.to_string(),
            property: property.to_string(),
        }),
    }
}

// =============================================================================
// Catalog lookup
// =============================================================================

/// Id-indexed, read-only view over a schema catalog
pub struct SchemaCatalog<'a> {
    schemas: &'a [Schema],
    by_id: HashMap<&'a str, &'a Schema>,
}

impl<'a> SchemaCatalog<'a> {
    pub fn new(schemas: &'a [Schema]) -> Self {
        let mut by_id = HashMap::with_capacity(schemas.len());
        for schema in schemas {
            if let Some(id) = schema.id() {
                // First occurrence wins for duplicated ids
                by_id.entry(id).or_insert(schema);
            }
        }
        Self { schemas, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Schema> {
        self.by_id.get(id).copied()
    }

    /// All schemas in catalog order
    pub fn schemas(&self) -> &'a [Schema] {
        self.schemas
    }

    /// The polymorphic root schema, if the catalog has one
    pub fn typed_context(&self) -> Option<&'a Schema> {
        self.get(TYPED_CONTEXT)
    }

    /// Base schema named by `$mixin`. An unknown id means "no base".
    pub fn base_of(&self, schema: &Schema) -> Option<&'a Schema> {
        schema.mixin.as_ref().and_then(|m| self.get(&m.ref_id))
    }

    /// Base chain from the immediate base upwards, stopping on a cycle
    pub fn base_chain(&self, schema: &Schema) -> Vec<&'a Schema> {
        let mut chain = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(schema.display_id());

        let mut current = self.base_of(schema);
        while let Some(base) = current {
            if !visited.insert(base.display_id()) {
                break;
            }
            chain.push(base);
            current = self.base_of(base);
        }
        chain
    }

    /// Raw property names declared anywhere along the base chain
    pub fn inherited_property_names(&self, schema: &Schema) -> HashSet<&'a str> {
        self.base_chain(schema)
            .into_iter()
            .flat_map(|base| base.properties.keys().map(String::as_str))
            .collect()
    }
}
