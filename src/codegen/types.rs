//! Type Mapping
//!
//! Maps property descriptors onto TypeScript type expressions. The mapping
//! is total over the parsed vocabulary; vocabulary violations are rejected
//! earlier, in [`PropertyDescriptor::parse`](crate::schema::PropertyDescriptor::parse).

use std::fmt;

use crate::schema::{PrimitiveKind, PropertyDescriptor};

/// Name of the synthetic link record
pub const BASIC_LINK: &str = "BasicLink";

/// A TypeScript type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TsType {
    /// A type name used verbatim (`string`, `User`, `Record<string, any>`)
    Named(String),
    /// `T[]`
    Array(Box<TsType>),
    /// `A | B | C`
    Union(Vec<TsType>),
}

impl TsType {
    pub fn named(name: impl Into<String>) -> Self {
        TsType::Named(name.into())
    }

    pub fn string() -> Self {
        TsType::named("string")
    }

    pub fn number() -> Self {
        TsType::named("number")
    }

    pub fn boolean() -> Self {
        TsType::named("boolean")
    }

    pub fn never() -> Self {
        TsType::named("never")
    }

    pub fn array_of(inner: TsType) -> Self {
        TsType::Array(Box::new(inner))
    }

    /// Union of `members` with duplicates removed, keeping first-seen order.
    /// Nested unions are flattened; a single member collapses to itself.
    pub fn union_of(members: impl IntoIterator<Item = TsType>) -> Self {
        let mut flat: Vec<TsType> = Vec::new();
        for member in members {
            match member {
                TsType::Union(inner) => {
                    for m in inner {
                        if !flat.contains(&m) {
                            flat.push(m);
                        }
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        match flat.len() {
            0 => TsType::never(),
            1 => flat.remove(0),
            _ => TsType::Union(flat),
        }
    }

    /// `string | number | boolean | string[]`
    pub fn variable() -> Self {
        TsType::Union(vec![
            TsType::string(),
            TsType::number(),
            TsType::boolean(),
            TsType::array_of(TsType::string()),
        ])
    }

    pub fn is_bare_string(&self) -> bool {
        matches!(self, TsType::Named(name) if name == "string")
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsType::Named(name) => write!(f, "{}", name),
            TsType::Array(inner) => match inner.as_ref() {
                TsType::Union(_) => write!(f, "({})[]", inner),
                _ => write!(f, "{}[]", inner),
            },
            TsType::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}

/// Map a descriptor to its TypeScript type.
///
/// Returns `None` for [`PropertyDescriptor::Untyped`]; the caller reports it.
pub fn map_descriptor(descriptor: &PropertyDescriptor) -> Option<TsType> {
    match descriptor {
        PropertyDescriptor::Ref(target) => Some(TsType::named(target.clone())),
        PropertyDescriptor::Untyped => None,
        PropertyDescriptor::Primitive { kind, items } => match kind {
            PrimitiveKind::Integer => Some(TsType::number()),
            PrimitiveKind::Variable => Some(TsType::variable()),
            PrimitiveKind::Array | PrimitiveKind::MappedArray => {
                let item = items.as_deref().and_then(map_descriptor)?;
                Some(TsType::array_of(item))
            }
            PrimitiveKind::Object
            | PrimitiveKind::String
            | PrimitiveKind::Number
            | PrimitiveKind::Boolean => Some(TsType::named(kind.as_str())),
        },
    }
}

/// Map a property, applying the `link` fixup: the server documents `link`
/// as a string but sends a list of link records.
pub fn map_property(name: &str, descriptor: &PropertyDescriptor) -> Option<TsType> {
    let ty = map_descriptor(descriptor)?;
    if name == "link" && ty.is_bare_string() {
        return Some(TsType::array_of(TsType::named(BASIC_LINK)));
    }
    Some(ty)
}
