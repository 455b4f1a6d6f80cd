//! Catalog loading
//!
//! The generator consumes two flat catalogs. Retrieving them from a live
//! server happens elsewhere; this module reads the saved server responses
//! from disk and puts them into the order the generator expects.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::attributes::CustomAttributeConfiguration;
use crate::error::{Result, TypegenError};
use crate::schema::Schema;

/// Both catalogs of one generation run
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Sorted by id
    pub schemas: Vec<Schema>,
    pub custom_attributes: Vec<CustomAttributeConfiguration>,
}

/// Something that can produce a complete catalog snapshot
pub trait CatalogSource {
    fn fetch(&self) -> Result<Catalog>;
}

/// Accepted response layouts: a bare list, the batched `[[...]]` form of
/// the server's call endpoint, or a query result `{"data": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Batched(Vec<Vec<T>>),
    Flat(Vec<T>),
    Query { data: Vec<T> },
}

impl<T> Payload<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Payload::Batched(batches) => batches.into_iter().next().unwrap_or_default(),
            Payload::Flat(items) => items,
            Payload::Query { data } => data,
        }
    }
}

/// Parse a saved response body into a list of `T`
pub fn parse_payload<T: DeserializeOwned>(content: &str) -> Result<Vec<T>> {
    let payload: Payload<T> = serde_json::from_str(content).map_err(|e| {
        TypegenError::InvalidCatalog(format!("unrecognised response layout: {}", e))
    })?;
    Ok(payload.into_items())
}

/// Sort schemas by id; schemas without an id go first
pub fn sort_schemas(schemas: &mut [Schema]) {
    schemas.sort_by(|a, b| a.id().unwrap_or_default().cmp(b.id().unwrap_or_default()));
}

/// Catalog read from saved JSON responses
#[derive(Debug, Clone)]
pub struct FileCatalog {
    schemas_path: PathBuf,
    custom_attributes_path: Option<PathBuf>,
}

impl FileCatalog {
    pub fn new(schemas_path: impl Into<PathBuf>) -> Self {
        Self {
            schemas_path: schemas_path.into(),
            custom_attributes_path: None,
        }
    }

    pub fn with_custom_attributes(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_attributes_path = Some(path.into());
        self
    }

    fn read<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        let content = fs::read_to_string(path)?;
        parse_payload(&content).map_err(|e| match e {
            TypegenError::InvalidCatalog(msg) => {
                TypegenError::InvalidCatalog(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }
}

impl CatalogSource for FileCatalog {
    fn fetch(&self) -> Result<Catalog> {
        let mut schemas: Vec<Schema> = Self::read(&self.schemas_path)?;
        sort_schemas(&mut schemas);
        debug!(path = %self.schemas_path.display(), count = schemas.len(), "loaded schemas");

        let custom_attributes = match &self.custom_attributes_path {
            Some(path) => {
                let configs: Vec<CustomAttributeConfiguration> = Self::read(path)?;
                debug!(path = %path.display(), count = configs.len(), "loaded custom attributes");
                configs
            }
            None => Vec::new(),
        };

        Ok(Catalog {
            schemas,
            custom_attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_layouts() {
        let flat: Vec<Schema> = parse_payload(r#"[{"id": "B"}, {"id": "A"}]"#).unwrap();
        assert_eq!(flat.len(), 2);

        let batched: Vec<Schema> = parse_payload(r#"[[{"id": "A"}]]"#).unwrap();
        assert_eq!(batched[0].id(), Some("A"));

        let query: Vec<Schema> = parse_payload(r#"{"data": [{"id": "A"}]}"#).unwrap();
        assert_eq!(query.len(), 1);

        let empty: Vec<Schema> = parse_payload("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_bad_layout() {
        let err = parse_payload::<Schema>(r#"{"schemas": 1}"#).unwrap_err();
        assert!(matches!(err, TypegenError::InvalidCatalog(_)));
    }

    #[test]
    fn test_sort_schemas() {
        let mut schemas: Vec<Schema> =
            parse_payload(r#"[{"id": "User"}, {"id": "Asset"}, {}, {"id": "Note"}]"#).unwrap();
        sort_schemas(&mut schemas);
        let ids: Vec<Option<&str>> = schemas.iter().map(Schema::id).collect();
        assert_eq!(ids, vec![None, Some("Asset"), Some("Note"), Some("User")]);
    }
}
