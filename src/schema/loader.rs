//! Schema documents and the on-disk registry
//!
//! - One JSON file per schema version, any name ending in `.json`
//! - Files are read in name order so loading is deterministic
//! - A registered (id, version) is immutable
//! - Unreadable or malformed files are FATAL

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::types::{NodeKind, SchemaNode};
use crate::observability::{log_event_with_fields, Event};

/// A versioned, named schema as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub schema_id: String,
    pub schema_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level schema; must be an object
    pub root: SchemaNode,
}

impl SchemaDocument {
    pub fn new(
        schema_id: impl Into<String>,
        schema_version: impl Into<String>,
        root: SchemaNode,
    ) -> Self {
        Self {
            schema_id: schema_id.into(),
            schema_version: schema_version.into(),
            description: None,
            root,
        }
    }

    /// Returns the registry key (id, version)
    pub fn key(&self) -> (&str, &str) {
        (&self.schema_id, &self.schema_version)
    }

    /// Validates the document envelope and refinement field names (not the
    /// constraint vocabulary, which is the compiler's concern).
    pub fn validate_structure(&self) -> Result<(), String> {
        if self.schema_id.trim().is_empty() {
            return Err("schema_id must not be empty".into());
        }
        if self.schema_version.trim().is_empty() {
            return Err("schema_version must not be empty".into());
        }
        if self.root.kind() != NodeKind::Object {
            return Err(format!(
                "root must be an object schema, found {}",
                self.root.kind()
            ));
        }
        if let Some((path, name)) = self.root.undeclared_refinement_field() {
            return Err(format!(
                "refinement at '{}' names undeclared field '{}'",
                path, name
            ));
        }
        Ok(())
    }
}

/// Reads schema documents from a directory into an in-memory registry.
pub struct SchemaLoader {
    schema_dir: PathBuf,
    schemas: HashMap<(String, String), SchemaDocument>,
}

impl SchemaLoader {
    pub fn new(schema_dir: &Path) -> Self {
        Self {
            schema_dir: schema_dir.to_path_buf(),
            schemas: HashMap::new(),
        }
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Loads every `.json` file in the schema directory.
    pub fn load_all(&mut self) -> SchemaResult<()> {
        let dir_display = self.schema_dir.display().to_string();

        let entries = fs::read_dir(&self.schema_dir).map_err(|e| {
            SchemaError::malformed_schema(
                &dir_display,
                format!("Failed to read schema directory: {}", e),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                SchemaError::malformed_schema(
                    &dir_display,
                    format!("Failed to read directory entry: {}", e),
                )
            })?;
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            self.load_schema_file(path)?;
        }

        let count = self.schemas.len().to_string();
        log_event_with_fields(
            Event::SchemasLoaded,
            &[("count", count.as_str()), ("dir", dir_display.as_str())],
        );

        Ok(())
    }

    fn load_schema_file(&mut self, path: &Path) -> SchemaResult<()> {
        let content = fs::read_to_string(path).map_err(|e| {
            SchemaError::malformed_schema(
                path.display().to_string(),
                format!("Failed to read file: {}", e),
            )
        })?;

        let document: SchemaDocument = serde_json::from_str(&content).map_err(|e| {
            SchemaError::malformed_schema(path.display().to_string(), format!("Invalid JSON: {}", e))
        })?;

        document
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema(path.display().to_string(), e))?;

        self.insert(document)
    }

    /// Registers a schema directly (for programmatic creation).
    pub fn register(&mut self, document: SchemaDocument) -> SchemaResult<()> {
        document
            .validate_structure()
            .map_err(|e| SchemaError::malformed_schema("<in-memory>", e))?;
        self.insert(document)
    }

    fn insert(&mut self, document: SchemaDocument) -> SchemaResult<()> {
        let key = (document.schema_id.clone(), document.schema_version.clone());
        if self.schemas.contains_key(&key) {
            return Err(SchemaError::schema_immutable(
                &document.schema_id,
                &document.schema_version,
            ));
        }
        self.schemas.insert(key, document);
        Ok(())
    }

    pub fn get(&self, schema_id: &str, schema_version: &str) -> Option<&SchemaDocument> {
        self.schemas
            .get(&(schema_id.to_string(), schema_version.to_string()))
    }

    /// Looks up a schema, distinguishing an unknown id from an unknown version.
    pub fn resolve(&self, schema_id: &str, schema_version: &str) -> SchemaResult<&SchemaDocument> {
        if !self.schema_id_exists(schema_id) {
            return Err(SchemaError::unknown_schema(schema_id));
        }
        self.get(schema_id, schema_version)
            .ok_or_else(|| SchemaError::unknown_version(schema_id, schema_version))
    }

    pub fn schema_id_exists(&self, schema_id: &str) -> bool {
        self.schemas.keys().any(|(id, _)| id == schema_id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
