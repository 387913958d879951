//! RuleSet memoization
//!
//! Keyed by a fingerprint of the schema and compiler config: SHA-256 over
//! their JSON serialization, base64 url-safe. A changed schema has a new
//! fingerprint, so entries are never invalidated, only added.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use super::errors::CompileResult;
use super::rules::RuleSet;
use super::Compiler;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaNode;

/// Thread-safe compile cache in front of a `Compiler`.
#[derive(Debug)]
pub struct RuleSetCache {
    compiler: Compiler,
    entries: RwLock<HashMap<String, Arc<RuleSet>>>,
}

impl RuleSetCache {
    pub fn new(compiler: Compiler) -> Self {
        Self {
            compiler,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Fingerprint of `schema` under this cache's compiler config.
    ///
    /// `None` if the schema cannot be serialized; such schemas are compiled
    /// without caching.
    pub fn fingerprint(&self, schema: &SchemaNode) -> Option<String> {
        let schema_bytes = serde_json::to_vec(schema).ok()?;
        let config_bytes = serde_json::to_vec(self.compiler.config()).ok()?;

        let mut hasher = Sha256::new();
        hasher.update(&schema_bytes);
        hasher.update(b"\0");
        hasher.update(&config_bytes);
        Some(URL_SAFE_NO_PAD.encode(hasher.finalize()))
    }

    /// Returns the cached RuleSet for `schema`, compiling it on first use.
    ///
    /// Compile errors are not cached.
    pub fn get_or_compile(&self, schema: &SchemaNode) -> CompileResult<Arc<RuleSet>> {
        let Some(key) = self.fingerprint(schema) else {
            return self.compiler.compile(schema).map(Arc::new);
        };

        if let Some(hit) = self.lookup(&key) {
            self.compiler.metrics().increment_cache_hits();
            log_event_with_fields(Event::RuleSetCacheHit, &[("fingerprint", key.as_str())]);
            return Ok(hit);
        }

        let rules = Arc::new(self.compiler.compile(schema)?);
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        // A concurrent caller may have compiled the same schema; keep the first.
        let stored = entries.entry(key).or_insert(rules);
        Ok(Arc::clone(stored))
    }

    fn lookup(&self, key: &str) -> Option<Arc<RuleSet>> {
        let entries = match self.entries.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}
