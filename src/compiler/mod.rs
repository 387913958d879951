//! Schema to UI-rule compiler
//!
//! `compile` runs the extractor over an object schema, then the emitter over
//! every extracted field, and assembles the field-keyed `RuleSet`.
//!
//! Compilation is pure: no I/O besides logging, no shared mutable state,
//! and the same schema always yields the same RuleSet. Any error aborts the
//! whole compilation; partial RuleSets are never returned.

mod cache;
mod emitter;
mod errors;
mod extractor;
pub(crate) mod messages;
mod rules;

use std::sync::Arc;

pub use cache::RuleSetCache;
pub use emitter::{Emitter, FieldContext};
pub use errors::{CompileError, CompileResult};
pub use extractor::{ExtractedConstraint, Extraction, Extractor, FieldEntry};
pub use rules::{Bounds, Measure, Rule, RuleSet, RuleType, TypeTag};

use crate::config::CompilerConfig;
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::schema::{FieldPath, NodeKind, SchemaNode};

/// Compiles schemas under one configuration.
#[derive(Debug, Clone)]
pub struct Compiler {
    config: CompilerConfig,
    metrics: Arc<MetricsRegistry>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Shares a metrics registry with other components.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Extracts per-field constraints from an object schema.
    pub fn extract(&self, schema: &SchemaNode) -> CompileResult<Extraction> {
        require_object(schema)?;
        Extractor::new(self.config.max_depth).extract(schema, FieldPath::root())
    }

    /// Compiles an object schema into its RuleSet.
    pub fn compile(&self, schema: &SchemaNode) -> CompileResult<RuleSet> {
        log_event(Event::CompileBegin);

        match self.compile_unlogged(schema) {
            Ok(rules) => {
                self.metrics.increment_compilations();
                let fields = rules.len().to_string();
                let count = rules.rule_count().to_string();
                log_event_with_fields(
                    Event::CompileComplete,
                    &[("fields", fields.as_str()), ("rules", count.as_str())],
                );
                Ok(rules)
            }
            Err(err) => {
                self.metrics.increment_compile_failures();
                let message = err.to_string();
                log_event_with_fields(
                    Event::CompileFailed,
                    &[("code", err.code()), ("error", message.as_str())],
                );
                Err(err)
            }
        }
    }

    fn compile_unlogged(&self, schema: &SchemaNode) -> CompileResult<RuleSet> {
        let extraction = self.extract(schema)?;
        let emitter = Emitter::new(self.config.default_trigger);

        let mut fields = Vec::with_capacity(extraction.entries().len());
        for entry in extraction.into_entries() {
            let rules = emitter.emit_field(&entry, self.config.merge_policy)?;
            fields.push((entry.path, rules));
        }
        Ok(RuleSet::from_fields(fields))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

fn require_object(schema: &SchemaNode) -> CompileResult<()> {
    match schema.kind() {
        NodeKind::Object => Ok(()),
        found => Err(CompileError::InvalidTopLevelSchema { found }),
    }
}

/// Compiles with the default configuration.
pub fn compile(schema: &SchemaNode) -> CompileResult<RuleSet> {
    Compiler::default().compile(schema)
}
