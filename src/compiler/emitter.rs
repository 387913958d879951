//! Rule emission
//!
//! Maps each extracted constraint to exactly one `Rule` through a closed
//! kind table. The table is an exhaustive match, so adding a kind to the
//! vocabulary without a mapping does not compile.

use regex::Regex;

use super::errors::{CompileError, CompileResult};
use super::extractor::FieldEntry;
use super::messages;
use super::rules::{Bounds, Measure, Rule, RuleType, TypeTag};
use crate::config::MergePolicy;
use crate::schema::{Constraint, ConstraintKind, FieldPath, NodeKind, PrimitiveType, Trigger};

/// Per-field facts the emitter needs besides the constraint itself.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldContext<'a> {
    pub path: &'a FieldPath,
    pub required: bool,
    /// Type of the field as a whole; a list for union fields
    pub field_type: RuleType,
}

impl<'a> FieldContext<'a> {
    pub fn of(entry: &'a FieldEntry) -> Self {
        let field_type = match entry.type_tags.as_slice() {
            [tag] if !entry.is_union => RuleType::Single(*tag),
            tags => RuleType::Union(tags.to_vec()),
        };
        Self {
            path: &entry.path,
            required: entry.required,
            field_type,
        }
    }

    pub fn label(&self) -> &str {
        self.path.label()
    }
}

/// Partial rule produced by the kind table.
struct Shape {
    bounds: Option<Bounds>,
    pattern: Option<String>,
    format: Option<TypeTag>,
}

impl Shape {
    fn bounds(bounds: Bounds) -> Self {
        Self {
            bounds: Some(bounds),
            pattern: None,
            format: None,
        }
    }

    fn format(tag: TypeTag) -> Self {
        Self {
            bounds: None,
            pattern: None,
            format: Some(tag),
        }
    }
}

pub struct Emitter {
    default_trigger: Trigger,
}

impl Emitter {
    pub fn new(default_trigger: Trigger) -> Self {
        Self { default_trigger }
    }

    /// Emits the rule for one constraint declared on a `node` at `field`.
    pub fn emit(
        &self,
        constraint: &Constraint,
        node: NodeKind,
        field: &FieldContext<'_>,
    ) -> CompileResult<Rule> {
        check_applicable(&constraint.kind, node, field.path)?;
        let shape = shape_of(&constraint.kind, field.path)?;

        let type_tag = match (&field.field_type, shape.format) {
            (RuleType::Single(_), Some(format)) => RuleType::Single(format),
            (field_type, _) => field_type.clone(),
        };

        Ok(Rule {
            trigger: constraint.trigger.unwrap_or(self.default_trigger),
            required: field.required,
            type_tag,
            bounds: shape.bounds,
            pattern: shape.pattern,
            message: messages::resolve(constraint, field.label()),
            constraint: Some(constraint.kind.name().to_string()),
        })
    }

    /// Rule for a field that declares no constraints: presence and type only.
    pub fn base_rule(&self, field: &FieldContext<'_>) -> Rule {
        let message = if field.required {
            messages::required(field.label())
        } else {
            messages::type_mismatch(field.label(), &field.field_type.describe())
        };
        Rule {
            trigger: self.default_trigger,
            required: field.required,
            type_tag: field.field_type.clone(),
            bounds: None,
            pattern: None,
            message,
            constraint: None,
        }
    }

    /// All rules for one extracted field, in constraint declaration order.
    pub fn emit_field(&self, entry: &FieldEntry, policy: MergePolicy) -> CompileResult<Vec<Rule>> {
        let field = FieldContext::of(entry);
        if entry.constraints.is_empty() {
            return Ok(vec![self.base_rule(&field)]);
        }

        let rules = entry
            .constraints
            .iter()
            .map(|c| self.emit(&c.constraint, c.node, &field))
            .collect::<CompileResult<Vec<_>>>()?;

        Ok(match policy {
            MergePolicy::Separate => rules,
            MergePolicy::CombineBounds => combine_bounds(rules),
        })
    }
}

fn check_applicable(kind: &ConstraintKind, node: NodeKind, path: &FieldPath) -> CompileResult<()> {
    let applies = match kind {
        ConstraintKind::MinLength(_)
        | ConstraintKind::MaxLength(_)
        | ConstraintKind::ExactLength(_)
        | ConstraintKind::Pattern(_)
        | ConstraintKind::Email
        | ConstraintKind::Url => node == NodeKind::Primitive(PrimitiveType::String),
        ConstraintKind::NumericGt(_)
        | ConstraintKind::NumericGte(_)
        | ConstraintKind::NumericLt(_)
        | ConstraintKind::NumericLte(_) => node == NodeKind::Primitive(PrimitiveType::Number),
        ConstraintKind::MinItems(_) | ConstraintKind::MaxItems(_) | ConstraintKind::ExactItems(_) => {
            node == NodeKind::Array
        }
        ConstraintKind::Unrecognized { name, .. } => {
            return Err(CompileError::UnsupportedConstraintKind {
                kind: name.clone(),
                path: path.clone(),
            })
        }
    };

    if applies {
        Ok(())
    } else {
        Err(CompileError::InapplicableConstraint {
            kind: kind.name().to_string(),
            node,
            path: path.clone(),
        })
    }
}

fn shape_of(kind: &ConstraintKind, path: &FieldPath) -> CompileResult<Shape> {
    let shape = match kind {
        ConstraintKind::MinLength(n) => Shape::bounds(Bounds::new(Measure::Length).min(*n as f64)),
        ConstraintKind::MaxLength(n) => Shape::bounds(Bounds::new(Measure::Length).max(*n as f64)),
        ConstraintKind::ExactLength(n) => {
            Shape::bounds(Bounds::new(Measure::Length).exact(*n as f64))
        }
        ConstraintKind::Pattern(pattern) => {
            Regex::new(pattern).map_err(|e| CompileError::InvalidPattern {
                pattern: pattern.clone(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
            Shape {
                bounds: None,
                pattern: Some(pattern.clone()),
                format: None,
            }
        }
        ConstraintKind::Email => Shape::format(TypeTag::Email),
        ConstraintKind::Url => Shape::format(TypeTag::Url),
        ConstraintKind::NumericGt(x) => {
            Shape::bounds(Bounds::new(Measure::Value).min(*x).exclusive())
        }
        ConstraintKind::NumericGte(x) => Shape::bounds(Bounds::new(Measure::Value).min(*x)),
        ConstraintKind::NumericLt(x) => {
            Shape::bounds(Bounds::new(Measure::Value).max(*x).exclusive())
        }
        ConstraintKind::NumericLte(x) => Shape::bounds(Bounds::new(Measure::Value).max(*x)),
        ConstraintKind::MinItems(n) => Shape::bounds(Bounds::new(Measure::Items).min(*n as f64)),
        ConstraintKind::MaxItems(n) => Shape::bounds(Bounds::new(Measure::Items).max(*n as f64)),
        ConstraintKind::ExactItems(n) => {
            Shape::bounds(Bounds::new(Measure::Items).exact(*n as f64))
        }
        ConstraintKind::Unrecognized { name, .. } => {
            return Err(CompileError::UnsupportedConstraintKind {
                kind: name.clone(),
                path: path.clone(),
            })
        }
    };
    Ok(shape)
}

/// Folds bound-only rules that share trigger, measure and exclusivity.
///
/// A rule is folded into the first earlier rule it is compatible with; a
/// bound slot (min, max, exact) is never overwritten.
fn combine_bounds(rules: Vec<Rule>) -> Vec<Rule> {
    let mut out: Vec<Rule> = Vec::with_capacity(rules.len());

    for rule in rules {
        let Some(i) = out.iter().position(|existing| can_fold(existing, &rule)) else {
            out.push(rule);
            continue;
        };

        let existing = &mut out[i];
        if let (Some(bounds), Some(incoming)) = (existing.bounds.as_mut(), rule.bounds.as_ref()) {
            bounds.min = bounds.min.or(incoming.min);
            bounds.max = bounds.max.or(incoming.max);
            bounds.exact = bounds.exact.or(incoming.exact);
        }
        existing.message = format!("{}; {}", existing.message, rule.message);
        existing.constraint = match (existing.constraint.take(), rule.constraint) {
            (Some(a), Some(b)) => Some(format!("{}+{}", a, b)),
            (a, _) => a,
        };
    }
    out
}

fn can_fold(existing: &Rule, incoming: &Rule) -> bool {
    let (a, b) = match (&existing.bounds, &incoming.bounds) {
        (Some(a), Some(b)) => (a, b),
        _ => return false,
    };
    let collides = (a.min.is_some() && b.min.is_some())
        || (a.max.is_some() && b.max.is_some())
        || (a.exact.is_some() && b.exact.is_some());

    existing.pattern.is_none()
        && incoming.pattern.is_none()
        && existing.trigger == incoming.trigger
        && existing.type_tag == incoming.type_tag
        && a.measure == b.measure
        && a.exclusive == b.exclusive
        && !collides
}
