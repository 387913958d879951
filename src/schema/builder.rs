//! Fluent schema construction
//!
//! ```ignore
//! use formrules::schema::builder::{boolean, object, string};
//!
//! let login = object([
//!     ("username", string().min(3).max(20)),
//!     ("password", string().min(6).message("too short")),
//!     ("rememberMe", boolean().optional()),
//! ]);
//! ```
//!
//! `min`/`max`/`length` pick the constraint kind from the node they are
//! called on: string length, array item count, or inclusive numeric bound.
//! Constraint methods called on a wrapper apply to the wrapped node; on a
//! union they apply to every alternative that can carry constraints. No
//! constraint kind applies to an object; one attached there is kept and
//! rejected at compile time.

use super::constraint::{Constraint, ConstraintKind, Trigger};
use super::types::{Field, NodeKind, PrimitiveType, Refinement, SchemaNode};

pub fn string() -> SchemaNode {
    SchemaNode::String {
        constraints: Vec::new(),
    }
}

pub fn number() -> SchemaNode {
    SchemaNode::Number {
        constraints: Vec::new(),
    }
}

pub fn boolean() -> SchemaNode {
    SchemaNode::Boolean {
        constraints: Vec::new(),
    }
}

pub fn array(element: SchemaNode) -> SchemaNode {
    SchemaNode::Array {
        element: Box::new(element),
        constraints: Vec::new(),
    }
}

/// Object with fields in the given order.
pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, SchemaNode)>) -> SchemaNode {
    SchemaNode::Object {
        fields: fields
            .into_iter()
            .map(|(name, schema)| Field::new(name, schema))
            .collect(),
        refinements: Vec::new(),
        constraints: Vec::new(),
    }
}

pub fn union(alternatives: impl IntoIterator<Item = SchemaNode>) -> SchemaNode {
    SchemaNode::Union {
        alternatives: alternatives.into_iter().collect(),
    }
}

impl SchemaNode {
    /// Attaches a constraint.
    ///
    /// On a union it is attached to every alternative. On an object it is
    /// kept as written; compilation then fails with `InapplicableConstraint`.
    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.attach(constraint);
        self
    }

    fn attach(&mut self, constraint: Constraint) {
        if let SchemaNode::Union { alternatives } = self {
            for alt in alternatives {
                alt.attach(constraint.clone());
            }
        } else if let Some(constraints) = self.constraints_mut() {
            constraints.push(constraint);
        }
    }

    fn measured(
        mut self,
        n: usize,
        length: fn(usize) -> ConstraintKind,
        items: fn(usize) -> ConstraintKind,
        value: fn(f64) -> ConstraintKind,
    ) -> Self {
        if let SchemaNode::Union { alternatives } = &mut self {
            let alts = std::mem::take(alternatives);
            *alternatives = alts
                .into_iter()
                .map(|alt| alt.measured(n, length, items, value))
                .collect();
            return self;
        }
        let kind = match self.unwrapped_kind() {
            NodeKind::Primitive(PrimitiveType::Number) => value(n as f64),
            NodeKind::Array => items(n),
            _ => length(n),
        };
        self.constrain(Constraint::new(kind))
    }

    pub fn min(self, n: usize) -> Self {
        self.measured(
            n,
            ConstraintKind::MinLength,
            ConstraintKind::MinItems,
            ConstraintKind::NumericGte,
        )
    }

    pub fn max(self, n: usize) -> Self {
        self.measured(
            n,
            ConstraintKind::MaxLength,
            ConstraintKind::MaxItems,
            ConstraintKind::NumericLte,
        )
    }

    /// Exact string length or item count.
    pub fn length(self, n: usize) -> Self {
        // numbers have no exact bound; fall back to string length
        self.measured(
            n,
            ConstraintKind::ExactLength,
            ConstraintKind::ExactItems,
            |x| ConstraintKind::ExactLength(x as usize),
        )
    }

    pub fn gt(self, x: f64) -> Self {
        self.constrain(Constraint::new(ConstraintKind::NumericGt(x)))
    }

    pub fn gte(self, x: f64) -> Self {
        self.constrain(Constraint::new(ConstraintKind::NumericGte(x)))
    }

    pub fn lt(self, x: f64) -> Self {
        self.constrain(Constraint::new(ConstraintKind::NumericLt(x)))
    }

    pub fn lte(self, x: f64) -> Self {
        self.constrain(Constraint::new(ConstraintKind::NumericLte(x)))
    }

    pub fn email(self) -> Self {
        self.constrain(Constraint::new(ConstraintKind::Email))
    }

    pub fn url(self) -> Self {
        self.constrain(Constraint::new(ConstraintKind::Url))
    }

    pub fn regex(self, pattern: impl Into<String>) -> Self {
        self.constrain(Constraint::new(ConstraintKind::Pattern(pattern.into())))
    }

    /// Sets the message of the most recently attached constraint.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.update_last(&mut |c| c.message = Some(message.clone()));
        self
    }

    /// Sets the trigger of the most recently attached constraint.
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.update_last(&mut |c| c.trigger = Some(trigger));
        self
    }

    fn update_last(&mut self, f: &mut dyn FnMut(&mut Constraint)) {
        if let SchemaNode::Union { alternatives } = self {
            for alt in alternatives {
                alt.update_last(f);
            }
        } else if let Some(last) = self.constraints_mut().and_then(|c| c.last_mut()) {
            f(last);
        }
    }

    pub fn optional(self) -> Self {
        SchemaNode::Optional {
            inner: Box::new(self),
        }
    }

    pub fn nullable(self) -> Self {
        SchemaNode::Nullable {
            inner: Box::new(self),
        }
    }

    /// Adds a cross-field refinement to an object node.
    pub fn refine(mut self, refinement: Refinement) -> Self {
        if let SchemaNode::Object { refinements, .. } = &mut self {
            refinements.push(refinement);
        }
        self
    }

    /// Requires `field` to equal `other` (e.g. password confirmation).
    pub fn fields_equal(self, field: &str, other: &str, message: impl Into<String>) -> Self {
        self.refine(Refinement::FieldsEqual {
            field: field.to_string(),
            other: other.to_string(),
            message: Some(message.into()),
        })
    }
}
