//! Schema tree definitions
//!
//! Node types:
//! - string, number, boolean: primitives carrying constraints
//! - optional, nullable: wrappers around exactly one node
//! - array: single element type, plus item-count constraints
//! - object: ordered named fields, plus authoritative-only refinements
//! - union: ordered alternatives

use std::fmt;

use serde::{Deserialize, Serialize};

use super::constraint::Constraint;
use super::path::FieldPath;

/// Primitive value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
}

impl PrimitiveType {
    /// Returns the type name for messages
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

/// Structural kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Primitive(PrimitiveType),
    Optional,
    Nullable,
    Array,
    Object,
    Union,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Primitive(p) => write!(f, "{}", p.type_name()),
            NodeKind::Optional => write!(f, "optional"),
            NodeKind::Nullable => write!(f, "nullable"),
            NodeKind::Array => write!(f, "array"),
            NodeKind::Object => write!(f, "object"),
            NodeKind::Union => write!(f, "union"),
        }
    }
}

/// A node of the schema tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SchemaNode {
    String {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        constraints: Vec<Constraint>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        constraints: Vec<Constraint>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        constraints: Vec<Constraint>,
    },
    /// Value may be absent
    Optional { inner: Box<SchemaNode> },
    /// Value may be null
    Nullable { inner: Box<SchemaNode> },
    Array {
        element: Box<SchemaNode>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        constraints: Vec<Constraint>,
    },
    Object {
        fields: Vec<Field>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        refinements: Vec<Refinement>,
        /// Kept only so compilation can reject them; no kind applies to objects
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        constraints: Vec<Constraint>,
    },
    Union { alternatives: Vec<SchemaNode> },
}

impl SchemaNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SchemaNode::String { .. } => NodeKind::Primitive(PrimitiveType::String),
            SchemaNode::Number { .. } => NodeKind::Primitive(PrimitiveType::Number),
            SchemaNode::Boolean { .. } => NodeKind::Primitive(PrimitiveType::Boolean),
            SchemaNode::Optional { .. } => NodeKind::Optional,
            SchemaNode::Nullable { .. } => NodeKind::Nullable,
            SchemaNode::Array { .. } => NodeKind::Array,
            SchemaNode::Object { .. } => NodeKind::Object,
            SchemaNode::Union { .. } => NodeKind::Union,
        }
    }

    /// Constraints attached directly to this node.
    ///
    /// Wrappers and unions carry none.
    pub fn constraints(&self) -> &[Constraint] {
        match self {
            SchemaNode::String { constraints }
            | SchemaNode::Number { constraints }
            | SchemaNode::Boolean { constraints }
            | SchemaNode::Array { constraints, .. }
            | SchemaNode::Object { constraints, .. } => constraints.as_slice(),
            _ => &[],
        }
    }

    /// Mutable access to the constraint list, descending through wrappers.
    ///
    /// Returns `None` for unions.
    pub(crate) fn constraints_mut(&mut self) -> Option<&mut Vec<Constraint>> {
        match self {
            SchemaNode::String { constraints }
            | SchemaNode::Number { constraints }
            | SchemaNode::Boolean { constraints }
            | SchemaNode::Array { constraints, .. }
            | SchemaNode::Object { constraints, .. } => Some(constraints),
            SchemaNode::Optional { inner } | SchemaNode::Nullable { inner } => {
                inner.constraints_mut()
            }
            SchemaNode::Union { .. } => None,
        }
    }

    /// Kind of the first non-wrapper node.
    pub fn unwrapped_kind(&self) -> NodeKind {
        match self {
            SchemaNode::Optional { inner } | SchemaNode::Nullable { inner } => {
                inner.unwrapped_kind()
            }
            other => other.kind(),
        }
    }

    /// First refinement naming a field its object does not declare, as the
    /// object's path and the missing name.
    pub fn undeclared_refinement_field(&self) -> Option<(FieldPath, String)> {
        self.find_undeclared(&FieldPath::root())
    }

    fn find_undeclared(&self, path: &FieldPath) -> Option<(FieldPath, String)> {
        match self {
            SchemaNode::Optional { inner } | SchemaNode::Nullable { inner } => {
                inner.find_undeclared(path)
            }
            SchemaNode::Array { element, .. } => element.find_undeclared(&path.each()),
            SchemaNode::Union { alternatives } => {
                alternatives.iter().find_map(|a| a.find_undeclared(path))
            }
            SchemaNode::Object {
                fields,
                refinements,
                ..
            } => {
                let missing = refinements
                    .iter()
                    .flat_map(|r| r.fields())
                    .find(|name| !fields.iter().any(|f| f.name == *name));
                if let Some(name) = missing {
                    return Some((path.clone(), name.to_string()));
                }
                fields
                    .iter()
                    .find_map(|f| f.schema.find_undeclared(&path.field(f.name.as_str())))
            }
            SchemaNode::String { .. } | SchemaNode::Number { .. } | SchemaNode::Boolean { .. } => {
                None
            }
        }
    }

    /// Looks up a direct field of an object node.
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Object { fields, .. } => {
                fields.iter().find(|f| f.name == name).map(|f| &f.schema)
            }
            _ => None,
        }
    }
}

/// A named field of an object node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub schema: SchemaNode,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: SchemaNode) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Cross-field conditions on an object.
///
/// These are only checked by authoritative validation; the UI rule
/// vocabulary has no way to express them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Refinement {
    /// `field` must equal `other`; reported at `field`
    FieldsEqual {
        field: String,
        other: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// `field` must differ from `other`; reported at `field`
    FieldsDiffer {
        field: String,
        other: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl Refinement {
    /// The field the violation is reported against.
    pub fn target(&self) -> &str {
        match self {
            Refinement::FieldsEqual { field, .. } | Refinement::FieldsDiffer { field, .. } => {
                field.as_str()
            }
        }
    }

    /// Both field names the refinement compares, `field` first.
    pub fn fields(&self) -> [&str; 2] {
        match self {
            Refinement::FieldsEqual { field, other, .. }
            | Refinement::FieldsDiffer { field, other, .. } => [field.as_str(), other.as_str()],
        }
    }

    /// Custom message if non-empty, else the default.
    pub fn resolved_message(&self) -> String {
        match self {
            Refinement::FieldsEqual {
                field,
                other,
                message,
            } => non_empty(message).unwrap_or_else(|| format!("{} must match {}", field, other)),
            Refinement::FieldsDiffer {
                field,
                other,
                message,
            } => non_empty(message)
                .unwrap_or_else(|| format!("{} must differ from {}", field, other)),
        }
    }
}

fn non_empty(message: &Option<String>) -> Option<String> {
    message.as_ref().filter(|m| !m.trim().is_empty()).cloned()
}
