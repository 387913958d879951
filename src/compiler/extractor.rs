//! Constraint extraction
//!
//! Walks a schema tree and flattens it into per-field entries, in the order
//! fields are first reached by a depth-first walk over declared fields. Only
//! leaves (primitives and arrays) become entries; objects contribute their
//! fields and unions contribute every alternative at the same path.
//!
//! Inside a union, a field below the union's own path is required only when
//! every alternative reaches it. An object alternative adds the `Object` tag
//! at the union's path so the UI accepts an object value there.

use std::collections::{HashMap, HashSet};

use super::errors::{CompileError, CompileResult};
use super::rules::TypeTag;
use crate::schema::{Constraint, ConstraintKind, Field, FieldPath, NodeKind, Refinement, SchemaNode};

/// A constraint together with the kind of node that declared it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedConstraint {
    pub constraint: Constraint,
    pub node: NodeKind,
}

/// Everything the compiler knows about one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub path: FieldPath,
    /// False when any wrapper directly around this field is optional/nullable
    pub required: bool,
    /// Reached through a union at this path, or typed differently by
    /// alternatives of an enclosing union
    pub is_union: bool,
    /// Leaf type tags in first-seen order, deduplicated
    pub type_tags: Vec<TypeTag>,
    pub constraints: Vec<ExtractedConstraint>,
}

/// Result of extraction: field entries in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    entries: Vec<FieldEntry>,
}

impl Extraction {
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FieldEntry> {
        self.entries
    }

    /// Flat `(path, constraint)` sequence in emission order.
    pub fn pairs(&self) -> impl Iterator<Item = (&FieldPath, &Constraint)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .constraints
                .iter()
                .map(move |c| (&entry.path, &c.constraint))
        })
    }

    pub fn get(&self, path: &FieldPath) -> Option<&FieldEntry> {
        self.entries.iter().find(|e| &e.path == path)
    }
}

/// Depth-bounded schema walker.
pub struct Extractor {
    max_depth: usize,
    entries: Vec<FieldEntry>,
    index: HashMap<FieldPath, usize>,
    optional_paths: HashSet<FieldPath>,
    union_paths: HashSet<FieldPath>,
    /// Every path a leaf was recorded at, in walk order
    reached: Vec<FieldPath>,
}

impl Extractor {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            entries: Vec::new(),
            index: HashMap::new(),
            optional_paths: HashSet::new(),
            union_paths: HashSet::new(),
            reached: Vec::new(),
        }
    }

    /// Extracts every field under `node`, addressed relative to `path`.
    pub fn extract(mut self, node: &SchemaNode, path: FieldPath) -> CompileResult<Extraction> {
        self.walk(node, &path, 1)?;

        let Extractor {
            mut entries,
            optional_paths,
            union_paths,
            ..
        } = self;
        for entry in &mut entries {
            entry.required = !optional_paths.contains(&entry.path);
            entry.is_union = union_paths.contains(&entry.path) || entry.type_tags.len() > 1;
        }
        Ok(Extraction { entries })
    }

    fn walk(&mut self, node: &SchemaNode, path: &FieldPath, depth: usize) -> CompileResult<()> {
        if depth > self.max_depth {
            return Err(CompileError::RecursiveSchemaUnsupported {
                max_depth: self.max_depth,
                path: path.clone(),
            });
        }

        match node {
            SchemaNode::String { constraints }
            | SchemaNode::Number { constraints }
            | SchemaNode::Boolean { constraints } => {
                let kind = node.kind();
                if let NodeKind::Primitive(primitive) = kind {
                    self.record_leaf(path, TypeTag::from(primitive), kind, constraints)?;
                }
            }
            SchemaNode::Optional { inner } | SchemaNode::Nullable { inner } => {
                self.optional_paths.insert(path.clone());
                self.walk(inner, path, depth + 1)?;
            }
            SchemaNode::Array {
                element,
                constraints,
            } => {
                self.record_leaf(path, TypeTag::Array, NodeKind::Array, constraints)?;
                self.walk(element, &path.each(), depth + 1)?;
            }
            SchemaNode::Object {
                fields,
                refinements,
                constraints,
            } => {
                if let Some(constraint) = constraints.first() {
                    return Err(object_constraint_error(constraint, path));
                }
                check_object(fields, refinements, path)?;
                for field in fields {
                    self.walk(&field.schema, &path.field(field.name.as_str()), depth + 1)?;
                }
            }
            SchemaNode::Union { alternatives } => {
                self.union_paths.insert(path.clone());

                let mut reached_by = Vec::with_capacity(alternatives.len());
                for alternative in alternatives {
                    if alternative.unwrapped_kind() == NodeKind::Object {
                        self.add_tag(path, TypeTag::Object);
                    }
                    let start = self.reached.len();
                    self.walk(alternative, path, depth + 1)?;
                    reached_by.push(self.reached[start..].iter().cloned().collect::<HashSet<_>>());
                }

                for reached in &reached_by {
                    for p in reached {
                        if p != path && !reached_by.iter().all(|other| other.contains(p)) {
                            self.optional_paths.insert(p.clone());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn record_leaf(
        &mut self,
        path: &FieldPath,
        tag: TypeTag,
        node: NodeKind,
        constraints: &[Constraint],
    ) -> CompileResult<()> {
        for constraint in constraints {
            if let ConstraintKind::Unrecognized { name, .. } = &constraint.kind {
                return Err(CompileError::UnsupportedConstraintKind {
                    kind: name.clone(),
                    path: path.clone(),
                });
            }
        }

        self.add_tag(path, tag);
        self.reached.push(path.clone());
        self.entry_mut(path)
            .constraints
            .extend(constraints.iter().map(|c| ExtractedConstraint {
                constraint: c.clone(),
                node,
            }));
        Ok(())
    }

    fn add_tag(&mut self, path: &FieldPath, tag: TypeTag) {
        let entry = self.entry_mut(path);
        if !entry.type_tags.contains(&tag) {
            entry.type_tags.push(tag);
        }
    }

    fn entry_mut(&mut self, path: &FieldPath) -> &mut FieldEntry {
        let i = match self.index.get(path) {
            Some(&i) => i,
            None => {
                self.entries.push(FieldEntry {
                    path: path.clone(),
                    required: true,
                    is_union: false,
                    type_tags: Vec::new(),
                    constraints: Vec::new(),
                });
                let i = self.entries.len() - 1;
                self.index.insert(path.clone(), i);
                i
            }
        };
        &mut self.entries[i]
    }
}

/// Rejects duplicate field names and refinements naming undeclared fields.
fn check_object(
    fields: &[Field],
    refinements: &[Refinement],
    path: &FieldPath,
) -> CompileResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(CompileError::DuplicateField {
                name: field.name.clone(),
                path: path.clone(),
            });
        }
    }

    for refinement in refinements {
        if let Some(name) = refinement.fields().into_iter().find(|n| !seen.contains(n)) {
            return Err(CompileError::UnknownRefinementField {
                field: name.to_string(),
                path: path.clone(),
            });
        }
    }
    Ok(())
}

fn object_constraint_error(constraint: &Constraint, path: &FieldPath) -> CompileError {
    match &constraint.kind {
        ConstraintKind::Unrecognized { name, .. } => CompileError::UnsupportedConstraintKind {
            kind: name.clone(),
            path: path.clone(),
        },
        kind => CompileError::InapplicableConstraint {
            kind: kind.name().to_string(),
            node: NodeKind::Object,
            path: path.clone(),
        },
    }
}
