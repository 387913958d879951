//! Field paths
//!
//! A path is an ordered list of segments rather than a joined string, so a
//! field name containing `.` or `[` never collides with a nested address.
//! Rendering (`address.city`, `tags[]`, `tags[2]`) is presentation only; it
//! escapes `.`, `[`, `]` and `\` inside names with a backslash (`a\.b` is
//! one field, `a.b` two).

use std::fmt;

use serde::{Serialize, Serializer};

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Named object field
    Field(String),
    /// Any element of an array (rule-side placeholder)
    Each,
    /// A concrete array element (value-side, used in validation errors)
    Index(usize),
}

/// Address of a field within a (possibly nested) schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, addressing the schema root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Builds a path of named fields, e.g. `FieldPath::of(&["address", "city"])`.
    pub fn of(names: &[&str]) -> Self {
        Self {
            segments: names
                .iter()
                .map(|n| PathSegment::Field((*n).to_string()))
                .collect(),
        }
    }

    /// Returns a new path with a named field appended.
    pub fn field(&self, name: impl Into<String>) -> Self {
        self.push(PathSegment::Field(name.into()))
    }

    /// Returns a new path with the element placeholder appended.
    pub fn each(&self) -> Self {
        self.push(PathSegment::Each)
    }

    /// Returns a new path with a concrete element index appended.
    pub fn index(&self, i: usize) -> Self {
        self.push(PathSegment::Index(i))
    }

    fn push(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Human-facing field name used in default messages.
    ///
    /// This is the last named segment (`tags[]` -> `tags`), or `value` for a
    /// path with no named segment.
    pub fn label(&self) -> &str {
        self.segments
            .iter()
            .rev()
            .find_map(|s| match s {
                PathSegment::Field(name) => Some(name.as_str()),
                _ => None,
            })
            .unwrap_or("value")
    }

    /// Rewrites concrete indices into placeholders, giving the rule-side key
    /// for a value-side path (`tags[3]` -> `tags[]`).
    pub fn generalized(&self) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|s| match s {
                    PathSegment::Index(_) => PathSegment::Each,
                    other => other.clone(),
                })
                .collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "$root");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write_escaped(f, name)?;
                }
                PathSegment::Each => write!(f, "[]")?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
            }
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    for c in name.chars() {
        if matches!(c, '.' | '[' | ']' | '\\') {
            write!(f, "\\")?;
        }
        write!(f, "{}", c)?;
    }
    Ok(())
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
