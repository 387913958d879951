//! Target-side rule representation
//!
//! A `RuleSet` maps each field path, in declaration order, to an ordered
//! list of `Rule`s. It is produced once per schema and never mutated.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::schema::{FieldPath, PrimitiveType, Trigger};

/// Value type a UI rule expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Email,
    Url,
    Array,
    /// Only on union fields with an object alternative
    Object,
}

impl TypeTag {
    pub fn type_name(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Email => "email address",
            TypeTag::Url => "URL",
            TypeTag::Array => "list",
            TypeTag::Object => "object",
        }
    }
}

impl From<PrimitiveType> for TypeTag {
    fn from(p: PrimitiveType) -> Self {
        match p {
            PrimitiveType::String => TypeTag::String,
            PrimitiveType::Number => TypeTag::Number,
            PrimitiveType::Boolean => TypeTag::Boolean,
        }
    }
}

/// A single tag, or the ordered tag list of a union field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RuleType {
    Single(TypeTag),
    Union(Vec<TypeTag>),
}

impl RuleType {
    pub fn tags(&self) -> &[TypeTag] {
        match self {
            RuleType::Single(tag) => std::slice::from_ref(tag),
            RuleType::Union(tags) => tags.as_slice(),
        }
    }

    /// Name used in type-mismatch messages (`string or number`).
    pub fn describe(&self) -> String {
        self.tags()
            .iter()
            .map(TypeTag::type_name)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}

/// What a bound measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// String length in characters
    Length,
    /// Numeric value
    Value,
    /// Array item count
    Items,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bounds {
    pub measure: Measure,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<f64>,
    /// `min`/`max` exclude the bound itself
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub exclusive: bool,
}

impl Bounds {
    pub fn new(measure: Measure) -> Self {
        Self {
            measure,
            min: None,
            max: None,
            exact: None,
            exclusive: false,
        }
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn exact(mut self, exact: f64) -> Self {
        self.exact = Some(exact);
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// True when `x` satisfies every bound present.
    pub fn contains(&self, x: f64) -> bool {
        if let Some(exact) = self.exact {
            if x != exact {
                return false;
            }
        }
        let above = match self.min {
            Some(min) if self.exclusive => x > min,
            Some(min) => x >= min,
            None => true,
        };
        let below = match self.max {
            Some(max) if self.exclusive => x < max,
            Some(max) => x <= max,
            None => true,
        };
        above && below
    }
}

/// One UI validation rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub trigger: Trigger,
    pub required: bool,
    #[serde(rename = "type")]
    pub type_tag: RuleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Resolved message; never empty
    pub message: String,
    /// Constraint kind(s) the rule came from; `None` for a field's base rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

impl Rule {
    /// String format the rule checks, if any.
    ///
    /// Union fields keep their tag list, so the format is recovered from
    /// the originating constraint kind.
    pub fn format(&self) -> Option<TypeTag> {
        match (&self.type_tag, self.constraint.as_deref()) {
            (RuleType::Single(TypeTag::Email), _) | (_, Some("email")) => Some(TypeTag::Email),
            (RuleType::Single(TypeTag::Url), _) | (_, Some("url")) => Some(TypeTag::Url),
            _ => None,
        }
    }
}

/// Compiled rules keyed by field path, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    fields: Vec<(FieldPath, Vec<Rule>)>,
}

impl RuleSet {
    pub(crate) fn from_fields(fields: Vec<(FieldPath, Vec<Rule>)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&[Rule]> {
        self.fields
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, rules)| rules.as_slice())
    }

    /// Looks up a field by its rendered path (`address.city`, `tags[]`).
    ///
    /// Delimiters inside a field name are backslash-escaped in the rendered
    /// form, so a field named `a.b` is looked up as `r"a\.b"`.
    pub fn get_by_name(&self, rendered: &str) -> Option<&[Rule]> {
        self.fields
            .iter()
            .find(|(p, _)| p.to_string() == rendered)
            .map(|(_, rules)| rules.as_slice())
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.fields.iter().map(|(p, _)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &[Rule])> {
        self.fields.iter().map(|(p, rules)| (p, rules.as_slice()))
    }

    /// Number of field keys
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of rules across all fields
    pub fn rule_count(&self) -> usize {
        self.fields.iter().map(|(_, rules)| rules.len()).sum()
    }
}

impl Serialize for RuleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (path, rules) in &self.fields {
            map.serialize_entry(&path.to_string(), rules)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_rule(tag: TypeTag) -> Rule {
        Rule {
            trigger: Trigger::OnBlur,
            required: true,
            type_tag: RuleType::Single(tag),
            bounds: None,
            pattern: None,
            message: "x is required".into(),
            constraint: None,
        }
    }

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::new(Measure::Length).min(3.0).max(5.0);
        assert!(!b.contains(2.0));
        assert!(b.contains(3.0));
        assert!(b.contains(5.0));
        assert!(!b.contains(6.0));

        let b = Bounds::new(Measure::Value).min(0.0).exclusive();
        assert!(!b.contains(0.0));
        assert!(b.contains(0.1));

        let b = Bounds::new(Measure::Items).exact(2.0);
        assert!(b.contains(2.0));
        assert!(!b.contains(3.0));
    }

    #[test]
    fn test_rule_type_serialization() {
        let single = serde_json::to_value(RuleType::Single(TypeTag::Email)).unwrap();
        assert_eq!(single, serde_json::json!("Email"));

        let union =
            serde_json::to_value(RuleType::Union(vec![TypeTag::String, TypeTag::Number])).unwrap();
        assert_eq!(union, serde_json::json!(["String", "Number"]));
    }

    #[test]
    fn test_ruleset_serializes_in_declaration_order() {
        let rules = RuleSet::from_fields(vec![
            (FieldPath::of(&["zeta"]), vec![base_rule(TypeTag::String)]),
            (FieldPath::of(&["alpha"]), vec![base_rule(TypeTag::Number)]),
        ]);
        let json = serde_json::to_string(&rules).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
        assert_eq!(rules.len(), 2);
        assert_eq!(rules.rule_count(), 2);
    }

    #[test]
    fn test_rule_omits_absent_parts() {
        let json = serde_json::to_value(base_rule(TypeTag::Boolean)).unwrap();
        assert_eq!(json["trigger"], "on_blur");
        assert_eq!(json["type"], "Boolean");
        assert!(json.get("bounds").is_none());
        assert!(json.get("pattern").is_none());
        assert!(json.get("constraint").is_none());
    }

    #[test]
    fn test_describe_union() {
        let t = RuleType::Union(vec![TypeTag::String, TypeTag::Number]);
        assert_eq!(t.describe(), "string or number");
    }
}
