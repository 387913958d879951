//! Constraint vocabulary
//!
//! The set of constraint kinds is closed. Kind names outside the vocabulary
//! still deserialize (as `Unrecognized`) so that compilation can report them
//! together with the field path that declared them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When a UI rule fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    #[default]
    OnBlur,
    OnChange,
    OnBlurAndChange,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::OnBlur => "on_blur",
            Trigger::OnChange => "on_change",
            Trigger::OnBlurAndChange => "on_blur_and_change",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of a constraint, with its parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// String length lower bound (inclusive)
    MinLength(usize),
    /// String length upper bound (inclusive)
    MaxLength(usize),
    /// Exact string length
    ExactLength(usize),
    /// Regular expression the whole string must match somewhere
    Pattern(String),
    /// Email address format
    Email,
    /// Absolute http(s) URL format
    Url,
    NumericGt(f64),
    NumericGte(f64),
    NumericLt(f64),
    NumericLte(f64),
    /// Array length lower bound (inclusive)
    MinItems(usize),
    /// Array length upper bound (inclusive)
    MaxItems(usize),
    /// Exact array length
    ExactItems(usize),
    /// A kind name the vocabulary does not know.
    Unrecognized { name: String, value: Option<Value> },
}

impl ConstraintKind {
    /// Wire name of the kind.
    pub fn name(&self) -> &str {
        match self {
            ConstraintKind::MinLength(_) => "min_length",
            ConstraintKind::MaxLength(_) => "max_length",
            ConstraintKind::ExactLength(_) => "exact_length",
            ConstraintKind::Pattern(_) => "pattern",
            ConstraintKind::Email => "email",
            ConstraintKind::Url => "url",
            ConstraintKind::NumericGt(_) => "numeric_gt",
            ConstraintKind::NumericGte(_) => "numeric_gte",
            ConstraintKind::NumericLt(_) => "numeric_lt",
            ConstraintKind::NumericLte(_) => "numeric_lte",
            ConstraintKind::MinItems(_) => "min_items",
            ConstraintKind::MaxItems(_) => "max_items",
            ConstraintKind::ExactItems(_) => "exact_items",
            ConstraintKind::Unrecognized { name, .. } => name.as_str(),
        }
    }

    /// Parameter as a JSON value, if the kind carries one.
    pub fn param(&self) -> Option<Value> {
        match self {
            ConstraintKind::MinLength(n)
            | ConstraintKind::MaxLength(n)
            | ConstraintKind::ExactLength(n)
            | ConstraintKind::MinItems(n)
            | ConstraintKind::MaxItems(n)
            | ConstraintKind::ExactItems(n) => Some(Value::from(*n as u64)),
            ConstraintKind::NumericGt(x)
            | ConstraintKind::NumericGte(x)
            | ConstraintKind::NumericLt(x)
            | ConstraintKind::NumericLte(x) => Some(Value::from(*x)),
            ConstraintKind::Pattern(p) => Some(Value::from(p.as_str())),
            ConstraintKind::Email | ConstraintKind::Url => None,
            ConstraintKind::Unrecognized { value, .. } => value.clone(),
        }
    }

    /// Builds a kind from its wire name and parameter.
    ///
    /// Unknown names are kept as `Unrecognized`; a known name with a missing
    /// or malformed parameter is an error.
    pub fn from_parts(name: &str, value: Option<Value>) -> Result<Self, String> {
        let kind = match name {
            "min_length" => ConstraintKind::MinLength(count_param(name, &value)?),
            "max_length" => ConstraintKind::MaxLength(count_param(name, &value)?),
            "exact_length" => ConstraintKind::ExactLength(count_param(name, &value)?),
            "pattern" => match value.as_ref().and_then(Value::as_str) {
                Some(p) => ConstraintKind::Pattern(p.to_string()),
                None => return Err("'pattern' requires a string value".into()),
            },
            "email" => ConstraintKind::Email,
            "url" => ConstraintKind::Url,
            "numeric_gt" => ConstraintKind::NumericGt(number_param(name, &value)?),
            "numeric_gte" => ConstraintKind::NumericGte(number_param(name, &value)?),
            "numeric_lt" => ConstraintKind::NumericLt(number_param(name, &value)?),
            "numeric_lte" => ConstraintKind::NumericLte(number_param(name, &value)?),
            "min_items" => ConstraintKind::MinItems(count_param(name, &value)?),
            "max_items" => ConstraintKind::MaxItems(count_param(name, &value)?),
            "exact_items" => ConstraintKind::ExactItems(count_param(name, &value)?),
            other => ConstraintKind::Unrecognized {
                name: other.to_string(),
                value,
            },
        };
        Ok(kind)
    }
}

fn count_param(name: &str, value: &Option<Value>) -> Result<usize, String> {
    value
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("'{}' requires a non-negative integer value", name))
}

fn number_param(name: &str, value: &Option<Value>) -> Result<f64, String> {
    value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|x| x.is_finite())
        .ok_or_else(|| format!("'{}' requires a finite numeric value", name))
}

/// A single validation condition attached to a schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraint", into = "RawConstraint")]
pub struct Constraint {
    pub kind: ConstraintKind,
    /// Author-supplied message overriding the generated default
    pub message: Option<String>,
    /// Author-supplied trigger overriding the configured default
    pub trigger: Option<Trigger>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind) -> Self {
        Self {
            kind,
            message: None,
            trigger: None,
        }
    }

    /// A constraint of a kind the compiler has no mapping for.
    pub fn unrecognized(name: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Unrecognized {
            name: name.into(),
            value: None,
        })
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// The custom message, if present and non-empty.
    pub fn custom_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Wire form of a constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConstraint {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trigger: Option<Trigger>,
}

impl TryFrom<RawConstraint> for Constraint {
    type Error = String;

    fn try_from(raw: RawConstraint) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: ConstraintKind::from_parts(&raw.kind, raw.value)?,
            message: raw.message,
            trigger: raw.trigger,
        })
    }
}

impl From<Constraint> for RawConstraint {
    fn from(c: Constraint) -> Self {
        Self {
            kind: c.kind.name().to_string(),
            value: c.kind.param(),
            message: c.message,
            trigger: c.trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_known_kind() {
        let c: Constraint =
            serde_json::from_value(json!({ "kind": "min_length", "value": 3 })).unwrap();
        assert_eq!(c.kind, ConstraintKind::MinLength(3));
        assert!(c.message.is_none());
    }

    #[test]
    fn test_parse_message_and_trigger() {
        let c: Constraint = serde_json::from_value(json!({
            "kind": "email",
            "message": "bad email",
            "trigger": "on_change"
        }))
        .unwrap();
        assert_eq!(c.kind, ConstraintKind::Email);
        assert_eq!(c.custom_message(), Some("bad email"));
        assert_eq!(c.trigger, Some(Trigger::OnChange));
    }

    #[test]
    fn test_unknown_kind_is_kept() {
        let c: Constraint =
            serde_json::from_value(json!({ "kind": "ip_address", "value": "v4" })).unwrap();
        assert_eq!(c.kind.name(), "ip_address");
        assert!(matches!(c.kind, ConstraintKind::Unrecognized { .. }));
    }

    #[test]
    fn test_malformed_param_rejected() {
        let result: Result<Constraint, _> =
            serde_json::from_value(json!({ "kind": "max_length", "value": -1 }));
        assert!(result.is_err());

        let result: Result<Constraint, _> =
            serde_json::from_value(json!({ "kind": "numeric_gt" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_message_is_not_custom() {
        let c = Constraint::new(ConstraintKind::Email).with_message("  ");
        assert_eq!(c.custom_message(), None);
    }

    #[test]
    fn test_serialize_wire_form() {
        let c = Constraint::new(ConstraintKind::NumericGte(18.0)).with_message("adults only");
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["kind"], "numeric_gte");
        assert_eq!(value["value"], 18.0);
        assert_eq!(value["message"], "adults only");
        assert!(value.get("trigger").is_none());
    }
}
