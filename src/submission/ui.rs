//! UI-side rule evaluation
//!
//! Applies a compiled RuleSet to a form value the way a UI form layer
//! would. Only the rule vocabulary is available here: refinements and
//! anything else the schema alone knows about are invisible.

use regex::Regex;
use serde_json::Value;

use crate::compiler::{messages, Measure, Rule, RuleSet, TypeTag};
use crate::schema::{FieldPath, PathSegment};
use crate::validator::formats;
use crate::validator::ErrorList;

/// Evaluates every rule against `value`; errors follow RuleSet order.
///
/// A field whose parent object is missing is skipped: the UI layer only
/// sees fields that exist in the form value.
pub fn evaluate_rules(rules: &RuleSet, value: &Value) -> ErrorList {
    let mut errors = ErrorList::new();
    for (path, field_rules) in rules.iter() {
        for (concrete, target) in resolve(path, value) {
            evaluate_field(field_rules, &concrete, target, &mut errors);
        }
    }
    errors
}

/// Concrete paths (and values, `None` if absent) addressed by `path`.
fn resolve<'v>(path: &FieldPath, value: &'v Value) -> Vec<(FieldPath, Option<&'v Value>)> {
    let mut current = vec![(FieldPath::root(), Some(value))];

    for segment in path.segments() {
        let mut next = Vec::new();
        for (at, v) in current {
            match (segment, v) {
                (PathSegment::Field(name), Some(Value::Object(map))) => {
                    next.push((at.field(name.as_str()), map.get(name)));
                }
                (PathSegment::Each, Some(Value::Array(items))) => {
                    next.extend(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, item)| (at.index(i), Some(item))),
                    );
                }
                (PathSegment::Index(i), Some(Value::Array(items))) => {
                    next.push((at.index(*i), items.get(*i)));
                }
                _ => {}
            }
        }
        current = next;
    }
    current
}

fn evaluate_field(rules: &[Rule], path: &FieldPath, value: Option<&Value>, errors: &mut ErrorList) {
    let Some(first) = rules.first() else {
        return;
    };
    let label = path.label();

    let value = match value {
        None | Some(Value::Null) => {
            if rules.iter().any(|r| r.required) {
                errors.push(path.clone(), messages::required(label));
            }
            return;
        }
        Some(v) => v,
    };

    if !first.type_tag.tags().iter().any(|tag| has_type(*tag, value)) {
        errors.push(
            path.clone(),
            messages::type_mismatch(label, &first.type_tag.describe()),
        );
        return;
    }

    for rule in rules {
        if !rule_passes(rule, value) {
            errors.push(path.clone(), rule.message.clone());
        }
    }
}

fn has_type(tag: TypeTag, value: &Value) -> bool {
    match tag {
        TypeTag::String | TypeTag::Email | TypeTag::Url => value.is_string(),
        TypeTag::Number => value.is_number(),
        TypeTag::Boolean => value.is_boolean(),
        TypeTag::Array => value.is_array(),
        TypeTag::Object => value.is_object(),
    }
}

/// True unless a bound, pattern or format of `rule` is violated.
///
/// Checks whose measure does not fit the value's type are skipped; on a
/// union field they belong to another alternative.
fn rule_passes(rule: &Rule, value: &Value) -> bool {
    if let Some(bounds) = &rule.bounds {
        let measured = match (bounds.measure, value) {
            (Measure::Length, Value::String(s)) => Some(formats::char_len(s) as f64),
            (Measure::Value, Value::Number(n)) => n.as_f64(),
            (Measure::Items, Value::Array(items)) => Some(items.len() as f64),
            _ => None,
        };
        if let Some(x) = measured {
            if !bounds.contains(x) {
                return false;
            }
        }
    }

    let Value::String(s) = value else {
        return true;
    };

    if let Some(pattern) = &rule.pattern {
        // Patterns were checked when the RuleSet was compiled
        if let Ok(re) = Regex::new(pattern) {
            if !re.is_match(s) {
                return false;
            }
        }
    }

    match rule.format() {
        Some(TypeTag::Email) => formats::is_email(s),
        Some(TypeTag::Url) => formats::is_url(s),
        _ => true,
    }
}
