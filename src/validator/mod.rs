//! Authoritative validation
//!
//! Runs the schema itself against a submitted value. This is the check
//! whose verdict accepts or rejects a record; compiled UI rules never
//! substitute for it.
//!
//! - Exhaustive: every violation is collected, none short-circuits
//! - Errors are ordered by field declaration order, then constraint order
//! - Undeclared object keys are dropped from the returned data
//! - Authoring defects found on the way are reported, never accepted

mod errors;
pub(crate) mod formats;

use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

pub use errors::{ErrorList, ValidationError, ValidationFailure};

use crate::compiler::messages;
use crate::observability::{log_event, log_event_with_fields, Event, MetricsRegistry};
use crate::schema::{Constraint, ConstraintKind, Field, FieldPath, Refinement, SchemaNode};

/// Validates values against schemas, counting outcomes.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    metrics: Arc<MetricsRegistry>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Arc<MetricsRegistry>) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Returns the accepted data, or every violation found.
    pub fn validate(&self, schema: &SchemaNode, value: &Value) -> Result<Value, ValidationFailure> {
        let mut errors = ErrorList::new();
        let data = check(schema, Some(value), &FieldPath::root(), &mut errors);

        if errors.is_empty() {
            self.metrics.increment_validations_accepted();
            log_event(Event::ValidationAccepted);
            Ok(data.unwrap_or(Value::Null))
        } else {
            self.metrics.increment_validations_rejected();
            let count = errors.len().to_string();
            log_event_with_fields(Event::ValidationRejected, &[("errors", count.as_str())]);
            Err(ValidationFailure::AuthoritativeValidationFailed { errors })
        }
    }
}

/// Validates with a fresh, unshared metrics registry.
pub fn validate(schema: &SchemaNode, value: &Value) -> Result<Value, ValidationFailure> {
    Validator::new().validate(schema, value)
}

/// Checks `value` (`None` when absent) against `node`.
///
/// Returns the cleaned value, or `None` when absent or when errors were
/// recorded for it.
fn check(
    node: &SchemaNode,
    value: Option<&Value>,
    path: &FieldPath,
    errors: &mut ErrorList,
) -> Option<Value> {
    match (node, value) {
        (SchemaNode::Optional { .. }, None) => None,
        (SchemaNode::Optional { inner }, Some(v)) => check(inner, Some(v), path, errors),
        (SchemaNode::Nullable { .. }, Some(Value::Null)) => Some(Value::Null),
        (SchemaNode::Nullable { inner }, v) => check(inner, v, path, errors),
        (SchemaNode::Union { alternatives }, None) => {
            if alternatives.iter().any(accepts_absent) {
                None
            } else {
                errors.push(path.clone(), messages::required(path.label()));
                None
            }
        }
        (SchemaNode::Union { alternatives }, Some(v)) => check_union(alternatives, v, path, errors),
        (_, None) => {
            errors.push(path.clone(), messages::required(path.label()));
            None
        }
        (_, Some(v)) => check_present(node, v, path, errors),
    }
}

fn check_present(
    node: &SchemaNode,
    value: &Value,
    path: &FieldPath,
    errors: &mut ErrorList,
) -> Option<Value> {
    let before = errors.len();

    match (node, value) {
        (SchemaNode::String { constraints }, Value::String(s)) => {
            for c in constraints {
                check_constraint(c, Subject::Text(s), path, errors);
            }
        }
        (SchemaNode::Number { constraints }, Value::Number(n)) => match n.as_f64() {
            Some(x) if x.is_finite() => {
                for c in constraints {
                    check_constraint(c, Subject::Number(x), path, errors);
                }
            }
            _ => errors.push(path.clone(), type_mismatch(node, path)),
        },
        (SchemaNode::Boolean { constraints }, Value::Bool(_)) => {
            for c in constraints {
                check_constraint(c, Subject::Flag, path, errors);
            }
        }
        (SchemaNode::Array { element, constraints }, Value::Array(items)) => {
            for c in constraints {
                check_constraint(c, Subject::Items(items.len()), path, errors);
            }
            let mut cleaned = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                if let Some(v) = check(element, Some(item), &path.index(i), errors) {
                    cleaned.push(v);
                }
            }
            return (errors.len() == before).then_some(Value::Array(cleaned));
        }
        (
            SchemaNode::Object {
                fields,
                refinements,
                constraints,
            },
            Value::Object(map),
        ) => {
            for c in constraints {
                check_constraint(c, Subject::Record, path, errors);
            }
            let mut cleaned = Map::new();
            for field in fields {
                let child = path.field(field.name.as_str());
                if let Some(v) = check(&field.schema, map.get(&field.name), &child, errors) {
                    cleaned.insert(field.name.clone(), v);
                }
            }
            if errors.len() == before {
                for refinement in refinements {
                    check_refinement(refinement, fields, map, path, errors);
                }
            }
            return (errors.len() == before).then_some(Value::Object(cleaned));
        }
        (SchemaNode::Optional { .. } | SchemaNode::Nullable { .. } | SchemaNode::Union { .. }, _) => {
            return check(node, Some(value), path, errors);
        }
        _ => errors.push(path.clone(), type_mismatch(node, path)),
    }

    (errors.len() == before).then(|| value.clone())
}

fn check_union(
    alternatives: &[SchemaNode],
    value: &Value,
    path: &FieldPath,
    errors: &mut ErrorList,
) -> Option<Value> {
    let mut closest: Option<ErrorList> = None;

    for alternative in alternatives {
        let mut attempt = ErrorList::new();
        let cleaned = check(alternative, Some(value), path, &mut attempt);
        if attempt.is_empty() {
            return cleaned;
        }
        if closest.is_none() && shape_matches(alternative, value) {
            closest = Some(attempt);
        }
    }

    match closest {
        Some(attempt) => errors.extend(attempt),
        None => errors.push(path.clone(), messages::no_matching_alternative(path.label())),
    }
    None
}

/// The measured part of a value a constraint is checked against.
#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Text(&'a str),
    Number(f64),
    Items(usize),
    Flag,
    Record,
}

fn check_constraint(
    constraint: &Constraint,
    subject: Subject<'_>,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    let label = path.label();
    let satisfied = match (&constraint.kind, subject) {
        (ConstraintKind::MinLength(n), Subject::Text(s)) => formats::char_len(s) >= *n,
        (ConstraintKind::MaxLength(n), Subject::Text(s)) => formats::char_len(s) <= *n,
        (ConstraintKind::ExactLength(n), Subject::Text(s)) => formats::char_len(s) == *n,
        (ConstraintKind::Pattern(pattern), Subject::Text(s)) => match Regex::new(pattern) {
            Ok(re) => re.is_match(s),
            Err(_) => {
                errors.push(
                    path.clone(),
                    format!("{} has an invalid pattern '{}'", label, pattern),
                );
                return;
            }
        },
        (ConstraintKind::Email, Subject::Text(s)) => formats::is_email(s),
        (ConstraintKind::Url, Subject::Text(s)) => formats::is_url(s),
        (ConstraintKind::NumericGt(bound), Subject::Number(x)) => x > *bound,
        (ConstraintKind::NumericGte(bound), Subject::Number(x)) => x >= *bound,
        (ConstraintKind::NumericLt(bound), Subject::Number(x)) => x < *bound,
        (ConstraintKind::NumericLte(bound), Subject::Number(x)) => x <= *bound,
        (ConstraintKind::MinItems(n), Subject::Items(len)) => len >= *n,
        (ConstraintKind::MaxItems(n), Subject::Items(len)) => len <= *n,
        (ConstraintKind::ExactItems(n), Subject::Items(len)) => len == *n,
        (ConstraintKind::Unrecognized { .. }, _) => {
            errors.push(path.clone(), messages::default_for(&constraint.kind, label));
            return;
        }
        (kind, _) => {
            errors.push(
                path.clone(),
                format!("{} has constraint '{}' that cannot apply to it", label, kind.name()),
            );
            return;
        }
    };

    if !satisfied {
        errors.push(path.clone(), messages::resolve(constraint, label));
    }
}

fn check_refinement(
    refinement: &Refinement,
    fields: &[Field],
    map: &Map<String, Value>,
    path: &FieldPath,
    errors: &mut ErrorList,
) {
    let (field, other, must_equal) = match refinement {
        Refinement::FieldsEqual { field, other, .. } => (field, other, true),
        Refinement::FieldsDiffer { field, other, .. } => (field, other, false),
    };

    for name in [field, other] {
        if !fields.iter().any(|f| &f.name == name) {
            errors.push(
                path.field(refinement.target()),
                format!("{} refers to undeclared field '{}'", refinement.target(), name),
            );
            return;
        }
    }

    let equal = map.get(field) == map.get(other);
    if equal != must_equal {
        errors.push(path.field(refinement.target()), refinement.resolved_message());
    }
}

/// True when `node` accepts an absent value.
fn accepts_absent(node: &SchemaNode) -> bool {
    match node {
        SchemaNode::Optional { .. } => true,
        SchemaNode::Nullable { inner } => accepts_absent(inner),
        SchemaNode::Union { alternatives } => alternatives.iter().any(accepts_absent),
        _ => false,
    }
}

/// True when the value has the base type `node` expects, ignoring constraints.
fn shape_matches(node: &SchemaNode, value: &Value) -> bool {
    match (node, value) {
        (SchemaNode::Nullable { .. }, Value::Null) => true,
        (SchemaNode::Optional { inner } | SchemaNode::Nullable { inner }, v) => {
            shape_matches(inner, v)
        }
        (SchemaNode::Union { alternatives }, v) => alternatives.iter().any(|a| shape_matches(a, v)),
        (SchemaNode::String { .. }, Value::String(_))
        | (SchemaNode::Number { .. }, Value::Number(_))
        | (SchemaNode::Boolean { .. }, Value::Bool(_))
        | (SchemaNode::Array { .. }, Value::Array(_))
        | (SchemaNode::Object { .. }, Value::Object(_)) => true,
        _ => false,
    }
}

fn expected_name(node: &SchemaNode) -> String {
    match node {
        SchemaNode::String { .. } => "string".into(),
        SchemaNode::Number { .. } => "number".into(),
        SchemaNode::Boolean { .. } => "boolean".into(),
        SchemaNode::Array { .. } => "list".into(),
        SchemaNode::Object { .. } => "object".into(),
        SchemaNode::Optional { inner } | SchemaNode::Nullable { inner } => expected_name(inner),
        SchemaNode::Union { alternatives } => alternatives
            .iter()
            .map(expected_name)
            .collect::<Vec<_>>()
            .join(" or "),
    }
}

fn type_mismatch(node: &SchemaNode, path: &FieldPath) -> String {
    messages::type_mismatch(path.label(), &expected_name(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::{array, boolean, number, object, string, union};
    use serde_json::json;

    fn errors_of(schema: &SchemaNode, value: Value) -> Vec<(String, String)> {
        validate(schema, &value)
            .unwrap_err()
            .into_errors()
            .into_iter()
            .map(|e| (e.path.to_string(), e.message))
            .collect()
    }

    fn login() -> SchemaNode {
        object([
            ("username", string().min(3).max(20)),
            ("password", string().min(6)),
            ("rememberMe", boolean().optional()),
        ])
    }

    #[test]
    fn test_valid_login_strips_unknown_keys() {
        let data = validate(
            &login(),
            &json!({ "username": "ada", "password": "secret1", "admin": true }),
        )
        .unwrap();
        assert_eq!(data, json!({ "username": "ada", "password": "secret1" }));
    }

    #[test]
    fn test_errors_are_exhaustive_and_ordered() {
        let errors = errors_of(&login(), json!({ "username": "ab", "rememberMe": "yes" }));
        assert_eq!(
            errors,
            vec![
                ("username".into(), "username must be at least 3 characters".into()),
                ("password".into(), "password is required".into()),
                ("rememberMe".into(), "rememberMe must be a boolean".into()),
            ]
        );
    }

    #[test]
    fn test_every_violated_constraint_reported() {
        let schema = object([("code", string().min(5).regex("^[0-9]+$"))]);
        let errors = errors_of(&schema, json!({ "code": "ab" }));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_null_only_under_nullable() {
        let schema = object([("a", string().nullable()), ("b", string().optional())]);
        assert!(validate(&schema, &json!({ "a": null })).is_ok());

        let errors = errors_of(&schema, json!({ "a": null, "b": null }));
        assert_eq!(errors, vec![("b".into(), "b must be a string".into())]);

        let errors = errors_of(&schema, json!({}));
        assert_eq!(errors, vec![("a".into(), "a is required".into())]);
    }

    #[test]
    fn test_array_errors_use_concrete_indices() {
        let schema = object([("tags", array(string().max(3)).min(1))]);
        let errors = errors_of(&schema, json!({ "tags": ["ok", "toolong", 7] }));
        assert_eq!(
            errors,
            vec![
                ("tags[1]".into(), "tags must be at most 3 characters".into()),
                ("tags[2]".into(), "tags must be a string".into()),
            ]
        );

        let errors = errors_of(&schema, json!({ "tags": [] }));
        assert_eq!(errors[0].1, "tags must contain at least 1 items");
    }

    #[test]
    fn test_lengths_count_characters() {
        let schema = object([("name", string().max(3))]);
        assert!(validate(&schema, &json!({ "name": "日本語" })).is_ok());
    }

    #[test]
    fn test_union_accepts_any_alternative() {
        let schema = object([("id", union([string().min(3), number().gt(0.0)]))]);
        assert!(validate(&schema, &json!({ "id": "abc" })).is_ok());
        assert!(validate(&schema, &json!({ "id": 5 })).is_ok());

        let errors = errors_of(&schema, json!({ "id": -1 }));
        assert_eq!(errors, vec![("id".into(), "id must be greater than 0".into())]);

        let errors = errors_of(&schema, json!({ "id": true }));
        assert_eq!(errors, vec![("id".into(), "id does not match any allowed type".into())]);
    }

    #[test]
    fn test_refinement_runs_after_fields_pass() {
        let schema = object([
            ("password", string().min(6)),
            ("confirm", string()),
        ])
        .fields_equal("confirm", "password", "passwords must match");

        let errors = errors_of(&schema, json!({ "password": "secret1", "confirm": "secret2" }));
        assert_eq!(errors, vec![("confirm".into(), "passwords must match".into())]);

        let errors = errors_of(&schema, json!({ "password": "short", "confirm": "other" }));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "password");
    }

    #[test]
    fn test_authoring_defects_are_errors() {
        let schema = object([
            ("a", string().constrain(Constraint::unrecognized("credit_card"))),
            ("b", string().regex("([")),
        ]);
        let errors = errors_of(&schema, json!({ "a": "x", "b": "y" }));
        assert_eq!(errors.len(), 2);
        assert!(errors[0].1.contains("credit_card"));
        assert!(errors[1].1.contains("invalid pattern"));

        let schema = object([("profile", object([("bio", string())]).min(1))]);
        let errors = errors_of(&schema, json!({ "profile": { "bio": "hi" } }));
        assert_eq!(
            errors,
            vec![(
                "profile".to_string(),
                "profile has constraint 'min_length' that cannot apply to it".to_string()
            )]
        );
    }

    #[test]
    fn test_email_and_url_formats() {
        let schema = object([("email", string().email()), ("site", string().url())]);
        assert!(validate(
            &schema,
            &json!({ "email": "ada@example.com", "site": "https://example.com" })
        )
        .is_ok());

        let errors = errors_of(&schema, json!({ "email": "nope", "site": "example.com" }));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].1, "email must be a valid email address");
    }

    #[test]
    fn test_non_object_root() {
        let errors = errors_of(&login(), json!([1, 2]));
        assert_eq!(errors, vec![("$root".into(), "value must be an object".into())]);
    }

    #[test]
    fn test_metrics_count_outcomes() {
        let validator = Validator::new();
        validator.validate(&login(), &json!({})).unwrap_err();
        validator
            .validate(&login(), &json!({ "username": "ada", "password": "secret1" }))
            .unwrap();
        let snapshot = validator.metrics().snapshot();
        assert_eq!(snapshot.validations_accepted, 1);
        assert_eq!(snapshot.validations_rejected, 1);
    }
}
