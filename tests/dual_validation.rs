//! Dual Validation Tests
//!
//! Properties of the submission protocol:
//! - The authoritative parse decides acceptance, whatever the UI verdict
//! - UI rules and the schema agree on what the UI vocabulary can express
//! - A bypassed UI gate does not block a valid record
//! - Authoritative errors are exhaustive and ordered
//! - Union fields never make the UI stricter than the schema
//! - Refinement authoring defects surface at compile time

use std::sync::Arc;
use std::thread;

use formrules::compiler::{compile, CompileError, Compiler, RuleSetCache};
use formrules::schema::builder::{array, boolean, number, object, string, union};
use formrules::schema::{FieldPath, Refinement, SchemaNode};
use formrules::submission::{evaluate_rules, Submission, SubmissionOutcome, SubmissionState};
use formrules::validator::{validate, ValidationFailure};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn signup_schema() -> SchemaNode {
    object([
        ("username", string().min(3).max(20)),
        ("email", string().email()),
        ("password", string().min(8)),
        ("confirmPassword", string()),
        ("age", number().gte(13.0).optional()),
        ("tags", array(string().max(12)).max(3)),
        ("newsletter", boolean().optional()),
    ])
    .fields_equal("confirmPassword", "password", "passwords must match")
}

fn valid_signup() -> Value {
    json!({
        "username": "ada",
        "email": "ada@example.com",
        "password": "correct horse",
        "confirmPassword": "correct horse",
        "tags": ["math"],
    })
}

fn error_pairs(failure: ValidationFailure) -> Vec<(String, String)> {
    failure
        .into_errors()
        .into_iter()
        .map(|e| (e.path.to_string(), e.message))
        .collect()
}

// =============================================================================
// Precedence Tests
// =============================================================================

/// A value passing every UI rule but violating a refinement is rejected.
#[test]
fn test_authoritative_only_constraint_rejects() {
    let schema = signup_schema();
    let rules = compile(&schema).unwrap();
    let mut value = valid_signup();
    value["confirmPassword"] = json!("something else");

    assert!(evaluate_rules(&rules, &value).is_empty());

    let failure = validate(&schema, &value).unwrap_err();
    assert_eq!(
        error_pairs(failure),
        vec![("confirmPassword".to_string(), "passwords must match".to_string())]
    );

    let mut submission = Submission::new(&schema, &rules);
    assert!(submission.check_ui(&value).is_empty());
    assert_eq!(submission.state(), &SubmissionState::UiAccepted);

    let (state, outcome) = submission.submit(&value);
    assert!(matches!(state, SubmissionState::Rejected(_)));
    assert!(!outcome.is_accepted());
    assert!(!outcome.ui_bypassed());
}

/// A differ refinement is enforced only by the schema.
#[test]
fn test_fields_differ_refinement() {
    let schema = object([("old", string()), ("new", string().min(4))]).refine(
        Refinement::FieldsDiffer {
            field: "new".into(),
            other: "old".into(),
            message: None,
        },
    );
    let rules = compile(&schema).unwrap();
    let value = json!({ "old": "hunter2", "new": "hunter2" });

    assert!(evaluate_rules(&rules, &value).is_empty());
    let errors = error_pairs(validate(&schema, &value).unwrap_err());
    assert_eq!(errors, vec![("new".into(), "new must differ from old".into())]);
}

/// Skipping the UI gate still accepts a valid record, flagged as bypassed.
#[test]
fn test_bypassed_ui_valid_record() {
    let schema = signup_schema();
    let rules = compile(&schema).unwrap();

    let (state, outcome) = Submission::new(&schema, &rules).submit(&valid_signup());
    assert_eq!(state, SubmissionState::Accepted);
    match outcome {
        SubmissionOutcome::Accepted { data, ui_bypassed } => {
            assert!(ui_bypassed);
            assert_eq!(data["username"], "ada");
        }
        other => panic!("expected acceptance, got {:?}", other),
    }
}

/// Skipping the UI gate cannot sneak an invalid record through.
#[test]
fn test_bypassed_ui_invalid_record() {
    let schema = signup_schema();
    let rules = compile(&schema).unwrap();
    let mut value = valid_signup();
    value["username"] = json!("x");

    let (state, outcome) = Submission::new(&schema, &rules).submit(&value);
    assert!(matches!(state, SubmissionState::Rejected(_)));
    assert!(outcome.ui_bypassed());
}

/// A failed UI check leaves the submission editable; the schema still decides.
#[test]
fn test_ui_failure_does_not_decide() {
    let schema = object([("code", union([string().min(4), number()]))]);
    let rules = compile(&schema).unwrap();

    let mut submission = Submission::new(&schema, &rules);
    assert!(!submission.check_ui(&json!({ "code": "ab" })).is_empty());
    assert_eq!(submission.state(), &SubmissionState::Editing);

    let (state, _) = submission.submit(&json!({ "code": 42 }));
    assert_eq!(state, SubmissionState::Accepted);
}

// =============================================================================
// Agreement Tests
// =============================================================================

/// For constraints the UI can express, UI and schema report the same messages.
#[test]
fn test_ui_and_schema_agree_on_expressible_constraints() {
    let schema = object([
        ("username", string().min(3).max(20)),
        ("email", string().email()),
        ("age", number().gte(13.0)),
        ("tags", array(string().max(5)).min(1)),
    ]);
    let rules = compile(&schema).unwrap();
    let value = json!({
        "username": "ab",
        "email": "not-an-email",
        "age": 9,
        "tags": ["fine", "far too long"],
    });

    let ui: Vec<_> = evaluate_rules(&rules, &value)
        .into_iter()
        .map(|e| (e.path.to_string(), e.message))
        .collect();
    let authoritative = error_pairs(validate(&schema, &value).unwrap_err());

    assert_eq!(ui, authoritative);
    assert_eq!(ui.len(), 4);
}

/// Missing required fields are reported by both sides.
#[test]
fn test_required_fields_agree() {
    let schema = signup_schema();
    let rules = compile(&schema).unwrap();
    let value = json!({ "username": "ada" });

    let ui = evaluate_rules(&rules, &value);
    let authoritative = validate(&schema, &value).unwrap_err();

    for field in ["email", "password", "confirmPassword", "tags"] {
        let path = FieldPath::of(&[field]);
        let expected = vec![format!("{} is required", field)];
        assert_eq!(ui.messages_at(&path), expected);
        assert_eq!(authoritative.errors().messages_at(&path), expected);
    }
    assert!(ui.messages_at(&FieldPath::of(&["age"])).is_empty());
}

// =============================================================================
// Union Agreement Tests
// =============================================================================

/// Fields of one object alternative are not required when another is chosen.
#[test]
fn test_union_of_objects_agrees_with_schema() {
    let schema = object([(
        "contact",
        union([
            object([("email", string().email())]),
            object([("phone", number())]),
        ]),
    )]);
    let rules = compile(&schema).unwrap();

    for value in [
        json!({ "contact": { "email": "a@b.io" } }),
        json!({ "contact": { "phone": 5551234 } }),
    ] {
        assert!(validate(&schema, &value).is_ok());
        assert!(evaluate_rules(&rules, &value).is_empty(), "UI rejected {}", value);

        let (state, _) = Submission::new(&schema, &rules).submit(&value);
        assert_eq!(state, SubmissionState::Accepted);
    }

    let missing = json!({});
    let ui = evaluate_rules(&rules, &missing);
    let authoritative = validate(&schema, &missing).unwrap_err();
    let path = FieldPath::of(&["contact"]);
    assert_eq!(ui.messages_at(&path), vec!["contact is required"]);
    assert_eq!(authoritative.errors().messages_at(&path), vec!["contact is required"]);
}

/// An object value passes the UI type check when a union allows objects.
#[test]
fn test_union_of_object_and_string_accepts_both() {
    let schema = object([("x", union([object([("a", string())]), string()]))]);
    let rules = compile(&schema).unwrap();

    for value in [json!({ "x": { "a": "s" } }), json!({ "x": "s" })] {
        assert!(validate(&schema, &value).is_ok());
        assert!(evaluate_rules(&rules, &value).is_empty(), "UI rejected {}", value);
    }

    let value = json!({ "x": 3 });
    assert!(validate(&schema, &value).is_err());
    assert!(!evaluate_rules(&rules, &value).is_empty());
}

/// A refinement naming an undeclared field is caught before any submission.
#[test]
fn test_undeclared_refinement_field_fails_compile() {
    let schema = object([("password", string().min(8))]).fields_equal(
        "confirm",
        "password",
        "passwords must match",
    );

    match compile(&schema) {
        Err(CompileError::UnknownRefinementField { field, path }) => {
            assert_eq!(field, "confirm");
            assert!(path.is_root());
        }
        other => panic!("expected UnknownRefinementField, got {:?}", other),
    }
}

// =============================================================================
// Authoritative Result Tests
// =============================================================================

/// Accepted data drops undeclared keys.
#[test]
fn test_accepted_data_is_cleaned() {
    let mut value = valid_signup();
    value["isAdmin"] = json!(true);

    let data = validate(&signup_schema(), &value).unwrap();
    assert!(data.get("isAdmin").is_none());
    assert_eq!(data["tags"], json!(["math"]));
}

/// The failure carries its code and every violation in declaration order.
#[test]
fn test_failure_is_exhaustive() {
    let value = json!({
        "username": "",
        "email": "x",
        "password": "short",
        "confirmPassword": "short",
        "tags": ["a", "b", "c", "d"],
        "newsletter": "yes",
    });
    let failure = validate(&signup_schema(), &value).unwrap_err();
    assert_eq!(failure.code(), "FORM_AUTHORITATIVE_VALIDATION_FAILED");

    let paths: Vec<_> = failure.errors().iter().map(|e| e.path.to_string()).collect();
    assert_eq!(
        paths,
        vec!["username", "email", "password", "tags", "newsletter"]
    );
}

// =============================================================================
// Cache Tests
// =============================================================================

/// Cached RuleSets evaluate exactly like fresh ones.
#[test]
fn test_cached_rules_match_fresh_compile() {
    let cache = RuleSetCache::new(Compiler::default());
    let schema = signup_schema();

    let cached = cache.get_or_compile(&schema).unwrap();
    let again = cache.get_or_compile(&schema).unwrap();
    assert_eq!(*cached, compile(&schema).unwrap());
    assert_eq!(cached, again);
    assert_eq!(cache.len(), 1);
}

/// Concurrent callers compile once and share the same RuleSet.
#[test]
fn test_cache_shared_across_threads() {
    let cache = RuleSetCache::new(Compiler::default());
    let schema = signup_schema();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| cache.get_or_compile(&schema).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.len(), 1);
    assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));

    let value = valid_signup();
    assert!(evaluate_rules(&results[0], &value).is_empty());
}
