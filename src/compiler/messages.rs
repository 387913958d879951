//! Default message templates
//!
//! Shared by the rule emitter and the authoritative validator so both sides
//! word the same violation identically.

use crate::schema::{Constraint, ConstraintKind};

/// Resolves the message for `constraint` on the field labelled `label`:
/// the author's non-empty message, else the default template.
pub fn resolve(constraint: &Constraint, label: &str) -> String {
    match constraint.custom_message() {
        Some(custom) => custom.to_string(),
        None => default_for(&constraint.kind, label),
    }
}

/// Default template for a constraint kind.
pub fn default_for(kind: &ConstraintKind, label: &str) -> String {
    match kind {
        ConstraintKind::MinLength(n) => format!("{} must be at least {} characters", label, n),
        ConstraintKind::MaxLength(n) => format!("{} must be at most {} characters", label, n),
        ConstraintKind::ExactLength(n) => format!("{} must be exactly {} characters", label, n),
        ConstraintKind::Pattern(_) => format!("{} has an invalid format", label),
        ConstraintKind::Email => format!("{} must be a valid email address", label),
        ConstraintKind::Url => format!("{} must be a valid URL", label),
        ConstraintKind::NumericGt(x) => format!("{} must be greater than {}", label, x),
        ConstraintKind::NumericGte(x) => {
            format!("{} must be greater than or equal to {}", label, x)
        }
        ConstraintKind::NumericLt(x) => format!("{} must be less than {}", label, x),
        ConstraintKind::NumericLte(x) => format!("{} must be less than or equal to {}", label, x),
        ConstraintKind::MinItems(n) => format!("{} must contain at least {} items", label, n),
        ConstraintKind::MaxItems(n) => format!("{} must contain at most {} items", label, n),
        ConstraintKind::ExactItems(n) => format!("{} must contain exactly {} items", label, n),
        ConstraintKind::Unrecognized { name, .. } => {
            format!("{} violates unsupported constraint '{}'", label, name)
        }
    }
}

pub fn required(label: &str) -> String {
    format!("{} is required", label)
}

/// Type mismatch; `type_name` is e.g. `string` or `string or number`.
pub fn type_mismatch(label: &str, type_name: &str) -> String {
    let article = match type_name.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("{} must be {} {}", label, article, type_name)
}

pub fn no_matching_alternative(label: &str) -> String {
    format!("{} does not match any allowed type", label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_template() {
        let c = Constraint::new(ConstraintKind::MinLength(3));
        assert_eq!(resolve(&c, "username"), "username must be at least 3 characters");
    }

    #[test]
    fn test_custom_message_wins() {
        let c = Constraint::new(ConstraintKind::MinLength(3)).with_message("too short");
        assert_eq!(resolve(&c, "username"), "too short");
    }

    #[test]
    fn test_numeric_templates_render_integers_plainly() {
        let c = Constraint::new(ConstraintKind::NumericGte(18.0));
        assert_eq!(resolve(&c, "age"), "age must be greater than or equal to 18");
        let c = Constraint::new(ConstraintKind::NumericLt(0.5));
        assert_eq!(resolve(&c, "ratio"), "ratio must be less than 0.5");
    }

    #[test]
    fn test_type_mismatch_article() {
        assert_eq!(type_mismatch("age", "number"), "age must be a number");
        assert_eq!(type_mismatch("contact", "email address"), "contact must be an email address");
    }
}
