// Field validation
//
// Rules are evaluated against the full value record after every edit. A field has an entry in
// `ValidationState` iff it currently violates its rule.

use crate::models::values::{FieldName, FieldValue, SignupValues};
use std::collections::BTreeMap;

pub const DEFAULT_USERNAME_MIN_LENGTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldRule {
    pub required: bool,
    pub min_length: Option<usize>,
}

impl FieldRule {
    pub fn required() -> Self {
        Self {
            required: true,
            min_length: None,
        }
    }

    pub fn with_min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: BTreeMap<FieldName, FieldRule>,
}

impl RuleSet {
    pub fn new(username_min_length: usize) -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(
            FieldName::Username,
            FieldRule::required().with_min_length(username_min_length),
        );
        rules.insert(FieldName::Address, FieldRule::required());
        rules.insert(FieldName::Toc, FieldRule::required());
        rules.insert(FieldName::Pp, FieldRule::required());
        Self { rules }
    }

    pub fn rule(&self, field: FieldName) -> FieldRule {
        self.rules.get(&field).copied().unwrap_or_default()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME_MIN_LENGTH)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    MinLength { min: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: FieldName,
    pub kind: FieldErrorKind,
    pub message: String,
}

/// Check one value against its rule. Required is checked before min length.
pub fn validate_field(
    field: FieldName,
    value: &FieldValue,
    rule: &FieldRule,
) -> Option<FieldError> {
    match value {
        FieldValue::Text(s) => {
            if rule.required && s.trim().is_empty() {
                return Some(FieldError {
                    field,
                    kind: FieldErrorKind::Required,
                    message: format!("Please enter {}", field.subject()),
                });
            }
            if let Some(min) = rule.min_length {
                // An optional field left empty is not held to its minimum.
                if !s.is_empty() && s.chars().count() < min {
                    return Some(FieldError {
                        field,
                        kind: FieldErrorKind::MinLength { min },
                        message: format!("Minimum length {}", min),
                    });
                }
            }
            None
        }
        FieldValue::Flag(checked) => {
            if rule.required && !checked {
                return Some(FieldError {
                    field,
                    kind: FieldErrorKind::Required,
                    message: format!("Please accept the {}", field.subject()),
                });
            }
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    errors: BTreeMap<FieldName, FieldError>,
}

impl ValidationState {
    pub fn evaluate(values: &SignupValues, rules: &RuleSet) -> Self {
        let errors = FieldName::ALL
            .into_iter()
            .filter_map(|f| validate_field(f, &values.get(f), &rules.rule(f)).map(|e| (f, e)))
            .collect();
        Self { errors }
    }

    /// Aggregate validity: true iff none of `fields` has an error.
    pub fn is_step_valid(&self, fields: &[FieldName]) -> bool {
        fields.iter().all(|f| !self.errors.contains_key(f))
    }

    pub fn error_for(&self, field: FieldName) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    pub fn invalid_fields(&self, fields: &[FieldName]) -> Vec<FieldName> {
        fields
            .iter()
            .copied()
            .filter(|f| self.errors.contains_key(f))
            .collect()
    }
}
