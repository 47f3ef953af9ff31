// Rejected wizard operations
//
// None of these are fatal: the wizard state is left exactly as it was and the UI keeps running.

use crate::models::values::{FieldKind, FieldName};
use crate::wizard::Step;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("step '{}' has invalid fields: {}", .step.title(), join_ids(.fields))]
    StepInvalid { step: Step, fields: Vec<FieldName> },

    #[error("already at the first step")]
    AtFirstStep,

    #[error("signup is already complete")]
    Completed,

    #[error("field '{field}' expects a {expected:?} value, got {got:?}")]
    KindMismatch {
        field: FieldName,
        expected: FieldKind,
        got: FieldKind,
    },

    #[error("submission failed: {0:#}")]
    Submission(anyhow::Error),
}

fn join_ids(fields: &[FieldName]) -> String {
    fields
        .iter()
        .map(|f| f.as_id())
        .collect::<Vec<_>>()
        .join(", ")
}
