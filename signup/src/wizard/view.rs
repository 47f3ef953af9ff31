// Render model: (wizard state) -> what is visible.
//
// Only the active step's fields are produced. Inactive steps are hidden, not destroyed; their
// values stay in the wizard.

use super::sink::SubmissionSink;
use super::{Phase, Step, Wizard, STEP_COUNT};
use crate::models::values::{FieldKind, FieldName};

pub const HEADLINE: &str = "Welcome to the Club";
pub const TAGLINE: &str = "Become a new member in 3 easy steps";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: FieldName,
    pub label: &'static str,
    pub kind: FieldKind,
    pub display_value: String,
    pub checked: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoneView {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageView {
    pub title: &'static str,
    pub step_label: String,
    pub fields: Vec<FieldView>,
    pub back_enabled: bool,
    pub next_enabled: bool,
    pub next_label: &'static str,
    pub progress_percent: u16,
    pub done: Option<DoneView>,
}

pub fn next_label(step: Step) -> &'static str {
    if step.is_last() {
        "Create Account"
    } else {
        "Next"
    }
}

impl StageView {
    pub fn from_wizard<S: SubmissionSink>(wizard: &Wizard<S>) -> Self {
        let progress_percent = (wizard.progress() * 100.0).round() as u16;

        match wizard.phase() {
            Phase::Step(step) => {
                let values = wizard.values();
                let fields = step
                    .fields()
                    .iter()
                    .map(|&name| FieldView {
                        name,
                        label: name.label(),
                        kind: name.kind(),
                        display_value: values.text(name).unwrap_or_default().to_string(),
                        checked: values.flag(name).unwrap_or(false),
                        error: wizard.visible_error(name).map(|e| e.message.clone()),
                    })
                    .collect();

                StageView {
                    title: step.title(),
                    step_label: format!("Step {} of {}", step.index() + 1, STEP_COUNT),
                    fields,
                    back_enabled: wizard.can_retreat(),
                    next_enabled: wizard.can_advance(),
                    next_label: next_label(step),
                    progress_percent,
                    done: None,
                }
            }
            Phase::Done => {
                let username = &wizard.values().username;
                StageView {
                    title: "Thank you",
                    step_label: "Completed".to_string(),
                    fields: Vec::new(),
                    back_enabled: false,
                    next_enabled: false,
                    next_label: "Finish",
                    progress_percent,
                    done: Some(DoneView {
                        heading: format!("Thank you for joining, {}!", username),
                        body: "Your account has been created.".to_string(),
                    }),
                }
            }
        }
    }
}
