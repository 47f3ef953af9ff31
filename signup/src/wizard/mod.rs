//! Signup step wizard.
//!
//! A linear sequence of three input stages followed by a terminal `Done` state. The wizard owns
//! the form values, the rules, the derived validation state and the submission sink; all state
//! changes go through `set_field`, `advance` and `retreat`.
//!
//! Invariants:
//! - `current_step` stays in `[0, STEP_COUNT]` and moves by exactly one per accepted action.
//! - A rejected action leaves step and values untouched.
//! - Values are never cleared on step change.
//! - `Done` is terminal.

pub mod contract;
mod error;
pub mod sink;
pub mod validation;
pub mod view;

pub use error::WizardError;

use crate::models::values::{FieldKind, FieldName, FieldValue, SignupValues};
use log::{debug, info, warn};
use sink::{SubmissionReceipt, SubmissionSink};
use std::collections::BTreeSet;
use validation::{FieldError, RuleSet, ValidationState};

/// Number of input-collecting stages.
pub const STEP_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Personal,
    Billing,
    Legal,
}

impl Step {
    pub const ALL: [Step; STEP_COUNT] = [Step::Personal, Step::Billing, Step::Legal];

    pub fn index(&self) -> usize {
        match self {
            Step::Personal => 0,
            Step::Billing => 1,
            Step::Legal => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Step> {
        Step::ALL.get(i).copied()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Personal => "Personal Information",
            Step::Billing => "Billing Information",
            Step::Legal => "Legal Information",
        }
    }

    pub fn fields(&self) -> &'static [FieldName] {
        match self {
            Step::Personal => &[FieldName::Username],
            Step::Billing => &[FieldName::Address],
            Step::Legal => &[FieldName::Toc, FieldName::Pp],
        }
    }

    pub fn of_field(field: FieldName) -> Step {
        match field {
            FieldName::Username => Step::Personal,
            FieldName::Address => Step::Billing,
            FieldName::Toc | FieldName::Pp => Step::Legal,
        }
    }

    pub fn is_last(&self) -> bool {
        self.index() + 1 == STEP_COUNT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Step(Step),
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WizardState {
    current_step: usize,
}

impl WizardState {
    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn phase(&self) -> Phase {
        match Step::from_index(self.current_step) {
            Some(step) => Phase::Step(step),
            None => Phase::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        self.current_step >= STEP_COUNT
    }
}

#[derive(Debug, Clone)]
pub enum Transition {
    Moved { from: Step, to: Step },
    Completed(SubmissionReceipt),
}

pub struct Wizard<S: SubmissionSink> {
    state: WizardState,
    values: SignupValues,
    rules: RuleSet,
    validation: ValidationState,
    touched: BTreeSet<FieldName>,
    attempted: BTreeSet<Step>,
    receipt: Option<SubmissionReceipt>,
    sink: S,
}

impl<S: SubmissionSink> Wizard<S> {
    pub fn new(rules: RuleSet, sink: S) -> Self {
        let values = SignupValues::default();
        let validation = ValidationState::evaluate(&values, &rules);
        Self {
            state: WizardState::default(),
            values,
            rules,
            validation,
            touched: BTreeSet::new(),
            attempted: BTreeSet::new(),
            receipt: None,
            sink,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn values(&self) -> &SignupValues {
        &self.values
    }

    pub fn validation(&self) -> &ValidationState {
        &self.validation
    }

    pub fn receipt(&self) -> Option<&SubmissionReceipt> {
        self.receipt.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn set_field(
        &mut self,
        field: FieldName,
        value: impl Into<FieldValue>,
    ) -> Result<(), WizardError> {
        if self.state.is_done() {
            return Err(WizardError::Completed);
        }
        self.values.set(field, value.into())?;
        self.touched.insert(field);
        self.validation = ValidationState::evaluate(&self.values, &self.rules);
        debug!(
            "[PHASE: wizard] [STEP: set_field] field={} valid={}",
            field,
            self.validation.error_for(field).is_none()
        );
        Ok(())
    }

    /// Flip a checkbox field.
    pub fn toggle(&mut self, field: FieldName) -> Result<(), WizardError> {
        let current = self.values.flag(field).ok_or(WizardError::KindMismatch {
            field,
            expected: field.kind(),
            got: FieldKind::Checkbox,
        })?;
        self.set_field(field, !current)
    }

    pub fn is_step_valid(&self, step: Step) -> bool {
        self.validation.is_step_valid(step.fields())
    }

    pub fn error_for(&self, field: FieldName) -> Option<&FieldError> {
        self.validation.error_for(field)
    }

    /// Error shown to the user: only for the active step, and only once the field was edited or
    /// an advance from its step was attempted.
    pub fn visible_error(&self, field: FieldName) -> Option<&FieldError> {
        let step = Step::of_field(field);
        if self.phase() != Phase::Step(step) {
            return None;
        }
        if !self.touched.contains(&field) && !self.attempted.contains(&step) {
            return None;
        }
        self.validation.error_for(field)
    }

    pub fn can_advance(&self) -> bool {
        match self.phase() {
            Phase::Step(step) => self.is_step_valid(step),
            Phase::Done => false,
        }
    }

    pub fn can_retreat(&self) -> bool {
        !self.state.is_done() && self.state.current_step > 0
    }

    /// Completed fraction in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        self.state.current_step.min(STEP_COUNT) as f64 / STEP_COUNT as f64
    }

    pub fn advance(&mut self) -> Result<Transition, WizardError> {
        let step = match self.phase() {
            Phase::Step(step) => step,
            Phase::Done => return Err(WizardError::Completed),
        };

        let invalid = self.validation.invalid_fields(step.fields());
        if !invalid.is_empty() {
            self.attempted.insert(step);
            warn!(
                "[PHASE: wizard] [STEP: advance] Rejected at '{}': invalid fields {:?}",
                step.title(),
                invalid.iter().map(|f| f.as_id()).collect::<Vec<_>>()
            );
            return Err(WizardError::StepInvalid {
                step,
                fields: invalid,
            });
        }

        if step.is_last() {
            self.sink
                .submit(&self.values)
                .map_err(WizardError::Submission)?;
            let receipt = SubmissionReceipt::new(self.values.clone());
            info!(
                "[PHASE: wizard] [STEP: complete] Signup submitted (submission_id={})",
                receipt.submission_id
            );
            self.state.current_step += 1;
            self.receipt = Some(receipt.clone());
            return Ok(Transition::Completed(receipt));
        }

        self.state.current_step += 1;
        let to = Step::from_index(self.state.current_step).unwrap_or(step);
        info!(
            "[PHASE: wizard] [STEP: advance] {} -> {}",
            step.title(),
            to.title()
        );
        Ok(Transition::Moved { from: step, to })
    }

    pub fn retreat(&mut self) -> Result<Transition, WizardError> {
        let step = match self.phase() {
            Phase::Step(step) => step,
            Phase::Done => return Err(WizardError::Completed),
        };
        if self.state.current_step == 0 {
            return Err(WizardError::AtFirstStep);
        }
        self.state.current_step -= 1;
        let to = Step::from_index(self.state.current_step).unwrap_or(step);
        info!(
            "[PHASE: wizard] [STEP: retreat] {} -> {}",
            step.title(),
            to.title()
        );
        Ok(Transition::Moved { from: step, to })
    }
}

#[cfg(test)]
mod tests {
    use super::sink::MemorySink;
    use super::*;
    use anyhow::anyhow;

    fn wizard() -> Wizard<MemorySink> {
        Wizard::new(RuleSet::default(), MemorySink::default())
    }

    fn fill_all(w: &mut Wizard<MemorySink>) {
        w.set_field(FieldName::Username, "abc").unwrap();
        w.advance().unwrap();
        w.set_field(FieldName::Address, "1 Main St").unwrap();
        w.advance().unwrap();
        w.set_field(FieldName::Toc, true).unwrap();
        w.set_field(FieldName::Pp, true).unwrap();
    }

    #[test]
    fn starts_at_first_step() {
        let w = wizard();
        assert_eq!(w.state().current_step(), 0);
        assert_eq!(w.phase(), Phase::Step(Step::Personal));
        assert!(!w.can_advance());
        assert!(!w.can_retreat());
    }

    #[test]
    fn username_scenario() {
        let mut w = wizard();

        let err = w.advance().unwrap_err();
        assert!(matches!(err, WizardError::StepInvalid { step: Step::Personal, .. }));
        assert_eq!(w.state().current_step(), 0);
        let msg = &w.error_for(FieldName::Username).unwrap().message;
        assert!(msg.starts_with("Please enter"), "{}", msg);

        w.set_field(FieldName::Username, "ab").unwrap();
        assert!(w.advance().is_err());
        assert_eq!(w.state().current_step(), 0);
        assert_eq!(
            w.error_for(FieldName::Username).unwrap().message,
            "Minimum length 3"
        );

        w.set_field(FieldName::Username, "abc").unwrap();
        assert!(w.error_for(FieldName::Username).is_none());
        let t = w.advance().unwrap();
        assert!(matches!(
            t,
            Transition::Moved {
                from: Step::Personal,
                to: Step::Billing
            }
        ));
        assert_eq!(w.state().current_step(), 1);
    }

    #[test]
    fn legal_step_requires_both_checkboxes() {
        let mut w = wizard();
        w.set_field(FieldName::Username, "abc").unwrap();
        w.advance().unwrap();
        w.set_field(FieldName::Address, "1 Main St").unwrap();
        w.advance().unwrap();
        assert_eq!(w.phase(), Phase::Step(Step::Legal));

        assert!(!w.can_advance());
        w.toggle(FieldName::Toc).unwrap();
        assert!(!w.can_advance());
        w.toggle(FieldName::Pp).unwrap();
        assert!(w.can_advance());
        w.toggle(FieldName::Toc).unwrap();
        assert!(!w.can_advance());
        assert!(w.advance().is_err());
        assert!(w.sink().submissions.is_empty());
    }

    #[test]
    fn full_run_emits_exact_payload() {
        let mut w = wizard();
        fill_all(&mut w);
        let t = w.advance().unwrap();
        let expected = SignupValues {
            username: "abc".to_string(),
            address: "1 Main St".to_string(),
            toc: true,
            pp: true,
        };
        match t {
            Transition::Completed(receipt) => assert_eq!(receipt.values, expected),
            other => panic!("expected completion, got {:?}", other),
        }
        assert_eq!(w.phase(), Phase::Done);
        assert_eq!(w.state().current_step(), STEP_COUNT);
        assert_eq!(w.sink().submissions, vec![expected]);
        assert!(w.receipt().is_some());
    }

    #[test]
    fn done_is_terminal() {
        let mut w = wizard();
        fill_all(&mut w);
        w.advance().unwrap();

        assert!(matches!(w.advance(), Err(WizardError::Completed)));
        assert!(matches!(w.retreat(), Err(WizardError::Completed)));
        assert!(matches!(
            w.set_field(FieldName::Username, "xyz"),
            Err(WizardError::Completed)
        ));
        assert_eq!(w.values().username, "abc");
        assert_eq!(w.sink().submissions.len(), 1);
        assert!(!w.can_advance());
        assert!(!w.can_retreat());
    }

    #[test]
    fn retreat_keeps_values() {
        let mut w = wizard();
        w.set_field(FieldName::Username, "abc").unwrap();
        w.advance().unwrap();
        w.set_field(FieldName::Address, "1 Main St").unwrap();

        w.retreat().unwrap();
        assert_eq!(w.phase(), Phase::Step(Step::Personal));
        assert_eq!(w.values().username, "abc");
        assert_eq!(w.values().address, "1 Main St");

        w.advance().unwrap();
        assert_eq!(w.phase(), Phase::Step(Step::Billing));
        assert_eq!(w.values().address, "1 Main St");
        assert!(w.can_advance());
    }

    #[test]
    fn retreat_at_first_step_is_rejected() {
        let mut w = wizard();
        assert!(matches!(w.retreat(), Err(WizardError::AtFirstStep)));
        assert_eq!(w.state().current_step(), 0);
    }

    #[test]
    fn step_stays_in_bounds_for_any_action_sequence() {
        // Deterministic pseudo-random walk over advance/retreat with valid and invalid data.
        let mut w = wizard();
        let mut seed: u32 = 0x2545_f491;
        for i in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;

            if i == 250 {
                w.set_field(FieldName::Username, "abc").unwrap();
                w.set_field(FieldName::Address, "1 Main St").unwrap();
            }

            let before = w.state().current_step();
            let result = if seed % 2 == 0 { w.advance() } else { w.retreat() };
            let after = w.state().current_step();

            assert!(after <= STEP_COUNT);
            match result {
                Ok(_) => assert_eq!(before.abs_diff(after), 1),
                Err(_) => assert_eq!(before, after),
            }
        }
    }

    #[test]
    fn errors_visible_only_after_touch_or_attempt() {
        let mut w = wizard();
        assert!(w.error_for(FieldName::Username).is_some());
        assert!(w.visible_error(FieldName::Username).is_none());

        let _ = w.advance();
        assert!(w.visible_error(FieldName::Username).is_some());

        w.set_field(FieldName::Address, "").unwrap();
        // Address belongs to an inactive step.
        assert!(w.visible_error(FieldName::Address).is_none());
    }

    #[test]
    fn toggle_rejects_text_fields() {
        let mut w = wizard();
        assert!(matches!(
            w.toggle(FieldName::Username),
            Err(WizardError::KindMismatch { .. })
        ));
    }

    struct FailingSink;

    impl SubmissionSink for FailingSink {
        fn submit(&mut self, _values: &SignupValues) -> anyhow::Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    #[test]
    fn failed_submission_stays_on_last_step() {
        let mut w = Wizard::new(RuleSet::default(), FailingSink);
        w.set_field(FieldName::Username, "abc").unwrap();
        w.advance().unwrap();
        w.set_field(FieldName::Address, "1 Main St").unwrap();
        w.advance().unwrap();
        w.set_field(FieldName::Toc, true).unwrap();
        w.set_field(FieldName::Pp, true).unwrap();

        let err = w.advance().unwrap_err();
        assert!(matches!(err, WizardError::Submission(_)));
        assert!(err.to_string().contains("disk full"));
        assert_eq!(w.phase(), Phase::Step(Step::Legal));
        assert!(w.receipt().is_none());
    }

    #[test]
    fn progress_tracks_step() {
        let mut w = wizard();
        assert_eq!(w.progress(), 0.0);
        w.set_field(FieldName::Username, "abc").unwrap();
        w.advance().unwrap();
        assert!((w.progress() - 1.0 / 3.0).abs() < f64::EPSILON);
    }
}
