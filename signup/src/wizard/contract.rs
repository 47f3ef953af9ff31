// Deterministic wizard contract runner.
//
// Drives the wizard through the signup scenarios without a terminal and records one transcript
// line per check. Used by `--wizard-contract-smoke` and by the unit tests below.

use super::sink::MemorySink;
use super::validation::{FieldErrorKind, RuleSet};
use super::{Phase, Step, Transition, Wizard, WizardError, STEP_COUNT};
use crate::models::values::{FieldName, SignupValues};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};

pub const TRANSCRIPT_FILE: &str = "wizard_contract_smoke_transcript.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContractReport {
    pub checks: Vec<CheckResult>,
}

impl ContractReport {
    fn record(&mut self, name: &'static str, passed: bool, detail: impl Into<String>) {
        let detail = detail.into();
        if passed {
            info!("[PHASE: contract] [STEP: {}] PASS {}", name, detail);
        } else {
            warn!("[PHASE: contract] [STEP: {}] FAIL {}", name, detail);
        }
        self.checks.push(CheckResult {
            name,
            passed,
            detail,
        });
    }

    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for c in &self.checks {
            out.push_str(&format!(
                "{} {} {}\n",
                if c.passed { "PASS" } else { "FAIL" },
                c.name,
                c.detail
            ));
        }
        out.push_str(&format!(
            "RESULT {}\n",
            if self.all_passed() { "PASS" } else { "FAIL" }
        ));
        out
    }

    pub fn write_transcript(&self, log_dir: &Path) -> Result<PathBuf> {
        let path = log_dir.join(TRANSCRIPT_FILE);
        std::fs::write(&path, self.transcript())
            .with_context(|| format!("Failed to write transcript {}", path.display()))?;
        Ok(path)
    }
}

fn new_wizard() -> Wizard<MemorySink> {
    Wizard::new(RuleSet::default(), MemorySink::default())
}

fn check_username_rules(report: &mut ContractReport) -> Result<()> {
    let mut w = new_wizard();

    let rejected = matches!(w.advance(), Err(WizardError::StepInvalid { .. }));
    let required = w
        .error_for(FieldName::Username)
        .map(|e| e.kind == FieldErrorKind::Required && e.message.starts_with("Please enter"))
        .unwrap_or(false);
    report.record(
        "empty_username_rejected",
        rejected && required && w.state().current_step() == 0,
        "advance with empty username stays on step 0 with a required error",
    );

    w.set_field(FieldName::Username, "ab")?;
    let rejected = w.advance().is_err();
    let min_len = w
        .error_for(FieldName::Username)
        .map(|e| e.message == "Minimum length 3")
        .unwrap_or(false);
    report.record(
        "short_username_rejected",
        rejected && min_len && w.state().current_step() == 0,
        "username 'ab' reports 'Minimum length 3'",
    );

    w.set_field(FieldName::Username, "abc")?;
    let moved = matches!(
        w.advance(),
        Ok(Transition::Moved {
            from: Step::Personal,
            to: Step::Billing
        })
    );
    report.record(
        "valid_username_advances",
        moved && w.state().current_step() == 1,
        "username 'abc' advances to step 1",
    );
    Ok(())
}

fn check_legal_gate(report: &mut ContractReport) -> Result<()> {
    let mut w = new_wizard();
    w.set_field(FieldName::Username, "abc")?;
    w.advance()?;
    w.set_field(FieldName::Address, "1 Main St")?;
    w.advance()?;

    let none = !w.can_advance();
    w.set_field(FieldName::Toc, true)?;
    let only_toc = !w.can_advance();
    w.set_field(FieldName::Toc, false)?;
    w.set_field(FieldName::Pp, true)?;
    let only_pp = !w.can_advance();
    w.set_field(FieldName::Toc, true)?;
    let both = w.can_advance();

    report.record(
        "legal_checkboxes_gate_submit",
        none && only_toc && only_pp && both,
        format!(
            "none={} only_toc={} only_pp={} both_enabled={}",
            none, only_toc, only_pp, both
        ),
    );
    Ok(())
}

fn check_retreat_preserves_values(report: &mut ContractReport) -> Result<()> {
    let mut w = new_wizard();
    w.set_field(FieldName::Username, "abc")?;
    w.advance()?;
    w.set_field(FieldName::Address, "1 Main St")?;
    w.retreat()?;
    w.advance()?;

    report.record(
        "retreat_preserves_values",
        w.values().username == "abc" && w.values().address == "1 Main St",
        "values survive Back then Next",
    );
    Ok(())
}

fn check_full_submission(report: &mut ContractReport) -> Result<()> {
    let mut w = new_wizard();
    w.set_field(FieldName::Username, "abc")?;
    w.advance()?;
    w.set_field(FieldName::Address, "1 Main St")?;
    w.advance()?;
    w.set_field(FieldName::Toc, true)?;
    w.set_field(FieldName::Pp, true)?;
    let completed = matches!(w.advance(), Ok(Transition::Completed(_)));

    let expected = SignupValues {
        username: "abc".to_string(),
        address: "1 Main St".to_string(),
        toc: true,
        pp: true,
    };
    let payload_ok = w.sink().submissions == vec![expected];
    report.record(
        "full_submission_payload",
        completed
            && payload_ok
            && w.phase() == Phase::Done
            && w.state().current_step() == STEP_COUNT,
        format!(
            "payload={}",
            serde_json::to_string(w.values()).unwrap_or_default()
        ),
    );

    let terminal = matches!(w.advance(), Err(WizardError::Completed))
        && matches!(w.retreat(), Err(WizardError::Completed))
        && w.sink().submissions.len() == 1;
    report.record(
        "done_is_terminal",
        terminal,
        "no transitions after completion",
    );
    Ok(())
}

/// Run every contract check. Setup failures are errors; failed checks are reported.
pub fn run_contract() -> Result<ContractReport> {
    let mut report = ContractReport::default();
    check_username_rules(&mut report)?;
    check_legal_gate(&mut report)?;
    check_retreat_preserves_values(&mut report)?;
    check_full_submission(&mut report)?;
    Ok(report)
}
