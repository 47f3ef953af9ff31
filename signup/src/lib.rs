// Club signup wizard
// Main library entry point

pub mod models;
pub mod tui;
pub mod utils;
pub mod wizard;

use anyhow::Result;
use log::{error, info};
use models::settings::{Settings, SubmissionTarget};
use std::path::{Path, PathBuf};
use wizard::sink::{JsonWriterSink, LogSink, MemorySink, SubmissionSink};

/// Options taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub config_path: Option<PathBuf>,
    /// Overrides `submission.output` from the settings.
    pub submit_to: Option<String>,
}

fn load_settings(opts: &LaunchOptions) -> Result<Settings> {
    let mut settings = Settings::load(opts.config_path.as_deref())?;
    if let Some(target) = &opts.submit_to {
        settings.submission.output = target.clone();
    }
    Ok(settings)
}

/// Initialize logging into the resolved log folder. Failures are reported but not fatal.
fn init_logging(settings: &Settings, with_stdout: bool) -> Option<PathBuf> {
    let log_dir = match utils::path_resolver::resolve_log_folder(settings.logging.dir.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to resolve log folder: {}", e);
            return None;
        }
    };
    if let Err(e) = utils::logging::init(&log_dir, with_stdout) {
        eprintln!("Failed to initialize logging: {:#}", e);
        return None;
    }
    Some(log_dir)
}

fn settings_or_exit(opts: &LaunchOptions) -> Settings {
    match load_settings(opts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Signup error: {:#}", e);
            std::process::exit(2);
        }
    }
}

/// Interactive terminal wizard.
pub fn run_tui(opts: &LaunchOptions) {
    let settings = settings_or_exit(opts);

    // No stdout logging: it would corrupt the TUI.
    init_logging(&settings, false);
    info!(
        "[PHASE: initialization] Signup wizard starting at {}",
        chrono::Utc::now()
    );
    info!(
        "[PHASE: initialization] [STEP: settings] username_min_length={} submission_output={}",
        settings.validation.username_min_length, settings.submission.output
    );

    if let Err(e) = run_tui_with_settings(&settings) {
        error!("[PHASE: tui] [STEP: fatal] TUI exited with error: {:?}", e);
        eprintln!("Signup error: {:#}", e);
        std::process::exit(1);
    }
}

fn run_tui_with_settings(settings: &Settings) -> Result<()> {
    let rules = settings.rules();
    match settings.submission.target() {
        SubmissionTarget::Log => {
            tui::run(rules, LogSink, &settings.theme)?;
        }
        SubmissionTarget::File(path) => {
            let sink = JsonWriterSink::append_to(&path)?;
            tui::run(rules, sink, &settings.theme)?;
        }
        SubmissionTarget::Stdout => {
            // The payload is printed once the terminal has been restored.
            let receipt = tui::run(rules, MemorySink::default(), &settings.theme)?;
            if let Some(receipt) = receipt {
                let mut out = JsonWriterSink::new(std::io::stdout());
                out.submit(&receipt.values)?;
            }
        }
    }
    Ok(())
}

/// Non-interactive TUI smoke mode: render one frame and print it.
pub fn run_tui_smoke(opts: &LaunchOptions, target: Option<String>) {
    let settings = settings_or_exit(opts);
    init_logging(&settings, false);

    let target = target.as_deref().unwrap_or("personal");
    match tui::smoke(
        target,
        settings.rules(),
        MemorySink::default(),
        &settings.theme,
    ) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            error!(
                "[PHASE: tui] [STEP: smoke] TUI smoke exited with error: {:?}",
                e
            );
            eprintln!("Signup error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Deterministic wizard contract runner. Writes the transcript under the log folder and exits
/// non-zero when any check fails.
pub fn run_wizard_contract_smoke(opts: &LaunchOptions) {
    let settings = settings_or_exit(opts);
    let log_dir = init_logging(&settings, true);

    info!(
        "[PHASE: initialization] Wizard contract smoke starting at {}",
        chrono::Utc::now()
    );

    match run_contract(log_dir.as_deref()) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!(
                "[PHASE: contract] [STEP: fatal] Contract smoke exited with error: {:?}",
                e
            );
            eprintln!("Signup error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run_contract(log_dir: Option<&Path>) -> Result<bool> {
    let report = wizard::contract::run_contract()?;
    if let Some(dir) = log_dir {
        let path = report.write_transcript(dir)?;
        info!(
            "[PHASE: contract] [STEP: transcript] Wrote {}",
            path.display()
        );
    }
    print!("{}", report.transcript());
    Ok(report.all_passed())
}

/// Print the effective settings as TOML.
pub fn run_print_config(opts: &LaunchOptions) {
    let settings = settings_or_exit(opts);
    match settings.to_toml() {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Signup error: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn submit_to_overrides_settings_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[submission]\noutput = \"log\"\n").unwrap();

        let opts = LaunchOptions {
            config_path: Some(path),
            submit_to: Some("stdout".to_string()),
        };
        let settings = load_settings(&opts).unwrap();
        assert_eq!(settings.submission.target(), SubmissionTarget::Stdout);
    }

    #[test]
    fn contract_run_writes_transcript() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_contract(Some(dir.path())).unwrap());
        assert!(dir
            .path()
            .join(wizard::contract::TRANSCRIPT_FILE)
            .exists());
    }
}
