// Logging utilities
// Structured logging with JSON and human-readable formats

use anyhow::{Context, Result};
use log::Level;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Mask personal data in logs, keeping a short prefix/suffix for troubleshooting.
pub fn mask_sensitive(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }

    let visible = 3;
    let start: String = chars[..visible].iter().collect();
    let end: String = chars[chars.len() - visible..].iter().collect();

    format!("{}...{}", start, end)
}

/// Parse phase and step from log message
/// Extracts [PHASE: ...] and [STEP: ...] patterns
pub fn parse_log_metadata(message: &str) -> (Option<String>, Option<String>, String) {
    let (phase, cleaned) = extract_tag(message, "[PHASE:");
    let (step, cleaned) = extract_tag(&cleaned, "[STEP:");
    (phase, step, cleaned)
}

fn extract_tag(message: &str, open: &str) -> (Option<String>, String) {
    let Some(start) = message.find(open) else {
        return (None, message.to_string());
    };
    let Some(end) = message[start..].find(']') else {
        return (None, message.to_string());
    };
    let value = message[start + open.len()..start + end].trim().to_string();
    let cleaned = format!("{} {}", &message[..start], &message[start + end + 1..])
        .trim()
        .to_string();
    (Some(value), cleaned)
}

/// Format log entry as JSON for structured logging
pub fn format_json_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_entry = json!({
        "timestamp": timestamp,
        "level": level.as_str(),
        "target": target,
        "message": message,
    });

    if let Some(phase) = phase {
        log_entry["phase"] = json!(phase);
    }

    if let Some(step) = step {
        log_entry["step"] = json!(step);
    }

    serde_json::to_string(&log_entry).unwrap_or_else(|_| "{}".to_string())
}

/// Format log entry as human-readable text
pub fn format_human_readable_log(
    timestamp: &str,
    level: Level,
    target: &str,
    message: &str,
    phase: Option<&str>,
    step: Option<&str>,
) -> String {
    let mut log_line = format!("[{}] [{}]", timestamp, level.as_str());

    if let Some(phase) = phase {
        log_line.push_str(&format!(" [PHASE: {}]", phase));
    }

    if let Some(step) = step {
        log_line.push_str(&format!(" [STEP: {}]", step));
    }

    log_line.push_str(&format!(" [{}] {}", target, message));
    log_line
}

/// Log files written by one run.
#[derive(Debug, Clone)]
pub struct LogFiles {
    pub json: PathBuf,
    pub text: PathBuf,
}

pub fn log_file_paths(log_dir: &Path) -> LogFiles {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d-%H%M%S");
    LogFiles {
        json: log_dir.join(format!("signup-{}.log", timestamp)),
        text: log_dir.join(format!("signup-{}.txt", timestamp)),
    }
}

/// Install the global logger: JSON lines + human-readable text under `log_dir`, plus stdout when
/// `with_stdout` is set (never while the TUI owns the terminal).
pub fn init(log_dir: &Path, with_stdout: bool) -> Result<LogFiles> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log folder {}", log_dir.display()))?;
    let files = log_file_paths(log_dir);

    let mut dispatch = fern::Dispatch::new().level(log::LevelFilter::Debug);

    if with_stdout {
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Info)
                .format(|out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let (phase, step, cleaned) = parse_log_metadata(&message.to_string());
                    out.finish(format_args!(
                        "{}",
                        format_human_readable_log(
                            &timestamp_local.to_string(),
                            record.level(),
                            record.target(),
                            &cleaned,
                            phase.as_deref(),
                            step.as_deref(),
                        )
                    ));
                })
                .chain(std::io::stdout()),
        );
    }

    dispatch = dispatch
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    let timestamp_utc = chrono::Utc::now().to_rfc3339();
                    let (phase, step, cleaned) = parse_log_metadata(&message.to_string());
                    out.finish(format_args!(
                        "{}",
                        format_json_log(
                            &timestamp_utc,
                            record.level(),
                            record.target(),
                            &cleaned,
                            phase.as_deref(),
                            step.as_deref(),
                        )
                    ));
                })
                .chain(
                    fern::log_file(&files.json)
                        .with_context(|| format!("Failed to open {}", files.json.display()))?,
                ),
        )
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    let timestamp_local = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                    let (phase, step, cleaned) = parse_log_metadata(&message.to_string());
                    out.finish(format_args!(
                        "{}",
                        format_human_readable_log(
                            &timestamp_local.to_string(),
                            record.level(),
                            record.target(),
                            &cleaned,
                            phase.as_deref(),
                            step.as_deref(),
                        )
                    ));
                })
                .chain(
                    fern::log_file(&files.text)
                        .with_context(|| format!("Failed to open {}", files.text.display()))?,
                ),
        );

    dispatch.apply().context("Failed to install logger")?;

    log::info!(
        "[PHASE: initialization] Logging initialized, log directory: {:?}",
        log_dir
    );
    Ok(files)
}
