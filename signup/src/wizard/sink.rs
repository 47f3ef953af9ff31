// Submission boundary
//
// The terminal transition hands the final values to a sink. Nothing here talks to a network;
// the drafts only printed the payload, and the sinks below keep that shape.

use crate::models::values::SignupValues;
use crate::utils::logging::mask_sensitive;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

pub trait SubmissionSink {
    fn submit(&mut self, values: &SignupValues) -> Result<()>;
}

impl<S: SubmissionSink + ?Sized> SubmissionSink for Box<S> {
    fn submit(&mut self, values: &SignupValues) -> Result<()> {
        (**self).submit(values)
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub submission_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub values: SignupValues,
}

impl SubmissionReceipt {
    pub(crate) fn new(values: SignupValues) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            values,
        }
    }
}

/// Logs the payload; personal fields are masked.
#[derive(Debug, Default)]
pub struct LogSink;

impl SubmissionSink for LogSink {
    fn submit(&mut self, values: &SignupValues) -> Result<()> {
        info!(
            "[PHASE: submit] [STEP: payload] username={} address={} toc={} pp={}",
            mask_sensitive(&values.username),
            mask_sensitive(&values.address),
            values.toc,
            values.pp
        );
        Ok(())
    }
}

/// Writes each payload as a single JSON line.
pub struct JsonWriterSink<W: Write> {
    out: W,
}

impl<W: Write> JsonWriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonWriterSink<std::fs::File> {
    /// Append payloads to `path`, creating the file if needed.
    pub fn append_to(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open submission file {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> SubmissionSink for JsonWriterSink<W> {
    fn submit(&mut self, values: &SignupValues) -> Result<()> {
        let line = serde_json::to_string(values).context("Failed to serialize signup payload")?;
        writeln!(self.out, "{}", line).context("Failed to write signup payload")?;
        self.out.flush().context("Failed to flush signup payload")?;
        info!("[PHASE: submit] [STEP: payload] Wrote signup payload ({} bytes)", line.len());
        Ok(())
    }
}

/// Keeps every payload in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub submissions: Vec<SignupValues>,
}

impl SubmissionSink for MemorySink {
    fn submit(&mut self, values: &SignupValues) -> Result<()> {
        self.submissions.push(values.clone());
        Ok(())
    }
}
