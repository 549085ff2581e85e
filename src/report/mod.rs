//! The per-job run report.
//!
//! A [`JobReport`] is created when a session starts, handed `&mut` to each pipeline
//! step in turn and persisted as `report_<id>.json`. Every field that the automation
//! may only write once goes through a typed setter that enforces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::JobOptions;
use crate::utils::sanitize_filename;
use crate::ScribeError;

/// Artifact kinds recorded under `outputs`
pub mod kinds {
    pub const TRANSCRIPTION: &str = "transcription";
    pub const SUMMARY_SHORT: &str = "summary_short";
    pub const SUMMARY_DETAILED: &str = "summary_detailed";
    pub const TRANSLATE: &str = "translate";
    pub const AUDIO: &str = "audio";
    pub const SOURCE: &str = "source";
    pub const SOURCE_FILES: &str = "source_files";
}

/// Overall job status. Only ever moves forward: `processing -> success|failed -> done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Processing,
    Success,
    Failed,
    Done,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
            JobStatus::Done => "done",
        }
    }

    // success may still turn into failed when a later step breaks, never the reverse
    fn rank(&self) -> u8 {
        match self {
            JobStatus::Processing => 0,
            JobStatus::Success => 1,
            JobStatus::Failed => 2,
            JobStatus::Done => 3,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    pub id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub status: JobStatus,
}

/// One failure encountered by a pipeline step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLogEntry {
    pub step: String,
    pub error: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(rename = "job_metadata")]
    metadata: JobMetadata,
    options: JobOptions,
    #[serde(default)]
    outputs: BTreeMap<String, String>,
    #[serde(default)]
    status_log: Vec<StatusLogEntry>,
}

impl JobReport {
    pub fn new(id: impl Into<String>, options: JobOptions) -> Self {
        Self {
            metadata: JobMetadata {
                id: id.into(),
                started_at: None,
                finished_at: None,
                source: None,
                title: None,
                status: JobStatus::Processing,
            },
            options,
            outputs: BTreeMap::new(),
            status_log: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn metadata(&self) -> &JobMetadata {
        &self.metadata
    }

    pub fn status(&self) -> JobStatus {
        self.metadata.status
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.title.as_deref()
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    pub fn outputs(&self) -> &BTreeMap<String, String> {
        &self.outputs
    }

    pub fn status_log(&self) -> &[StatusLogEntry] {
        &self.status_log
    }

    pub fn is_failed(&self) -> bool {
        self.metadata.status == JobStatus::Failed
    }

    /// Stamp `started_at`. Later calls keep the first timestamp.
    pub fn mark_started(&mut self) {
        if self.metadata.started_at.is_none() {
            self.metadata.started_at = Some(Utc::now());
        }
    }

    /// Record where the media came from. Returns `false` if a source was already set.
    pub fn set_source(&mut self, source: impl Into<String>) -> bool {
        if self.metadata.source.is_some() {
            return false;
        }
        self.metadata.source = Some(source.into());
        true
    }

    /// Latch the job title. Blank titles are ignored and the first real one wins.
    pub fn set_title_once(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() || self.metadata.title.is_some() {
            return false;
        }
        self.metadata.title = Some(title.to_string());
        true
    }

    /// Record an artifact. Each kind is written by exactly one step.
    pub fn add_output(
        &mut self,
        kind: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<(), ScribeError> {
        let kind = kind.into();
        if self.outputs.contains_key(&kind) {
            return Err(ScribeError::OutputExists(kind));
        }
        self.outputs.insert(kind, location.into());
        Ok(())
    }

    pub fn append_status_log(&mut self, step: impl Into<String>, error: impl Into<String>) {
        self.status_log.push(StatusLogEntry {
            step: step.into(),
            error: error.into(),
            time: Utc::now(),
        });
    }

    /// Move the status forward. Moving backwards is refused and leaves the status untouched.
    pub fn advance_status(&mut self, to: JobStatus) -> Result<(), ScribeError> {
        let from = self.metadata.status;
        if to.rank() < from.rank() {
            return Err(ScribeError::StatusRegression {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        self.metadata.status = to;
        Ok(())
    }

    /// Log a step failure and flag the job as failed
    pub fn record_failure(&mut self, step: &str, error: impl Into<String>) {
        self.append_status_log(step, error);
        if let Err(err) = self.advance_status(JobStatus::Failed) {
            tracing::warn!("Step {} failed after the report was closed: {}", step, err);
        }
    }

    /// Close the report: set `finished_at` and mark it `done`.
    ///
    /// Idempotent, the first call's timestamp is kept. Returns whether this call closed it.
    pub fn finalize(&mut self) -> bool {
        self.metadata.status = JobStatus::Done;
        if self.metadata.finished_at.is_some() {
            return false;
        }
        self.metadata.finished_at = Some(Utc::now());
        true
    }

    pub fn to_json(&self) -> Result<String, ScribeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ScribeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Where the report for this job lives inside `dir`
    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(format!("report_{}.json", sanitize_filename(&self.metadata.id)))
    }

    /// Write the report into `dir`, returning the file path
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ScribeError> {
        fs_err::create_dir_all(dir)?;
        let path = self.path_in(dir);
        fs_err::write(&path, self.to_json()?)?;
        tracing::info!("Report saved at {}", path.display());
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, ScribeError> {
        let content = fs_err::read_to_string(path)?;
        Self::from_json(&content)
    }
}
