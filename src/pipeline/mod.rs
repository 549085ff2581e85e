//! Sequential driver for the steps of one job.
//!
//! Steps run one at a time against a borrowed [`JobReport`]. A step reports back
//! through [`StepOutcome`] instead of ending the process; the driver decides whether
//! to carry on, and always writes the final report and releases the session.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::observer::{JobBoard, JobObserver, TerminalOutcome};
use crate::report::JobReport;

pub mod plan;

pub use plan::{plan_steps, ExternalProvider, MediaSource, StepKind};

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// The step failed but later steps can still run
    Recoverable(String),
    /// The step failed and the pipeline must stop
    Fatal(String),
    /// Stop the pipeline; the step already wrote its own status log entry
    Halted,
}

/// One unit of work in a job pipeline
#[async_trait]
pub trait PipelineStep: Send {
    fn kind(&self) -> StepKind;

    async fn run(&mut self, report: &mut JobReport) -> StepOutcome;
}

/// The browser session the steps share
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send {
    /// Close the session; called exactly once when the pipeline ends
    async fn release(&mut self) -> Result<()>;
}

/// Summary of a finished pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub report_path: PathBuf,
    /// Step that stopped the run early, if any
    pub stopped_at: Option<StepKind>,
    /// No step recorded a failure
    pub clean: bool,
}

pub struct Pipeline {
    output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write the report as it stands
    pub fn checkpoint(&self, report: &JobReport) -> Result<PathBuf> {
        report
            .save(&self.output_dir)
            .with_context(|| format!("Failed to write report for job {}", report.id()))
    }

    /// Run `steps` in order, then finalize the report and release `session`
    pub async fn run<S>(
        &self,
        report: &mut JobReport,
        steps: &mut [Box<dyn PipelineStep>],
        session: &mut S,
    ) -> Result<PipelineRun>
    where
        S: Session + ?Sized,
    {
        report.mark_started();
        self.checkpoint(report)?;

        let mut stopped_at = None;
        for step in steps.iter_mut() {
            let kind = step.kind();
            tracing::info!("Running step {}", kind);

            match step.run(report).await {
                StepOutcome::Completed => tracing::debug!("Step {} completed", kind),
                StepOutcome::Recoverable(error) => {
                    tracing::warn!("Step {} failed, continuing: {}", kind, error);
                    report.record_failure(kind.step_name(), error);
                }
                StepOutcome::Fatal(error) => {
                    tracing::error!("Step {} failed, stopping: {}", kind, error);
                    report.record_failure(kind.step_name(), error);
                    stopped_at = Some(kind);
                    break;
                }
                StepOutcome::Halted => {
                    tracing::error!("Step {} halted the pipeline", kind);
                    stopped_at = Some(kind);
                    break;
                }
            }
        }

        let clean = report.status_log().is_empty();
        self.finish(report, session).await.map(|report_path| PipelineRun {
            report_path,
            stopped_at,
            clean,
        })
    }

    /// Close the report, release the session and write the final report
    pub async fn finish<S>(&self, report: &mut JobReport, session: &mut S) -> Result<PathBuf>
    where
        S: Session + ?Sized,
    {
        report.finalize();
        if let Err(err) = session.release().await {
            tracing::warn!("Failed to release browser session: {:#}", err);
            report.append_status_log("release_session", format!("{:#}", err));
        }
        self.checkpoint(report)
    }
}

/// Pipeline step that waits for the transcription job to finish
pub struct ObserveStep<B> {
    observer: JobObserver,
    board: B,
}

impl<B: JobBoard> ObserveStep<B> {
    pub fn new(observer: JobObserver, board: B) -> Self {
        Self { observer, board }
    }
}

#[async_trait]
impl<B: JobBoard> PipelineStep for ObserveStep<B> {
    fn kind(&self) -> StepKind {
        StepKind::Monitor
    }

    async fn run(&mut self, report: &mut JobReport) -> StepOutcome {
        match self.observer.observe(&mut self.board, report).await {
            TerminalOutcome::Succeeded { .. } => StepOutcome::Completed,
            TerminalOutcome::Failed => StepOutcome::Fatal("transcription failed on the service".into()),
            TerminalOutcome::Aborted(_) => StepOutcome::Halted,
        }
    }
}
