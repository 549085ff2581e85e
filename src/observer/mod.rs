use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, sleep_until, Instant};

use crate::report::{JobReport, JobStatus};
use crate::utils::parse_web_link;
use crate::ScribeError;

pub mod row;
pub mod script;

pub use row::{JobRow, StatusSignal, STATUS_COLUMN};
pub use script::ScriptedBoard;
pub use tokio_util::sync::CancellationToken;

/// Step name used for status log entries written while monitoring
pub const MONITOR_STEP: &str = "monitor_process";

/// Failure reading from or driving the job board
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The view is not in the expected shape yet, e.g. the row has not rendered
    #[error("job row not available: {0}")]
    Transient(String),

    /// The session behind the board is broken
    #[error("browser session failure: {0}")]
    Infrastructure(String),
}

/// Read access to the service's job table, plus navigation to a job's result page
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobBoard: Send {
    /// Read the most recent job row as currently displayed
    async fn read_latest_row(&mut self) -> Result<JobRow, BoardError>;

    /// Open `locator` and wait until the browser confirms it arrived
    async fn navigate(&mut self, locator: &str) -> Result<(), BoardError>;
}

/// Why monitoring stopped without a verdict from the service
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    #[error("no terminal status within {0:?}")]
    TimeoutExceeded(Duration),

    #[error("no terminal status after {0} reads")]
    AttemptsExhausted(u32),

    #[error("monitoring cancelled")]
    Cancelled,

    #[error("unexpected error while monitoring: {0}")]
    Infrastructure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The job finished; `link` points at its result page when the row offered one
    Succeeded { link: Option<String> },
    /// The service reported the job as failed
    Failed,
    /// Monitoring stopped before the job reached a terminal state
    Aborted(AbortReason),
}

impl TerminalOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TerminalOutcome::Succeeded { .. })
    }
}

/// Timing and bounds of the polling loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause before the first read
    pub settle_delay: Duration,
    /// Fixed pause between reads
    pub interval: Duration,
    /// Stop after this much time, measured from the start of `observe`
    pub max_wait: Option<Duration>,
    /// Stop after this many reads
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(3),
            interval: Duration::from_secs(2),
            max_wait: Some(Duration::from_secs(2 * 60 * 60)),
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    /// Reject policies that would spin or can never succeed
    pub fn validate(&self) -> Result<(), ScribeError> {
        if self.interval < Duration::from_secs(1) {
            return Err(ScribeError::InvalidPolicy(
                "poll interval must be at least 1s".into(),
            ));
        }
        if self.max_wait == Some(Duration::ZERO) {
            return Err(ScribeError::InvalidPolicy(
                "max wait must be positive or unbounded".into(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ScribeError::InvalidPolicy(
                "max attempts must be positive or unbounded".into(),
            ));
        }
        Ok(())
    }
}

/// Watches the most recent job until the service reports a terminal status
pub struct JobObserver {
    policy: PollPolicy,
    cancel: CancellationToken,
    show_progress: bool,
}

impl JobObserver {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            cancel: CancellationToken::new(),
            show_progress: false,
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Poll `board` until the job succeeds, fails, or monitoring has to give up.
    ///
    /// Sets the report status to `success` or `failed` and latches the job title on
    /// the first read that shows one. An abort appends one `monitor_process` entry to
    /// the status log. `finished_at` is left alone.
    ///
    /// The deadline and the cancel token also cut short a board call that hangs.
    pub async fn observe<B>(&self, board: &mut B, report: &mut JobReport) -> TerminalOutcome
    where
        B: JobBoard + ?Sized,
    {
        let progress = self.progress_bar();
        progress.set_message("Waiting for the job table...");
        tracing::info!("Starting to monitor job {}", report.id());

        let started = Instant::now();
        let deadline = self.policy.max_wait.map(|max_wait| started + max_wait);
        let mut attempts: u32 = 0;

        if let Err(reason) = self.bounded(sleep(self.policy.settle_delay), deadline).await {
            return self.abort(report, &progress, reason);
        }

        loop {
            if self.cancel.is_cancelled() {
                return self.abort(report, &progress, AbortReason::Cancelled);
            }
            if let (Some(deadline), Some(max_wait)) = (deadline, self.policy.max_wait) {
                if Instant::now() >= deadline {
                    return self.abort(report, &progress, AbortReason::TimeoutExceeded(max_wait));
                }
            }
            if let Some(max_attempts) = self.policy.max_attempts {
                if attempts >= max_attempts {
                    return self.abort(report, &progress, AbortReason::AttemptsExhausted(attempts));
                }
            }

            attempts += 1;

            let read = match self.bounded(board.read_latest_row(), deadline).await {
                Ok(read) => read,
                Err(reason) => return self.abort(report, &progress, reason),
            };

            match read {
                Err(BoardError::Transient(message)) => {
                    tracing::debug!("Read #{} found no usable row: {}", attempts, message);
                }
                Err(BoardError::Infrastructure(message)) => {
                    return self.abort(report, &progress, AbortReason::Infrastructure(message));
                }
                Ok(row) => {
                    if let Some(title) = row.title() {
                        if report.set_title_once(title) {
                            tracing::info!("Job title: {}", title);
                        }
                    }

                    if row.is_malformed() {
                        tracing::warn!(
                            "Row has {} columns, expected at least {}",
                            row.cells.len(),
                            STATUS_COLUMN + 1
                        );
                    } else {
                        tracing::debug!("Status cell: {}", row.status_text().unwrap_or_default());

                        match row.signal() {
                            StatusSignal::Succeeded => {
                                return self.succeed(board, report, &progress, row.link, deadline).await;
                            }
                            StatusSignal::Failed => {
                                progress.finish_with_message("Transcription failed");
                                tracing::error!("Job {} failed", report.id());
                                set_status(report, JobStatus::Failed);
                                return TerminalOutcome::Failed;
                            }
                            StatusSignal::Running => {
                                progress.set_message(format!(
                                    "Transcribing... ({}s elapsed, check #{})",
                                    started.elapsed().as_secs(),
                                    attempts
                                ));
                                tracing::debug!("Still processing");
                            }
                        }
                    }
                }
            }

            if let Err(reason) = self.bounded(sleep(self.policy.interval), deadline).await {
                return self.abort(report, &progress, reason);
            }
        }
    }

    async fn succeed<B>(
        &self,
        board: &mut B,
        report: &mut JobReport,
        progress: &ProgressBar,
        link: Option<String>,
        deadline: Option<Instant>,
    ) -> TerminalOutcome
    where
        B: JobBoard + ?Sized,
    {
        progress.finish_with_message("Transcription completed!");
        tracing::info!("Job {} finished successfully", report.id());
        set_status(report, JobStatus::Success);

        if let Some(link) = &link {
            tracing::info!("Result URL: {}", link);
            match parse_web_link(link) {
                Ok(url) => match self.bounded(board.navigate(url.as_str()), deadline).await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => tracing::warn!("Could not open result link: {}", err),
                    Err(reason) => tracing::warn!("Gave up opening result link: {}", reason),
                },
                Err(err) => tracing::warn!("Not opening result link {}: {:#}", link, err),
            }
        }

        TerminalOutcome::Succeeded { link }
    }

    fn abort(&self, report: &mut JobReport, progress: &ProgressBar, reason: AbortReason) -> TerminalOutcome {
        progress.abandon_with_message("Monitoring stopped");
        tracing::error!("Monitoring job {} aborted: {}", report.id(), reason);
        report.record_failure(MONITOR_STEP, reason.to_string());
        TerminalOutcome::Aborted(reason)
    }

    /// Run `work` unless cancellation or the deadline comes first
    async fn bounded<F>(&self, work: F, deadline: Option<Instant>) -> Result<F::Output, AbortReason>
    where
        F: Future,
    {
        let expired = async {
            match deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AbortReason::Cancelled),
            output = work => Ok(output),
            _ = expired => Err(AbortReason::TimeoutExceeded(self.policy.max_wait.unwrap_or_default())),
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            progress.set_style(style);
        }
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}

fn set_status(report: &mut JobReport, status: JobStatus) {
    if let Err(err) = report.advance_status(status) {
        tracing::warn!("Keeping report status: {}", err);
    }
}
