//! Scribewatch - job observation and run reporting for browser-driven transcription
//!
//! This library watches an externally managed transcription job until it reaches a
//! terminal state and keeps a structured JSON report of everything the surrounding
//! automation produced along the way.

pub mod cli;
pub mod config;
pub mod observer;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Config, JobOptions, Model, SpeakerCount};
pub use observer::{AbortReason, BoardError, CancellationToken, JobBoard, JobObserver, JobRow, TerminalOutcome};
pub use pipeline::{Pipeline, PipelineStep, Session, StepKind, StepOutcome};
pub use report::{JobReport, JobStatus, StatusLogEntry};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to job observation and reporting
#[derive(thiserror::Error, Debug)]
pub enum ScribeError {
    #[error("Invalid job options: {0}")]
    InvalidOptions(String),

    #[error("Unknown language code: {0}")]
    UnknownLanguage(String),

    #[error("Output `{0}` was already recorded")]
    OutputExists(String),

    #[error("Status cannot move from {from} to {to}")]
    StatusRegression { from: String, to: String },

    #[error("Invalid polling policy: {0}")]
    InvalidPolicy(String),

    #[error("Report file operation failed: {0}")]
    Report(#[from] std::io::Error),

    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::ScribeError;

    #[test]
    fn error_messages_name_the_offending_value() {
        let cases = vec![
            (ScribeError::InvalidOptions("model".into()), "Invalid job options: model"),
            (ScribeError::UnknownLanguage("xx".into()), "Unknown language code: xx"),
            (ScribeError::OutputExists("audio".into()), "Output `audio` was already recorded"),
            (
                ScribeError::InvalidPolicy("poll interval must be at least 1s".into()),
                "Invalid polling policy: poll interval must be at least 1s",
            ),
            (
                ScribeError::StatusRegression {
                    from: "done".into(),
                    to: "processing".into(),
                },
                "Status cannot move from done to processing",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }
}
