use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{JobOptions, Model, SpeakerCount};
use crate::pipeline::{ExternalProvider, MediaSource};
use crate::ScribeError;

#[derive(Parser)]
#[command(
    name = "scribewatch",
    about = "Scribewatch - watch transcription jobs and inspect their run reports",
    version,
    long_about = "Observes a transcription job until the service reports success or failure, and keeps a structured JSON report of everything the automation produced."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a saved job report
    Report {
        /// Path to a report_<id>.json file
        #[arg(value_name = "REPORT")]
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Observe a recorded sequence of job table reads and write the resulting report
    Replay {
        /// JSON array of recorded rows (`null` for a read that found no row)
        #[arg(value_name = "ROWS")]
        rows: PathBuf,

        /// Job identifier (random if not given)
        #[arg(long)]
        id: Option<String>,

        /// Directory for the report (defaults to the configured output directory)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Source descriptor stored in the report
        #[arg(long)]
        source: Option<String>,

        /// Seconds between reads (overrides configuration)
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,

        /// Seconds to wait before the first read (overrides configuration)
        #[arg(long, value_name = "SECS")]
        settle_delay: Option<u64>,

        /// Give up after this many seconds (overrides configuration)
        #[arg(long, value_name = "SECS")]
        max_wait: Option<u64>,

        #[command(flatten)]
        job: JobArgs,
    },

    /// Show the steps a job with these options would run
    Plan {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        job: JobArgs,
    },

    /// List supported language codes
    Languages,

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

/// Where the media comes from
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Fetch the recording from this host first
    #[arg(long, value_enum)]
    pub source: Option<ExternalProvider>,

    /// Continue with transcription after fetching from --source
    #[arg(long, requires = "source")]
    pub with_transcription: bool,

    /// Link to the media (or to the recording when --source is set)
    #[arg(long, conflicts_with = "file")]
    pub link: Option<String>,

    /// Local media file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl InputArgs {
    pub fn media_source(&self) -> Result<MediaSource, ScribeError> {
        match (&self.source, &self.link, &self.file) {
            (Some(provider), Some(link), _) => Ok(MediaSource::External {
                provider: *provider,
                link: link.clone(),
                with_transcription: self.with_transcription,
            }),
            (Some(_), None, _) => Err(ScribeError::InvalidOptions(
                "--link is required with --source".into(),
            )),
            (None, Some(link), _) => Ok(MediaSource::Link(link.clone())),
            (None, None, Some(file)) => Ok(MediaSource::File(file.clone())),
            (None, None, None) => Err(ScribeError::InvalidOptions(
                "provide --link or --file when --source is not given".into(),
            )),
        }
    }
}

/// Transcription options
#[derive(Args, Debug, Clone)]
pub struct JobArgs {
    /// Language of the audio (required unless only fetching from --source)
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Transcription model
    #[arg(long, value_enum, default_value = "base")]
    pub model: Model,

    /// Recognize speakers, optionally with the number of speakers (auto-detect otherwise)
    #[arg(long, value_name = "COUNT", num_args = 0..=1, default_missing_value = "-1", allow_negative_numbers = true)]
    pub speakers: Option<i32>,

    #[arg(long)]
    pub transcribe: bool,

    /// Restore audio quality
    #[arg(long)]
    pub restore: bool,

    #[arg(long)]
    pub timestamps: bool,

    #[arg(long)]
    pub short_summary: bool,

    #[arg(long)]
    pub detail_summary: bool,

    /// Translate the transcript into this language
    #[arg(long, value_name = "LANG")]
    pub translate: Option<String>,

    #[arg(long)]
    pub download_audio: bool,
}

impl JobArgs {
    /// Build validated job options
    pub fn to_options(&self) -> Result<JobOptions, ScribeError> {
        let language = self
            .language
            .clone()
            .ok_or_else(|| ScribeError::InvalidOptions("--language is required".into()))?;
        let recognize_speakers = self.speakers.map(SpeakerCount::try_from).transpose()?;

        JobOptions {
            language,
            model: self.model,
            recognize_speakers,
            transcribe: self.transcribe,
            restore_audio: self.restore,
            timestamps: self.timestamps,
            short_summary: self.short_summary,
            detail_summary: self.detail_summary,
            translate: self.translate.clone(),
            download_audio: self.download_audio,
        }
        .validated()
    }

    /// Options for a job from `source`; a fetch-only run may leave them out
    pub fn options_for(&self, source: &MediaSource) -> Result<Option<JobOptions>, ScribeError> {
        if source.is_fetch_only() && self.language.is_none() {
            return Ok(None);
        }
        self.to_options().map(Some)
    }
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Human readable summary
    Text,
    /// The report document as stored
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
