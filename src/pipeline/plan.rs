use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::config::JobOptions;
use crate::report::kinds;
use crate::ScribeError;

/// Hosting service a recording can be fetched from before transcription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExternalProvider {
    Zoom,
    #[value(name = "onedrive")]
    #[serde(rename = "onedrive")]
    OneDrive,
}

/// Where the media for a job comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Imported by the service from a public link
    Link(String),
    /// Uploaded from the local disk
    File(PathBuf),
    /// Downloaded from a recording host first, then uploaded
    External {
        provider: ExternalProvider,
        link: String,
        with_transcription: bool,
    },
}

impl MediaSource {
    /// Descriptor stored as `job_metadata.source`
    pub fn descriptor(&self) -> String {
        match self {
            MediaSource::Link(link) => link.clone(),
            MediaSource::File(path) => path.display().to_string(),
            MediaSource::External { link, .. } => link.clone(),
        }
    }

    /// Only downloads the recording; nothing is sent for transcription
    pub fn is_fetch_only(&self) -> bool {
        matches!(
            self,
            MediaSource::External {
                with_transcription: false,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    FetchExternal(ExternalProvider),
    Login,
    ImportLink,
    UploadFile,
    SelectOptions,
    StartTranscription,
    Monitor,
    ExportDownload,
    DownloadResults,
    DownloadAudio,
    OpenSummaries,
    ShortSummary,
    DetailedSummary,
    CloseSummaries,
    Translate,
}

impl StepKind {
    /// Name written to the status log
    pub fn step_name(&self) -> &'static str {
        match self {
            StepKind::FetchExternal(ExternalProvider::Zoom) => "zoom_link",
            StepKind::FetchExternal(ExternalProvider::OneDrive) => "onedrive_link",
            StepKind::Login => "login",
            StepKind::ImportLink => "import_from_link",
            StepKind::UploadFile => "upload_file",
            StepKind::SelectOptions => "selecting_options",
            StepKind::StartTranscription => "start_transcription",
            StepKind::Monitor => crate::observer::MONITOR_STEP,
            StepKind::ExportDownload => "trigger_export",
            StepKind::DownloadResults => "download_transcription",
            StepKind::DownloadAudio => "download_audio",
            StepKind::OpenSummaries => "open_summaries",
            StepKind::ShortSummary => "generate_short_summary",
            StepKind::DetailedSummary => "generate_detailed_summary",
            StepKind::CloseSummaries => "close_summaries",
            StepKind::Translate => "translate",
        }
    }

    /// The `outputs` key this step owns, if it produces an artifact
    pub fn output_kind(&self) -> Option<&'static str> {
        match self {
            StepKind::FetchExternal(ExternalProvider::Zoom) => Some(kinds::SOURCE_FILES),
            StepKind::FetchExternal(ExternalProvider::OneDrive) => Some(kinds::SOURCE),
            StepKind::ExportDownload | StepKind::DownloadResults => Some(kinds::TRANSCRIPTION),
            StepKind::DownloadAudio => Some(kinds::AUDIO),
            StepKind::ShortSummary => Some(kinds::SUMMARY_SHORT),
            StepKind::DetailedSummary => Some(kinds::SUMMARY_DETAILED),
            StepKind::Translate => Some(kinds::TRANSLATE),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.step_name())
    }
}

/// Ordered steps needed to run a job from `source` with `options`.
///
/// Options are only consulted when the plan transcribes; a fetch-only source
/// plans without them.
pub fn plan_steps(
    source: &MediaSource,
    options: Option<&JobOptions>,
) -> Result<Vec<StepKind>, ScribeError> {
    let mut steps = Vec::new();

    match source {
        MediaSource::External {
            provider,
            with_transcription,
            ..
        } => {
            steps.push(StepKind::FetchExternal(*provider));
            if !with_transcription {
                return Ok(steps);
            }
            steps.push(StepKind::Login);
            steps.push(StepKind::UploadFile);
        }
        MediaSource::Link(_) => {
            steps.push(StepKind::Login);
            steps.push(StepKind::ImportLink);
        }
        MediaSource::File(_) => {
            steps.push(StepKind::Login);
            steps.push(StepKind::UploadFile);
        }
    }

    let options = options.ok_or_else(|| {
        ScribeError::InvalidOptions("a language is required to transcribe".into())
    })?;

    steps.extend([
        StepKind::SelectOptions,
        StepKind::StartTranscription,
        StepKind::Monitor,
    ]);

    // the export dialog is the only way to get a transcript with timestamps
    steps.push(if options.timestamps {
        StepKind::ExportDownload
    } else {
        StepKind::DownloadResults
    });

    if options.download_audio {
        steps.push(StepKind::DownloadAudio);
    }

    if options.wants_summary() {
        steps.push(StepKind::OpenSummaries);
        if options.short_summary {
            steps.push(StepKind::ShortSummary);
        }
        if options.detail_summary {
            steps.push(StepKind::DetailedSummary);
        }
        steps.push(StepKind::CloseSummaries);
    }

    if options.translate.is_some() {
        steps.push(StepKind::Translate);
    }

    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn minimal_link_plan() {
        let steps = plan_steps(
            &MediaSource::Link("https://youtu.be/abc".into()),
            Some(&JobOptions::new("en")),
        )
        .unwrap();
        assert_eq!(
            steps,
            vec![
                StepKind::Login,
                StepKind::ImportLink,
                StepKind::SelectOptions,
                StepKind::StartTranscription,
                StepKind::Monitor,
                StepKind::DownloadResults,
            ]
        );
    }

    #[test]
    fn full_file_plan() {
        let mut options = JobOptions::new("ar");
        options.timestamps = true;
        options.download_audio = true;
        options.short_summary = true;
        options.detail_summary = true;
        options.translate = Some("en".into());

        let steps = plan_steps(&MediaSource::File("talk.mp3".into()), Some(&options)).unwrap();
        assert_eq!(
            steps,
            vec![
                StepKind::Login,
                StepKind::UploadFile,
                StepKind::SelectOptions,
                StepKind::StartTranscription,
                StepKind::Monitor,
                StepKind::ExportDownload,
                StepKind::DownloadAudio,
                StepKind::OpenSummaries,
                StepKind::ShortSummary,
                StepKind::DetailedSummary,
                StepKind::CloseSummaries,
                StepKind::Translate,
            ]
        );
    }

    #[test]
    fn external_without_transcription_only_fetches() {
        let source = MediaSource::External {
            provider: ExternalProvider::Zoom,
            link: "https://zoom.us/rec/share/abc".into(),
            with_transcription: false,
        };
        assert!(source.is_fetch_only());
        assert_eq!(
            plan_steps(&source, None).unwrap(),
            vec![StepKind::FetchExternal(ExternalProvider::Zoom)]
        );
    }

    #[test]
    fn transcribing_without_options_is_rejected() {
        let err = plan_steps(&MediaSource::File("talk.mp3".into()), None).unwrap_err();
        assert!(matches!(err, ScribeError::InvalidOptions(_)));

        let source = MediaSource::External {
            provider: ExternalProvider::Zoom,
            link: "https://zoom.us/rec/share/abc".into(),
            with_transcription: true,
        };
        assert!(!source.is_fetch_only());
        assert!(plan_steps(&source, None).is_err());
    }

    #[test]
    fn external_with_transcription_uploads_the_fetched_file() {
        let source = MediaSource::External {
            provider: ExternalProvider::OneDrive,
            link: "https://1drv.ms/v/abc".into(),
            with_transcription: true,
        };
        let steps = plan_steps(&source, Some(&JobOptions::new("en"))).unwrap();
        assert_eq!(&steps[..3], &[
            StepKind::FetchExternal(ExternalProvider::OneDrive),
            StepKind::Login,
            StepKind::UploadFile,
        ]);
        assert!(steps.contains(&StepKind::Monitor));
    }

    #[test]
    fn output_keys_have_a_single_producer_per_plan() {
        let mut options = JobOptions::new("ar");
        options.download_audio = true;
        options.short_summary = true;
        options.detail_summary = true;
        options.translate = Some("en".into());

        for timestamps in [false, true] {
            options.timestamps = timestamps;
            let steps = plan_steps(&MediaSource::Link("https://x/y".into()), Some(&options)).unwrap();
            let keys: Vec<_> = steps.iter().filter_map(StepKind::output_kind).collect();
            let unique: HashSet<_> = keys.iter().collect();
            assert_eq!(keys.len(), unique.len());
        }
    }

    #[test]
    fn source_descriptor() {
        assert_eq!(MediaSource::File("a/b.mp3".into()).descriptor(), "a/b.mp3");
        assert_eq!(MediaSource::Link("https://x/y".into()).descriptor(), "https://x/y");
    }
}
