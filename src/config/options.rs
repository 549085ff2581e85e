use serde::{Deserialize, Serialize};

use crate::utils::language_name;
use crate::ScribeError;

/// Most speakers the service will try to tell apart
pub const MAX_SPEAKERS: u8 = 32;

/// Transcription model variant offered by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum Model {
    #[default]
    #[serde(rename = "base")]
    #[value(name = "base")]
    Base,
    #[serde(rename = "small")]
    #[value(name = "small")]
    Small,
    #[serde(rename = "large-v2")]
    #[value(name = "large-v2")]
    LargeV2,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Base => "base",
            Model::Small => "small",
            Model::LargeV2 => "large-v2",
        }
    }
}

/// Speaker recognition hint. Stored as an integer in reports, `-1` meaning auto-detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum SpeakerCount {
    Auto,
    Exact(u8),
}

impl TryFrom<i32> for SpeakerCount {
    type Error = ScribeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SpeakerCount::Auto),
            n if n >= 1 && n <= MAX_SPEAKERS as i32 => Ok(SpeakerCount::Exact(n as u8)),
            n => Err(ScribeError::InvalidOptions(format!(
                "speaker count must be -1 (auto) or 1-{}, got {}",
                MAX_SPEAKERS, n
            ))),
        }
    }
}

impl From<SpeakerCount> for i32 {
    fn from(count: SpeakerCount) -> Self {
        match count {
            SpeakerCount::Auto => -1,
            SpeakerCount::Exact(n) => n as i32,
        }
    }
}

/// Options requested for a transcription job. Fixed once the job report is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Language code of the spoken audio
    pub language: String,

    /// Model variant
    #[serde(default)]
    pub model: Model,

    /// Speaker recognition, off when absent
    #[serde(default)]
    pub recognize_speakers: Option<SpeakerCount>,

    #[serde(default)]
    pub transcribe: bool,

    #[serde(default)]
    pub restore_audio: bool,

    #[serde(default)]
    pub timestamps: bool,

    #[serde(default)]
    pub short_summary: bool,

    #[serde(default)]
    pub detail_summary: bool,

    /// Target language for the translated transcript
    #[serde(default)]
    pub translate: Option<String>,

    #[serde(default)]
    pub download_audio: bool,
}

impl JobOptions {
    /// Options with every feature switched off
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            model: Model::default(),
            recognize_speakers: None,
            transcribe: false,
            restore_audio: false,
            timestamps: false,
            short_summary: false,
            detail_summary: false,
            translate: None,
            download_audio: false,
        }
    }

    /// Validate and hand the options back, so construction sites read `JobOptions::new(..).validated()?`
    pub fn validated(self) -> Result<Self, ScribeError> {
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ScribeError> {
        if self.language.trim().is_empty() {
            return Err(ScribeError::InvalidOptions("language is required".into()));
        }
        if language_name(&self.language).is_none() {
            return Err(ScribeError::UnknownLanguage(self.language.clone()));
        }

        if let Some(SpeakerCount::Exact(n)) = self.recognize_speakers {
            if n == 0 || n > MAX_SPEAKERS {
                return Err(ScribeError::InvalidOptions(format!(
                    "speaker count must be between 1 and {}",
                    MAX_SPEAKERS
                )));
            }
        }

        if let Some(target) = &self.translate {
            let well_formed = !target.is_empty()
                && target.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !well_formed {
                return Err(ScribeError::InvalidOptions(format!(
                    "translation target `{}` is not a language code",
                    target
                )));
            }
        }

        Ok(())
    }

    /// Whether any summary has to be generated
    pub fn wants_summary(&self) -> bool {
        self.short_summary || self.detail_summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_off() {
        let options = JobOptions::new("ar").validated().unwrap();
        assert_eq!(options.model, Model::Base);
        assert!(options.recognize_speakers.is_none());
        assert!(!options.wants_summary());
    }

    #[test]
    fn unknown_language_is_rejected() {
        let err = JobOptions::new("xx").validate().unwrap_err();
        assert!(matches!(err, ScribeError::UnknownLanguage(code) if code == "xx"));
    }

    #[test]
    fn empty_language_is_rejected() {
        assert!(matches!(
            JobOptions::new("  ").validate(),
            Err(ScribeError::InvalidOptions(_))
        ));
    }

    #[test]
    fn translation_target_must_look_like_a_code() {
        let mut options = JobOptions::new("en");
        options.translate = Some("fr".into());
        assert!(options.validate().is_ok());

        options.translate = Some("fr; rm".into());
        assert!(options.validate().is_err());

        options.translate = Some(String::new());
        assert!(options.validate().is_err());
    }

    #[test]
    fn speaker_count_uses_minus_one_for_auto() {
        let mut options = JobOptions::new("en");
        options.recognize_speakers = Some(SpeakerCount::Auto);
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["recognize_speakers"], -1);

        options.recognize_speakers = Some(SpeakerCount::Exact(3));
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["recognize_speakers"], 3);

        options.recognize_speakers = None;
        let json = serde_json::to_value(&options).unwrap();
        assert!(json["recognize_speakers"].is_null());
    }

    #[test]
    fn out_of_range_speaker_count_fails_to_parse() {
        let parsed: Result<JobOptions, _> =
            serde_json::from_str(r#"{"language": "en", "recognize_speakers": 0}"#);
        assert!(parsed.is_err());

        let parsed: JobOptions =
            serde_json::from_str(r#"{"language": "en", "recognize_speakers": -1, "model": "large-v2"}"#).unwrap();
        assert_eq!(parsed.recognize_speakers, Some(SpeakerCount::Auto));
        assert_eq!(parsed.model, Model::LargeV2);
    }
}
