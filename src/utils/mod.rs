use anyhow::{Context, Result};
use url::Url;

/// Language codes accepted by the transcription service, with their display names
pub const LANGUAGES: &[(&str, &str)] = &[
    // Common
    ("en", "English"),
    ("en-US", "English (US)"),
    ("en-UK", "English (UK)"),
    ("es", "Spanish"),
    ("pt", "Portuguese"),
    ("fr", "French"),
    ("it", "Italian"),
    ("de", "German"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("da", "Danish"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("hu", "Hungarian"),
    ("cs", "Czech"),
    ("zh", "Chinese"),
    ("he", "Hebrew"),
    // High accuracy
    ("az", "Azerbaijani"),
    ("hy", "Armenian"),
    ("et", "Estonian"),
    ("af", "Afrikaans"),
    ("id", "Indonesian"),
    ("ur", "Urdu"),
    ("uk", "Ukrainian"),
    ("is", "Icelandic"),
    ("bg", "Bulgarian"),
    ("bs", "Bosnian"),
    ("be", "Belarusian"),
    ("tl", "Tagalog"),
    ("ta", "Tamil"),
    ("th", "Thai"),
    ("tr", "Turkish"),
    ("gl", "Galician"),
    ("ru", "Russian"),
    ("ro", "Romanian"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sw", "Swahili"),
    ("sv", "Swedish"),
    ("sr", "Serbian"),
    ("zh-TW", "Chinese (Traditional)"),
    ("zh-CN", "Chinese (Simplified)"),
    ("ar", "Arabic"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("vi", "Vietnamese"),
    ("kk", "Kazakh"),
    ("kn", "Kannada"),
    ("ca", "Catalan"),
    ("hr", "Croatian"),
    ("lv", "Latvian"),
    ("lt", "Lithuanian"),
    ("mr", "Marathi"),
    ("mi", "Maori"),
    ("mk", "Macedonian"),
    ("ms", "Malay"),
    ("no", "Norwegian"),
    ("ne", "Nepali"),
    ("hi", "Hindi"),
    ("cy", "Welsh"),
    ("el", "Greek"),
    // Other
    ("as", "Assamese"),
    ("sq", "Albanian"),
    ("am", "Amharic"),
    ("uz", "Uzbek"),
    ("oc", "Occitan"),
    ("eu", "Basque"),
    ("ps", "Pashto"),
    ("ba", "Bashkir"),
    ("br", "Breton"),
    ("pa", "Punjabi"),
    ("bn", "Bengali"),
    ("my", "Myanmar"),
    ("my-BE", "Burmese"),
    ("bo", "Tibetan"),
    ("tt", "Tatar"),
    ("tk", "Turkmen"),
    ("te", "Telugu"),
    ("jv", "Javanese"),
    ("ka", "Georgian"),
    ("km", "Khmer"),
    ("sd", "Sindhi"),
    ("sa", "Sanskrit"),
    ("si", "Sinhala"),
    ("su", "Sundanese"),
    ("so", "Somali"),
    ("tg", "Tajik"),
    ("gu", "Gujarati"),
    ("fo", "Faroese"),
    ("val", "Valencian"),
    ("vls", "Flemish"),
    ("es-ES", "Castilian"),
    ("ht", "Haitian"),
    ("ht-cr", "Haitian Creole"),
    ("la", "Latin"),
    ("lo", "Lao"),
    ("haw", "Hawaiian"),
    ("lb", "Luxembourgish"),
    ("ln", "Lingala"),
    ("mt", "Maltese"),
    ("ml", "Malayalam"),
    ("mg", "Malagasy"),
    ("mn", "Mongolian"),
    ("mo", "Moldovan"),
    ("nn", "Nynorsk"),
    ("ha", "Hausa"),
    ("yi", "Yiddish"),
    ("yo", "Yoruba"),
    ("sn", "Shona"),
];

/// Look up the display name for a language code
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// Display name for a language code, falling back to `Unknown (<code>)`
pub fn describe_language(code: &str) -> String {
    language_name(code)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Unknown ({})", code))
}

/// Parse a result link, accepting only absolute http(s) URLs
pub fn parse_web_link(link: &str) -> Result<Url> {
    let url = Url::parse(link.trim()).with_context(|| format!("Invalid link: {}", link))?;

    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        scheme => anyhow::bail!("Refusing {} link, only http and https are opened", scheme),
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize a job id for use inside a file name
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim_matches('.')
        .to_string()
}
