use anyhow::Result;
use console::style;
use std::fmt::{self, Write};

use crate::cli::OutputFormat;
use crate::report::{JobReport, JobStatus};
use crate::utils::{describe_language, format_duration};

/// Render a report in the requested format
pub fn render(report: &JobReport, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => format_as_text(report),
        OutputFormat::Json => format_as_json(report),
    }
}

/// Print a report to the console
pub fn print_to_console(report: &JobReport, format: &OutputFormat) -> Result<()> {
    println!("{}", render(report, format)?);
    Ok(())
}

/// The persisted JSON document
pub fn format_as_json(report: &JobReport) -> Result<String> {
    Ok(report.to_json()?)
}

/// Human readable summary of a report
pub fn format_as_text(report: &JobReport) -> Result<String> {
    let mut out = String::new();
    write_text(&mut out, report)?;
    Ok(out)
}

fn write_text(out: &mut impl Write, report: &JobReport) -> fmt::Result {
    let meta = report.metadata();
    let options = report.options();

    let status = match meta.status {
        JobStatus::Success | JobStatus::Done if report.status_log().is_empty() => {
            style(meta.status.as_str()).green()
        }
        JobStatus::Failed => style(meta.status.as_str()).red(),
        _ => style(meta.status.as_str()).yellow(),
    };

    writeln!(out, "Job {}", meta.id)?;
    writeln!(out, "  Status:   {}", status)?;
    writeln!(out, "  Title:    {}", meta.title.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Source:   {}", meta.source.as_deref().unwrap_or("-"))?;
    writeln!(
        out,
        "  Language: {} ({}), model {}",
        describe_language(&options.language),
        options.language,
        options.model.as_str()
    )?;

    if let Some(started) = meta.started_at {
        writeln!(out, "  Started:  {}", started.to_rfc3339())?;
        if let Some(finished) = meta.finished_at {
            let elapsed = (finished - started).num_milliseconds() as f64 / 1000.0;
            writeln!(
                out,
                "  Finished: {} (took {})",
                finished.to_rfc3339(),
                format_duration(elapsed)
            )?;
        }
    }

    if !report.outputs().is_empty() {
        writeln!(out, "\nOutputs:")?;
        for (kind, location) in report.outputs() {
            writeln!(out, "  {:<18} {}", kind, location)?;
        }
    }

    if !report.status_log().is_empty() {
        writeln!(out, "\nStatus log:")?;
        for entry in report.status_log() {
            writeln!(
                out,
                "  [{}] {}: {}",
                entry.time.format("%Y-%m-%d %H:%M:%S"),
                entry.step,
                entry.error
            )?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobOptions;
    use crate::report::kinds;

    fn sample() -> JobReport {
        let mut report = JobReport::new("job-9", JobOptions::new("ar"));
        report.mark_started();
        report.set_source("https://example.com/talk.mp3");
        report.set_title_once("Weekly sync");
        report.add_output(kinds::TRANSCRIPTION, "out/transcript_job-9.txt").unwrap();
        report.record_failure("translate", "no translated text");
        report.finalize();
        report
    }

    #[test]
    fn text_lists_metadata_outputs_and_log() {
        let text = format_as_text(&sample()).unwrap();

        assert!(text.starts_with("Job job-9"));
        assert!(text.contains("Weekly sync"));
        assert!(text.contains("Arabic (ar), model base"));
        assert!(text.contains("transcription"));
        assert!(text.contains("out/transcript_job-9.txt"));
        assert!(text.contains("translate: no translated text"));
        assert!(text.contains("took"));
    }

    #[test]
    fn text_for_fresh_report_uses_placeholders() {
        let text = format_as_text(&JobReport::new("job-0", JobOptions::new("en"))).unwrap();
        assert!(text.contains("Title:    -"));
        assert!(!text.contains("Outputs:"));
        assert!(!text.contains("Status log:"));
    }

    #[test]
    fn json_render_parses_back() {
        let report = sample();
        let json = render(&report, &OutputFormat::Json).unwrap();
        assert_eq!(JobReport::from_json(&json).unwrap(), report);
    }

    struct FullSink;

    impl Write for FullSink {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn write_errors_are_propagated() {
        assert!(write_text(&mut FullSink, &sample()).is_err());
    }
}
