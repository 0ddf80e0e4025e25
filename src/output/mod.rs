use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::OutputFormat;
use crate::transcript::content::TranscriptContent;

pub mod formatters;

pub use formatters::*;

/// Render transcript content in the requested format
pub fn render(content: &TranscriptContent, format: &OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => format_as_text(content),
        OutputFormat::Json => format_as_json(content).context("Failed to serialize transcript")?,
        OutputFormat::PrettyJson => format_as_pretty_json(content).context("Failed to serialize transcript")?,
        OutputFormat::Vtt => format_as_vtt(content),
        OutputFormat::Srt => format_as_srt(content),
    };

    Ok(rendered)
}

/// Save transcript content to file
pub fn save_to_file(content: &TranscriptContent, path: &Path, format: &OutputFormat) -> Result<()> {
    let rendered = render(content, format)?;
    fs_err::write(path, rendered)?;
    Ok(())
}

/// Print transcript content to stdout
pub fn print_to_console(content: &TranscriptContent, format: &OutputFormat) -> Result<()> {
    println!("{}", render(content, format)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::content::Fragment;

    #[test]
    fn test_save_to_file_writes_rendered_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.srt");
        let content = TranscriptContent::new(vec![Fragment::new("hello", 1.0, 0.5)]);

        save_to_file(&content, &path, &OutputFormat::Srt).unwrap();

        let written = fs_err::read_to_string(&path).unwrap();
        assert_eq!(written, "1\n00:00:01.000 --> 00:00:01.500\nhello");
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let content = TranscriptContent::new(vec![Fragment::new("hello", 0.0, 1.0)]);

        assert_eq!(render(&content, &OutputFormat::Text).unwrap(), "hello");
        assert!(render(&content, &OutputFormat::Vtt).unwrap().starts_with("WEBVTT\n\n"));
        assert!(render(&content, &OutputFormat::Json).unwrap().starts_with(r#"{"content":["#));
    }
}
