//! Writes transcript exports to disk

use chrono::{DateTime, Local};
use duel_domain::{ConversationExport, ExportFormat};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `conversation_YYYYMMDD_HHMMSS.{json,md}` files into a directory.
pub struct ExportWriter {
    dir: PathBuf,
}

impl ExportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for an export taken at `at`.
    pub fn file_name(format: ExportFormat, at: DateTime<Local>) -> String {
        format!(
            "conversation_{}.{}",
            at.format("%Y%m%d_%H%M%S"),
            format.extension()
        )
    }

    /// Render `export` once per format and write each file.
    ///
    /// Creates the directory if needed. Returns the written paths in the
    /// order of `formats`.
    pub fn write_all(
        &self,
        export: &ConversationExport,
        formats: &[ExportFormat],
        at: DateTime<Local>,
    ) -> io::Result<Vec<PathBuf>> {
        if formats.is_empty() {
            return Ok(Vec::new());
        }

        std::fs::create_dir_all(&self.dir)?;

        let mut written = Vec::with_capacity(formats.len());
        for &format in formats {
            let path = self.dir.join(Self::file_name(format, at));
            std::fs::write(&path, export.render(format))?;
            info!("Exported {} transcript to {}", format, path.display());
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use duel_domain::{ConversationConfig, ModelConfig, RunState, Speaker, Turn};
    use std::time::Duration;

    fn export() -> ConversationExport {
        let config = ConversationConfig::new(
            "AI ethics",
            ModelConfig::new("sk-a", "gpt-4.1-mini", "Alice", "skeptic"),
            ModelConfig::new("sk-b", "gpt-4.1-nano", "Bob", "optimist"),
        );
        let mut state = RunState::new();
        state.begin().unwrap();
        state
            .record_turn(Turn::new(1, Speaker::A, "Opening statement", Duration::from_secs(1)))
            .unwrap();
        state.complete().unwrap();
        ConversationExport::new(&config, &state)
    }

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            ExportWriter::file_name(ExportFormat::Json, at()),
            "conversation_20260309_140507.json"
        );
        assert_eq!(
            ExportWriter::file_name(ExportFormat::Markdown, at()),
            "conversation_20260309_140507.md"
        );
    }

    #[test]
    fn test_write_all_creates_dir_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path().join("exports"));
        let export = export();

        let paths = writer
            .write_all(&export, &[ExportFormat::Json, ExportFormat::Markdown], at())
            .unwrap();
        assert_eq!(paths.len(), 2);

        let json = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(json, export.render(ExportFormat::Json));
        let markdown = std::fs::read_to_string(&paths[1]).unwrap();
        assert!(markdown.contains("Opening statement"));
    }

    #[test]
    fn test_no_formats_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ExportWriter::new(dir.path().join("unused"));
        let paths = writer.write_all(&export(), &[], at()).unwrap();
        assert!(paths.is_empty());
        assert!(!writer.dir().exists());
    }
}
