//! Output configuration from TOML (`[output]` section)

use duel_domain::ExportFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Directory for exported transcripts (default: current directory)
    pub export_dir: Option<PathBuf>,
    /// Formats exported automatically when a run ends
    pub export: Vec<ExportFormat>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            export_dir: None,
            export: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_deserialize() {
        let toml_str = r#"
[output]
color = false
export_dir = "transcripts"
export = ["json", "markdown"]
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert!(!config.output.color);
        assert_eq!(config.output.export_dir, Some(PathBuf::from("transcripts")));
        assert_eq!(
            config.output.export,
            vec![ExportFormat::Json, ExportFormat::Markdown]
        );
    }

    #[test]
    fn test_output_deserialize_md_alias() {
        let toml_str = "[output]\nexport = [\"md\"]\n";
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.export, vec![ExportFormat::Markdown]);
    }
}
