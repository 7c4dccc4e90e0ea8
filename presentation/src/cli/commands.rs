//! CLI command definitions

use clap::{Parser, ValueEnum};
use duel_domain::{ConfigIssue, ConversationConfig, ExportFormat};
use std::path::{Path, PathBuf};

/// Transcript export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportArg {
    /// Structured JSON record
    Json,
    /// Human-readable Markdown document
    Markdown,
}

impl From<ExportArg> for ExportFormat {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Json => ExportFormat::Json,
            ExportArg::Markdown => ExportFormat::Markdown,
        }
    }
}

/// CLI arguments for llm-duel
#[derive(Parser, Debug)]
#[command(name = "llm-duel")]
#[command(author, version, about = "Two LLMs hold a turn-based conversation on a topic")]
#[command(long_about = r#"
llm-duel lets two OpenAI-compatible models talk to each other.

Model A opens the discussion, then the models alternate until the turn
limit is reached, a model fails, or you press Ctrl-C.

Configuration files are loaded from (in priority order):
1. DUEL_<SECTION>__<KEY>   Environment variables
2. --config <path>         Explicit config file
3. ./duel.toml             Project-level config
4. ~/.config/llm-duel/config.toml   Global config

Example:
  llm-duel "Is mathematics discovered or invented?"
  llm-duel --turns 6 --model-a gpt-4.1 --export markdown "Tabs versus spaces"
  llm-duel --same-model --check
"#)]
pub struct Cli {
    /// Discussion topic (defaults to the configured topic)
    pub topic: Option<String>,

    /// Number of turns to run (2-50)
    #[arg(short = 'n', long, value_name = "N")]
    pub turns: Option<u32>,

    /// Sampling temperature (0.0-2.0)
    #[arg(short, long, value_name = "T")]
    pub temperature: Option<f32>,

    /// Pause between turns in seconds
    #[arg(short, long, value_name = "SECS")]
    pub delay: Option<f64>,

    /// Model name for Model A
    #[arg(long, value_name = "NAME")]
    pub model_a: Option<String>,

    /// Model name for Model B
    #[arg(long, value_name = "NAME")]
    pub model_b: Option<String>,

    /// Let Model B use Model A's key, endpoint and model (two personas)
    #[arg(long)]
    pub same_model: bool,

    /// Export the transcript when the run ends (can be specified multiple times)
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub export: Vec<ExportArg>,

    /// Directory for exported transcripts
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Check that both endpoints answer, then exit
    #[arg(long)]
    pub check: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append structured run events (JSONL) to this file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Also write diagnostic logs to a daily-rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Suppress the header and progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    ///
    /// Returns warnings for flags that have no effect.
    pub fn apply_overrides(&self, config: ConversationConfig) -> (ConversationConfig, Vec<ConfigIssue>) {
        let mut config = config;
        let mut issues = Vec::new();

        if let Some(topic) = &self.topic {
            config.topic = topic.clone();
        }
        if let Some(turns) = self.turns {
            config = config.with_max_turns(turns);
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(delay) = self.delay {
            config = config.with_turn_delay_secs(delay);
        }
        if let Some(model) = &self.model_a {
            config.model_a.model = model.clone();
        }
        if self.same_model && !config.model_b.share_endpoint {
            config.model_b = config.model_b.sharing_endpoint();
        }
        if let Some(model) = &self.model_b {
            if config.model_b.share_endpoint {
                issues.push(ConfigIssue::ignored_field(
                    "--model-b",
                    "Model B shares Model A's endpoint",
                ));
            } else {
                config.model_b.model = model.clone();
            }
        }

        (config, issues)
    }

    /// Export formats to write: flags replace the configured list.
    pub fn export_formats(&self, configured: &[ExportFormat]) -> Vec<ExportFormat> {
        let requested: Vec<ExportFormat> = if self.export.is_empty() {
            configured.to_vec()
        } else {
            self.export.iter().copied().map(ExportFormat::from).collect()
        };

        let mut formats = Vec::new();
        for format in requested {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        formats
    }

    /// Export directory: flag, then configuration, then the working directory.
    pub fn export_dir(&self, configured: Option<&Path>) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(|| configured.map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duel_domain::{ModelConfig, Speaker};

    fn config() -> ConversationConfig {
        ConversationConfig::new(
            "AI ethics",
            ModelConfig::new("sk-a", "gpt-4.1-mini", "Alice", "skeptic"),
            ModelConfig::new("sk-b", "gpt-4.1-nano", "Bob", "optimist"),
        )
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("llm-duel").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_full_command_line() {
        let cli = parse(&[
            "--turns",
            "6",
            "--temperature",
            "1.2",
            "--delay",
            "0",
            "--export",
            "json",
            "--export",
            "markdown",
            "-vv",
            "Tabs versus spaces",
        ]);
        assert_eq!(cli.topic.as_deref(), Some("Tabs versus spaces"));
        assert_eq!(cli.turns, Some(6));
        assert_eq!(cli.export, vec![ExportArg::Json, ExportArg::Markdown]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.check);
    }

    #[test]
    fn test_rejects_unknown_export_format() {
        let result = Cli::try_parse_from(["llm-duel", "--export", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_flags_keep_configuration() {
        let (config, issues) = parse(&[]).apply_overrides(config());
        assert!(issues.is_empty());
        assert_eq!(config, self::config());
    }

    #[test]
    fn test_overrides_replace_values() {
        let cli = parse(&["-n", "4", "-t", "0.2", "-d", "0.5", "--model-a", "gpt-4.1", "Cats"]);
        let (config, issues) = cli.apply_overrides(config());
        assert!(issues.is_empty());
        assert_eq!(config.topic, "Cats");
        assert_eq!(config.max_turns, 4);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.turn_delay_secs, 0.5);
        assert_eq!(config.model_a.model, "gpt-4.1");
        assert_eq!(config.model_b.model, "gpt-4.1-nano");
    }

    #[test]
    fn test_same_model_ignores_model_b_flag() {
        let cli = parse(&["--same-model", "--model-b", "other"]);
        let (config, issues) = cli.apply_overrides(config());
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("--model-b"));

        let b = config.model(Speaker::B);
        assert_eq!(b.model, "gpt-4.1-mini");
        assert_eq!(b.api_key, "sk-a");
        assert_eq!(b.nickname, "Bob");
    }

    #[test]
    fn test_out_of_range_override_is_left_to_validation() {
        let (config, _) = parse(&["--turns", "1"]).apply_overrides(config());
        assert_eq!(config.errors().len(), 1);
    }

    #[test]
    fn test_export_formats_flag_replaces_config_and_dedups() {
        let cli = parse(&["-e", "markdown", "-e", "markdown"]);
        assert_eq!(
            cli.export_formats(&[ExportFormat::Json]),
            vec![ExportFormat::Markdown]
        );

        let cli = parse(&[]);
        assert_eq!(
            cli.export_formats(&[ExportFormat::Json]),
            vec![ExportFormat::Json]
        );
    }

    #[test]
    fn test_export_dir_priority() {
        let cli = parse(&["--export-dir", "out"]);
        assert_eq!(cli.export_dir(Some(Path::new("cfg"))), PathBuf::from("out"));

        let cli = parse(&[]);
        assert_eq!(cli.export_dir(Some(Path::new("cfg"))), PathBuf::from("cfg"));
        assert_eq!(cli.export_dir(None), PathBuf::from("."));
    }
}
