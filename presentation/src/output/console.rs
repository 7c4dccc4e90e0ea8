//! Console output formatter for conversation runs

use colored::{ColoredString, Colorize};
use duel_application::ConnectionCheck;
use duel_application::ports::progress::ConversationProgressNotifier;
use duel_domain::{
    ConfigIssue, ConversationConfig, ConversationExport, RunFailure, RunState, RunStatus,
    Severity, Speaker, Turn,
};
use std::sync::atomic::{AtomicU32, Ordering};

/// Formats conversation runs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Speaker colors: Model A blue, Model B magenta.
    pub fn paint(speaker: Speaker, text: &str) -> ColoredString {
        match speaker {
            Speaker::A => text.blue().bold(),
            Speaker::B => text.magenta().bold(),
        }
    }

    /// Banner printed before the first turn
    pub fn header(config: &ConversationConfig) -> String {
        let mut output = String::new();

        output.push_str(&Self::banner("LLM Duel"));
        output.push('\n');
        output.push_str(&format!("{} {}\n\n", "Topic:".cyan().bold(), config.topic));

        for speaker in [Speaker::A, Speaker::B] {
            let model = config.model(speaker);
            output.push_str(&format!(
                "{} {} ({})\n",
                Self::paint(speaker, &format!("{}:", speaker)),
                model.nickname,
                model.model
            ));
        }

        output.push_str(&format!(
            "\n{} {}   {} {}   {} {}s\n",
            "Turns:".cyan().bold(),
            config.max_turns,
            "Temperature:".cyan().bold(),
            config.temperature,
            "Delay:".cyan().bold(),
            config.turn_delay_secs
        ));

        output
    }

    /// One turn as it arrives
    pub fn format_turn(turn: &Turn, nickname: &str, max_turns: u32) -> String {
        let title = if max_turns > 0 {
            format!("── Turn {}/{} · {} ──", turn.number(), max_turns, nickname)
        } else {
            format!("── Turn {} · {} ──", turn.number(), nickname)
        };

        format!(
            "\n{} {}\n{}\n",
            Self::paint(turn.speaker(), &title),
            format!("({:.2}s)", turn.latency().as_secs_f64()).dimmed(),
            turn.content().trim()
        )
    }

    /// Failure line with a hint on what to do about it
    pub fn format_failure(failure: &RunFailure, nickname: &str) -> String {
        format!(
            "{} Turn {} ({}, {}) failed: {}\n  {} {}\n",
            "x".red().bold(),
            failure.turn,
            nickname,
            failure.kind,
            failure.message,
            "hint:".yellow(),
            failure.class().hint()
        )
    }

    /// Final statistics block
    pub fn format_stats(config: &ConversationConfig, state: &RunState) -> String {
        let export = ConversationExport::new(config, state);
        let stats = &export.stats;
        let mut output = String::new();

        output.push_str(&Self::section_header("Statistics"));
        output.push_str(&format!(
            "  {:<18} {}\n",
            "Status:",
            Self::status_label(state.status())
        ));
        output.push_str(&format!("  {:<18} {}\n", "Total turns:", stats.total_turns));
        output.push_str(&format!(
            "  {:<18} {}\n",
            format!("{}:", config.nickname(Speaker::A)),
            stats.model_a_messages
        ));
        output.push_str(&format!(
            "  {:<18} {}\n",
            format!("{}:", config.nickname(Speaker::B)),
            stats.model_b_messages
        ));
        if let Some(latency) = stats.average_latency_secs {
            output.push_str(&format!("  {:<18} {:.2}s\n", "Avg. latency:", latency));
        }
        if let Some(tokens) = stats.total_tokens {
            output.push_str(&format!("  {:<18} {}\n", "Total tokens:", tokens));
        }
        if let (Some(started), Some(finished)) = (state.started_at(), state.finished_at()) {
            let elapsed = (finished - started).num_milliseconds() as f64 / 1000.0;
            output.push_str(&format!("  {:<18} {:.1}s\n", "Duration:", elapsed));
        }

        if let Some(failure) = state.failure() {
            output.push('\n');
            output.push_str(&Self::format_failure(
                failure,
                config.nickname(failure.speaker),
            ));
        }

        output
    }

    /// Configuration problems, errors first
    pub fn format_issues(issues: &[ConfigIssue]) -> String {
        let mut sorted: Vec<&ConfigIssue> = issues.iter().collect();
        sorted.sort_by_key(|issue| issue.severity != Severity::Error);

        let mut output = String::new();
        for issue in sorted {
            let label = match issue.severity {
                Severity::Error => "error:".red().bold(),
                Severity::Warning => "warning:".yellow().bold(),
            };
            output.push_str(&format!("{} {}\n", label, issue.message));
        }
        output
    }

    /// Result of `--check`
    pub fn format_connection_checks(checks: &[ConnectionCheck]) -> String {
        let mut output = Self::section_header("Connection check");
        for check in checks {
            let who = format!("{} ({}, {})", check.speaker, check.nickname, check.model);
            match &check.result {
                Ok(()) => output.push_str(&format!("  {} {}\n", "v".green(), who)),
                Err(e) => output.push_str(&format!(
                    "  {} {}: {}\n    {} {}\n",
                    "x".red(),
                    who,
                    e,
                    "hint:".yellow(),
                    e.class().hint()
                )),
            }
        }
        output
    }

    fn status_label(status: RunStatus) -> ColoredString {
        let label = status.to_string();
        match status {
            RunStatus::Completed => label.green(),
            RunStatus::Failed => label.red(),
            RunStatus::StoppedByUser => label.yellow(),
            RunStatus::Idle | RunStatus::Running => label.normal(),
        }
    }

    fn banner(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}\n", line.cyan(), title.cyan().bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("━━━ {} ━━━", title).cyan().bold())
    }
}

/// Prints each turn to stdout as soon as it is recorded.
pub struct TurnPrinter {
    nicknames: [String; 2],
    max_turns: AtomicU32,
}

impl TurnPrinter {
    pub fn new(config: &ConversationConfig) -> Self {
        Self {
            nicknames: [
                config.nickname(Speaker::A).to_string(),
                config.nickname(Speaker::B).to_string(),
            ],
            max_turns: AtomicU32::new(config.max_turns),
        }
    }

    fn nickname(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::A => &self.nicknames[0],
            Speaker::B => &self.nicknames[1],
        }
    }

    /// Rendered text of `turn`, as printed.
    pub fn render(&self, turn: &Turn) -> String {
        ConsoleFormatter::format_turn(
            turn,
            self.nickname(turn.speaker()),
            self.max_turns.load(Ordering::Relaxed),
        )
    }
}

impl ConversationProgressNotifier for TurnPrinter {
    fn on_run_start(&self, max_turns: u32) {
        self.max_turns.store(max_turns, Ordering::Relaxed);
    }

    fn on_turn_start(&self, _turn: u32, _speaker: Speaker, _nickname: &str) {}

    fn on_turn_complete(&self, turn: &Turn) {
        println!("{}", self.render(turn));
    }

    fn on_run_finish(&self, _state: &RunState) {}
}
