//! Markdown rendering of a [`ConversationExport`].

use super::document::ConversationExport;
use crate::conversation::run_state::RunStatus;
use crate::conversation::value_objects::Speaker;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

pub(super) fn render(export: &ConversationExport) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push("# LLM Conversation Transcript".to_string());
    lines.push(String::new());
    if let Some(started) = export.started_at {
        lines.push(format!("**Started:** {}", started.format(TIMESTAMP_FORMAT)));
    }
    lines.push(format!("**Status:** {}", export.status));
    lines.push(String::new());

    lines.push("## Configuration".to_string());
    lines.push(String::new());
    lines.push(format!("**Discussion Topic:** {}", export.config.topic));
    lines.push(String::new());
    for speaker in [Speaker::A, Speaker::B] {
        let model = export.config.model(speaker);
        lines.push(format!(
            "**{}:** {} (`{}`)",
            speaker, model.nickname, model.model
        ));
        lines.push(format!("- Persona: {}", model.persona));
        lines.push(String::new());
    }
    lines.push(format!("**Temperature:** {}", export.config.temperature));
    lines.push(format!("**Max Turns:** {}", export.config.max_turns));
    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(String::new());

    lines.push("## Conversation".to_string());
    lines.push(String::new());
    for turn in &export.turns {
        lines.push(format!("### Turn {}: {}", turn.turn, turn.nickname));
        lines.push(format!(
            "*{} · {:.2}s*",
            turn.timestamp.format(TIMESTAMP_FORMAT),
            turn.latency_secs
        ));
        lines.push(String::new());
        lines.push(turn.content.trim().to_string());
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
    }

    if let Some(failure) = &export.failure {
        lines.push("## Error".to_string());
        lines.push(String::new());
        lines.push(format!(
            "Turn {} ({}) failed with `{}`: {}",
            failure.turn, failure.speaker, failure.kind, failure.message
        ));
        lines.push(String::new());
        lines.push(format!("> {}", failure.hint));
        lines.push(String::new());
    } else if export.status == RunStatus::StoppedByUser {
        lines.push("*Conversation stopped by user.*".to_string());
        lines.push(String::new());
    }

    lines.push("## Statistics".to_string());
    lines.push(String::new());
    lines.push(format!("- **Total Turns:** {}", export.stats.total_turns));
    lines.push(format!(
        "- **{} Messages:** {}",
        export.config.model_a.nickname, export.stats.model_a_messages
    ));
    lines.push(format!(
        "- **{} Messages:** {}",
        export.config.model_b.nickname, export.stats.model_b_messages
    ));
    if let Some(avg) = export.stats.average_latency_secs {
        lines.push(format!("- **Average Response Time:** {:.2}s", avg));
    }
    if let Some(tokens) = export.stats.total_tokens {
        lines.push(format!("- **Total Tokens:** {}", tokens));
    }

    let mut document = lines.join("\n");
    document.push('\n');
    document
}

#[cfg(test)]
mod tests {
    use crate::config::{ConversationConfig, ModelConfig};
    use crate::conversation::entities::Turn;
    use crate::conversation::run_state::RunState;
    use crate::conversation::value_objects::Speaker;
    use crate::export::{ConversationExport, ExportFormat};
    use std::time::Duration;

    fn export(turns: u32, stopped: bool) -> String {
        let config = ConversationConfig::new(
            "AI ethics",
            ModelConfig::new("sk-a", "gpt-4.1-mini", "Alice", "skeptic"),
            ModelConfig::new("sk-b", "gpt-4.1-nano", "Bob", "optimist"),
        );
        let mut state = RunState::new();
        state.begin().unwrap();
        for i in 1..=turns {
            state
                .record_turn(Turn::new(
                    i,
                    Speaker::for_turn(i),
                    format!("thought {}", i),
                    Duration::from_millis(1250),
                ))
                .unwrap();
        }
        if stopped {
            state.stop_by_user().unwrap();
        }
        ConversationExport::new(&config, &state).render(ExportFormat::Markdown)
    }

    #[test]
    fn test_markdown_sections() {
        let md = export(2, false);
        assert!(md.starts_with("# LLM Conversation Transcript\n"));
        assert!(md.contains("## Configuration"));
        assert!(md.contains("**Discussion Topic:** AI ethics"));
        assert!(md.contains("**Model A:** Alice (`gpt-4.1-mini`)"));
        assert!(md.contains("- Persona: optimist"));
        assert!(md.contains("### Turn 1: Alice"));
        assert!(md.contains("### Turn 2: Bob"));
        assert!(md.contains("thought 2"));
        assert!(md.contains("- **Total Turns:** 2"));
        assert!(md.contains("- **Bob Messages:** 1"));
        assert!(md.contains("- **Average Response Time:** 1.25s"));
    }

    #[test]
    fn test_markdown_marks_user_stop() {
        assert!(export(1, true).contains("stopped by user"));
        assert!(!export(1, false).contains("stopped by user"));
    }

    #[test]
    fn test_markdown_without_turns_omits_average() {
        let md = export(0, false);
        assert!(md.contains("- **Total Turns:** 0"));
        assert!(!md.contains("Average Response Time"));
    }
}
