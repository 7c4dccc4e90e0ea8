//! Prompt templates for the conversation flow

/// Placeholder substituted with the conversation topic.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

/// System prompt template shared by both models.
///
/// Rendering is plain substitution of every `{topic}` occurrence; no other
/// braces are interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPromptTemplate {
    template: String,
}

impl SystemPromptTemplate {
    pub const DEFAULT: &'static str = r#"You are having a conversation with another AI assistant about: {topic}

Guidelines:
- Keep responses conversational and natural (2-4 sentences typically)
- Build on what the other assistant has said
- Feel free to ask questions, agree, disagree, or introduce new perspectives
- Stay on topic but allow the conversation to evolve naturally
- Be respectful and constructive in your dialogue"#;

    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    pub fn contains_placeholder(&self) -> bool {
        self.template.contains(TOPIC_PLACEHOLDER)
    }

    pub fn render(&self, topic: &str) -> String {
        self.template.replace(TOPIC_PLACEHOLDER, topic)
    }
}

impl Default for SystemPromptTemplate {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

/// Fixed prompts around the history.
pub struct PromptTemplate;

impl PromptTemplate {
    /// Full system message: persona first, then the rendered template.
    pub fn system_message(persona: &str, template: &SystemPromptTemplate, topic: &str) -> String {
        format!("{}\n\n{}", persona.trim(), template.render(topic))
    }

    /// User message that opens an empty conversation.
    pub fn opening(topic: &str) -> String {
        format!(
            "Please start a conversation about: {}. Share your initial thoughts on this topic in 2-4 sentences.",
            topic
        )
    }

    /// User message appended when the history ends with the model's own turn.
    pub fn continue_prompt() -> &'static str {
        "Please continue the conversation."
    }

    /// Minimal prompt used to probe an endpoint.
    pub fn connection_check() -> &'static str {
        "Hello"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_replaces_every_placeholder() {
        let template = SystemPromptTemplate::new("Talk about {topic}. Remember: {topic}!");
        assert_eq!(
            template.render("AI ethics"),
            "Talk about AI ethics. Remember: AI ethics!"
        );
    }

    #[test]
    fn test_render_leaves_other_braces() {
        let template = SystemPromptTemplate::new("{topic} in {json}");
        assert_eq!(template.render("x"), "x in {json}");
    }

    #[test]
    fn test_default_contains_placeholder() {
        let template = SystemPromptTemplate::default();
        assert!(template.contains_placeholder());
        assert!(template.render("space").contains("about: space"));
        assert!(!SystemPromptTemplate::new("no topic here").contains_placeholder());
    }

    #[test]
    fn test_system_message_puts_persona_first() {
        let message = PromptTemplate::system_message(
            "  You are a skeptic. ",
            &SystemPromptTemplate::new("Topic: {topic}"),
            "AI ethics",
        );
        assert_eq!(message, "You are a skeptic.\n\nTopic: AI ethics");
    }

    #[test]
    fn test_opening_mentions_topic() {
        assert!(PromptTemplate::opening("AI ethics").contains("about: AI ethics."));
    }
}
