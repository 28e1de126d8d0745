//! Prompt assembly for the assistant

use crate::message::Message;

/// Persona and scope sent with every request
pub const SYSTEM_INSTRUCTION: &str = r#"You are the AI Assistant for the IEEE P3394 Working Group.
This working group focuses on the "Standard for Artificial Intelligence".
Your role is to help members facilitate discussions, draft agenda items, summarize complex AI technical standards, and brainstorm topics related to AI ethics, robustness, and interoperability.

Tone: Professional, Academic, Collaborative, and Technical.
Context: You are speaking to engineers, researchers, and policy makers.

If asked about the schedule, remind them to check the Schedule tab, but you can suggest topics for future meetings."#;

/// Render prior history as `role: content` lines in conversation order.
pub fn render_context(history: &[Message]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Combine prior history and the new utterance into one prompt.
pub fn build_prompt(history: &[Message], utterance: &str) -> String {
    format!(
        "Previous context: {}\n\nUser Question: {utterance}",
        render_context(history)
    )
}
