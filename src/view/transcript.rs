use crate::chat::ChatMessage;

/// One rendered chat line: bold sender label followed by the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub sender: &'static str,
    pub text: String,
}

impl TranscriptLine {
    /// `"<sender>: <text>"`
    pub fn plain(&self) -> String {
        format!("{}: {}", self.sender, self.text)
    }
}

/// Render the chat log oldest first.
pub fn render_transcript(messages: &[ChatMessage]) -> Vec<TranscriptLine> {
    messages
        .iter()
        .map(|m| TranscriptLine {
            sender: m.sender.as_str(),
            text: m.text.clone(),
        })
        .collect()
}
