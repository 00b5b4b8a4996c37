//! Prompt construction.
//!
//! A prompt is the fixed persona preamble followed by the extracted text,
//! truncated to a hard character cap.

/// Maximum number of characters of source text placed in a prompt.
pub const MAX_CONTENT_CHARS: usize = 100_000;

/// Persona and output instructions prepended to every prompt.
pub const PERSONA_PREAMBLE: &str = "\
You are Precis, a friendly, well-read and concise reading assistant.
You write plainly, skip jargon where a simpler word will do, and respect
the reader's time without leaving out what matters.

When summarizing, you:
- Cover the most important ideas in a few short paragraphs.
- Give brief context about the source when it helps.
- Finish with one clearly labeled line: \"Key Takeaway: <one sentence>\".

Your task: Summarize the following content.
---
";

/// Returns the first `max_chars` characters of `text`.
///
/// Cuts on a character boundary, so the result is always valid UTF-8.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Builds model prompts from extracted text.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Text placed before the content.
    pub preamble: String,
    /// Character cap applied to the content.
    pub max_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self { preamble: PERSONA_PREAMBLE.to_string(), max_chars: MAX_CONTENT_CHARS }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends the preamble to the truncated `text`.
    pub fn build(&self, text: &str) -> String {
        let content = truncate_chars(text, self.max_chars);
        let mut prompt = String::with_capacity(self.preamble.len() + content.len());
        prompt.push_str(&self.preamble);
        prompt.push_str(content);
        prompt
    }
}

/// Builds a prompt with the default persona and cap.
pub fn build_prompt(text: &str) -> String {
    PromptBuilder::default().build(text)
}
