pub mod error;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod gemini;
pub mod prompt;
pub mod source;
pub mod summarizer;

pub use error::{BILLING_URL, ContentOrigin, NetworkError, PrecisError, RATE_LIMIT_URL, Result};
pub use events::{
    Event, EventLogger, EventRecord, EventSink, EventType, JsonArraySink, JsonLinesSink, Level, MemorySink, SessionId,
    WriterSink,
};
pub use extract::{extract_html_text, extract_pdf_text, is_pdf};
pub use fetch::{ACCEPTED_SCHEMES, FetchConfig, fetch_file, fetch_url, validate_url};
pub use gemini::{
    API_BASE_VAR, API_KEY_VAR, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TEMPERATURE, GeminiClient, GeminiConfig,
    Generator,
};
pub use prompt::{MAX_CONTENT_CHARS, PERSONA_PREAMBLE, PromptBuilder, build_prompt, truncate_chars};
pub use source::{Source, SourceKind};
pub use summarizer::Summarizer;
