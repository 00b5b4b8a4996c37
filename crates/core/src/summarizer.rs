//! Summarization pipeline.
//!
//! [`Summarizer`] runs extract → build prompt → generate for one source at a
//! time and records the lifecycle in the session's event log:
//!
//! - a source rejected up front logs a single `validation_error`;
//! - otherwise `summary_requested` is logged, followed by exactly one of
//!   `summary_completed`, `validation_error`, `fetch_error`, `pdf_error` or
//!   `gemini_error`.

use crate::events::{Event, EventLogger, EventType};
use crate::extract::{extract_html_text, extract_pdf_text};
use crate::fetch::{FetchConfig, fetch_url, validate_url};
use crate::gemini::{DEFAULT_TEMPERATURE, Generator};
use crate::prompt::PromptBuilder;
use crate::{PrecisError, Result, Source, SourceKind};

/// Orchestrates extraction and generation for a session.
#[derive(Debug)]
pub struct Summarizer<G> {
    generator: G,
    logger: EventLogger,
    fetch: FetchConfig,
    prompt: PromptBuilder,
    temperature: f32,
}

impl<G: Generator> Summarizer<G> {
    pub fn new(generator: G, logger: EventLogger) -> Self {
        Self {
            generator,
            logger,
            fetch: FetchConfig::default(),
            prompt: PromptBuilder::default(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_fetch_config(mut self, config: FetchConfig) -> Self {
        self.fetch = config;
        self
    }

    pub fn with_prompt_builder(mut self, builder: PromptBuilder) -> Self {
        self.prompt = builder;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Mutable access, e.g. to switch models between runs.
    pub fn generator_mut(&mut self) -> &mut G {
        &mut self.generator
    }

    pub fn logger(&self) -> &EventLogger {
        &self.logger
    }

    /// Logs `app_started` for the configured model.
    pub fn announce(&mut self) {
        self.logger.log(Event::new(EventType::AppStarted, self.generator.model_name()));
    }

    /// Logs a failure that happened outside a pipeline run, such as a
    /// front-end rejecting a missing upload.
    pub fn report_failure(&mut self, kind: SourceKind, identifier: &str, err: &PrecisError) {
        self.logger.log(
            Event::new(err.event_type(), self.generator.model_name())
                .source(kind, identifier)
                .error(err.to_string()),
        );
    }

    /// Summarizes either kind of source.
    pub async fn summarize(&mut self, source: &Source) -> Result<String> {
        match source {
            Source::Url(url) => self.summarize_url(url).await,
            Source::Pdf { filename, bytes } => self.summarize_pdf(filename, bytes).await,
        }
    }

    /// Fetches `url`, extracts its text and summarizes it.
    pub async fn summarize_url(&mut self, url: &str) -> Result<String> {
        if let Err(err) = validate_url(url) {
            self.report_failure(SourceKind::Url, url, &err);
            return Err(err);
        }

        self.log_requested(SourceKind::Url, url);

        let extracted = match fetch_url(url, &self.fetch).await {
            Ok(html) => extract_html_text(&html),
            Err(err) => Err(err),
        };
        let text = self.checked(SourceKind::Url, url, extracted)?;

        self.generate_summary(SourceKind::Url, url, &text).await
    }

    /// Extracts the text of an uploaded PDF and summarizes it.
    pub async fn summarize_pdf(&mut self, filename: &str, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            let err = PrecisError::InvalidInput("Please upload a PDF file before summarizing.".to_string());
            self.report_failure(SourceKind::Pdf, filename, &err);
            return Err(err);
        }

        self.log_requested(SourceKind::Pdf, filename);

        let text = self.checked(SourceKind::Pdf, filename, extract_pdf_text(bytes))?;

        self.generate_summary(SourceKind::Pdf, filename, &text).await
    }

    async fn generate_summary(&mut self, kind: SourceKind, identifier: &str, text: &str) -> Result<String> {
        let prompt = self.prompt.build(text);
        tracing::debug!(%kind, identifier, text_chars = text.chars().count(), "built prompt");

        let generated = self.generator.generate(&prompt, self.temperature).await;
        let summary = self.checked(kind, identifier, generated)?;

        self.logger.log(
            Event::new(EventType::SummaryCompleted, self.generator.model_name())
                .source(kind, identifier)
                .summary_length(summary.chars().count()),
        );

        Ok(summary)
    }

    fn log_requested(&mut self, kind: SourceKind, identifier: &str) {
        self.logger.log(Event::new(EventType::SummaryRequested, self.generator.model_name()).source(kind, identifier));
    }

    /// Logs the terminal error event for a failed stage.
    fn checked<T>(&mut self, kind: SourceKind, identifier: &str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.report_failure(kind, identifier, err);
        }
        result
    }
}
