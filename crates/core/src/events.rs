//! Session-scoped structured event log.
//!
//! An [`EventLogger`] stamps every event with its session id and a
//! timestamp, mirrors it to `tracing`, and appends it to an injected
//! [`EventSink`].
//!
//! # Example
//!
//! ```rust
//! use precis_core::{Event, EventLogger, EventType, MemorySink, SourceKind};
//!
//! let sink = MemorySink::new();
//! let mut logger = EventLogger::new(sink.clone());
//! logger.log(Event::new(EventType::SummaryRequested, "gemini-2.5-flash").source(SourceKind::Url, "https://example.com"));
//!
//! assert_eq!(sink.records().len(), 1);
//! assert_eq!(sink.records()[0].session_id, logger.session_id());
//! ```

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::SourceKind;

/// `tracing` target of the mirrored event lines.
pub const EVENT_TARGET: &str = "precis_events";

/// Opaque identifier of one front-end instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Severity of an [`EventRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    AppStarted,
    SummaryRequested,
    SummaryCompleted,
    ValidationError,
    FetchError,
    PdfError,
    GeminiError,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AppStarted => "app_started",
            EventType::SummaryRequested => "summary_requested",
            EventType::SummaryCompleted => "summary_completed",
            EventType::ValidationError => "validation_error",
            EventType::FetchError => "fetch_error",
            EventType::PdfError => "pdf_error",
            EventType::GeminiError => "gemini_error",
        }
    }

    /// Level recorded for this event type.
    pub fn level(&self) -> Level {
        match self {
            EventType::AppStarted | EventType::SummaryRequested | EventType::SummaryCompleted => Level::Info,
            EventType::ValidationError => Level::Warning,
            EventType::FetchError | EventType::PdfError | EventType::GeminiError => Level::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.level() != Level::Info
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub level: Level,
    pub event_type: EventType,
    pub session_id: SessionId,
    pub source_type: Option<SourceKind>,
    pub source_identifier: Option<String>,
    pub model: String,
    pub error_message: Option<String>,
    pub summary_length: Option<usize>,
}

/// The caller-supplied part of an [`EventRecord`].
#[derive(Debug, Clone)]
pub struct Event<'a> {
    pub event_type: EventType,
    pub model: &'a str,
    pub source: Option<(SourceKind, &'a str)>,
    pub error_message: Option<String>,
    pub summary_length: Option<usize>,
}

impl<'a> Event<'a> {
    pub fn new(event_type: EventType, model: &'a str) -> Self {
        Self { event_type, model, source: None, error_message: None, summary_length: None }
    }

    pub fn source(mut self, kind: SourceKind, identifier: &'a str) -> Self {
        self.source = Some((kind, identifier));
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn summary_length(mut self, length: usize) -> Self {
        self.summary_length = Some(length);
        self
    }
}

/// Destination for event records.
pub trait EventSink: Send {
    fn append(&mut self, record: &EventRecord) -> io::Result<()>;

    /// Human-readable location, shown by front-ends.
    fn describe(&self) -> String;
}

/// Appends one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventSink for JsonLinesSink {
    fn append(&mut self, record: &EventRecord) -> io::Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps every record in memory and rewrites the file as one JSON array.
///
/// Single writer only: concurrent sessions sharing a path lose records.
#[derive(Debug, Clone)]
pub struct JsonArraySink {
    path: PathBuf,
    entries: Vec<EventRecord>,
}

impl JsonArraySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), entries: Vec::new() }
    }
}

impl EventSink for JsonArraySink {
    fn append(&mut self, record: &EventRecord) -> io::Result<()> {
        self.entries.push(record.clone());
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes JSON lines to any stream.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> EventSink for WriterSink<W> {
    fn append(&mut self, record: &EventRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    fn describe(&self) -> String {
        "stream".to_string()
    }
}

/// In-memory sink; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far.
    pub fn records(&self) -> Vec<EventRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn event_types(&self) -> Vec<EventType> {
        self.records().iter().map(|record| record.event_type).collect()
    }
}

impl EventSink for MemorySink {
    fn append(&mut self, record: &EventRecord) -> io::Result<()> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Session-owned logger.
pub struct EventLogger {
    session_id: SessionId,
    sink: Box<dyn EventSink>,
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("session_id", &self.session_id)
            .field("sink", &self.sink.describe())
            .finish()
    }
}

impl EventLogger {
    /// Creates a logger for a fresh session.
    pub fn new(sink: impl EventSink + 'static) -> Self {
        Self::with_session(SessionId::new(), sink)
    }

    pub fn with_session(session_id: SessionId, sink: impl EventSink + 'static) -> Self {
        Self { session_id, sink: Box::new(sink) }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Where records end up.
    pub fn destination(&self) -> String {
        self.sink.describe()
    }

    /// Records `event` and returns the stored record.
    ///
    /// A failing sink is reported through `tracing` and otherwise ignored.
    pub fn log(&mut self, event: Event<'_>) -> EventRecord {
        let (source_type, source_identifier) = match event.source {
            Some((kind, identifier)) => (Some(kind), Some(identifier.to_string())),
            None => (None, None),
        };

        let record = EventRecord {
            timestamp: OffsetDateTime::now_utc(),
            level: event.event_type.level(),
            event_type: event.event_type,
            session_id: self.session_id,
            source_type,
            source_identifier,
            model: event.model.to_string(),
            error_message: event.error_message,
            summary_length: event.summary_length,
        };

        trace_record(&record);

        if let Err(err) = self.sink.append(&record) {
            tracing::warn!(sink = %self.sink.describe(), error = %err, "could not write event log");
        }

        record
    }
}

fn trace_record(record: &EventRecord) {
    let source = record.source_type.map(|kind| kind.to_string()).unwrap_or_else(|| "-".to_string());
    let id = record.source_identifier.as_deref().unwrap_or("-");

    match record.level {
        Level::Info => {
            tracing::info!(
                target: EVENT_TARGET,
                session = %record.session_id,
                "[{}] source={} id={}",
                record.event_type,
                source,
                id
            )
        }
        Level::Warning => {
            tracing::warn!(
                target: EVENT_TARGET,
                session = %record.session_id,
                "[{}] source={} id={}",
                record.event_type,
                source,
                id
            )
        }
        Level::Error => {
            tracing::error!(
                target: EVENT_TARGET,
                session = %record.session_id,
                "[{}] source={} id={}",
                record.event_type,
                source,
                id
            )
        }
    }
}
