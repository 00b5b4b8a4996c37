mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use precis_core::{
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, EventLogger, FetchConfig, GeminiClient, Generator, JsonArraySink,
    JsonLinesSink, PrecisError, Source, SourceKind, Summarizer, fetch_file,
};
use tracing_subscriber::EnvFilter;

use crate::echo::{format_size, print_banner, print_detail, print_error, print_info, print_step, print_success, print_warning};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// On-disk layout of the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// One JSON object per line, appended
    JsonLines,
    /// A single JSON array, rewritten after every event
    JsonArray,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "json" => Ok(Self::JsonArray),
            _ => Err(format!("Invalid log format: {}. Valid options: jsonl, json", s)),
        }
    }
}

/// Summarize a web article or a PDF document with Gemini
#[derive(Parser, Debug)]
#[command(name = "precis")]
#[command(author = "Precis Contributors")]
#[command(version)]
#[command(about = "Summarize web articles and PDF documents with Gemini", long_about = None)]
struct Args {
    /// Article URL (http:// or https://) or path to a PDF file
    #[arg(value_name = "INPUT", required_unless_present = "list_models")]
    input: Option<String>,

    /// Gemini model to use
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE, value_name = "TEMP")]
    temperature: f32,

    /// HTTP timeout in seconds for fetching pages
    #[arg(long, default_value = "10", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Event log file
    #[arg(long, default_value = "assistant_log.jsonl", value_name = "FILE")]
    log_file: PathBuf,

    /// Event log format (jsonl, json)
    #[arg(long, default_value = "jsonl", value_name = "FORMAT")]
    log_format: LogFormat,

    /// List models that support content generation and exit
    #[arg(long)]
    list_models: bool,

    /// Output file for the summary (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,precis=debug,precis_core=debug" } else { "warn,precis_events=off" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_logger(path: &Path, format: LogFormat) -> EventLogger {
    match format {
        LogFormat::JsonLines => EventLogger::new(JsonLinesSink::new(path)),
        LogFormat::JsonArray => EventLogger::new(JsonArraySink::new(path)),
    }
}

/// Decides whether `input` names a PDF on disk or a URL.
fn input_kind(input: &str) -> SourceKind {
    let input = input.trim();
    let is_pdf_path =
        !input.contains("://") && Path::new(input).extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

    if is_pdf_path { SourceKind::Pdf } else { SourceKind::Url }
}

fn resolve_source(input: &str, kind: SourceKind) -> precis_core::Result<Source> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PrecisError::InvalidInput(
            "Please enter a URL or a PDF path before summarizing.".to_string(),
        ));
    }

    match kind {
        SourceKind::Url => Ok(Source::url(input)),
        SourceKind::Pdf => {
            let bytes = fetch_file(input)?;
            let filename = Path::new(input)
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Source::pdf(filename, bytes))
        }
    }
}

async fn list_models(client: &GeminiClient) {
    let models = client.list_models().await;

    if models.is_empty() {
        print_warning("Could not list models; using the default model.");
        println!("{}", DEFAULT_MODEL);
        return;
    }

    for model in models {
        if model == client.model_name() {
            println!("{} {}", "*".green(), model.bold());
        } else {
            println!("  {}", model);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.verbose {
        print_banner();
        print_info("Debug logging enabled");
        eprintln!();
    }

    let client = match GeminiClient::from_env(args.model.as_deref()) {
        Ok(client) => client,
        Err(err) => {
            print_error(&err.user_message());
            print_warning("The assistant is not ready. Set GOOGLE_API_KEY in your environment or .env file and retry.");
            return Ok(ExitCode::FAILURE);
        }
    };

    if args.list_models {
        list_models(&client).await;
        return Ok(ExitCode::SUCCESS);
    }

    let fetch_config = FetchConfig {
        timeout: args.timeout,
        user_agent: args.user_agent.unwrap_or_else(|| FetchConfig::default().user_agent),
    };
    let mut summarizer = Summarizer::new(client, open_logger(&args.log_file, args.log_format))
        .with_fetch_config(fetch_config)
        .with_temperature(args.temperature);
    summarizer.announce();

    if args.verbose {
        print_detail("Session", &summarizer.logger().session_id().to_string());
        print_detail("Model", summarizer.generator().model_name());
        print_detail("Events", &summarizer.logger().destination());
        eprintln!();
    }

    let input = args.input.unwrap_or_default();
    let kind = input_kind(&input);
    tracing::debug!(%kind, input = input.trim(), "resolved input");

    if args.verbose {
        print_step(1, 2, &format!("Reading {} source", kind));
    }

    let source = match resolve_source(&input, kind) {
        Ok(source) => source,
        Err(err) => {
            summarizer.report_failure(kind, input.trim(), &err);
            print_error(&err.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Source::Pdf { filename, bytes } = &source {
        print_info(&format!("Uploaded: {} ({})", filename.bright_white(), format_size(bytes.len())));
    }

    if args.verbose {
        print_step(
            2,
            2,
            &format!("Summarizing with {}", summarizer.generator().model_name().bright_white()),
        );
    }

    let summary = match summarizer.summarize(&source).await {
        Ok(summary) => summary,
        Err(err) => {
            print_error(&err.user_message());
            return Ok(ExitCode::FAILURE);
        }
    };

    print_success("Summary ready");

    match args.output {
        Some(path) => {
            fs::write(&path, &summary).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Summary written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", summary);
        }
    }

    Ok(ExitCode::SUCCESS)
}
