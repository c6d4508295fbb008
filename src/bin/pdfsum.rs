//! CLI binary for pdf-summarizer.
//!
//! A thin shim over the library crate: maps CLI flags to `SummarizerConfig`,
//! drives one `SummarizationController` session and prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_summarizer::summarize::write_atomic;
use pdf_summarizer::{
    load_document, resolve_extractor, BusyKind, GeminiClient, Status, StatusObserver,
    SummarizationController, SummarizerConfig, SummarizerError, SummaryReport,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

// ── Status spinner ───────────────────────────────────────────────────────────

/// Terminal status indicator: a spinner while the controller is busy that
/// names the running stage, cleared as soon as it leaves the busy state.
struct SpinnerObserver {
    bar: Mutex<Option<ProgressBar>>,
}

impl SpinnerObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(None),
        })
    }

    fn spinner(message: &'static str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }
}

impl StatusObserver for SpinnerObserver {
    fn on_status_change(&self, _previous: &Status, current: &Status) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = slot.take() {
            bar.finish_and_clear();
        }
        if let Status::Busy(kind) = current {
            let message = match kind {
                BusyKind::Extracting => "Extracting text…",
                BusyKind::Summarizing => "Summarizing…",
            };
            *slot = Some(Self::spinner(message));
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a local PDF (stdout)
  pdfsum report.pdf

  # Write the summary to a file
  pdfsum report.pdf -o summary.txt

  # Summarise a PDF from a URL
  pdfsum https://arxiv.org/pdf/1706.03762

  # Show the extracted text only (no API key needed)
  pdfsum --extract-only report.pdf

  # JSON output with page and character counts
  pdfsum --json report.pdf > summary.json

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Access key for the generative-language API
  PDFSUM_MODEL            Override model ID
  PDFSUM_API_BASE_URL     Override API root (e.g. a local proxy)
  PDFSUM_MAX_CHARS        Largest extracted text that will be sent
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, overrides -v / -q

EXIT STATUS:
  0  summary (or extracted text) written
  1  the document could not be read, extracted or summarised
  2  the summarization service failed or could not be reached
"#;

/// Summarise PDF documents with a generative-language model.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsum",
    version,
    about = "Summarise PDF documents with a generative-language model",
    long_about = "Extract the text of a PDF (local file or URL) with PDFium and ask a \
generative-language model for a summary. One request per document, no retries.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the summary to this file instead of stdout.
    #[arg(short, long, env = "PDFSUM_OUTPUT")]
    output: Option<PathBuf>,

    /// API access key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID.
    #[arg(long, env = "PDFSUM_MODEL", default_value = pdf_summarizer::config::DEFAULT_MODEL)]
    model: String,

    /// API root URL.
    #[arg(long, env = "PDFSUM_API_BASE_URL", default_value = pdf_summarizer::config::DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Longest extracted text, in characters, that will be sent.
    #[arg(long, env = "PDFSUM_MAX_CHARS", default_value_t = pdf_summarizer::config::DEFAULT_MAX_TEXT_CHARS)]
    max_chars: usize,

    /// Path to a text file containing a custom instruction.
    #[arg(long, env = "PDFSUM_INSTRUCTION")]
    instruction_file: Option<PathBuf>,

    /// Request timeout in seconds (default: none).
    #[arg(long, env = "PDFSUM_TIMEOUT")]
    timeout: Option<u64>,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "PDFSUM_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Path to libpdfium, or the directory that holds it.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the extracted text and stop.
    #[arg(long)]
    extract_only: bool,

    /// Output a JSON report instead of plain text.
    #[arg(long, env = "PDFSUM_JSON")]
    json: bool,

    /// Disable the status spinner.
    #[arg(long, env = "PDFSUM_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSUM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSUM_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner carries progress; library INFO logs would tear it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;

    // ── Resolve the extractor ────────────────────────────────────────────
    // Not fatal: the controller reports the missing capability when the
    // document is selected, the same way it reports every other failure.
    let extractor = match resolve_extractor(&config) {
        Ok(extractor) => Some(extractor),
        Err(e) => {
            warn!("{e:?}");
            None
        }
    };

    let client = GeminiClient::new(&config).context("Failed to build HTTP client")?;
    let model = client.model().to_string();
    let mut session = SummarizationController::new(extractor, Arc::new(client), &config);
    if show_progress {
        session = session.with_observer(SpinnerObserver::new());
    }

    // ── File intake ──────────────────────────────────────────────────────
    let document = load_document(&cli.input, config.download_timeout_secs)
        .await
        .with_context(|| format!("Failed to open '{}'", cli.input))?;
    let name = document.name().to_string();
    let media_type = document.media_type().to_string();

    // ── Extraction ───────────────────────────────────────────────────────
    let extraction_start = Instant::now();
    if let Err(e) = session.select_document(document).await.map(|_| ()) {
        return Ok(report_error(&session, &e));
    }
    let extraction_ms = extraction_start.elapsed().as_millis() as u64;

    if cli.extract_only {
        let extracted = session.extracted();
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(extracted).context("Failed to serialise text")?
            );
        } else {
            print_text(&extracted.text)?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Summarisation ────────────────────────────────────────────────────
    let summary_start = Instant::now();
    if let Err(e) = session.summarize().await.map(|_| ()) {
        return Ok(report_error(&session, &e));
    }
    let summary_ms = summary_start.elapsed().as_millis() as u64;

    let extracted = session.extracted();
    let report = SummaryReport {
        document: name,
        media_type,
        page_count: extracted.page_count,
        extracted_chars: extracted.char_count(),
        model,
        summary: session.summary().unwrap_or_default().to_string(),
        extraction_ms,
        summary_ms,
    };

    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, &report.summary)
            .await
            .context("Failed to write summary")?;
        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {} chars  →  {}",
                green("✔"),
                report.page_count,
                report.extracted_chars,
                output_path.display()
            );
        }
    } else if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else {
        print_text(&report.summary)?;
    }

    if !cli.quiet && !cli.json && cli.output.is_none() {
        eprintln!(
            "{}",
            dim(&format!(
                "{} pages, {} chars, {} · {}ms extraction, {}ms summary",
                report.page_count,
                report.extracted_chars,
                report.model,
                report.extraction_ms,
                report.summary_ms
            ))
        );
    }

    Ok(ExitCode::SUCCESS)
}

/// Exit status for a failed run.
const EXIT_FAILED: u8 = 1;
/// Exit status when the summarization service failed or could not be reached.
const EXIT_SERVICE_FAILED: u8 = 2;

fn exit_status(err: &SummarizerError) -> u8 {
    if err.is_remote() {
        EXIT_SERVICE_FAILED
    } else {
        EXIT_FAILED
    }
}

/// Print the controller's error banner and choose the exit code.
fn report_error(session: &SummarizationController, err: &SummarizerError) -> ExitCode {
    let message = session
        .error_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    eprintln!("{} {}", red("✘"), message);
    ExitCode::from(exit_status(err))
}

/// Write `text` to stdout with exactly one trailing newline.
fn print_text(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// Map CLI args to `SummarizerConfig`.
async fn build_config(cli: &Cli) -> Result<SummarizerConfig> {
    let mut builder = SummarizerConfig::builder()
        .model(&cli.model)
        .api_base_url(&cli.api_base_url)
        .max_text_chars(cli.max_chars)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref path) = cli.instruction_file {
        let instruction = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(instruction.trim());
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_library_path(path);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_defaults() {
        let cli = Cli::try_parse_from(["pdfsum", "doc.pdf"]).unwrap();
        assert_eq!(cli.input, "doc.pdf");
        assert_eq!(cli.max_chars, pdf_summarizer::config::DEFAULT_MAX_TEXT_CHARS);
        assert!(cli.timeout.is_none());
        assert!(!cli.extract_only);
    }

    #[tokio::test]
    async fn config_from_flags() {
        let cli = Cli::try_parse_from([
            "pdfsum",
            "doc.pdf",
            "--model",
            "gemini-test",
            "--max-chars",
            "10",
            "--timeout",
            "30",
            "--api-key",
            "k",
        ])
        .unwrap();
        let config = build_config(&cli).await.unwrap();
        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.max_text_chars, 10);
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn service_failures_exit_with_their_own_status() {
        let remote = [
            SummarizerError::ApiError {
                message: "quota".into(),
            },
            SummarizerError::Blocked {
                reason: "SAFETY".into(),
            },
            SummarizerError::NoCandidates,
            SummarizerError::Network {
                detail: "refused".into(),
            },
        ];
        for err in &remote {
            assert_eq!(exit_status(err), EXIT_SERVICE_FAILED, "{err:?}");
        }

        let local = [
            SummarizerError::NothingToSummarize,
            SummarizerError::DocumentTooLarge { chars: 2, limit: 1 },
            SummarizerError::InvalidFileType {
                name: "a.txt".into(),
                media_type: "text/plain".into(),
            },
        ];
        for err in &local {
            assert_eq!(exit_status(err), EXIT_FAILED, "{err:?}");
        }
    }

    #[tokio::test]
    async fn zero_max_chars_is_rejected() {
        let cli = Cli::try_parse_from(["pdfsum", "doc.pdf", "--max-chars", "0"]).unwrap();
        assert!(build_config(&cli).await.is_err());
    }
}
