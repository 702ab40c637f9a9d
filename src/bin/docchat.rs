//! CLI binary for docchat.
//!
//! A terminal front end over the library: it reads uploads and chat input
//! from stdin, shows spinners while work is in progress, and renders the
//! session's messages and errors.

use anyhow::{Context, Result};
use clap::Parser;
use docchat::{
    ChatConfig, ChatView, LlmClient, MediaKind, Message, Role, SessionLoop, UploadedFile,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── Terminal view ────────────────────────────────────────────────────────────

/// Renders session events to the terminal.
///
/// At most one spinner is active at a time; lines printed while it spins go
/// through the bar so they do not tear it.
struct CliView {
    spinner: Mutex<Option<ProgressBar>>,
    show_spinner: bool,
}

impl CliView {
    fn new(show_spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            spinner: Mutex::new(None),
            show_spinner,
        })
    }

    fn start_spinner(&self, message: String) {
        if !self.show_spinner {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.lock().unwrap() = Some(bar);
    }

    fn stop_spinner(&self) {
        if let Some(bar) = self.spinner.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }

    fn println(&self, line: String) {
        match self.spinner.lock().unwrap().as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl ChatView for CliView {
    fn on_message(&self, message: &Message) {
        match message.role {
            Role::Assistant => self.println(format!(
                "{} {}\n",
                bold(&green("assistant ›")),
                message.content
            )),
            Role::User => self.println(dim(&format!("you › {}", message.content))),
        }
    }

    fn on_upload_start(&self, name: &str, kind: MediaKind) {
        self.start_spinner(format!("Processing {kind}… {}", dim(name)));
    }

    fn on_upload_complete(&self, kind: MediaKind) {
        self.stop_spinner();
        self.println(format!("{} {kind} processed successfully!", green("✔")));
    }

    fn on_thinking_start(&self) {
        self.start_spinner("AI is thinking…".to_string());
    }

    fn on_thinking_end(&self) {
        self.stop_spinner();
    }

    fn on_error(&self, error: &str) {
        self.stop_spinner();
        eprintln!("{} {}", red("✘"), red(error));
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"COMMANDS (at the › prompt):
  /upload <path|url>   Upload a PDF or image (replaces the current document)
  /history             Print the conversation as JSON
  /help                Show this list
  /quit, /exit         Leave

  Anything else is sent to the assistant as a chat message.

EXAMPLES:
  # Start with a document
  docchat report.pdf

  # Ask about an image from the web
  docchat https://example.com/chart.png

  # Use another provider / model
  docchat --provider openai --model gpt-4.1-mini scan.jpg

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY       Anthropic API key (default provider)
  OPENAI_API_KEY          OpenAI API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (with EDGEQUAKE_MODEL)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium (skips auto-download)
"#;

/// Chat with a PDF or image using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "docchat",
    version,
    about = "Chat with a PDF or image using an LLM",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or image to upload before the first prompt (local path or HTTP/HTTPS URL).
    file: Option<String>,

    /// LLM model ID (default: claude-3-opus-20240229 with anthropic; required with --provider for others).
    #[arg(long, env = "DOCCHAT_MODEL")]
    model: Option<String>,

    /// LLM provider: anthropic, openai, gemini, ollama, azure.
    #[arg(long, env = "DOCCHAT_PROVIDER")]
    provider: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "DOCCHAT_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Max tokens per reply.
    #[arg(long, env = "DOCCHAT_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// Per-reply LLM timeout in seconds (0 = wait forever).
    #[arg(long, env = "DOCCHAT_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout in seconds for URL uploads.
    #[arg(long, env = "DOCCHAT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// User password for encrypted PDFs.
    #[arg(long, env = "DOCCHAT_PDF_PASSWORD")]
    password: Option<String>,

    /// Disable spinners.
    #[arg(long, env = "DOCCHAT_NO_SPINNER")]
    no_spinner: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCCHAT_VERBOSE")]
    verbose: bool,

    /// Suppress everything except replies and errors.
    #[arg(short, long, env = "DOCCHAT_QUIET")]
    quiet: bool,
}

/// One line of terminal input.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Upload(&'a str),
    History,
    Help,
    Quit,
    Say(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head {
        "/upload" => Command::Upload(rest),
        "/history" => Command::History,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Say(line),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // RUST_LOG wins when set.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config & client (fail fast on missing credentials) ─────────
    let config = build_config(&cli)?;
    let client = LlmClient::from_config(&config).context("Failed to set up the LLM provider")?;

    let view = CliView::new(!cli.quiet && !cli.no_spinner);
    let mut session =
        SessionLoop::new(Arc::new(client), &config).with_view(view.clone() as Arc<dyn ChatView>);

    if !cli.quiet {
        eprintln!(
            "{} {}  {}",
            cyan("◆"),
            bold("docchat"),
            dim("type /help for commands, /quit to leave")
        );
    }

    if let Some(ref input) = cli.file {
        upload(&mut session, &view, input, &cli).await;
    }

    // ── REPL ─────────────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", cyan("›"));
        io::stdout().flush().ok();

        let Some(line) = lines.next_line().await.context("Failed to read stdin")? else {
            break;
        };

        match parse_command(&line) {
            Command::Say("") => continue,
            Command::Quit => break,
            Command::Help => println!("{AFTER_HELP}"),
            Command::History => {
                let json = serde_json::to_string_pretty(session.messages())
                    .context("Failed to serialise history")?;
                println!("{json}");
            }
            Command::Upload("") => view.on_error("Error: /upload needs a path or URL"),
            Command::Upload(input) => upload(&mut session, &view, input, &cli).await,
            Command::Say(text) => {
                // Errors were already rendered by the view; the turn stays unanswered.
                let _ = session.on_user_turn(text).await;
            }
        }
    }

    Ok(())
}

/// Load, preview and hand an upload to the session.
async fn upload(session: &mut SessionLoop, view: &CliView, input: &str, cli: &Cli) {
    let file = match UploadedFile::load(input, cli.download_timeout).await {
        Ok(file) => file,
        Err(e) => {
            view.on_error(&format!("Error: {e}"));
            return;
        }
    };

    match file.kind {
        MediaKind::Pdf => {
            if let Err(e) = ensure_pdfium(cli.quiet || cli.no_spinner) {
                view.on_error(&format!("Error: {e:#}"));
                return;
            }
        }
        MediaKind::Image => {
            // Preview from the original bytes, not the canonical PNG.
            if let Ok(img) = image::load_from_memory(&file.bytes) {
                view.println(dim(&format!(
                    "Uploaded image: {} ({}×{})",
                    file.name,
                    img.width(),
                    img.height()
                )));
            }
        }
    }

    // Failures were already rendered by the view.
    let _ = session.on_upload(file).await;
}

/// Make sure the PDFium library is available before the first PDF upload.
///
/// On the very first run this downloads ~30 MB from bblanchon/pdfium-binaries
/// into the pdfium-auto cache; later runs only check the path.
fn ensure_pdfium(silent: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }

    if silent {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to `ChatConfig`.
fn build_config(cli: &Cli) -> Result<ChatConfig> {
    let mut builder = ChatConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs(cli.api_timeout)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref password) = cli.password {
        builder = builder.pdf_password(password.clone());
    }

    builder.build().context("Invalid configuration")
}
