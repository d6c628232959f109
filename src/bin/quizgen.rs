//! CLI binary for quizgen.
//!
//! A thin shim over the library crate that maps CLI flags to `QuizConfig`,
//! checks credentials and builds the model client once at start-up and prints the quiz, the review and
//! the usage statistics.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use quizgen::{
    generate_from_file, resolve_client, Credentials, PipelineProgressCallback, PipelineResult,
    PipelineStage, ProgressCallback, QuizConfig, QuizParams, SchemaExemplar, DEFAULT_PROVIDER,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one spinner whose message follows the current
/// stage, plus a log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_message("Starting…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: PipelineStage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: PipelineStage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<20} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: PipelineStage, error: &str) {
        // Keep the spinner line tidy; the full error is printed on exit.
        let msg = match error.char_indices().nth(80) {
            Some((idx, _)) => format!("{}\u{2026}", &error[..idx]),
            None => error.to_string(),
        };
        self.bar.println(format!("  {} {:<20} {}", red("✗"), stage.to_string(), red(&msg)));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Five simple questions from a PDF
  quizgen chapter1.pdf --questions 5 --subject Biology --tone simple

  # Harder quiz from plain text with a specific model
  quizgen notes.txt -n 10 --subject Physics --tone difficult --model gpt-4.1-mini

  # Use Anthropic instead of OpenAI
  quizgen paper.pdf --provider anthropic --model claude-haiku-4-5

  # Structured output for other tools
  quizgen notes.txt --json > quiz.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY      OpenAI API key (default provider)
  ANTHROPIC_API_KEY   Anthropic API key
  GEMINI_API_KEY      Google Gemini API key
  MISTRAL_API_KEY     Mistral API key
  QUIZGEN_PROVIDER    Override provider (openai, anthropic, gemini, mistral, ollama)
  QUIZGEN_MODEL       Override model ID
  QUIZGEN_SCHEMA      Path to a custom answer-shape exemplar (JSON)
  PDFIUM_LIB_PATH     Path to libpdfium; the system library is used otherwise

  Variables may also be placed in a .env file in the working directory.
"#;

/// Generate multiple-choice quizzes from PDF or text documents with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "quizgen",
    version,
    about = "Generate multiple-choice quizzes from PDF or text documents with an LLM",
    long_about = "Read a PDF or text document, ask a hosted LLM to write a multiple-choice quiz \
about it, then ask the model to review its own quiz for the intended audience. Prints the quiz \
as a table together with the review and the token usage of both calls.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF or TXT file to build the quiz from.
    input: PathBuf,

    /// Number of questions (3–50).
    #[arg(short = 'n', long, env = "QUIZGEN_QUESTIONS", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(3..=50))]
    questions: u32,

    /// Subject the students are studying.
    #[arg(short, long, env = "QUIZGEN_SUBJECT", default_value = "General Knowledge")]
    subject: String,

    /// Complexity level of the questions (e.g. simple, moderate, difficult).
    #[arg(short, long, env = "QUIZGEN_TONE", default_value = "simple")]
    tone: String,

    /// LLM model ID (e.g. gpt-4.1-nano, gpt-4.1-mini, claude-haiku-4-5).
    #[arg(long, env = "QUIZGEN_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, mistral, ollama.
    #[arg(long, env = "QUIZGEN_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "QUIZGEN_TEMPERATURE", default_value_t = 0.5)]
    temperature: f32,

    /// Max LLM output tokens per call.
    #[arg(long, env = "QUIZGEN_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// Custom answer-shape exemplar (JSON object) injected into the prompt.
    #[arg(long, env = "QUIZGEN_SCHEMA")]
    schema: Option<PathBuf>,

    /// Directory for the temporary staged document.
    #[arg(long, env = "QUIZGEN_STAGING_DIR")]
    staging_dir: Option<PathBuf>,

    /// Output structured JSON (quiz, rows, review, usage) instead of a table.
    #[arg(long, env = "QUIZGEN_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "QUIZGEN_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "QUIZGEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long, env = "QUIZGEN_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner replaces INFO-level library logs while it is active.
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

    // ── Credentials check ────────────────────────────────────────────────
    let provider = cli.provider.as_deref().unwrap_or(DEFAULT_PROVIDER);
    Credentials::from_env(provider).context("Missing credentials")?;

    // ── Build config ─────────────────────────────────────────────────────
    let spinner = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .as_ref()
        .map(|cb| Arc::clone(cb) as Arc<dyn PipelineProgressCallback>);
    let mut config = build_config(&cli, progress_cb)?;
    config.client = Some(resolve_client(&config).context("Failed to set up the LLM provider")?);

    let params = QuizParams::new(cli.questions as usize, cli.subject.as_str(), cli.tone.as_str());

    // ── Run pipeline ─────────────────────────────────────────────────────
    let outcome = generate_from_file(&cli.input, &params, &config).await;
    if let Some(ref cb) = spinner {
        cb.finish();
    }
    let result = outcome
        .with_context(|| format!("Quiz generation failed for {}", cli.input.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        print_report(&result, cli.quiet);
    }

    Ok(())
}

/// Map CLI args to `QuizConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<QuizConfig> {
    let mut builder = QuizConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens);

    if let Some(ref model) = cli.model {
        builder = builder.model(model.as_str());
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.as_str());
    }
    if let Some(ref dir) = cli.staging_dir {
        builder = builder.staging_dir(dir.clone());
    }
    if let Some(ref path) = cli.schema {
        let exemplar = SchemaExemplar::from_file(path)
            .with_context(|| format!("Failed to load schema exemplar from {:?}", path))?;
        builder = builder.exemplar(exemplar);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Print the quiz table, the review and the usage statistics.
fn print_report(result: &PipelineResult, quiz_only: bool) {
    println!("{}", quizgen::pipeline::format::render_text_table(&result.rows));

    if quiz_only {
        return;
    }

    println!("{}", bold("Review"));
    println!("{}\n", result.review);

    let usage = &result.usage;
    println!("{}", bold("API Usage Statistics"));
    println!("  Total Tokens:       {}", usage.total_tokens);
    println!("  Prompt Tokens:      {}", usage.prompt_tokens);
    println!("  Completion Tokens:  {}", usage.completion_tokens);
    println!("  Total Cost (USD):   ${:.6}", usage.estimated_cost);
    println!(
        "  {}",
        dim(&format!("{} model calls in {}ms", usage.calls, result.duration_ms))
    );
}
