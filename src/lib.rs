//! # quizgen
//!
//! Generate multiple-choice quizzes from PDF or text documents with a hosted
//! large language model, then have the model critique its own quiz.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / TXT
//!  │
//!  ├─ 1. Read      extract text (pdfium on spawn_blocking, or UTF-8 decode)
//!  ├─ 2. Stage     write text to a scoped temp file, read it back
//!  ├─ 3. Generate  render prompt + schema exemplar → model call
//!  ├─ 4. Parse     JSON decode, brace-extraction fallback, shape validation
//!  ├─ 5. Review    render review prompt → second model call
//!  └─ 6. Format    one display row per question + usage statistics
//! ```
//!
//! Every step is fatal on failure; there is no retry and no partial output.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quizgen::{generate_from_file, QuizConfig, QuizParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from QUIZGEN_PROVIDER / OPENAI_API_KEY
//!     let config = QuizConfig::default();
//!     let params = QuizParams::new(5, "Biology", "simple");
//!     let result = generate_from_file("chapter1.pdf", &params, &config).await?;
//!     for row in &result.rows {
//!         println!("{}\n{}\nAnswer: {}\n", row.question, row.options, row.correct_answer);
//!     }
//!     eprintln!("review: {}", result.review);
//!     eprintln!("tokens: {} (~${:.4})", result.usage.total_tokens, result.usage.estimated_cost);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `quizgen` binary (clap + anyhow + tracing-subscriber + indicatif + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! quizgen = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod exemplar;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod pricing;
pub mod progress;
pub mod prompts;
pub mod quiz;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Credentials, QuizConfig, QuizConfigBuilder, DEFAULT_MODEL, DEFAULT_PROVIDER};
pub use error::{CallStage, QuizGenError};
pub use exemplar::SchemaExemplar;
pub use generate::{
    generate_from_file, generate_from_file_sync, generate_from_upload, generate_quiz,
    resolve_client, QuizParams,
};
pub use output::{CallUsage, PipelineResult, QuizRow, UsageStatistics};
pub use pipeline::llm::{CallOptions, Completion, LlmClient, ModelClient};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, PipelineStage, ProgressCallback};
pub use quiz::{AnswerOptions, GenerationRequest, Quiz, QuizQuestion};
