//! Quiz generation entry points.
//!
//! A run is strictly sequential: read the document, stage its text, call
//! the model for the quiz, parse it, call the model again for the review,
//! then flatten the quiz into rows. Any failure ends the run; there is no
//! partial result. The staged document is an RAII guard, so it is removed
//! on every exit path.

use crate::config::{QuizConfig, DEFAULT_MODEL, DEFAULT_PROVIDER};
use crate::error::{CallStage, QuizGenError};
use crate::output::{PipelineResult, UsageStatistics};
use crate::pipeline::llm::{CallOptions, LlmClient, ModelClient};
use crate::pipeline::{format, input, parse, review};
use crate::progress::PipelineStage;
use crate::prompts::render_generation_prompt;
use crate::quiz::GenerationRequest;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// User-chosen quiz parameters, independent of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizParams {
    pub question_count: usize,
    pub subject: String,
    pub tone: String,
}

impl QuizParams {
    pub fn new(question_count: usize, subject: impl Into<String>, tone: impl Into<String>) -> Self {
        Self {
            question_count,
            subject: subject.into(),
            tone: tone.into(),
        }
    }
}

/// Generate, parse and review a quiz for an already-built request.
///
/// # Errors
/// - [`QuizGenError::ModelCallError`] if either model call fails
/// - [`QuizGenError::MalformedQuiz`] / [`QuizGenError::SchemaViolation`] if
///   the generation response is not a valid quiz
/// - [`QuizGenError::ConfigurationError`] if no model client can be built
pub async fn generate_quiz(
    request: &GenerationRequest,
    config: &QuizConfig,
) -> Result<PipelineResult, QuizGenError> {
    let client = resolve_client(config)?;
    run_with_client(client.as_ref(), request, config).await
}

/// Run the model steps with an already-resolved client.
async fn run_with_client(
    client: &dyn ModelClient,
    request: &GenerationRequest,
    config: &QuizConfig,
) -> Result<PipelineResult, QuizGenError> {
    let total_start = Instant::now();
    info!(
        "Generating {} questions for '{}' ({} tone) with {}",
        request.question_count(),
        request.subject(),
        request.tone(),
        client.model()
    );

    let mut usage = UsageStatistics::default();

    // ── Step 1: Generation call ──────────────────────────────────────────
    let prompt = render_generation_prompt(request, &config.exemplar)?;
    debug!("Generation prompt: {} chars", prompt.len());
    let generation = run_stage(config, PipelineStage::Generate, async {
        client
            .complete(&prompt, &call_options(config, CallStage::Generation))
            .await
    })
    .await?;
    usage += generation.usage;

    // ── Step 2: Parse and validate ───────────────────────────────────────
    let quiz = run_stage(config, PipelineStage::Parse, async {
        parse::parse_quiz(&generation.text, request.question_count())
    })
    .await?;

    // ── Step 3: Review call ──────────────────────────────────────────────
    let critique = run_stage(config, PipelineStage::Review, async {
        review::review_quiz(
            client,
            &quiz,
            request,
            &call_options(config, CallStage::Review),
        )
        .await
    })
    .await?;
    usage += critique.usage;

    // ── Step 4: Display rows ─────────────────────────────────────────────
    let rows = run_stage(config, PipelineStage::Format, async {
        Ok::<_, QuizGenError>(format::table_rows(&quiz))
    })
    .await?;

    let duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Quiz complete: {} questions, {} tokens, ~${:.4}, {}ms",
        quiz.len(),
        usage.total_tokens,
        usage.estimated_cost,
        duration_ms
    );

    Ok(PipelineResult {
        quiz,
        rows,
        review: critique.text,
        usage,
        duration_ms,
    })
}

/// Run the full pipeline on an uploaded document.
///
/// The model client is resolved before the document is read, so a
/// configuration problem fails the run without any reading or staging.
///
/// # Arguments
/// * `name`: declared file name; its extension picks the reader
/// * `bytes`: raw file contents
/// * `params`: question count, subject and tone
/// * `config`: run configuration
pub async fn generate_from_upload(
    name: &str,
    bytes: &[u8],
    params: &QuizParams,
    config: &QuizConfig,
) -> Result<PipelineResult, QuizGenError> {
    let client = resolve_client(config)?;
    let text = run_stage(
        config,
        PipelineStage::ReadDocument,
        input::read_document(name, bytes),
    )
    .await?;
    generate_from_text(client.as_ref(), &text, params, config).await
}

/// Run the full pipeline on a local `.pdf` or `.txt` file.
pub async fn generate_from_file(
    path: impl AsRef<Path>,
    params: &QuizParams,
    config: &QuizConfig,
) -> Result<PipelineResult, QuizGenError> {
    let path = path.as_ref();
    let client = resolve_client(config)?;
    let text = run_stage(
        config,
        PipelineStage::ReadDocument,
        input::read_document_file(path),
    )
    .await?;
    generate_from_text(client.as_ref(), &text, params, config).await
}

/// Synchronous wrapper around [`generate_from_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_from_file_sync(
    path: impl AsRef<Path>,
    params: &QuizParams,
    config: &QuizConfig,
) -> Result<PipelineResult, QuizGenError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| QuizGenError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate_from_file(path, params, config))
}

/// Stage the extracted text, read it back and run the model steps.
async fn generate_from_text(
    client: &dyn ModelClient,
    text: &str,
    params: &QuizParams,
    config: &QuizConfig,
) -> Result<PipelineResult, QuizGenError> {
    let staged = input::StagedDocument::stage(text, config.staging_dir.as_deref())?;
    let source_text = staged.read_text().await?;
    let request = GenerationRequest::new(
        source_text,
        params.question_count,
        params.subject.as_str(),
        params.tone.as_str(),
    )?;

    let result = run_with_client(client, &request, config).await;
    // `staged` is dropped here on both the Ok and Err paths.
    debug!("Removing staged document {}", staged.path().display());
    drop(staged);
    result
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the model client, from most-specific to least-specific.
///
/// 1. **Pre-built client** (`config.client`), used as-is.
/// 2. **Named provider** (`config.provider_name`) with `config.model`,
///    else `QUIZGEN_MODEL`, else [`DEFAULT_MODEL`].
/// 3. **Environment pair** (`QUIZGEN_PROVIDER`, with the same model chain).
/// 4. **OpenAI** when `OPENAI_API_KEY` is set.
pub fn resolve_client(config: &QuizConfig) -> Result<Arc<dyn ModelClient>, QuizGenError> {
    // 1) User-provided client takes priority
    if let Some(ref client) = config.client {
        return Ok(Arc::clone(client));
    }

    let model = resolve_model(config);

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        return Ok(Arc::new(LlmClient::from_provider_name(name, &model)?));
    }

    // 3) Provider named by the environment
    if let Some(name) = non_empty_env("QUIZGEN_PROVIDER") {
        return Ok(Arc::new(LlmClient::from_provider_name(&name, &model)?));
    }

    // 4) OpenAI when its key is present
    if non_empty_env("OPENAI_API_KEY").is_some() {
        return Ok(Arc::new(LlmClient::from_provider_name(DEFAULT_PROVIDER, &model)?));
    }

    Err(QuizGenError::ConfigurationError(
        "No LLM provider configured.\n\
        Set OPENAI_API_KEY, or choose a provider with --provider / QUIZGEN_PROVIDER."
            .into(),
    ))
}

fn resolve_model(config: &QuizConfig) -> String {
    config
        .model
        .clone()
        .or_else(|| non_empty_env("QUIZGEN_MODEL"))
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn call_options(config: &QuizConfig, stage: CallStage) -> CallOptions {
    CallOptions {
        stage,
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Await one pipeline stage, reporting it to the progress callback.
async fn run_stage<T, F>(
    config: &QuizConfig,
    stage: PipelineStage,
    fut: F,
) -> Result<T, QuizGenError>
where
    F: Future<Output = Result<T, QuizGenError>>,
{
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    let result = fut.await;

    if let Some(ref cb) = config.progress_callback {
        match &result {
            Ok(_) => cb.on_stage_complete(stage, start.elapsed().as_millis() as u64),
            Err(e) => cb.on_stage_error(stage, &e.to_string()),
        }
    }
    result
}
