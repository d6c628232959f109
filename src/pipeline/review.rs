//! Review step: ask the model to critique a validated quiz.
//!
//! The critique is free text for a human reader. Nothing downstream parses
//! it, and it never feeds back into the quiz.

use crate::error::QuizGenError;
use crate::pipeline::llm::{CallOptions, Completion, ModelClient};
use crate::prompts::render_review_prompt;
use crate::quiz::{GenerationRequest, Quiz};
use tracing::debug;

/// Render the review prompt for `quiz` and return the model's critique.
///
/// Errors from the model call propagate unchanged; the caller decides what
/// happens to the already-generated quiz.
pub async fn review_quiz(
    client: &dyn ModelClient,
    quiz: &Quiz,
    request: &GenerationRequest,
    options: &CallOptions,
) -> Result<Completion, QuizGenError> {
    let prompt = render_review_prompt(quiz, request)?;
    debug!("Review prompt: {} chars", prompt.len());

    let mut completion = client.complete(&prompt, options).await?;
    completion.text = completion.text.trim().to_string();
    Ok(completion)
}
