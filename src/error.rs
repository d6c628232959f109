//! Error types for the quizgen library.
//!
//! Every variant of [`QuizGenError`] is fatal to a single pipeline run: there
//! is no retry and no partial result. The caller (the `quizgen` binary, or any
//! other shell embedding the library) maps each kind to a user-facing message
//! and logs the full cause chain.
//!
//! Temporary staging files are cleaned up by their RAII guard regardless of
//! which variant is returned.

use std::fmt;
use thiserror::Error;

/// Which model call of the pipeline failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CallStage {
    /// The first call, producing the quiz JSON.
    Generation,
    /// The second call, producing the free-text critique.
    Review,
}

impl fmt::Display for CallStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStage::Generation => f.write_str("generation"),
            CallStage::Review => f.write_str("review"),
        }
    }
}

/// All errors returned by the quizgen library.
#[derive(Debug, Error)]
pub enum QuizGenError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The uploaded file is neither `.pdf` nor `.txt`.
    #[error("Unsupported file format '{extension}'\nPlease upload a PDF or TXT file.")]
    UnsupportedFormat { extension: String },

    /// The file could not be read, decoded or parsed.
    #[error("Error reading file '{name}': {source}")]
    ReadError {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Prompt errors ─────────────────────────────────────────────────────
    /// A template placeholder had no value.
    #[error("Prompt template is missing required field '{field}'")]
    TemplateError { field: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// Transport, authentication or provider failure during a model call.
    #[error("LLM {stage} call failed (model: {model}): {message}")]
    ModelCallError {
        model: String,
        stage: CallStage,
        message: String,
    },

    // ── Quiz errors ───────────────────────────────────────────────────────
    /// No JSON object could be recovered from the generation response.
    #[error("Could not extract valid quiz JSON from the model response ({} chars)", .raw.len())]
    MalformedQuiz { raw: String },

    /// The decoded quiz does not have the required shape.
    #[error("{}", describe_violation(.key, .field.as_deref(), .reason))]
    SchemaViolation {
        key: String,
        field: Option<String>,
        reason: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Missing credentials or an unusable provider, detected at start-up.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

fn describe_violation(key: &str, field: Option<&str>, reason: &str) -> String {
    match field {
        Some(field) => format!("Question \"{key}\" field \"{field}\": {reason}"),
        None => format!("Question \"{key}\": {reason}"),
    }
}

impl QuizGenError {
    pub(crate) fn read_error(
        name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        QuizGenError::ReadError {
            name: name.into(),
            source: source.into(),
        }
    }

    pub(crate) fn violation(
        key: impl Into<String>,
        field: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        QuizGenError::SchemaViolation {
            key: key.into(),
            field: field.map(str::to_string),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = QuizGenError::UnsupportedFormat {
            extension: "docx".into(),
        };
        assert!(e.to_string().contains("'docx'"));
    }

    #[test]
    fn schema_violation_names_key_and_field() {
        let e = QuizGenError::violation("3", Some("correct"), "missing required field");
        let msg = e.to_string();
        assert!(msg.contains("\"3\""), "got: {msg}");
        assert!(msg.contains("\"correct\""), "got: {msg}");
    }

    #[test]
    fn schema_violation_without_field() {
        let e = QuizGenError::violation("5", None, "question is missing");
        assert_eq!(e.to_string(), "Question \"5\": question is missing");
    }

    #[test]
    fn model_call_error_mentions_stage() {
        let e = QuizGenError::ModelCallError {
            model: "gpt-4.1-nano".into(),
            stage: CallStage::Review,
            message: "401 Unauthorized".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("review"));
        assert!(msg.contains("gpt-4.1-nano"));
    }

    #[test]
    fn read_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let e = QuizGenError::read_error("notes.txt", io);
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("notes.txt"));
    }
}
