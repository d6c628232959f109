//! The schema exemplar injected into the generation prompt.
//!
//! A literal one-question example of the expected answer shape. It is loaded
//! once (from the built-in asset or a user-supplied file), checked to be a
//! JSON object, and shared read-only for the lifetime of the process.

use crate::error::QuizGenError;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Built-in exemplar shipped with the crate.
pub const BUILTIN_EXEMPLAR: &str = include_str!("../assets/response.json");

/// Parsed exemplar plus its pretty-printed prompt form.
#[derive(Debug, Clone)]
pub struct SchemaExemplar {
    rendered: Arc<str>,
}

impl SchemaExemplar {
    /// The exemplar compiled into the binary.
    pub fn builtin() -> Self {
        // The asset is checked by `builtin_exemplar_is_valid`.
        Self::from_json(BUILTIN_EXEMPLAR).unwrap_or_else(|_| Self {
            rendered: Arc::from(BUILTIN_EXEMPLAR.trim()),
        })
    }

    /// Parse an exemplar from JSON text. The top level must be an object.
    pub fn from_json(json: &str) -> Result<Self, QuizGenError> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| QuizGenError::InvalidConfig(format!("Schema exemplar is not JSON: {e}")))?;
        if !value.is_object() {
            return Err(QuizGenError::InvalidConfig(
                "Schema exemplar must be a JSON object".into(),
            ));
        }
        let rendered = serde_json::to_string_pretty(&value)
            .map_err(|e| QuizGenError::Internal(format!("Failed to render exemplar: {e}")))?;
        Ok(Self {
            rendered: Arc::from(rendered),
        })
    }

    /// Read an exemplar file from disk.
    pub fn from_file(path: &Path) -> Result<Self, QuizGenError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| QuizGenError::read_error(path.display().to_string(), e))?;
        debug!("Loaded schema exemplar from {}", path.display());
        Self::from_json(&json)
    }

    /// Pretty JSON text for the `response_json` template field.
    pub fn as_prompt_text(&self) -> &str {
        &self.rendered
    }
}

impl Default for SchemaExemplar {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_exemplar_is_valid() {
        let ex = SchemaExemplar::from_json(BUILTIN_EXEMPLAR).expect("built-in exemplar parses");
        let text = ex.as_prompt_text();
        assert!(text.contains("\"prompt\""));
        assert!(text.contains("\"options\""));
        assert!(text.contains("\"correct\""));
        for key in ["\"a\"", "\"b\"", "\"c\"", "\"d\""] {
            assert!(text.contains(key), "missing option {key}");
        }
    }

    #[test]
    fn rejects_non_object() {
        let err = SchemaExemplar::from_json("[1, 2]").unwrap_err();
        assert!(matches!(err, QuizGenError::InvalidConfig(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"1": {{"mcq": "q", "options": {{"a": "x"}}, "correct": "a"}}}}"#).unwrap();
        let ex = SchemaExemplar::from_file(file.path()).expect("loads");
        assert!(ex.as_prompt_text().contains("\"mcq\""));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = SchemaExemplar::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, QuizGenError::ReadError { .. }));
    }
}
