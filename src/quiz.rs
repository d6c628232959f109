//! Quiz data model.
//!
//! A [`Quiz`] is an ordered list of [`QuizQuestion`]s whose 1-based position
//! is its sequence number. On the wire it is the JSON object the model is
//! asked to produce:
//!
//! ```json
//! {
//!   "1": { "prompt": "…", "options": { "a": "…", "b": "…" }, "correct": "a" },
//!   "2": { … }
//! }
//! ```
//!
//! Decoding from untrusted model output goes through
//! [`crate::pipeline::parse`], which validates the shape first and names the
//! offending key and field. The `Deserialize` impls here assume that
//! validation already happened.

use crate::error::QuizGenError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Parameters for one pipeline run.
///
/// Built once from user input and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    source_text: String,
    question_count: usize,
    subject: String,
    tone: String,
}

impl GenerationRequest {
    /// Validate and build a request.
    ///
    /// An empty subject or tone counts as an absent template parameter and
    /// is reported as [`QuizGenError::TemplateError`].
    pub fn new(
        source_text: impl Into<String>,
        question_count: usize,
        subject: impl Into<String>,
        tone: impl Into<String>,
    ) -> Result<Self, QuizGenError> {
        let subject = subject.into().trim().to_string();
        let tone = tone.into().trim().to_string();

        if question_count == 0 {
            return Err(QuizGenError::InvalidConfig(
                "Question count must be ≥ 1".into(),
            ));
        }
        if subject.is_empty() {
            return Err(QuizGenError::TemplateError {
                field: "subject".into(),
            });
        }
        if tone.is_empty() {
            return Err(QuizGenError::TemplateError {
                field: "tone".into(),
            });
        }

        Ok(Self {
            source_text: source_text.into(),
            question_count,
            subject,
            tone,
        })
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn question_count(&self) -> usize {
        self.question_count
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn tone(&self) -> &str {
        &self.tone
    }
}

/// Answer options keyed by a short identifier, in display order.
///
/// Serialised as a JSON object; the key order of the input is preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerOptions(Vec<(String, String)>);

impl AnswerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option. A repeated key replaces the earlier text in place.
    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        let key = key.into();
        let text = text.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = text,
            None => self.0.push((key, text)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Find the stored key matching `candidate`, ignoring case and whitespace.
    pub fn resolve_key(&self, candidate: &str) -> Option<&str> {
        let candidate = candidate.trim();
        self.0
            .iter()
            .map(|(k, _)| k.as_str())
            .find(|k| k.eq_ignore_ascii_case(candidate))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AnswerOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = AnswerOptions::new();
        for (k, v) in iter {
            options.insert(k, v);
        }
        options
    }
}

impl Serialize for AnswerOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AnswerOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionsVisitor;

        impl<'de> Visitor<'de> for OptionsVisitor {
            type Value = AnswerOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping option keys to option text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut options = AnswerOptions::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    options.insert(k, v);
                }
                Ok(options)
            }
        }

        deserializer.deserialize_map(OptionsVisitor)
    }
}

/// One multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text. Older prompts call this field `mcq`.
    #[serde(alias = "mcq")]
    pub prompt: String,
    pub options: AnswerOptions,
    /// Key of the correct option.
    pub correct: String,
}

/// An ordered quiz. Question `i` (0-based) has sequence number `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quiz {
    questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by its 1-based sequence number.
    pub fn get(&self, number: usize) -> Option<&QuizQuestion> {
        number.checked_sub(1).and_then(|i| self.questions.get(i))
    }

    /// Iterate `(sequence_number, question)` in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &QuizQuestion)> {
        self.questions.iter().enumerate().map(|(i, q)| (i + 1, q))
    }

    /// Pretty JSON in the same shape the model was asked to produce.
    pub fn to_json_pretty(&self) -> Result<String, QuizGenError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QuizGenError::Internal(format!("Failed to serialise quiz: {e}")))
    }
}

impl Serialize for Quiz {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.questions.len()))?;
        for (number, question) in self.iter() {
            map.serialize_entry(&number.to_string(), question)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> QuizQuestion {
        QuizQuestion {
            prompt: "What colour is the sky?".into(),
            options: [("a", "Blue"), ("b", "Green"), ("c", "Red"), ("d", "Black")]
                .into_iter()
                .collect(),
            correct: "a".into(),
        }
    }

    #[test]
    fn request_rejects_empty_subject() {
        let err = GenerationRequest::new("text", 3, "  ", "simple").unwrap_err();
        assert!(matches!(err, QuizGenError::TemplateError { ref field } if field == "subject"));
    }

    #[test]
    fn request_rejects_zero_questions() {
        let err = GenerationRequest::new("text", 0, "Science", "simple").unwrap_err();
        assert!(matches!(err, QuizGenError::InvalidConfig(_)));
    }

    #[test]
    fn options_keep_insertion_order() {
        let options: AnswerOptions = [("d", "4"), ("a", "1"), ("c", "3")].into_iter().collect();
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["d", "a", "c"]);
    }

    #[test]
    fn options_deserialise_in_source_order() {
        let options: AnswerOptions =
            serde_json::from_str(r#"{"b": "two", "a": "one"}"#).expect("valid options");
        let keys: Vec<&str> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn resolve_key_ignores_case() {
        let q = sample_question();
        assert_eq!(q.options.resolve_key(" A "), Some("a"));
        assert_eq!(q.options.resolve_key("e"), None);
    }

    #[test]
    fn question_accepts_mcq_alias() {
        let q: QuizQuestion = serde_json::from_str(
            r#"{"mcq": "Q?", "options": {"a": "x", "b": "y"}, "correct": "b"}"#,
        )
        .expect("mcq alias");
        assert_eq!(q.prompt, "Q?");
    }

    #[test]
    fn quiz_serialises_with_numbered_keys() {
        let quiz = Quiz::new(vec![sample_question(), sample_question()]);
        let value = serde_json::to_value(&quiz).expect("serialise");
        let obj = value.as_object().expect("object");
        let keys: Vec<&String> = obj.keys().collect();
        assert_eq!(keys, vec!["1", "2"]);
        assert_eq!(obj["1"]["prompt"], "What colour is the sky?");
    }

    #[test]
    fn quiz_get_is_one_based() {
        let quiz = Quiz::new(vec![sample_question()]);
        assert!(quiz.get(0).is_none());
        assert!(quiz.get(1).is_some());
        assert!(quiz.get(2).is_none());
    }
}
