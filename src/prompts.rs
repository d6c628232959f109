//! Prompt templates for quiz generation and review.
//!
//! Both prompts live here so wording changes happen in one place and tests
//! can inspect the rendered text without a model. Templates use `{name}`
//! placeholders; `{{` and `}}` render as literal braces so JSON examples can
//! be written inline.

use crate::error::QuizGenError;
use crate::exemplar::SchemaExemplar;
use crate::quiz::{GenerationRequest, Quiz};
use std::collections::HashMap;

/// Generation prompt. Fields: `text`, `number`, `subject`, `tone`, `response_json`.
pub const GENERATION_TEMPLATE: &str = r#"Text: {text}

You are an expert MCQ maker. Given the above text, it is your job to create a quiz of {number} multiple choice questions for {subject} students in {tone} tone.
Make sure the questions are not repeated and that every question can be answered from the text above alone.
Format your response as a single JSON object whose top-level keys are the strings "1" to "{number}", one per question.
Each question must have the following format:
{{
    "prompt": "Question text here",
    "options": {{
        "a": "First option",
        "b": "Second option",
        "c": "Third option",
        "d": "Fourth option"
    }},
    "correct": "correct option letter (a, b, c, or d)"
}}
Ensure to make exactly {number} MCQs.

### RESPONSE_JSON
{response_json}

Respond with the JSON object only."#;

/// Review prompt. Fields: `subject`, `tone`, `quiz`.
pub const REVIEW_TEMPLATE: &str = r#"You are an expert English grammarian and writer. Given a Multiple Choice Quiz for {subject} students, written to be {tone}:
evaluate the complexity of the questions and give a complete analysis of the quiz. Use at most 50 words for the complexity analysis.
If the quiz is not at par with the cognitive and analytical abilities of the students, update the quiz questions which need to be changed and change the tone such that it perfectly fits the students' abilities, restating the updated questions.

Quiz_MCQs:
{quiz}

Write your review as a single plain-text block for a human reader."#;

/// A parsed prompt template.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    source: &'static str,
}

/// Template piece produced by the scanner.
enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Field(&'a str),
}

impl PromptTemplate {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    /// Names of all placeholders, in order of first appearance.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for segment in segments(self.source) {
            if let Segment::Field(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute every placeholder.
    ///
    /// # Errors
    /// [`QuizGenError::TemplateError`] naming the first placeholder that has
    /// no entry in `vars`.
    pub fn render(&self, vars: &HashMap<&str, String>) -> Result<String, QuizGenError> {
        let mut out = String::with_capacity(self.source.len() + 256);
        for segment in segments(self.source) {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Brace(c) => out.push(c),
                Segment::Field(name) => {
                    let value = vars.get(name).ok_or_else(|| QuizGenError::TemplateError {
                        field: name.to_string(),
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Split a template into literals, escaped braces and `{field}` references.
///
/// A `{` that does not start a well-formed `{identifier}` is kept literally.
fn segments(source: &str) -> Vec<Segment<'_>> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                out.push(Segment::Literal(&source[start..i]));
                out.push(Segment::Brace(bytes[i] as char));
                i += 2;
                start = i;
            }
            b'{' => {
                let rest = &source[i + 1..];
                let len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                if len > 0 && rest.as_bytes().get(len) == Some(&b'}') {
                    out.push(Segment::Literal(&source[start..i]));
                    out.push(Segment::Field(&rest[..len]));
                    i += len + 2;
                    start = i;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    out.push(Segment::Literal(&source[start..]));
    out
}

/// Render the generation prompt for a request.
pub fn render_generation_prompt(
    request: &GenerationRequest,
    exemplar: &SchemaExemplar,
) -> Result<String, QuizGenError> {
    let vars = HashMap::from([
        ("text", request.source_text().to_string()),
        ("number", request.question_count().to_string()),
        ("subject", request.subject().to_string()),
        ("tone", request.tone().to_string()),
        ("response_json", exemplar.as_prompt_text().to_string()),
    ]);
    PromptTemplate::new(GENERATION_TEMPLATE).render(&vars)
}

/// Render the review prompt for a validated quiz.
pub fn render_review_prompt(quiz: &Quiz, request: &GenerationRequest) -> Result<String, QuizGenError> {
    let vars = HashMap::from([
        ("subject", request.subject().to_string()),
        ("tone", request.tone().to_string()),
        ("quiz", quiz.to_json_pretty()?),
    ]);
    PromptTemplate::new(REVIEW_TEMPLATE).render(&vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QuizQuestion;

    fn science_request() -> GenerationRequest {
        GenerationRequest::new("The sky is blue.", 3, "Science", "simple").unwrap()
    }

    #[test]
    fn generation_prompt_contains_parameters() {
        let prompt = render_generation_prompt(&science_request(), &SchemaExemplar::builtin()).unwrap();
        assert!(prompt.contains("3 multiple choice questions"));
        assert!(prompt.contains("Science students"));
        assert!(prompt.contains("simple tone"));
        assert!(prompt.contains("The sky is blue."));
        assert!(prompt.contains("\"1\" to \"3\""));
        assert!(prompt.contains("exactly 3 MCQs"));
    }

    #[test]
    fn generation_prompt_unescapes_braces() {
        let prompt = render_generation_prompt(&science_request(), &SchemaExemplar::builtin()).unwrap();
        assert!(prompt.contains("{\n    \"prompt\": \"Question text here\""));
        assert!(!prompt.contains("{{"));
        assert!(!prompt.contains("{response_json}"));
    }

    #[test]
    fn generation_prompt_includes_exemplar() {
        let exemplar = SchemaExemplar::builtin();
        let prompt = render_generation_prompt(&science_request(), &exemplar).unwrap();
        assert!(prompt.contains(exemplar.as_prompt_text()));
    }

    #[test]
    fn missing_field_is_template_error() {
        let vars = HashMap::from([("subject", "Maths".to_string())]);
        let err = PromptTemplate::new(REVIEW_TEMPLATE).render(&vars).unwrap_err();
        match err {
            QuizGenError::TemplateError { field } => assert_eq!(field, "tone"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn template_fields_listed_once() {
        assert_eq!(
            PromptTemplate::new(GENERATION_TEMPLATE).fields(),
            vec!["text", "number", "subject", "tone", "response_json"]
        );
        assert_eq!(
            PromptTemplate::new(REVIEW_TEMPLATE).fields(),
            vec!["subject", "tone", "quiz"]
        );
    }

    #[test]
    fn stray_brace_is_literal() {
        let t = PromptTemplate::new("set {a, b} and {x}");
        let vars = HashMap::from([("x", "1".to_string())]);
        assert_eq!(t.render(&vars).unwrap(), "set {a, b} and 1");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let t = PromptTemplate::new("Text: {text}");
        let vars = HashMap::from([("text", "{number}".to_string())]);
        assert_eq!(t.render(&vars).unwrap(), "Text: {number}");
    }

    #[test]
    fn review_prompt_embeds_quiz_json() {
        let quiz = Quiz::new(vec![QuizQuestion {
            prompt: "Why is the sky blue?".into(),
            options: [("a", "Rayleigh scattering"), ("b", "Oceans")].into_iter().collect(),
            correct: "a".into(),
        }]);
        let prompt = render_review_prompt(&quiz, &science_request()).unwrap();
        assert!(prompt.contains("Science students"));
        assert!(prompt.contains("\"Why is the sky blue?\""));
        assert!(prompt.contains("at most 50 words"));
    }
}
