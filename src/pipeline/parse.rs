//! Quiz parsing: model response text → validated [`Quiz`].
//!
//! Hosted models do not always return bare JSON. Decoding therefore has two
//! steps:
//!
//! 1. decode the whole response as JSON;
//! 2. if that fails, take the first `{` through the last `}` (a greedy
//!    match, so nested objects survive) and decode that span.
//!
//! If neither yields JSON the raw response is returned inside
//! [`QuizGenError::MalformedQuiz`] for diagnosis.
//!
//! Validation then checks the shape question by question. It detects
//! problems and names the offending key and field; it never repairs data.

use crate::error::QuizGenError;
use crate::quiz::{AnswerOptions, Quiz, QuizQuestion};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use tracing::{debug, warn};

static RE_JSON_OBJECT: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(r"\{[\s\S]*\}").unwrap());

/// Decode and validate a generation response.
///
/// # Arguments
/// * `response`: raw completion text
/// * `expected`: requested number of questions
pub fn parse_quiz(response: &str, expected: usize) -> Result<Quiz, QuizGenError> {
    let value = decode_response(response)?;
    let questions = question_map(value, response)?;
    validate_questions(&questions, expected)
}

/// Decode the response as JSON, falling back to brace extraction.
pub fn decode_response(response: &str) -> Result<Value, QuizGenError> {
    let direct_err = match serde_json::from_str::<Value>(response.trim()) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let malformed = || QuizGenError::MalformedQuiz {
        raw: response.to_string(),
    };

    let candidate = RE_JSON_OBJECT.find(response).ok_or_else(malformed)?;
    warn!(
        "Response is not bare JSON ({}); retrying with the extracted {{…}} span ({} of {} chars)",
        direct_err,
        candidate.as_str().len(),
        response.len()
    );

    serde_json::from_str(candidate.as_str()).map_err(|e| {
        debug!("Extracted span is not JSON either: {}", e);
        malformed()
    })
}

/// Return the object holding the numbered questions.
///
/// Accepts the bare `{"1": …}` shape and a `{"questions": {"1": …}}` wrapper.
fn question_map(value: Value, raw: &str) -> Result<Map<String, Value>, QuizGenError> {
    let malformed = || QuizGenError::MalformedQuiz {
        raw: raw.to_string(),
    };

    let mut root = match value {
        Value::Object(map) => map,
        _ => return Err(malformed()),
    };

    if root.len() == 1 && root.contains_key("questions") {
        return match root.remove("questions") {
            Some(Value::Object(inner)) => Ok(inner),
            _ => Err(malformed()),
        };
    }
    Ok(root)
}

/// Check keys `"1"..="expected"` and build the quiz in sequence order.
fn validate_questions(map: &Map<String, Value>, expected: usize) -> Result<Quiz, QuizGenError> {
    let mut questions = Vec::with_capacity(expected);

    for number in 1..=expected {
        let key = number.to_string();
        let entry = map.get(&key).ok_or_else(|| {
            QuizGenError::violation(
                &key,
                None,
                format!("question is missing (expected {} questions, got {})", expected, map.len()),
            )
        })?;
        questions.push(validate_question(&key, entry)?);
    }

    let is_expected = |k: &str| {
        k.parse::<usize>()
            .is_ok_and(|n| (1..=expected).contains(&n) && n.to_string() == k)
    };
    if let Some(extra) = map.keys().find(|k| !is_expected(k.as_str())) {
        return Err(QuizGenError::violation(
            extra.as_str(),
            None,
            format!("unexpected entry (expected exactly {} questions)", expected),
        ));
    }

    debug!("Validated {} questions", questions.len());
    Ok(Quiz::new(questions))
}

fn validate_question(key: &str, entry: &Value) -> Result<QuizQuestion, QuizGenError> {
    let obj = entry
        .as_object()
        .ok_or_else(|| QuizGenError::violation(key, None, "question is not a JSON object"))?;

    let prompt = obj
        .get("prompt")
        .or_else(|| obj.get("mcq"))
        .ok_or_else(|| QuizGenError::violation(key, Some("prompt"), "missing required field"))?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            QuizGenError::violation(key, Some("prompt"), "must be a non-empty string")
        })?;

    let options_value = obj
        .get("options")
        .ok_or_else(|| QuizGenError::violation(key, Some("options"), "missing required field"))?;
    let options: AnswerOptions = serde_json::from_value(options_value.clone())
        .map_err(|e| QuizGenError::violation(key, Some("options"), e.to_string()))?;
    if options.is_empty() {
        return Err(QuizGenError::violation(key, Some("options"), "no options given"));
    }

    let correct = obj
        .get("correct")
        .ok_or_else(|| QuizGenError::violation(key, Some("correct"), "missing required field"))?
        .as_str()
        .ok_or_else(|| QuizGenError::violation(key, Some("correct"), "must be a string"))?;
    let correct = options.resolve_key(correct).ok_or_else(|| {
        QuizGenError::violation(
            key,
            Some("correct"),
            format!("'{}' is not one of the option keys", correct),
        )
    })?;

    Ok(QuizQuestion {
        prompt: prompt.to_string(),
        correct: correct.to_string(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_QUESTIONS: &str = r#"{
        "1": {"mcq": "What colour is the sky?", "options": {"a": "Blue", "b": "Green", "c": "Red", "d": "Black"}, "correct": "a"},
        "2": {"mcq": "What scatters sunlight?", "options": {"a": "Rocks", "b": "Air molecules", "c": "Glass", "d": "Water"}, "correct": "b"},
        "3": {"mcq": "When is the sky red?", "options": {"a": "Noon", "b": "Midnight", "c": "Sunset", "d": "Never"}, "correct": "c"}
    }"#;

    #[test]
    fn parses_bare_json() {
        let quiz = parse_quiz(THREE_QUESTIONS, 3).expect("valid quiz");
        assert_eq!(quiz.len(), 3);
        assert_eq!(quiz.get(2).unwrap().correct, "b");
        assert_eq!(quiz.get(3).unwrap().prompt, "When is the sky red?");
    }

    #[test]
    fn recovers_json_wrapped_in_prose() {
        let wrapped = format!("Here is the quiz: {} Thanks", THREE_QUESTIONS);
        let recovered = parse_quiz(&wrapped, 3).expect("brace extraction");
        assert_eq!(recovered, parse_quiz(THREE_QUESTIONS, 3).unwrap());
    }

    #[test]
    fn recovers_json_in_code_fence() {
        let fenced = format!("```json\n{}\n```", THREE_QUESTIONS);
        assert_eq!(parse_quiz(&fenced, 3).unwrap().len(), 3);
    }

    #[test]
    fn no_json_is_malformed_with_raw_text() {
        let err = parse_quiz("Sorry, I cannot help with that.", 3).unwrap_err();
        match err {
            QuizGenError::MalformedQuiz { raw } => assert_eq!(raw, "Sorry, I cannot help with that."),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn broken_braces_are_malformed() {
        let err = parse_quiz("Quiz: {\"1\": {\"mcq\": } oops }", 1).unwrap_err();
        assert!(matches!(err, QuizGenError::MalformedQuiz { .. }));
    }

    #[test]
    fn top_level_array_is_malformed() {
        let err = parse_quiz("[1, 2, 3]", 3).unwrap_err();
        assert!(matches!(err, QuizGenError::MalformedQuiz { .. }));
    }

    #[test]
    fn missing_correct_names_key_and_field() {
        let response = THREE_QUESTIONS.replace(r#", "correct": "c""#, "");
        match parse_quiz(&response, 3).unwrap_err() {
            QuizGenError::SchemaViolation { key, field, .. } => {
                assert_eq!(key, "3");
                assert_eq!(field.as_deref(), Some("correct"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_question_names_key() {
        match parse_quiz(THREE_QUESTIONS, 4).unwrap_err() {
            QuizGenError::SchemaViolation { key, field, .. } => {
                assert_eq!(key, "4");
                assert_eq!(field, None);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extra_question_is_reported() {
        match parse_quiz(THREE_QUESTIONS, 2).unwrap_err() {
            QuizGenError::SchemaViolation { key, .. } => assert_eq!(key, "3"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn correct_must_name_an_option() {
        let response = THREE_QUESTIONS.replace(r#""correct": "b""#, r#""correct": "e""#);
        match parse_quiz(&response, 3).unwrap_err() {
            QuizGenError::SchemaViolation { key, field, .. } => {
                assert_eq!(key, "2");
                assert_eq!(field.as_deref(), Some("correct"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn upper_case_correct_resolves_to_option_key() {
        let response = THREE_QUESTIONS.replace(r#""correct": "a""#, r#""correct": "A""#);
        let quiz = parse_quiz(&response, 3).unwrap();
        assert_eq!(quiz.get(1).unwrap().correct, "a");
    }

    #[test]
    fn non_string_option_is_violation() {
        let response = r#"{"1": {"prompt": "2+2?", "options": {"a": 4, "b": 5}, "correct": "a"}}"#;
        match parse_quiz(response, 1).unwrap_err() {
            QuizGenError::SchemaViolation { field, .. } => assert_eq!(field.as_deref(), Some("options")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn questions_wrapper_is_unwrapped() {
        let wrapped = format!(r#"{{"questions": {}}}"#, THREE_QUESTIONS);
        assert_eq!(parse_quiz(&wrapped, 3).unwrap().len(), 3);
    }

    #[test]
    fn questions_wrapper_around_non_object_is_malformed() {
        let response = r#"{"questions": [1, 2, 3]}"#;
        match parse_quiz(response, 3) {
            Err(QuizGenError::MalformedQuiz { raw }) => assert_eq!(raw, response),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_prompt_is_violation() {
        let response = r#"{"1": {"mcq": "  \n ", "options": {"a": "Yes", "b": "No"}, "correct": "a"}}"#;
        match parse_quiz(response, 1) {
            Err(QuizGenError::SchemaViolation { key, field, .. }) => {
                assert_eq!(key, "1");
                assert_eq!(field.as_deref(), Some("prompt"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn option_order_is_preserved() {
        let response = r#"{"1": {"prompt": "Pick", "options": {"d": "4", "b": "2", "a": "1"}, "correct": "b"}}"#;
        let quiz = parse_quiz(response, 1).unwrap();
        let keys: Vec<&str> = quiz.get(1).unwrap().options.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["d", "b", "a"]);
    }

    #[test]
    fn serialised_quiz_parses_back_equal() {
        let quiz = parse_quiz(THREE_QUESTIONS, 3).unwrap();
        let json = serde_json::to_string(&quiz).unwrap();
        assert_eq!(parse_quiz(&json, 3).unwrap(), quiz);
    }

    #[test]
    fn padded_prompt_is_kept_verbatim() {
        let quiz = Quiz::new(vec![QuizQuestion {
            prompt: "  What colour is the sky?\n".to_string(),
            options: [("a", "Blue"), ("b", "Green")].into_iter().collect(),
            correct: "a".to_string(),
        }]);
        let json = serde_json::to_string(&quiz).unwrap();
        let parsed = parse_quiz(&json, 1).unwrap();
        assert_eq!(parsed.get(1).unwrap().prompt, "  What colour is the sky?\n");
        assert_eq!(parsed, quiz);
    }
}
