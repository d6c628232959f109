//! Result formatting: flatten a quiz into display rows.

use crate::output::QuizRow;
use crate::quiz::{Quiz, QuizQuestion};

/// One row per question, in sequence order.
pub fn table_rows(quiz: &Quiz) -> Vec<QuizRow> {
    quiz.iter().map(|(_, question)| to_row(question)).collect()
}

fn to_row(question: &QuizQuestion) -> QuizRow {
    let options = question
        .options
        .iter()
        .map(|(key, text)| format!("{}: {}", key, text))
        .collect::<Vec<_>>()
        .join("\n");

    QuizRow {
        question: question.prompt.clone(),
        options,
        correct_answer: question.correct.to_uppercase(),
    }
}

/// Render rows as numbered plain-text blocks for a terminal.
///
/// ```text
/// 1. What colour is the sky?
///      a: Blue
///      b: Green
///    Correct Answer: A
/// ```
pub fn render_text_table(rows: &[QuizRow]) -> String {
    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{}. {}\n", i + 1, row.question));
        for line in row.options.lines() {
            out.push_str(&format!("     {}\n", line));
        }
        out.push_str(&format!("   Correct Answer: {}\n", row.correct_answer));
    }
    out
}
