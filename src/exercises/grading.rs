//! Answer grading
//!
//! Comparison ignores case and extra whitespace. Word-reordering answers also
//! ignore terminal punctuation so "Ma elan Tallinnas" matches
//! "Ma elan Tallinnas.".

use serde::{Deserialize, Serialize};

use super::text;
use super::types::ExerciseItem;

/// Outcome of checking one learner answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub correct: bool,
    /// The canonical answer, for display
    pub expected: String,
    pub explanation: String,
}

pub fn grade(item: &ExerciseItem, answer: &str) -> GradeResult {
    let given = text::normalize_answer(answer);

    let (correct, expected, explanation) = match item {
        ExerciseItem::MultipleChoice(mc) => (
            given == text::normalize_answer(&mc.correct_option),
            mc.correct_option.clone(),
            mc.explanation.clone(),
        ),
        ExerciseItem::Completion(c) => (
            given == text::normalize_answer(&c.correct_text),
            c.correct_text.clone(),
            c.explanation.clone(),
        ),
        ExerciseItem::WordReordering(wr) => {
            let given_tokens = text::tokens(answer);
            let correct = std::iter::once(&wr.correct_sequence)
                .chain(wr.alternative_sequences.iter())
                .any(|sequence| text::tokens(sequence) == given_tokens);
            (correct, wr.correct_sequence.clone(), wr.explanation.clone())
        }
        ExerciseItem::ErrorDetection(ed) => (
            given == text::normalize_answer(&ed.faulty_span),
            ed.faulty_span.clone(),
            ed.explanation.clone(),
        ),
    };

    GradeResult {
        correct,
        expected,
        explanation,
    }
}
