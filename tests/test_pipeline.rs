//! Integration tests for the exercise pipeline:
//! - Generator failure always ends in a usable set
//! - Truncated and fenced generator replies are salvaged
//! - Word-bag and error-span rules hold on everything served

use async_trait::async_trait;
use estonian_tutor::exercises::{fallback_set, ExerciseItem, ALL_CATEGORIES, ITEMS_PER_SET};
use estonian_tutor::proficiency::ALL_TIERS;
use estonian_tutor::{
    AnswerValidator, Category, GenerationRequest, Generator, GeneratorError, InMemoryLearnerStore,
    OfflineGenerator, ProficiencyTier, Provenance, TutorPipeline,
};
use std::sync::Arc;

/// Replies with a fixed blob every time
struct CannedGenerator(String);

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        Ok(self.0.clone())
    }
}

fn pipeline(generator: impl Generator + 'static) -> TutorPipeline {
    TutorPipeline::new(Arc::new(generator), Arc::new(InMemoryLearnerStore::new()))
}

const REORDER_REPLY: &str = r#"```json
{"questions": [
  {"question": "Pane sõnad järjekorda", "words": ["kooli", "Ma", "lähen"], "correctAnswer": "Ma lähen kooli.", "alternativeAnswers": ["Kooli lähen ma"]},
  {"question": "Pane sõnad järjekorda", "words": ["Tartus", "elab", "Ta"], "correctAnswer": "Ta elab Tartus."},
  {"question": "Pane sõnad järjekorda", "words": ["on", "ilus", "Ilm"], "correctAnswer": "Ilm on ilus."},
  {"question": "Pane sõnad järjekorda", "words": ["joon", "teed", "Ma"], "correctAnswer": "Ma joon teed."},
  {"question": "Pane sõnad järjekorda", "words": ["Me", "kinno", "läheme"], "correctAnswer": "Me läheme"#;

// =====================================================================
// FALLBACK GUARANTEE
// =====================================================================

#[tokio::test]
async fn test_a1_vocabulary_with_failing_generator() {
    let set = pipeline(OfflineGenerator)
        .request_exercises(ProficiencyTier::A1, Category::Vocabulary)
        .await;

    assert_eq!(set.len(), ITEMS_PER_SET);
    assert_eq!(set.provenance, Provenance::Fallback);
    assert!(set.degraded);
    assert_eq!(set.items, fallback_set(ProficiencyTier::A1, Category::Vocabulary).items);

    let validator = AnswerValidator::new();
    assert!(set.items.iter().all(|item| validator.is_valid(item, Category::Vocabulary)));
}

#[tokio::test]
async fn test_every_combination_served_offline() {
    let pipeline = pipeline(OfflineGenerator);
    let validator = AnswerValidator::new();

    for tier in ALL_TIERS {
        for category in ALL_CATEGORIES {
            let set = pipeline.request_exercises(tier, category).await;
            assert_eq!(set.tier, tier);
            assert_eq!(set.category, category);
            assert!(!set.is_empty());
            assert!(validator.analyze(&set).all_valid, "{} {}", tier, category);
        }
    }
}

#[tokio::test]
async fn test_empty_reply_falls_back() {
    let set = pipeline(CannedGenerator("   ".to_string()))
        .request_exercises(ProficiencyTier::B1, Category::Grammar)
        .await;
    assert_eq!(set.provenance, Provenance::Fallback);
}

// =====================================================================
// SALVAGE
// =====================================================================

#[tokio::test]
async fn test_fenced_truncated_reorder_reply() {
    let set = pipeline(CannedGenerator(REORDER_REPLY.to_string()))
        .request_exercises(ProficiencyTier::A1, Category::WordReordering)
        .await;

    assert_eq!(set.provenance, Provenance::Partial);
    assert_eq!(set.len(), 4);

    let ExerciseItem::WordReordering(first) = &set.items[0] else {
        panic!("expected word-reordering items");
    };
    assert_eq!(first.correct_sequence, "Ma lähen kooli.");
    assert_eq!(first.alternative_sequences, vec!["Kooli lähen ma".to_string()]);
}

#[tokio::test]
async fn test_mismatched_word_bag_is_dropped() {
    let reply = r#"{"questions": [
        {"question": "Järjesta", "words": ["Ma", "elan", "Tallinnas"], "correctAnswer": "Ma elan Tallinnas"},
        {"question": "Järjesta", "words": ["Ma", "elan"], "correctAnswer": "Ma elan Tartus"}
    ]}"#;

    let set = pipeline(CannedGenerator(reply.to_string()))
        .request_exercises(ProficiencyTier::A1, Category::WordReordering)
        .await;

    assert_eq!(set.len(), 1);
    assert_eq!(set.provenance, Provenance::Partial);
}

#[tokio::test]
async fn test_error_detection_spans_derived_from_quote() {
    let reply = r#"{"questions": [
        {"question": "Leia viga: 'Nad elab Tartus.'", "correctAnswer": "elab", "explanation": "Nad needs elavad"}
    ]}"#;

    let set = pipeline(CannedGenerator(reply.to_string()))
        .request_exercises(ProficiencyTier::A2, Category::ErrorDetection)
        .await;

    assert_eq!(set.len(), 1);
    let ExerciseItem::ErrorDetection(item) = &set.items[0] else {
        panic!("expected error-detection items");
    };
    assert_eq!(item.candidate_spans, vec!["Nad", "elab", "Tartus"]);
    assert_eq!(item.faulty_span, "elab");
}

// =====================================================================
// GRADING
// =====================================================================

#[tokio::test]
async fn test_grade_served_items() {
    let pipeline = pipeline(OfflineGenerator);
    let set = pipeline
        .request_exercises(ProficiencyTier::B2, Category::Conjugation)
        .await;

    for (index, item) in set.items.iter().enumerate() {
        let ExerciseItem::Completion(c) = item else {
            panic!("conjugation sets hold completion items");
        };
        let padded = format!("  {}  ", c.correct_text.to_uppercase());
        assert!(pipeline.grade_answer(&set, index, &padded).unwrap().correct);
        assert!(!pipeline.grade_answer(&set, index, "vale").unwrap().correct);
    }
}
