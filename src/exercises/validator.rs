//! Answer validator - per-category correctness checks
//!
//! Runs after sanitization. Invalid items are dropped one by one; only when
//! too few survive does the caller switch to static content. Pure: never
//! calls the generator.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::report::ValidationReport;
use super::text;
use super::types::{
    Category, CompletionItem, ErrorDetectionItem, ExerciseItem, ExerciseSet, MultipleChoiceItem,
    WordReorderingItem, MULTIPLE_CHOICE_OPTIONS,
};
use crate::proficiency::ProficiencyTier;

/// Smallest set worth showing a learner
pub const DEFAULT_MIN_USABLE_ITEMS: usize = 1;

/// Candidate spans an error-detection item needs
const MIN_CANDIDATE_SPANS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Item is unusable and gets dropped
    Error,
    /// Suspicious but kept
    Warning,
}

/// One problem found on an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn error(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    fn warning(field: &str, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

/// Too few valid items remained after filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsufficientItems {
    pub category: Category,
    pub tier: ProficiencyTier,
    pub remaining: usize,
    pub dropped: usize,
}

/// Category-specific item checks
#[derive(Debug, Clone)]
pub struct AnswerValidator {
    min_usable_items: usize,
}

impl Default for AnswerValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerValidator {
    pub fn new() -> Self {
        Self {
            min_usable_items: DEFAULT_MIN_USABLE_ITEMS,
        }
    }

    pub fn with_min_usable_items(mut self, min: usize) -> Self {
        self.min_usable_items = min.max(1);
        self
    }

    /// All issues on one item, in the context of the set's category
    pub fn check_item(&self, item: &ExerciseItem, category: Category) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if item.kind() != category.item_kind() {
            issues.push(ValidationIssue::error(
                "kind",
                format!("{:?} item in a {} set", item.kind(), category),
            ));
        }
        if item.prompt().trim().is_empty() {
            issues.push(ValidationIssue::error("prompt", "prompt is empty"));
        }

        match item {
            ExerciseItem::MultipleChoice(mc) => check_multiple_choice(mc, &mut issues),
            ExerciseItem::Completion(c) => check_completion(c, &mut issues),
            ExerciseItem::WordReordering(wr) => check_word_reordering(wr, &mut issues),
            ExerciseItem::ErrorDetection(ed) => check_error_detection(ed, &mut issues),
        }

        issues
    }

    /// Whether an item has no blocking issues
    pub fn is_valid(&self, item: &ExerciseItem, category: Category) -> bool {
        !self.check_item(item, category).iter().any(ValidationIssue::is_error)
    }

    /// Per-item summary of a set without modifying it
    pub fn analyze(&self, set: &ExerciseSet) -> ValidationReport {
        ValidationReport::for_set(self, set)
    }

    /// Drop invalid items. Fails when fewer than the usable minimum remain.
    pub fn filter_set(&self, mut set: ExerciseSet) -> Result<ExerciseSet, InsufficientItems> {
        let before = set.items.len();
        let category = set.category;

        let kept: Vec<ExerciseItem> = set
            .items
            .iter()
            .enumerate()
            .filter(|(index, item)| {
                let issues = self.check_item(item, category);
                let blocking: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
                if blocking.is_empty() {
                    true
                } else {
                    debug!("Dropping {} item {}: {:?}", category, index, blocking);
                    false
                }
            })
            .map(|(_, item)| item.clone())
            .collect();

        let dropped = before - kept.len();
        if kept.len() < self.min_usable_items {
            warn!(
                "Only {} valid {} items for {} ({} dropped)",
                kept.len(),
                category,
                set.tier,
                dropped
            );
            return Err(InsufficientItems {
                category,
                tier: set.tier,
                remaining: kept.len(),
                dropped,
            });
        }

        if dropped > 0 {
            warn!("Dropped {} invalid {} items", dropped, category);
        }
        set.retain_items(kept);
        Ok(set)
    }
}

fn check_multiple_choice(mc: &MultipleChoiceItem, issues: &mut Vec<ValidationIssue>) {
    if mc.options.len() != MULTIPLE_CHOICE_OPTIONS {
        issues.push(ValidationIssue::error(
            "options",
            format!("expected {} options, got {}", MULTIPLE_CHOICE_OPTIONS, mc.options.len()),
        ));
    }

    let mut seen = HashSet::new();
    for option in &mc.options {
        if option.trim().is_empty() {
            issues.push(ValidationIssue::error("options", "empty option"));
        } else if !seen.insert(text::normalize_answer(option)) {
            issues.push(ValidationIssue::error("options", format!("duplicate option '{}'", option)));
        }
    }

    if !mc.options.iter().any(|o| text::same_answer(o, &mc.correct_option)) {
        issues.push(ValidationIssue::error(
            "correct_option",
            format!("'{}' is not one of the options", mc.correct_option),
        ));
    }
}

fn check_completion(c: &CompletionItem, issues: &mut Vec<ValidationIssue>) {
    if c.correct_text.trim().is_empty() {
        issues.push(ValidationIssue::error("correct_text", "answer is empty"));
    }
}

fn check_word_reordering(wr: &WordReorderingItem, issues: &mut Vec<ValidationIssue>) {
    let bag = text::token_counts(&wr.word_bag);
    if bag.is_empty() {
        issues.push(ValidationIssue::error("word_bag", "word bag is empty"));
        return;
    }

    if text::token_counts([&wr.correct_sequence]) != bag {
        issues.push(ValidationIssue::error(
            "correct_sequence",
            format!("'{}' does not use exactly the words in the bag", wr.correct_sequence),
        ));
    }

    for (i, alternative) in wr.alternative_sequences.iter().enumerate() {
        if text::token_counts([alternative]) != bag {
            issues.push(ValidationIssue::error(
                "alternative_sequences",
                format!("alternative {} '{}' does not match the word bag", i, alternative),
            ));
        }
    }
}

fn check_error_detection(ed: &ErrorDetectionItem, issues: &mut Vec<ValidationIssue>) {
    if ed.candidate_spans.len() < MIN_CANDIDATE_SPANS {
        issues.push(ValidationIssue::error(
            "candidate_spans",
            format!("need at least {} candidate spans, got {}", MIN_CANDIDATE_SPANS, ed.candidate_spans.len()),
        ));
    }

    if !ed.candidate_spans.iter().any(|s| text::same_answer(s, &ed.faulty_span)) {
        issues.push(ValidationIssue::error(
            "faulty_span",
            format!("'{}' is not one of the candidate spans", ed.faulty_span),
        ));
    }

    if let Some(sentence) = text::extract_quoted_sentence(&ed.prompt) {
        let faulty = text::tokens(&ed.faulty_span);
        let sentence_tokens = text::tokens(&sentence);
        if !faulty.is_empty() && !faulty.iter().all(|t| sentence_tokens.contains(t)) {
            issues.push(ValidationIssue::warning(
                "faulty_span",
                format!("'{}' does not occur in the quoted sentence", ed.faulty_span),
            ));
        }
    }
}
