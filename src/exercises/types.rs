//! Exercise categories, items, and sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::proficiency::ProficiencyTier;

/// Items in a complete exercise set
pub const ITEMS_PER_SET: usize = 5;

/// Options in a multiple-choice item
pub const MULTIPLE_CHOICE_OPTIONS: usize = 4;

/// Exercise type requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Vocabulary,
    Grammar,
    Conjugation,
    WordReordering,
    ErrorDetection,
}

pub const ALL_CATEGORIES: [Category; 5] = [
    Category::Vocabulary,
    Category::Grammar,
    Category::Conjugation,
    Category::WordReordering,
    Category::ErrorDetection,
];

impl Category {
    /// Parse a category label; accepts kebab, snake and a few aliases
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "vocabulary" | "vocab" => Some(Category::Vocabulary),
            "grammar" => Some(Category::Grammar),
            "conjugation" | "verbs" => Some(Category::Conjugation),
            "word-reordering" | "sentence-reorder" | "reorder" => Some(Category::WordReordering),
            "error-detection" | "errors" => Some(Category::ErrorDetection),
            _ => None,
        }
    }

    /// Shape of the answers this category produces
    pub fn item_kind(self) -> ItemKind {
        match self {
            Category::Vocabulary | Category::Grammar => ItemKind::MultipleChoice,
            Category::Conjugation => ItemKind::Completion,
            Category::WordReordering => ItemKind::WordReordering,
            Category::ErrorDetection => ItemKind::ErrorDetection,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vocabulary => "vocabulary",
            Category::Grammar => "grammar",
            Category::Conjugation => "conjugation",
            Category::WordReordering => "word-reordering",
            Category::ErrorDetection => "error-detection",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown exercise category: {}", s))
    }
}

/// Answer shape of an exercise item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    MultipleChoice,
    Completion,
    WordReordering,
    ErrorDetection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleChoiceItem {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionItem {
    pub prompt: String,
    pub correct_text: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordReorderingItem {
    pub prompt: String,
    /// Shuffled tokens shown to the learner
    pub word_bag: Vec<String>,
    pub correct_sequence: String,
    /// Other orders that are also grammatical
    #[serde(default)]
    pub alternative_sequences: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetectionItem {
    pub prompt: String,
    pub candidate_spans: Vec<String>,
    pub faulty_span: String,
    #[serde(default)]
    pub explanation: String,
}

/// One exercise, in its category's answer shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExerciseItem {
    MultipleChoice(MultipleChoiceItem),
    Completion(CompletionItem),
    WordReordering(WordReorderingItem),
    ErrorDetection(ErrorDetectionItem),
}

impl ExerciseItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            ExerciseItem::MultipleChoice(_) => ItemKind::MultipleChoice,
            ExerciseItem::Completion(_) => ItemKind::Completion,
            ExerciseItem::WordReordering(_) => ItemKind::WordReordering,
            ExerciseItem::ErrorDetection(_) => ItemKind::ErrorDetection,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            ExerciseItem::MultipleChoice(i) => &i.prompt,
            ExerciseItem::Completion(i) => &i.prompt,
            ExerciseItem::WordReordering(i) => &i.prompt,
            ExerciseItem::ErrorDetection(i) => &i.prompt,
        }
    }
}

/// Where a set's content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Parsed directly, all items intact
    Generated,
    /// Needed truncation repair or item padding, still a full set
    Repaired,
    /// Fewer items than requested survived
    Partial,
    /// Static hand-authored content
    Fallback,
}

impl Provenance {
    /// Anything other than clean generated output
    pub fn is_degraded(self) -> bool {
        !matches!(self, Provenance::Generated)
    }
}

/// An ordered, category-homogeneous set of exercises for one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: String,
    pub tier: ProficiencyTier,
    pub category: Category,
    pub items: Vec<ExerciseItem>,
    pub provenance: Provenance,
    /// Mirrors `provenance.is_degraded()` for callers that only want a flag
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
}

impl ExerciseSet {
    pub fn new(
        tier: ProficiencyTier,
        category: Category,
        items: Vec<ExerciseItem>,
        provenance: Provenance,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tier,
            category,
            items,
            provenance,
            degraded: provenance.is_degraded(),
            created_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the items, downgrading provenance if some were lost
    pub fn retain_items(&mut self, items: Vec<ExerciseItem>) {
        if items.len() < self.items.len() && self.provenance != Provenance::Fallback {
            self.provenance = Provenance::Partial;
            self.degraded = true;
        }
        self.items = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_aliases() {
        assert_eq!(Category::parse("word_reordering"), Some(Category::WordReordering));
        assert_eq!(Category::parse("Error-Detection"), Some(Category::ErrorDetection));
        assert_eq!(Category::parse("vocab"), Some(Category::Vocabulary));
        assert_eq!(Category::parse("poetry"), None);
    }

    #[test]
    fn test_item_kind_mapping() {
        assert_eq!(Category::Grammar.item_kind(), ItemKind::MultipleChoice);
        assert_eq!(Category::Conjugation.item_kind(), ItemKind::Completion);
    }

    #[test]
    fn test_retain_items_marks_partial() {
        let item = ExerciseItem::Completion(CompletionItem {
            prompt: "Mina ___ (olema) õpetaja.".to_string(),
            correct_text: "olen".to_string(),
            hint: String::new(),
            explanation: String::new(),
        });
        let mut set = ExerciseSet::new(
            ProficiencyTier::A1,
            Category::Conjugation,
            vec![item.clone(), item.clone()],
            Provenance::Generated,
        );
        assert!(!set.degraded);

        set.retain_items(vec![item]);
        assert_eq!(set.provenance, Provenance::Partial);
        assert!(set.degraded);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_item_serializes_with_kind_tag() {
        let item = ExerciseItem::ErrorDetection(ErrorDetectionItem {
            prompt: "Leia viga: 'Ma lähevad kooli'".to_string(),
            candidate_spans: vec!["Ma".into(), "lähevad".into(), "kooli".into()],
            faulty_span: "lähevad".to_string(),
            explanation: String::new(),
        });
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["kind"], "error_detection");
        assert_eq!(value["faulty_span"], "lähevad");
    }
}
