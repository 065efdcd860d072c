//! Generation request planner
//!
//! One data-driven registry maps each category to its prompt template,
//! output schema, and sampling parameters. Tier-dependent details (topic
//! focus, sentence length, token budget) come from per-tier tables on the
//! strategy, so adding a category is a new registry entry, not a new type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

use super::types::{Category, ItemKind, ITEMS_PER_SET, MULTIPLE_CHOICE_OPTIONS};
use crate::proficiency::ProficiencyTier;

/// Key the generator is told to wrap items in
pub const ROOT_KEY: &str = "questions";

const SYSTEM_PROMPT: &str = "You are an Estonian language teacher who writes practice exercises. \
Reply with a single JSON object and nothing else: no markdown, no commentary.";

/// Sampling knobs passed through to the generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

/// Expected shape of the generator's JSON reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Object key holding the item array
    pub root_key: String,
    pub item_kind: ItemKind,
    pub item_count: usize,
    /// Fields every item must carry
    pub required_fields: Vec<String>,
    /// Fields that are defaulted when absent
    pub optional_fields: Vec<String>,
    /// Exact options per item, where the shape has options
    pub options_per_item: Option<usize>,
}

impl OutputSchema {
    pub fn for_kind(item_kind: ItemKind) -> Self {
        let (required, optional, options): (&[&str], &[&str], Option<usize>) = match item_kind {
            ItemKind::MultipleChoice => (
                &["question", "options", "correctAnswer"],
                &["explanation"],
                Some(MULTIPLE_CHOICE_OPTIONS),
            ),
            ItemKind::Completion => (&["question", "correctAnswer"], &["hint", "explanation"], None),
            ItemKind::WordReordering => (
                &["question", "words", "correctAnswer"],
                &["alternativeAnswers", "explanation"],
                None,
            ),
            ItemKind::ErrorDetection => (
                &["question", "options", "correctAnswer"],
                &["explanation"],
                None,
            ),
        };

        Self {
            root_key: ROOT_KEY.to_string(),
            item_kind,
            item_count: ITEMS_PER_SET,
            required_fields: required.iter().map(|s| s.to_string()).collect(),
            optional_fields: optional.iter().map(|s| s.to_string()).collect(),
            options_per_item: options,
        }
    }

    /// Example item rendered into the prompt
    pub fn example_item(&self) -> &'static str {
        match self.item_kind {
            ItemKind::MultipleChoice => {
                r#"{"question": "...", "options": ["...", "...", "...", "..."], "correctAnswer": "...", "explanation": "..."}"#
            }
            ItemKind::Completion => {
                r#"{"question": "... ___ ...", "correctAnswer": "...", "hint": "...", "explanation": "..."}"#
            }
            ItemKind::WordReordering => {
                r#"{"question": "...", "words": ["...", "..."], "correctAnswer": "...", "alternativeAnswers": ["..."], "explanation": "..."}"#
            }
            ItemKind::ErrorDetection => {
                r#"{"question": "Find the error: '...'", "options": ["...", "..."], "correctAnswer": "...", "explanation": "..."}"#
            }
        }
    }

    /// Output-format section of the prompt
    pub fn describe(&self) -> String {
        format!(
            "Return exactly {} items as JSON: {{\"{}\": [{}, ...]}}.\nRequired fields per item: {}.",
            self.item_count,
            self.root_key,
            self.example_item(),
            self.required_fields.join(", ")
        )
    }
}

/// A fully planned call to the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub tier: ProficiencyTier,
    pub category: Category,
    pub system_prompt: String,
    pub instructions: String,
    pub output_schema: OutputSchema,
    pub sampling: SamplingParams,
}

/// Per-category generation strategy
#[derive(Debug, Clone)]
pub struct Strategy {
    pub category: Category,
    /// Template with `{count}`, `{tier}`, `{level}`, `{focus}`, `{length}` slots
    template: &'static str,
    /// Topic or grammar focus per tier, A1..C2
    focus: [&'static str; 6],
    /// Sentence length range per tier, A1..C2
    length: [(u8, u8); 6],
    base_temperature: f32,
    base_max_tokens: u32,
}

const LEVEL_DESCRIPTIONS: [&str; 6] = [
    "absolute beginner; only the most common everyday words and present tense",
    "elementary; familiar topics, simple past tense, common cases",
    "intermediate; everyday situations, all basic cases, simple subordinate clauses",
    "upper intermediate; abstract topics, conditional mood, richer case use",
    "advanced; idiomatic usage, nuanced cases, complex clauses",
    "proficient; near-native register, rare forms, quotative and jussive moods",
];

/// Sampling stays near-deterministic at or below this tier
const LOW_TIER_CEILING: ProficiencyTier = ProficiencyTier::A2;
const LOW_TIER_TEMPERATURE: f32 = 0.1;
const TOKENS_PER_TIER: u32 = 200;

impl Strategy {
    fn render(&self, tier: ProficiencyTier, count: usize) -> String {
        let rank = tier.rank();
        let (min_len, max_len) = self.length[rank];
        self.template
            .replace("{count}", &count.to_string())
            .replace("{tier}", tier.as_str())
            .replace("{level}", LEVEL_DESCRIPTIONS[rank])
            .replace("{focus}", self.focus[rank])
            .replace("{length}", &format!("{}-{}", min_len, max_len))
    }

    fn sampling(&self, tier: ProficiencyTier) -> SamplingParams {
        let temperature = if tier <= LOW_TIER_CEILING {
            self.base_temperature.min(LOW_TIER_TEMPERATURE)
        } else {
            self.base_temperature
        };
        SamplingParams {
            temperature,
            top_p: if temperature <= LOW_TIER_TEMPERATURE { 0.5 } else { 0.9 },
            max_tokens: self.base_max_tokens + TOKENS_PER_TIER * tier.rank() as u32,
        }
    }

    /// Sentence length range for a tier
    pub fn length_range(&self, tier: ProficiencyTier) -> (u8, u8) {
        self.length[tier.rank()]
    }
}

static REGISTRY: LazyLock<HashMap<Category, Strategy>> = LazyLock::new(|| {
    let strategies = [
        Strategy {
            category: Category::Vocabulary,
            template: "Write {count} Estonian vocabulary multiple-choice questions for a {tier} learner ({level}). \
Topic focus: {focus}. Each question asks for the meaning of one Estonian word or the Estonian word for a meaning, \
with four distinct options and exactly one correct. Vary the words; do not repeat a word across questions.",
            focus: [
                "family, food, colours, numbers",
                "home, shopping, weather, time",
                "work, travel, health, hobbies",
                "society, media, environment",
                "abstract concepts, idioms, formal register",
                "literary vocabulary, rare synonyms, fixed expressions",
            ],
            length: [(3, 5), (4, 6), (5, 8), (6, 10), (8, 12), (8, 14)],
            base_temperature: 0.7,
            base_max_tokens: 1200,
        },
        Strategy {
            category: Category::Grammar,
            template: "Write {count} Estonian grammar multiple-choice questions for a {tier} learner ({level}). \
Grammar focus: {focus}. Each question shows a sentence of {length} words with a gap and four candidate forms; \
exactly one form is grammatical.",
            focus: [
                "nominative vs genitive, personal pronouns",
                "partitive singular, inessive and elative",
                "illative, adessive, allative, total vs partial object",
                "plural partitive, translative, essive",
                "terminative, abessive, comitative, case government of verbs",
                "rare plural stems, nuanced object case, fixed case collocations",
            ],
            length: [(3, 5), (4, 6), (5, 7), (6, 9), (7, 11), (8, 12)],
            base_temperature: 0.1,
            base_max_tokens: 1200,
        },
        Strategy {
            category: Category::Conjugation,
            template: "Write {count} Estonian verb conjugation fill-in questions for a {tier} learner ({level}). \
Focus: {focus}. Each question is a sentence of {length} words with one gap marked ___ and the infinitive in \
parentheses; the answer is the single correctly conjugated form.",
            focus: [
                "present tense of olema, minema, tulema, elama",
                "present and simple past of common verbs",
                "perfect tense, negation, ma- and da-infinitives",
                "conditional mood, pluperfect",
                "impersonal voice, imperative plural",
                "quotative and jussive moods, impersonal past participles",
            ],
            length: [(3, 5), (4, 6), (5, 7), (6, 9), (7, 11), (8, 12)],
            base_temperature: 0.3,
            base_max_tokens: 1000,
        },
        Strategy {
            category: Category::WordReordering,
            template: "Write {count} Estonian word-order exercises for a {tier} learner ({level}). \
Each exercise is one sentence of {length} words about {focus}. Give the words shuffled in \"words\", the \
sentence in \"correctAnswer\", and every other grammatical order in \"alternativeAnswers\". The words list must \
contain exactly the words of the correct sentence, no more and no fewer.",
            focus: [
                "daily routine",
                "family and home",
                "travel and plans",
                "opinions and work",
                "society and culture",
                "abstract argument",
            ],
            length: [(3, 4), (4, 5), (4, 6), (5, 7), (6, 7), (6, 8)],
            base_temperature: 0.5,
            base_max_tokens: 1200,
        },
        Strategy {
            category: Category::ErrorDetection,
            template: "Write {count} Estonian error-detection questions for a {tier} learner ({level}). \
Each question quotes one sentence of {length} words in single quotes that contains exactly one error \
({focus}). List the sentence's words as options and give the faulty word as correctAnswer, with a short \
explanation of the correct form.",
            focus: [
                "wrong personal ending on the verb",
                "verb ending or basic case ending",
                "object case or local case",
                "case agreement between adjective and noun",
                "verb government or mood",
                "subtle case or mood choice",
            ],
            length: [(3, 5), (4, 6), (5, 7), (6, 8), (7, 10), (8, 12)],
            base_temperature: 0.1,
            base_max_tokens: 1200,
        },
    ];

    strategies.into_iter().map(|s| (s.category, s)).collect()
});

/// Builds generation requests from the strategy registry
#[derive(Debug, Clone)]
pub struct GenerationRequestPlanner {
    max_tokens_cap: Option<u32>,
    item_count: usize,
}

impl Default for GenerationRequestPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationRequestPlanner {
    pub fn new() -> Self {
        Self {
            max_tokens_cap: None,
            item_count: ITEMS_PER_SET,
        }
    }

    /// Items to ask for per set
    pub fn with_item_count(mut self, count: usize) -> Self {
        self.item_count = count.max(1);
        self
    }

    /// Cap the planned token budget (from config)
    pub fn with_max_tokens_cap(mut self, cap: u32) -> Self {
        self.max_tokens_cap = Some(cap);
        self
    }

    /// Strategy for a category
    pub fn strategy(&self, category: Category) -> &'static Strategy {
        REGISTRY
            .get(&category)
            .or_else(|| REGISTRY.get(&Category::Vocabulary))
            .unwrap_or_else(|| unreachable!("vocabulary strategy is always registered"))
    }

    /// Plan a request for a tier and category
    pub fn plan(&self, tier: ProficiencyTier, category: Category) -> GenerationRequest {
        let strategy = self.strategy(category);
        let mut schema = OutputSchema::for_kind(category.item_kind());
        schema.item_count = self.item_count;

        let mut sampling = strategy.sampling(tier);
        if let Some(cap) = self.max_tokens_cap {
            sampling.max_tokens = sampling.max_tokens.min(cap);
        }

        let instructions = format!("{}\n\n{}", strategy.render(tier, self.item_count), schema.describe());

        GenerationRequest {
            tier,
            category,
            system_prompt: SYSTEM_PROMPT.to_string(),
            instructions,
            output_schema: schema,
            sampling,
        }
    }

    /// Plan from a free-form category label; unknown labels get vocabulary
    pub fn plan_label(&self, tier: ProficiencyTier, label: &str) -> GenerationRequest {
        let category = Category::parse(label).unwrap_or(Category::Vocabulary);
        self.plan(tier, category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::types::ALL_CATEGORIES;
    use crate::proficiency::ALL_TIERS;

    #[test]
    fn test_every_category_registered() {
        for category in ALL_CATEGORIES {
            assert_eq!(REGISTRY[&category].category, category);
        }
    }

    #[test]
    fn test_plan_carries_schema_and_tier() {
        let planner = GenerationRequestPlanner::new();
        let req = planner.plan(ProficiencyTier::B1, Category::ErrorDetection);
        assert_eq!(req.tier, ProficiencyTier::B1);
        assert_eq!(req.output_schema.item_kind, ItemKind::ErrorDetection);
        assert_eq!(req.output_schema.item_count, 5);
        assert!(req.instructions.contains("B1"));
        assert!(req.instructions.contains("\"questions\""));
    }

    #[test]
    fn test_reorder_length_grows_with_tier() {
        let planner = GenerationRequestPlanner::new();
        let strategy = planner.strategy(Category::WordReordering);
        assert_eq!(strategy.length_range(ProficiencyTier::A1), (3, 4));
        assert_eq!(strategy.length_range(ProficiencyTier::C2), (6, 8));

        let low = planner.plan(ProficiencyTier::A1, Category::WordReordering);
        assert!(low.instructions.contains("3-4 words"));
        let high = planner.plan(ProficiencyTier::C2, Category::WordReordering);
        assert!(high.instructions.contains("6-8 words"));
    }

    #[test]
    fn test_sampling_near_zero_for_low_tiers_and_strict_categories() {
        let planner = GenerationRequestPlanner::new();
        for tier in ALL_TIERS {
            for category in [Category::Grammar, Category::ErrorDetection] {
                assert!(planner.plan(tier, category).sampling.temperature <= 0.1);
            }
        }
        assert!(planner.plan(ProficiencyTier::A1, Category::Vocabulary).sampling.temperature <= 0.1);
        assert!(planner.plan(ProficiencyTier::B2, Category::Vocabulary).sampling.temperature >= 0.5);
    }

    #[test]
    fn test_token_budget_grows_and_respects_cap() {
        let planner = GenerationRequestPlanner::new();
        let low = planner.plan(ProficiencyTier::A1, Category::Grammar).sampling.max_tokens;
        let high = planner.plan(ProficiencyTier::C2, Category::Grammar).sampling.max_tokens;
        assert!(high > low);

        let capped = GenerationRequestPlanner::new().with_max_tokens_cap(900);
        assert_eq!(capped.plan(ProficiencyTier::C2, Category::Grammar).sampling.max_tokens, 900);
    }

    #[test]
    fn test_item_count_override() {
        let planner = GenerationRequestPlanner::new().with_item_count(3);
        let req = planner.plan(ProficiencyTier::A1, Category::Conjugation);
        assert_eq!(req.output_schema.item_count, 3);
        assert!(req.instructions.starts_with("Write 3 "));
        assert!(req.instructions.contains("Return exactly 3 items"));
    }

    #[test]
    fn test_unknown_label_falls_back_to_vocabulary() {
        let planner = GenerationRequestPlanner::new();
        let req = planner.plan_label(ProficiencyTier::A2, "astrology");
        assert_eq!(req.category, Category::Vocabulary);
        assert_eq!(req.output_schema.item_kind, ItemKind::MultipleChoice);
    }
}
