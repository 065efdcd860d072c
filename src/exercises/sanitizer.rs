//! Response sanitizer - raw generator text to a typed exercise set
//!
//! Stages, each feeding the next:
//! 1. strip code fences and leading prose
//! 2. direct parse; a clean five-item reply is returned as generated
//! 3. truncation repair and re-parse
//! 4. salvage every item that carries its core fields, padding the rest
//! 5. otherwise report a [`SanitizeFailure`] so the caller can fall back
//!
//! Nothing here panics or returns an error type on malformed input; every
//! outcome is a value.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::planner::{GenerationRequest, OutputSchema};
use super::repair::{self, RepairStep};
use super::text;
use super::types::{
    Category, CompletionItem, ErrorDetectionItem, ExerciseItem, ExerciseSet, ItemKind,
    MultipleChoiceItem, Provenance, WordReorderingItem, MULTIPLE_CHOICE_OPTIONS,
};
use crate::proficiency::ProficiencyTier;

/// Why nothing usable came out of the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Blank reply
    Empty,
    /// Not parseable even after repair
    MalformedOutput(String),
    /// Parsed, but no item had the required fields
    NoUsableItems,
    /// The generator call itself failed or timed out
    GeneratorUnavailable(String),
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Empty => write!(f, "empty output"),
            FailureReason::MalformedOutput(e) => write!(f, "malformed output: {}", e),
            FailureReason::NoUsableItems => write!(f, "no usable items"),
            FailureReason::GeneratorUnavailable(e) => write!(f, "generator unavailable: {}", e),
        }
    }
}

/// Sanitizer failure, carrying what the caller needs to pick fallback content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizeFailure {
    pub category: Category,
    pub tier: ProficiencyTier,
    pub reason: FailureReason,
}

impl SanitizeFailure {
    pub fn new(request: &GenerationRequest, reason: FailureReason) -> Self {
        Self {
            category: request.category,
            tier: request.tier,
            reason,
        }
    }
}

/// Generic distractors for multiple-choice vocabulary padding
const VOCABULARY_FILLERS: &[&str] = &["maja", "raamat", "aken", "laud", "päike", "vesi"];

/// Case endings used to build grammar distractors from the correct form
const CASE_ENDING_FILLERS: &[&str] = &["s", "st", "le", "l", "ga", "ks"];

/// Stateless parser and salvager for generator output
#[derive(Debug, Clone, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Turn raw generator text into an exercise set, or explain why not
    pub fn sanitize(
        &self,
        raw: &str,
        request: &GenerationRequest,
    ) -> Result<ExerciseSet, SanitizeFailure> {
        let schema = &request.output_schema;
        let payload = repair::slice_to_payload(repair::strip_code_fences(raw));
        if payload.trim().is_empty() {
            return Err(SanitizeFailure::new(request, FailureReason::Empty));
        }

        // Direct parse
        match parse_leading_value(payload) {
            Ok(value) => {
                let items = item_values(&value, schema);
                if items.len() == schema.item_count {
                    let strict: Vec<ExerciseItem> = items
                        .iter()
                        .filter_map(|v| strict_item(v, schema))
                        .collect();
                    if strict.len() == schema.item_count {
                        debug!("Generator output parsed cleanly ({} items)", strict.len());
                        return Ok(ExerciseSet::new(
                            request.tier,
                            request.category,
                            strict,
                            Provenance::Generated,
                        ));
                    }
                }
                self.salvage(&items, request)
            }
            Err(parse_err) => {
                debug!("Direct parse failed ({}), attempting repair", parse_err);
                let repaired = repair::repair(payload);
                match parse_leading_value(&repaired.text) {
                    Ok(value) => {
                        if repaired.steps.contains(&RepairStep::TruncatedToLastItem) {
                            debug!("Output was truncated; keeping items up to the last complete one");
                        }
                        let items = item_values(&value, schema);
                        self.salvage(&items, request)
                    }
                    Err(e) => {
                        warn!("Generator output unrecoverable after repair: {}", e);
                        Err(SanitizeFailure::new(
                            request,
                            FailureReason::MalformedOutput(e.to_string()),
                        ))
                    }
                }
            }
        }
    }

    /// Keep every item that can be read leniently, padding missing fields
    fn salvage(
        &self,
        items: &[Value],
        request: &GenerationRequest,
    ) -> Result<ExerciseSet, SanitizeFailure> {
        let schema = &request.output_schema;
        let mut salvaged: Vec<ExerciseItem> = items
            .iter()
            .filter_map(|v| lenient_item(v, schema, request.category))
            .collect();

        if salvaged.is_empty() {
            warn!(
                "No usable {} items for {} in generator output ({} candidates)",
                request.category,
                request.tier,
                items.len()
            );
            return Err(SanitizeFailure::new(request, FailureReason::NoUsableItems));
        }

        salvaged.truncate(schema.item_count);
        let provenance = if salvaged.len() == schema.item_count {
            Provenance::Repaired
        } else {
            Provenance::Partial
        };

        warn!(
            "Salvaged {} of {} {} items ({:?})",
            salvaged.len(),
            schema.item_count,
            request.category,
            provenance
        );
        Ok(ExerciseSet::new(request.tier, request.category, salvaged, provenance))
    }
}

/// First JSON value in the text; trailing prose after it is ignored
fn parse_leading_value(text: &str) -> Result<Value, serde_json::Error> {
    match serde_json::Deserializer::from_str(text).into_iter::<Value>().next() {
        Some(result) => result,
        None => serde_json::from_str(text),
    }
}

/// Locate the item array: `{root_key: [...]}`, any single array field, or a
/// bare top-level array
fn item_values(value: &Value, schema: &OutputSchema) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            if let Some(Value::Array(items)) = map.get(&schema.root_key) {
                return items.clone();
            }
            // A single item object without a wrapper
            if PROMPT_KEYS.iter().any(|k| map.contains_key(*k)) {
                return vec![value.clone()];
            }
            let arrays: Vec<&Vec<Value>> = map.values().filter_map(|v| v.as_array()).collect();
            match arrays.as_slice() {
                [only] => (*only).clone(),
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    obj.get(name).and_then(|v| v.as_str()).map(str::trim).filter(|s| !s.is_empty())
}

fn str_list(obj: &Map<String, Value>, name: &str) -> Option<Vec<String>> {
    let arr = obj.get(name)?.as_array()?;
    let list: Vec<String> = arr
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();
    Some(list)
}

fn first_str<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|n| str_field(obj, n))
}

fn first_list(obj: &Map<String, Value>, names: &[&str]) -> Option<Vec<String>> {
    names.iter().find_map(|n| str_list(obj, n)).filter(|l| !l.is_empty())
}

const PROMPT_KEYS: &[&str] = &["question", "prompt", "sentence", "text"];
const ANSWER_KEYS: &[&str] = &["correctAnswer", "correct_answer", "answer", "correct"];
const OPTION_KEYS: &[&str] = &["options", "choices", "candidates"];
const WORD_KEYS: &[&str] = &["words", "wordBag", "word_bag", "tokens"];
const ALTERNATIVE_KEYS: &[&str] = &["alternativeAnswers", "alternative_answers", "alternatives"];

/// Exact schema match: canonical field names, correct types, exact option
/// count. Anything less goes through salvage.
fn strict_item(value: &Value, schema: &OutputSchema) -> Option<ExerciseItem> {
    let obj = value.as_object()?;
    for field in &schema.required_fields {
        obj.get(field)?;
    }

    let prompt = str_field(obj, "question")?.to_string();
    let answer = str_field(obj, "correctAnswer")?.to_string();
    let explanation = str_field(obj, "explanation").unwrap_or_default().to_string();

    match schema.item_kind {
        ItemKind::MultipleChoice => {
            let options = str_list(obj, "options")?;
            if Some(options.len()) != schema.options_per_item {
                return None;
            }
            Some(ExerciseItem::MultipleChoice(MultipleChoiceItem {
                prompt,
                options,
                correct_option: answer,
                explanation,
            }))
        }
        ItemKind::Completion => Some(ExerciseItem::Completion(CompletionItem {
            prompt,
            correct_text: answer,
            hint: str_field(obj, "hint").unwrap_or_default().to_string(),
            explanation,
        })),
        ItemKind::WordReordering => Some(ExerciseItem::WordReordering(WordReorderingItem {
            prompt,
            word_bag: str_list(obj, "words")?,
            correct_sequence: answer,
            alternative_sequences: str_list(obj, "alternativeAnswers").unwrap_or_default(),
            explanation,
        })),
        ItemKind::ErrorDetection => Some(ExerciseItem::ErrorDetection(ErrorDetectionItem {
            prompt,
            candidate_spans: str_list(obj, "options")?,
            faulty_span: answer,
            explanation,
        })),
    }
}

/// Best-effort read: accepts field aliases and pads what is missing.
/// Needs at least a prompt and an answer.
fn lenient_item(value: &Value, schema: &OutputSchema, category: Category) -> Option<ExerciseItem> {
    let obj = value.as_object()?;
    let prompt = first_str(obj, PROMPT_KEYS)?.to_string();
    let explanation = str_field(obj, "explanation").unwrap_or_default().to_string();
    let options = first_list(obj, OPTION_KEYS);

    match schema.item_kind {
        ItemKind::MultipleChoice => {
            let answer = answer_text(obj, options.as_deref())?;
            let options = pad_options(options.unwrap_or_default(), &answer, category);
            Some(ExerciseItem::MultipleChoice(MultipleChoiceItem {
                prompt,
                options,
                correct_option: answer,
                explanation,
            }))
        }
        ItemKind::Completion => Some(ExerciseItem::Completion(CompletionItem {
            prompt,
            correct_text: answer_text(obj, None)?,
            hint: str_field(obj, "hint").unwrap_or_default().to_string(),
            explanation,
        })),
        ItemKind::WordReordering => {
            let answer = answer_text(obj, None).or_else(|| {
                // Some replies give the answer as a word list
                ANSWER_KEYS
                    .iter()
                    .find_map(|k| str_list(obj, k))
                    .filter(|l| !l.is_empty())
                    .map(|l| l.join(" "))
            })?;
            let word_bag = first_list(obj, WORD_KEYS).unwrap_or_else(|| shuffled_words(&answer));
            Some(ExerciseItem::WordReordering(WordReorderingItem {
                prompt,
                word_bag,
                correct_sequence: answer,
                alternative_sequences: first_list(obj, ALTERNATIVE_KEYS).unwrap_or_default(),
                explanation,
            }))
        }
        ItemKind::ErrorDetection => {
            let answer = answer_text(obj, options.as_deref())?;
            let candidate_spans = options.unwrap_or_else(|| {
                text::extract_quoted_sentence(&prompt)
                    .map(|s| text::words(&s))
                    .unwrap_or_default()
            });
            Some(ExerciseItem::ErrorDetection(ErrorDetectionItem {
                prompt,
                candidate_spans,
                faulty_span: answer,
                explanation,
            }))
        }
    }
}

/// Answer as text; a numeric answer is read as an index into the options
fn answer_text(obj: &Map<String, Value>, options: Option<&[String]>) -> Option<String> {
    if let Some(s) = first_str(obj, ANSWER_KEYS) {
        return Some(s.to_string());
    }
    let index = ANSWER_KEYS.iter().find_map(|k| obj.get(*k)?.as_u64())?;
    options?.get(index as usize).cloned()
}

/// Bring a short multiple-choice option list up to four distinct entries
/// that include the answer. A full list without the answer is returned
/// untouched so validation rejects the item.
fn pad_options(options: Vec<String>, answer: &str, category: Category) -> Vec<String> {
    let answer_listed = options.iter().any(|o| text::same_answer(o, answer));
    if !answer_listed && options.len() >= MULTIPLE_CHOICE_OPTIONS {
        debug!(
            "Answer '{}' is not among {} supplied options, leaving them as-is",
            answer,
            options.len()
        );
        return options;
    }

    let push_unique = |list: &mut Vec<String>, candidate: String| {
        if !candidate.is_empty() && !list.iter().any(|o| text::same_answer(o, &candidate)) {
            list.push(candidate);
        }
    };

    let mut padded: Vec<String> = Vec::with_capacity(MULTIPLE_CHOICE_OPTIONS);
    if !answer_listed {
        push_unique(&mut padded, answer.to_string());
    }
    for option in options {
        push_unique(&mut padded, option);
    }

    // Too many: drop distractors from the end, never the answer
    while padded.len() > MULTIPLE_CHOICE_OPTIONS {
        match padded.iter().rposition(|o| !text::same_answer(o, answer)) {
            Some(pos) => {
                padded.remove(pos);
            }
            None => break,
        }
    }

    let fillers: Vec<String> = match category {
        Category::Grammar => CASE_ENDING_FILLERS
            .iter()
            .map(|ending| format!("{}{}", answer, ending))
            .collect(),
        _ => VOCABULARY_FILLERS.iter().map(|s| s.to_string()).collect(),
    };
    for filler in fillers {
        if padded.len() >= MULTIPLE_CHOICE_OPTIONS {
            break;
        }
        push_unique(&mut padded, filler);
    }

    // The answer went in first; hide its position
    if !answer_listed {
        padded.shuffle(&mut rand::rng());
    }
    padded
}

fn shuffled_words(sentence: &str) -> Vec<String> {
    let mut words = text::words(sentence);
    words.shuffle(&mut rand::rng());
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::planner::GenerationRequestPlanner;
    use crate::exercises::validator::AnswerValidator;
    use serde_json::json;

    fn request(category: Category) -> GenerationRequest {
        GenerationRequestPlanner::new().plan(ProficiencyTier::A1, category)
    }

    fn vocab_item(n: usize) -> Value {
        json!({
            "question": format!("Mis on 'koer' inglise keeles? #{}", n),
            "options": ["dog", "cat", "house", "tree"],
            "correctAnswer": "dog",
            "explanation": "koer = dog"
        })
    }

    fn five_vocab() -> String {
        json!({ "questions": (0..5).map(vocab_item).collect::<Vec<_>>() }).to_string()
    }

    #[test]
    fn test_clean_output_is_generated() {
        let set = ResponseSanitizer::new()
            .sanitize(&five_vocab(), &request(Category::Vocabulary))
            .unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.provenance, Provenance::Generated);
        assert!(!set.degraded);
        match &set.items[0] {
            ExerciseItem::MultipleChoice(mc) => {
                assert_eq!(mc.options, vec!["dog", "cat", "house", "tree"]);
                assert_eq!(mc.correct_option, "dog");
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_fenced_output_is_unwrapped() {
        let raw = format!("```json\n{}\n```", five_vocab());
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::Vocabulary))
            .unwrap();
        assert_eq!(set.provenance, Provenance::Generated);
    }

    #[test]
    fn test_truncated_output_is_salvaged_as_partial() {
        let full = five_vocab();
        let cut = &full[..full.len() - 40];
        let set = ResponseSanitizer::new()
            .sanitize(cut, &request(Category::Vocabulary))
            .unwrap();
        assert!(set.len() >= 1 && set.len() < 5);
        assert_eq!(set.provenance, Provenance::Partial);
        assert!(set.degraded);
    }

    #[test]
    fn test_missing_options_are_padded() {
        let raw = json!({"questions": [
            {"question": "Mis on 'kass'?", "correctAnswer": "cat"}
        ]})
        .to_string();
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::Vocabulary))
            .unwrap();
        assert_eq!(set.provenance, Provenance::Partial);
        match &set.items[0] {
            ExerciseItem::MultipleChoice(mc) => {
                assert_eq!(mc.options.len(), 4);
                assert!(mc.options.contains(&"cat".to_string()));
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_numeric_answer_maps_to_option() {
        let raw = json!([
            {"question": "q", "options": ["a", "b", "c", "d"], "correctAnswer": 2}
        ])
        .to_string();
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::Grammar))
            .unwrap();
        match &set.items[0] {
            ExerciseItem::MultipleChoice(mc) => assert_eq!(mc.correct_option, "c"),
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_reorder_without_words_gets_bag_from_answer() {
        let raw = json!({"questions": [
            {"question": "Pane sõnad õigesse järjekorda", "correctAnswer": "Ma elan Tallinnas"}
        ]})
        .to_string();
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::WordReordering))
            .unwrap();
        match &set.items[0] {
            ExerciseItem::WordReordering(item) => {
                let mut bag = item.word_bag.clone();
                bag.sort();
                assert_eq!(bag, vec!["Ma", "Tallinnas", "elan"]);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_error_detection_spans_from_quoted_sentence() {
        let raw = json!({"questions": [
            {"question": "Leia viga: 'Nad elab Tartus.'", "correctAnswer": "elab"}
        ]})
        .to_string();
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::ErrorDetection))
            .unwrap();
        match &set.items[0] {
            ExerciseItem::ErrorDetection(item) => {
                assert_eq!(item.candidate_spans, vec!["Nad", "elab", "Tartus"]);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_failure_not_panic() {
        let req = request(Category::Conjugation);
        let sanitizer = ResponseSanitizer::new();

        let err = sanitizer.sanitize("I'm sorry, I can't help with that.", &req).unwrap_err();
        assert!(matches!(err.reason, FailureReason::MalformedOutput(_)));
        assert_eq!(err.category, Category::Conjugation);
        assert_eq!(err.tier, ProficiencyTier::A1);

        assert_eq!(sanitizer.sanitize("   ", &req).unwrap_err().reason, FailureReason::Empty);
        assert_eq!(
            sanitizer.sanitize(r#"{"questions": [{"foo": 1}]}"#, &req).unwrap_err().reason,
            FailureReason::NoUsableItems
        );
    }

    #[test]
    fn test_single_line_fence_is_unwrapped() {
        let raw = format!("```json {}```", five_vocab());
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::Vocabulary))
            .unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.provenance, Provenance::Generated);
    }

    #[test]
    fn test_trailing_prose_is_ignored() {
        let raw = format!("{}\nHope this helps!", five_vocab());
        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::Vocabulary))
            .unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.provenance, Provenance::Generated);
    }

    #[test]
    fn test_full_options_without_answer_are_not_rewritten() {
        let mut questions: Vec<Value> = (1..4).map(vocab_item).collect();
        questions.insert(
            0,
            json!({
                "question": "Mis on 'koer' inglise keeles?",
                "options": ["cat", "house", "tree", "bird"],
                "correctAnswer": "dog"
            }),
        );
        let raw = json!({ "questions": questions }).to_string();

        let set = ResponseSanitizer::new()
            .sanitize(&raw, &request(Category::Vocabulary))
            .unwrap();
        match &set.items[0] {
            ExerciseItem::MultipleChoice(mc) => {
                assert_eq!(mc.options, vec!["cat", "house", "tree", "bird"]);
                assert_eq!(mc.correct_option, "dog");
            }
            other => panic!("unexpected item {:?}", other),
        }

        let filtered = AnswerValidator::new().filter_set(set).unwrap();
        assert_eq!(filtered.len(), 3);
        assert!(filtered.items.iter().all(|item| item.prompt() != "Mis on 'koer' inglise keeles?"));
    }

    #[test]
    fn test_extra_options_keep_the_answer() {
        let options: Vec<String> = ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect();
        let padded = pad_options(options, "e", Category::Grammar);
        assert_eq!(padded, vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn test_padding_dedups_non_ascii_case() {
        let options = vec!["Õun".to_string(), "õun".to_string(), "pirn".to_string()];
        let padded = pad_options(options, "pirn", Category::Vocabulary);
        assert_eq!(padded.len(), 4);
        assert!(padded.contains(&"Õun".to_string()));
        assert!(!padded.contains(&"õun".to_string()));

        let item = ExerciseItem::MultipleChoice(MultipleChoiceItem {
            prompt: "Mis on 'pear' eesti keeles?".to_string(),
            options: padded,
            correct_option: "pirn".to_string(),
            explanation: String::new(),
        });
        assert!(AnswerValidator::new().is_valid(&item, Category::Vocabulary));
    }
}
