//! Exercise generation pipeline pieces
//!
//! Planner builds the generator request, sanitizer turns raw output into a
//! typed set, validator filters it, and fallback covers total failure.

pub mod fallback;
pub mod grading;
pub mod planner;
pub mod repair;
pub mod report;
pub mod sanitizer;
pub mod text;
pub mod types;
pub mod validator;

pub use fallback::{fallback_items, fallback_set};
pub use grading::{grade, GradeResult};
pub use planner::{GenerationRequest, GenerationRequestPlanner, OutputSchema, SamplingParams};
pub use report::{ItemReport, ValidationReport};
pub use sanitizer::{FailureReason, ResponseSanitizer, SanitizeFailure};
pub use types::{
    Category, CompletionItem, ErrorDetectionItem, ExerciseItem, ExerciseSet, ItemKind,
    MultipleChoiceItem, Provenance, WordReorderingItem, ALL_CATEGORIES, ITEMS_PER_SET,
};
pub use validator::{AnswerValidator, InsufficientItems, IssueSeverity, ValidationIssue};
