//! Estonian Tutor Library
//!
//! Adaptive proficiency tracking and exercise generation:
//! - Six-tier proficiency scale with weighted scoring and one-step moves
//! - Generation request planning per exercise category and tier
//! - Repair and salvage of malformed or truncated generator JSON
//! - Per-category answer validation with static fallback content
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use estonian_tutor::{Category, InMemoryLearnerStore, OfflineGenerator, ProficiencyTier, TutorPipeline};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = TutorPipeline::new(Arc::new(OfflineGenerator), Arc::new(InMemoryLearnerStore::new()));
//!     let set = pipeline.request_exercises(ProficiencyTier::A1, Category::Vocabulary).await;
//!     println!("{} items", set.len());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod exercises;
pub mod generator;
pub mod pipeline;
pub mod proficiency;

pub use config::Config;

pub use exercises::{
    AnswerValidator, Category, ExerciseItem, ExerciseSet, GenerationRequest,
    GenerationRequestPlanner, Provenance, ResponseSanitizer, SanitizeFailure, ValidationReport,
};

pub use generator::{Generator, GeneratorError, OfflineGenerator, OpenRouterGenerator};

pub use pipeline::TutorPipeline;

pub use proficiency::{
    Direction, InMemoryLearnerStore, LearnerStore, PerformanceScorer, PerformanceSignal,
    ProficiencyTier, ProficiencyTracker, Recommendation, TierChange, TrackerError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Adaptive Estonian exercises", NAME, VERSION)
}
