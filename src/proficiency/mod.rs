//! Adaptive proficiency tracking
//!
//! Scores assessment events and moves learners along the tier scale,
//! one step at a time.

pub mod level;
pub mod scorer;
pub mod store;
pub mod tracker;

pub use level::{ProficiencyTier, ALL_TIERS};
pub use scorer::{PerformanceScorer, PerformanceSignal, SignalError};
pub use store::{InMemoryLearnerStore, LearnerState, LearnerStore, StoreError};
pub use tracker::{
    Direction, ProficiencyTracker, Recommendation, TierChange, TrackerError, TrackerThresholds,
};
