//! Tutor pipeline - the caller-facing entry point
//!
//! Exercise requests always resolve to a usable set: generator errors,
//! timeouts, malformed output, and sets that lose every item to validation
//! all end in the static set for the requested category and tier. The only
//! failure a caller sees is an unknown learner.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::exercises::{
    fallback_set, grade, AnswerValidator, Category, ExerciseSet, FailureReason, GenerationRequest,
    GenerationRequestPlanner, GradeResult, ResponseSanitizer, SanitizeFailure,
};
use crate::generator::{Generator, GeneratorError};
use crate::proficiency::{
    Direction, LearnerStore, PerformanceSignal, ProficiencyTier, ProficiencyTracker,
    Recommendation, TierChange, TrackerError,
};

pub struct TutorPipeline {
    generator: Arc<dyn Generator>,
    tracker: ProficiencyTracker,
    planner: GenerationRequestPlanner,
    sanitizer: ResponseSanitizer,
    validator: AnswerValidator,
    generator_timeout: Duration,
    items_per_set: usize,
}

impl TutorPipeline {
    /// Pipeline with default thresholds and set sizes
    pub fn new(generator: Arc<dyn Generator>, store: Arc<dyn LearnerStore>) -> Self {
        Self::from_config(&Config::default(), generator, store)
    }

    pub fn from_config(
        config: &Config,
        generator: Arc<dyn Generator>,
        store: Arc<dyn LearnerStore>,
    ) -> Self {
        let items_per_set = config.exercises.items_per_set.max(1);
        Self {
            generator,
            tracker: ProficiencyTracker::with_thresholds(store, config.tracker.thresholds()),
            planner: GenerationRequestPlanner::new()
                .with_max_tokens_cap(config.generator.max_tokens)
                .with_item_count(items_per_set),
            sanitizer: ResponseSanitizer::new(),
            validator: AnswerValidator::new()
                .with_min_usable_items(config.exercises.min_usable_items),
            generator_timeout: Duration::from_secs(config.generator.timeout_secs),
            items_per_set,
        }
    }

    pub fn with_timeout(mut self, generator_timeout: Duration) -> Self {
        self.generator_timeout = generator_timeout;
        self
    }

    pub fn tracker(&self) -> &ProficiencyTracker {
        &self.tracker
    }

    pub fn planner(&self) -> &GenerationRequestPlanner {
        &self.planner
    }

    pub fn validator(&self) -> &AnswerValidator {
        &self.validator
    }

    /// Exercises for a tier and category. Never fails.
    pub async fn request_exercises(&self, tier: ProficiencyTier, category: Category) -> ExerciseSet {
        let request = self.planner.plan(tier, category);

        let raw = match self.call_generator(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                let reason = FailureReason::GeneratorUnavailable(e.to_string());
                return self.fallback(&SanitizeFailure::new(&request, reason));
            }
        };

        match self.process_output(&raw, &request) {
            Ok(set) => {
                info!(
                    "Serving {} {} items for {} ({:?})",
                    set.len(),
                    category,
                    tier,
                    set.provenance
                );
                set
            }
            Err(failure) => self.fallback(&failure),
        }
    }

    /// Exercises at the learner's stored tier
    pub async fn request_exercises_for(
        &self,
        learner_id: &str,
        category: Category,
    ) -> Result<ExerciseSet, TrackerError> {
        let tier = self.tracker.current_tier(learner_id).await?;
        Ok(self.request_exercises(tier, category).await)
    }

    /// Sanitize and validate one raw generator reply
    pub fn process_output(
        &self,
        raw: &str,
        request: &GenerationRequest,
    ) -> Result<ExerciseSet, SanitizeFailure> {
        let set = self.sanitizer.sanitize(raw, request)?;
        self.validator.filter_set(set).map_err(|insufficient| {
            debug!(
                "{} of {} {} items failed validation",
                insufficient.dropped,
                insufficient.dropped + insufficient.remaining,
                insufficient.category
            );
            SanitizeFailure::new(request, FailureReason::NoUsableItems)
        })
    }

    pub async fn submit_assessment(
        &self,
        learner_id: &str,
        signal: &PerformanceSignal,
        recommendation: Recommendation,
    ) -> Result<TierChange, TrackerError> {
        self.tracker
            .submit_assessment(learner_id, signal, recommendation)
            .await
    }

    pub async fn adjust_tier_manually(
        &self,
        learner_id: &str,
        direction: Direction,
    ) -> Result<TierChange, TrackerError> {
        self.tracker.adjust_manually(learner_id, direction).await
    }

    /// Grade an answer to one item of a set; `None` if the index is out of range
    pub fn grade_answer(&self, set: &ExerciseSet, index: usize, answer: &str) -> Option<GradeResult> {
        set.items.get(index).map(|item| grade(item, answer))
    }

    async fn call_generator(&self, request: &GenerationRequest) -> Result<String, GeneratorError> {
        match timeout(self.generator_timeout, self.generator.generate(request)).await {
            Ok(Ok(raw)) => Ok(raw),
            Ok(Err(e)) => {
                if e.is_transient() {
                    warn!("Generator unavailable for {} {}: {}", request.tier, request.category, e);
                } else {
                    error!("Generator rejected request for {} {}: {}", request.tier, request.category, e);
                }
                Err(e)
            }
            Err(_) => {
                warn!(
                    "Generator timed out after {:?} for {} {}",
                    self.generator_timeout, request.tier, request.category
                );
                Err(GeneratorError::Timeout(self.generator_timeout))
            }
        }
    }

    fn fallback(&self, failure: &SanitizeFailure) -> ExerciseSet {
        warn!(
            "Serving static {} set for {}: {}",
            failure.category, failure.tier, failure.reason
        );
        let mut set = fallback_set(failure.tier, failure.category);
        set.items.truncate(self.items_per_set);
        set
    }
}
