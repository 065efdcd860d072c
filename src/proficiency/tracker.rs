//! Proficiency tracker - decides tier moves after an assessment
//!
//! A transition needs both a strong (or weak) score and the assessor's
//! agreeing recommendation. Moves are one step at a time and the new tier is
//! written through the [`LearnerStore`] only when it actually changed.
//! Read-evaluate-write for a single learner is serialized so two concurrent
//! "increase" evaluations cannot both start from the same tier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::level::ProficiencyTier;
use super::scorer::{PerformanceScorer, PerformanceSignal};
use super::store::{LearnerStore, StoreError};

pub const DEFAULT_PROMOTE_THRESHOLD: f64 = 4.5;
pub const DEFAULT_DEMOTE_THRESHOLD: f64 = 2.0;

/// Qualitative hint from the external assessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Maintain,
    Increase,
    Decrease,
}

impl std::str::FromStr for Recommendation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maintain" | "hold" => Ok(Recommendation::Maintain),
            "increase" | "up" => Ok(Recommendation::Increase),
            "decrease" | "down" => Ok(Recommendation::Decrease),
            other => Err(format!("Unknown recommendation: {}", other)),
        }
    }
}

/// Direction of a manual adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increase,
    Decrease,
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "increase" | "up" => Ok(Direction::Increase),
            "decrease" | "down" => Ok(Direction::Decrease),
            other => Err(format!("Unknown direction: {}", other)),
        }
    }
}

/// Outcome of one evaluation or manual adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierChange {
    pub previous_tier: ProficiencyTier,
    pub new_tier: ProficiencyTier,
    pub changed: bool,
    /// Performance score, absent for manual adjustments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    #[error("learner not found: {0}")]
    NotFound(String),
    #[error("learner store failed: {0}")]
    Store(String),
}

impl From<StoreError> for TrackerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => TrackerError::NotFound(id),
            StoreError::Backend(msg) => TrackerError::Store(msg),
        }
    }
}

/// Score thresholds for automatic moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerThresholds {
    /// Minimum score for a promotion
    pub promote: f64,
    /// Maximum score for a demotion
    pub demote: f64,
}

impl Default for TrackerThresholds {
    fn default() -> Self {
        Self {
            promote: DEFAULT_PROMOTE_THRESHOLD,
            demote: DEFAULT_DEMOTE_THRESHOLD,
        }
    }
}

/// Pure transition rule. Returns the tier the learner should hold next.
pub fn next_tier(
    current: ProficiencyTier,
    score: f64,
    recommendation: Recommendation,
    thresholds: &TrackerThresholds,
) -> ProficiencyTier {
    if score >= thresholds.promote && recommendation == Recommendation::Increase {
        if let Some(up) = current.next() {
            return up;
        }
    } else if score <= thresholds.demote && recommendation == Recommendation::Decrease {
        if let Some(down) = current.previous() {
            return down;
        }
    }
    current
}

/// One-step move ignoring the score. No-op at the ends of the scale.
pub fn adjusted_tier(current: ProficiencyTier, direction: Direction) -> ProficiencyTier {
    let moved = match direction {
        Direction::Increase => current.next(),
        Direction::Decrease => current.previous(),
    };
    moved.unwrap_or(current)
}

/// Tier state machine over a learner store
pub struct ProficiencyTracker {
    store: Arc<dyn LearnerStore>,
    scorer: PerformanceScorer,
    thresholds: TrackerThresholds,
    learner_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProficiencyTracker {
    /// Create a tracker with the default thresholds
    pub fn new(store: Arc<dyn LearnerStore>) -> Self {
        Self::with_thresholds(store, TrackerThresholds::default())
    }

    pub fn with_thresholds(store: Arc<dyn LearnerStore>, thresholds: TrackerThresholds) -> Self {
        Self {
            store,
            scorer: PerformanceScorer::new(),
            thresholds,
            learner_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn thresholds(&self) -> &TrackerThresholds {
        &self.thresholds
    }

    /// Tier the learner currently holds
    pub async fn current_tier(&self, learner_id: &str) -> Result<ProficiencyTier, TrackerError> {
        Ok(self.store.get_tier(learner_id).await?)
    }

    /// Score an assessment and apply the transition rule
    pub async fn submit_assessment(
        &self,
        learner_id: &str,
        signal: &PerformanceSignal,
        recommendation: Recommendation,
    ) -> Result<TierChange, TrackerError> {
        let score = self.scorer.score(signal);
        let thresholds = self.thresholds;

        let mut change = self
            .transition(learner_id, |current| {
                next_tier(current, score, recommendation, &thresholds)
            })
            .await?;
        change.score = Some(score);

        debug!(
            "Assessment for {}: score {:.2}, recommendation {:?}, {} -> {}",
            learner_id, score, recommendation, change.previous_tier, change.new_tier
        );
        Ok(change)
    }

    /// Manual one-step override
    pub async fn adjust_manually(
        &self,
        learner_id: &str,
        direction: Direction,
    ) -> Result<TierChange, TrackerError> {
        self.transition(learner_id, |current| adjusted_tier(current, direction))
            .await
    }

    /// Read, decide, and write under the learner's lock
    async fn transition<F>(&self, learner_id: &str, decide: F) -> Result<TierChange, TrackerError>
    where
        F: FnOnce(ProficiencyTier) -> ProficiencyTier,
    {
        let lock = self.learner_lock(learner_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.apply(learner_id, decide).await
        };
        self.release_lock(learner_id, lock).await;
        result
    }

    async fn apply<F>(&self, learner_id: &str, decide: F) -> Result<TierChange, TrackerError>
    where
        F: FnOnce(ProficiencyTier) -> ProficiencyTier,
    {
        let previous_tier = self.store.get_tier(learner_id).await?;
        let new_tier = decide(previous_tier);
        let changed = new_tier != previous_tier;

        if changed {
            self.store.set_tier(learner_id, new_tier).await?;
            info!("Learner {} moved {} -> {}", learner_id, previous_tier, new_tier);
        }

        Ok(TierChange {
            previous_tier,
            new_tier,
            changed,
            score: None,
        })
    }

    async fn learner_lock(&self, learner_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.learner_locks.lock().await;
        locks
            .entry(learner_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_lock(&self, learner_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.learner_locks.lock().await;
        // Only the map and this caller hold it: nobody is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(learner_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proficiency::store::InMemoryLearnerStore;
    use async_trait::async_trait;
    use mockall::mock;

    mock! {
        pub Store {}
        #[async_trait]
        impl LearnerStore for Store {
            async fn get_tier(&self, learner_id: &str) -> Result<ProficiencyTier, StoreError>;
            async fn set_tier(&self, learner_id: &str, tier: ProficiencyTier) -> Result<(), StoreError>;
        }
    }

    fn strong() -> PerformanceSignal {
        // 1.0 + 2.0 + 1.5 + 0.5 = 5.0
        PerformanceSignal { speed: 5, accuracy: 5, complexity: 5, session_score: Some(100.0) }
    }

    fn weak() -> PerformanceSignal {
        PerformanceSignal { speed: 1, accuracy: 1, complexity: 1, session_score: None }
    }

    #[test]
    fn test_next_tier_rule() {
        let t = TrackerThresholds::default();
        assert_eq!(next_tier(ProficiencyTier::B1, 4.6, Recommendation::Increase, &t), ProficiencyTier::B2);
        assert_eq!(next_tier(ProficiencyTier::B1, 4.4, Recommendation::Increase, &t), ProficiencyTier::B1);
        assert_eq!(next_tier(ProficiencyTier::B1, 4.9, Recommendation::Maintain, &t), ProficiencyTier::B1);
        assert_eq!(next_tier(ProficiencyTier::B1, 2.0, Recommendation::Decrease, &t), ProficiencyTier::A2);
        assert_eq!(next_tier(ProficiencyTier::B1, 2.1, Recommendation::Decrease, &t), ProficiencyTier::B1);
        assert_eq!(next_tier(ProficiencyTier::A1, 1.5, Recommendation::Decrease, &t), ProficiencyTier::A1);
        assert_eq!(next_tier(ProficiencyTier::C2, 4.8, Recommendation::Increase, &t), ProficiencyTier::C2);
        // A strong score never demotes, even on a decrease hint
        assert_eq!(next_tier(ProficiencyTier::B1, 4.8, Recommendation::Decrease, &t), ProficiencyTier::B1);
    }

    #[test]
    fn test_adjusted_tier_boundaries() {
        assert_eq!(adjusted_tier(ProficiencyTier::A1, Direction::Decrease), ProficiencyTier::A1);
        assert_eq!(adjusted_tier(ProficiencyTier::C2, Direction::Increase), ProficiencyTier::C2);
        assert_eq!(adjusted_tier(ProficiencyTier::B2, Direction::Increase), ProficiencyTier::C1);
    }

    #[tokio::test]
    async fn test_promotion_persists_once() {
        let mut store = MockStore::new();
        store.expect_get_tier().times(1).returning(|_| Ok(ProficiencyTier::B1));
        store
            .expect_set_tier()
            .times(1)
            .withf(|id, tier| id == "mari" && *tier == ProficiencyTier::B2)
            .returning(|_, _| Ok(()));

        let tracker = ProficiencyTracker::new(Arc::new(store));
        let change = tracker
            .submit_assessment("mari", &strong(), Recommendation::Increase)
            .await
            .unwrap();

        assert_eq!(change.previous_tier, ProficiencyTier::B1);
        assert_eq!(change.new_tier, ProficiencyTier::B2);
        assert!(change.changed);
        assert_eq!(change.score, Some(5.0));
    }

    #[tokio::test]
    async fn test_bottom_boundary_is_noop_without_write() {
        let mut store = MockStore::new();
        store.expect_get_tier().returning(|_| Ok(ProficiencyTier::A1));
        store.expect_set_tier().never();

        let tracker = ProficiencyTracker::new(Arc::new(store));
        let change = tracker
            .submit_assessment("mari", &weak(), Recommendation::Decrease)
            .await
            .unwrap();

        assert_eq!(change.new_tier, ProficiencyTier::A1);
        assert!(!change.changed);
    }

    #[tokio::test]
    async fn test_missing_learner_is_not_found() {
        let mut store = MockStore::new();
        store
            .expect_get_tier()
            .returning(|id| Err(StoreError::NotFound(id.to_string())));
        store.expect_set_tier().never();

        let tracker = ProficiencyTracker::new(Arc::new(store));
        let err = tracker
            .adjust_manually("ghost", Direction::Increase)
            .await
            .unwrap_err();
        assert_eq!(err, TrackerError::NotFound("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_manual_adjust_ignores_score() {
        let store = Arc::new(InMemoryLearnerStore::new());
        store.insert("jaan", ProficiencyTier::B2).await;

        let tracker = ProficiencyTracker::new(store.clone());
        let change = tracker.adjust_manually("jaan", Direction::Decrease).await.unwrap();
        assert_eq!(change.new_tier, ProficiencyTier::B1);
        assert!(change.score.is_none());
        assert_eq!(store.get_tier("jaan").await, Ok(ProficiencyTier::B1));
    }

    #[tokio::test]
    async fn test_concurrent_promotions_serialize() {
        let store = Arc::new(InMemoryLearnerStore::new());
        store.insert("liis", ProficiencyTier::A1).await;
        let tracker = Arc::new(ProficiencyTracker::new(store.clone()));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                tracker
                    .submit_assessment("liis", &strong(), Recommendation::Increase)
                    .await
                    .unwrap()
            }));
        }

        let mut changes = Vec::new();
        for h in handles {
            changes.push(h.await.unwrap());
        }

        // Each evaluation saw the previous one's result: four distinct starting tiers
        let mut starts: Vec<_> = changes.iter().map(|c| c.previous_tier).collect();
        starts.sort();
        starts.dedup();
        assert_eq!(starts.len(), 4);
        assert_eq!(store.get_tier("liis").await, Ok(ProficiencyTier::C1));
        assert!(tracker.learner_locks.lock().await.is_empty());
    }
}
