//! Learner tier storage
//!
//! The tracker never owns storage; it reads and writes tiers through
//! [`LearnerStore`]. The in-memory implementation backs the CLI and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use super::level::ProficiencyTier;

/// Storage failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("learner not found: {0}")]
    NotFound(String),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// A learner as the store sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerState {
    pub id: String,
    pub current_tier: ProficiencyTier,
    pub updated_at: DateTime<Utc>,
}

/// Single source of truth for each learner's tier
#[async_trait]
pub trait LearnerStore: Send + Sync {
    /// Current tier for a learner
    async fn get_tier(&self, learner_id: &str) -> Result<ProficiencyTier, StoreError>;

    /// Persist a new tier for an existing learner
    async fn set_tier(&self, learner_id: &str, tier: ProficiencyTier) -> Result<(), StoreError>;
}

/// Process-local learner store
#[derive(Default)]
pub struct InMemoryLearnerStore {
    learners: RwLock<HashMap<String, LearnerState>>,
}

impl InMemoryLearnerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or reset) a learner at a tier
    pub async fn insert(&self, learner_id: &str, tier: ProficiencyTier) {
        let state = LearnerState {
            id: learner_id.to_string(),
            current_tier: tier,
            updated_at: Utc::now(),
        };
        self.learners.write().await.insert(learner_id.to_string(), state);
    }

    /// Snapshot of a learner record
    pub async fn get(&self, learner_id: &str) -> Option<LearnerState> {
        self.learners.read().await.get(learner_id).cloned()
    }
}

#[async_trait]
impl LearnerStore for InMemoryLearnerStore {
    async fn get_tier(&self, learner_id: &str) -> Result<ProficiencyTier, StoreError> {
        self.learners
            .read()
            .await
            .get(learner_id)
            .map(|s| s.current_tier)
            .ok_or_else(|| StoreError::NotFound(learner_id.to_string()))
    }

    async fn set_tier(&self, learner_id: &str, tier: ProficiencyTier) -> Result<(), StoreError> {
        let mut learners = self.learners.write().await;
        let state = learners
            .get_mut(learner_id)
            .ok_or_else(|| StoreError::NotFound(learner_id.to_string()))?;
        state.current_tier = tier;
        state.updated_at = Utc::now();
        debug!("Stored tier {} for learner {}", tier, learner_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_and_set_tier() {
        let store = InMemoryLearnerStore::new();
        store.insert("kadri", ProficiencyTier::A2).await;

        assert_eq!(store.get_tier("kadri").await, Ok(ProficiencyTier::A2));
        store.set_tier("kadri", ProficiencyTier::B1).await.unwrap();
        assert_eq!(store.get_tier("kadri").await, Ok(ProficiencyTier::B1));
    }

    #[tokio::test]
    async fn test_missing_learner() {
        let store = InMemoryLearnerStore::new();
        assert_eq!(
            store.get_tier("nobody").await,
            Err(StoreError::NotFound("nobody".to_string()))
        );
        assert!(store.set_tier("nobody", ProficiencyTier::A1).await.is_err());
        assert!(store.get("nobody").await.is_none());
    }
}
