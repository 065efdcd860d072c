//! Performance scoring
//!
//! Folds the assessor's sub-scores into one scalar on the 1..5 scale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SPEED_WEIGHT: f64 = 0.2;
const ACCURACY_WEIGHT: f64 = 0.4;
const COMPLEXITY_WEIGHT: f64 = 0.3;
const SESSION_WEIGHT: f64 = 0.1;

/// Divisor mapping a 0..100 percentage onto the 0..5 scale
const SESSION_SCALE: f64 = 20.0;

pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 5.0;

/// One assessment event's sub-scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSignal {
    /// 1..5
    pub speed: u8,
    /// 1..5
    pub accuracy: u8,
    /// 1..5
    pub complexity: u8,
    /// Percentage of the session answered correctly, 0..100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_score: Option<f64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("{field} must be between 1 and 5, got {value}")]
    SubScoreOutOfRange { field: &'static str, value: u8 },
    #[error("session score must be between 0 and 100, got {0}")]
    SessionScoreOutOfRange(f64),
}

impl PerformanceSignal {
    /// Build a signal, rejecting out-of-range inputs
    pub fn try_new(
        speed: u8,
        accuracy: u8,
        complexity: u8,
        session_score: Option<f64>,
    ) -> Result<Self, SignalError> {
        for (field, value) in [("speed", speed), ("accuracy", accuracy), ("complexity", complexity)] {
            if !(1..=5).contains(&value) {
                return Err(SignalError::SubScoreOutOfRange { field, value });
            }
        }
        if let Some(s) = session_score {
            if !(0.0..=100.0).contains(&s) {
                return Err(SignalError::SessionScoreOutOfRange(s));
            }
        }
        Ok(Self { speed, accuracy, complexity, session_score })
    }
}

/// Weighted performance scorer
#[derive(Debug, Clone, Default)]
pub struct PerformanceScorer;

impl PerformanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a signal. Always lands in [1, 5].
    pub fn score(&self, signal: &PerformanceSignal) -> f64 {
        let mut total = f64::from(signal.speed) * SPEED_WEIGHT
            + f64::from(signal.accuracy) * ACCURACY_WEIGHT
            + f64::from(signal.complexity) * COMPLEXITY_WEIGHT;

        if let Some(session) = signal.session_score {
            total += (session / SESSION_SCALE) * SESSION_WEIGHT;
        }

        if total.is_nan() {
            return MIN_SCORE;
        }
        total.clamp(MIN_SCORE, MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(speed: u8, accuracy: u8, complexity: u8, session: Option<f64>) -> PerformanceSignal {
        PerformanceSignal { speed, accuracy, complexity, session_score: session }
    }

    #[test]
    fn test_weighted_sum_without_session() {
        let score = PerformanceScorer::new().score(&signal(5, 5, 5, None));
        assert!((score - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_session_score_adds_weighted_term() {
        let score = PerformanceScorer::new().score(&signal(5, 5, 5, Some(100.0)));
        assert!((score - 5.0).abs() < 1e-9);

        let score = PerformanceScorer::new().score(&signal(3, 3, 3, Some(50.0)));
        // 0.6 + 1.2 + 0.9 + 0.25
        assert!((score - 2.95).abs() < 1e-9);
    }

    #[test]
    fn test_low_scores_clamped_to_one() {
        let score = PerformanceScorer::new().score(&signal(1, 1, 1, None));
        assert_eq!(score, MIN_SCORE);
    }

    #[test]
    fn test_score_always_in_range() {
        let scorer = PerformanceScorer::new();
        for s in 1..=5 {
            for a in 1..=5 {
                for c in 1..=5 {
                    for session in [None, Some(0.0), Some(37.5), Some(100.0)] {
                        let score = scorer.score(&signal(s, a, c, session));
                        assert!((MIN_SCORE..=MAX_SCORE).contains(&score));
                    }
                }
            }
        }
    }

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert_eq!(
            PerformanceSignal::try_new(0, 3, 3, None),
            Err(SignalError::SubScoreOutOfRange { field: "speed", value: 0 })
        );
        assert_eq!(
            PerformanceSignal::try_new(3, 3, 3, Some(120.0)),
            Err(SignalError::SessionScoreOutOfRange(120.0))
        );
        assert!(PerformanceSignal::try_new(5, 4, 3, Some(88.0)).is_ok());
    }
}
