//! External text generator seam
//!
//! The pipeline only sees [`Generator`]: a request goes in, raw text or a
//! [`GeneratorError`] comes out. Vendor wire formats live in adapters.

pub mod openrouter;

use async_trait::async_trait;
use std::time::Duration;

use crate::exercises::GenerationRequest;

pub use openrouter::OpenRouterGenerator;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),
    #[error("generator timed out after {0:?}")]
    Timeout(Duration),
    #[error("generator rate limited: {0}")]
    RateLimited(String),
    #[error("generator HTTP error ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("invalid generator response: {0}")]
    InvalidResponse(String),
}

impl GeneratorError {
    /// Map a non-success HTTP status and body to an error kind
    pub fn from_status(status: u16, body: &str) -> Self {
        let lower = body.to_lowercase();
        if status == 429 || lower.contains("rate limit") || lower.contains("too many requests") {
            GeneratorError::RateLimited(body.to_string())
        } else if matches!(status, 502..=504)
            || lower.contains("model is currently overloaded")
            || lower.contains("service unavailable")
        {
            GeneratorError::Unavailable(format!("HTTP {}: {}", status, body))
        } else {
            GeneratorError::Http {
                status,
                body: body.to_string(),
            }
        }
    }

    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GeneratorError::Unavailable(_) | GeneratorError::Timeout(_) | GeneratorError::RateLimited(_)
        )
    }
}

/// Produces raw exercise text for a planned request
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GeneratorError>;
}

/// A generator that is never reachable; every request takes the fallback path
#[derive(Debug, Clone, Default)]
pub struct OfflineGenerator;

#[async_trait]
impl Generator for OfflineGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable("offline mode".to_string()))
    }
}
