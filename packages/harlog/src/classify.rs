//! Classifier trait: the seam to the natural-language ranking service.

use async_trait::async_trait;

use crate::error::Result;

/// Transport seam for the external classifier.
///
/// Implementations wrap a specific LLM provider and return the raw
/// reply text. Prompt construction and reply parsing live in
/// [`crate::pipeline::select`], so the fallback policy stays
/// provider-agnostic.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// One ranking round trip: send the rendered prompt to the given
    /// model and return the raw reply. No retries are performed.
    async fn rank(&self, prompt: &str, model: &str) -> Result<String>;
}
