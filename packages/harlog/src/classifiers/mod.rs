//! Classifier implementations.
//!
//! The OpenAI implementation is feature-gated so the core library
//! carries no HTTP client; tests use [`crate::testing::MockClassifier`].

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::OpenAiClassifier;
