//! HAR capture analysis.
//!
//! Narrows a captured browser network log (HAR) to its API-like
//! entries, asks a natural-language classifier which entry best
//! matches a free-text description, and renders the winner as a
//! shell-replayable curl command.
//!
//! The library is transport-agnostic: the classifier is a trait
//! (`Classifier`), so callers can plug in the OpenAI implementation
//! (behind the `openai` feature) or a mock for tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use harlog::{ExtractionPipeline, OpenAiClassifier};
//!
//! let classifier = Arc::new(OpenAiClassifier::from_env()?);
//! let pipeline = ExtractionPipeline::new(classifier);
//! let result = pipeline
//!     .run(&har_bytes, "the login request", "gpt-4o")
//!     .await?;
//! println!("{}", result.curl_command);
//! ```

pub mod classifiers;
pub mod classify;
pub mod curl;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod testing;
pub mod types;

pub use classify::Classifier;
#[cfg(feature = "openai")]
pub use classifiers::openai::OpenAiClassifier;
pub use curl::curl_command;
pub use error::{HarError, Result};
pub use filter::{filter_api_entries, is_api_entry};
pub use pipeline::{parse_entries, select_candidate, ExtractionPipeline};
pub use testing::MockClassifier;
pub use types::{
    extract::{CandidateSelection, CandidateSummary, ExtractionResult, RequestDetails},
    har::{HarDocument, HarEntry, HarRequest, HarResponse, Header},
};
