//! Testing utilities: a canned-reply classifier.
//!
//! Useful for exercising the pipeline without real LLM calls.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::classify::Classifier;
use crate::error::{HarError, Result};

/// A mock classifier returning a configurable reply.
///
/// Records every prompt it receives for assertions. Defaults to a
/// valid reply selecting index 0.
#[derive(Clone, Default)]
pub struct MockClassifier {
    reply: Arc<RwLock<Option<String>>>,
    fail: Arc<RwLock<bool>>,
    delay: Arc<RwLock<Option<Duration>>>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with this exact text.
    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        *self.reply.write().unwrap() = Some(reply.into());
        self
    }

    /// Reply with a well-formed selection object.
    pub fn selecting(index: usize, reasoning: &str) -> Self {
        Self::new().with_reply(
            serde_json::json!({
                "selected_index": index,
                "reasoning": reasoning,
            })
            .to_string(),
        )
    }

    /// Fail every call with a transport error.
    pub fn failing() -> Self {
        let mock = Self::new();
        *mock.fail.write().unwrap() = true;
        mock
    }

    /// Sleep before replying, to exercise deadline handling.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = Some(delay);
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn rank(&self, prompt: &str, _model: &str) -> Result<String> {
        self.prompts.write().unwrap().push(prompt.to_string());

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.fail.read().unwrap() {
            return Err(HarError::Classifier("mock transport failure".into()));
        }

        Ok(self
            .reply
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| r#"{"selected_index": 0, "reasoning": "default"}"#.to_string()))
    }
}
