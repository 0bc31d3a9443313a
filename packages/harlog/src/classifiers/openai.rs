//! OpenAI implementation of the `Classifier` trait.
//!
//! By default the schema-constrained structured-output mode is used,
//! which pins the reply to the [`SelectionReply`] shape. The plain
//! chat mode remains available for models and proxies that do not
//! support `json_schema` response formats; its free-text replies are
//! handled by the salvage parser in `pipeline::select`.

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, StructuredOutput, StructuredRequest};

use crate::classify::Classifier;
use crate::error::{HarError, Result};
use crate::pipeline::prompts::SELECTION_SYSTEM_PROMPT;
use crate::types::extract::SelectionReply;

/// OpenAI-backed classifier.
#[derive(Clone)]
pub struct OpenAiClassifier {
    client: OpenAIClient,
    structured: bool,
}

impl OpenAiClassifier {
    /// Create a classifier with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(OpenAIClient::new(api_key))
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let client = OpenAIClient::from_env().map_err(|e| HarError::Classifier(Box::new(e)))?;
        Ok(Self::with_client(client))
    }

    /// Wrap an existing client (custom base URL, shared connection pool).
    pub fn with_client(client: OpenAIClient) -> Self {
        Self {
            client,
            structured: true,
        }
    }

    /// Disable the `json_schema` response format and send a plain
    /// chat completion instead.
    pub fn with_plain_chat(mut self) -> Self {
        self.structured = false;
        self
    }
}

#[async_trait]
impl Classifier for OpenAiClassifier {
    async fn rank(&self, prompt: &str, model: &str) -> Result<String> {
        if self.structured {
            let request = StructuredRequest::new(
                model,
                SELECTION_SYSTEM_PROMPT,
                prompt,
                SelectionReply::openai_schema(),
            );
            self.client
                .structured_output(request)
                .await
                .map_err(|e| HarError::Classifier(Box::new(e)))
        } else {
            let request = ChatRequest {
                model: model.to_string(),
                messages: vec![Message::user(prompt)],
                ..Default::default()
            };
            self.client
                .chat_completion(request)
                .await
                .map(|response| response.content)
                .map_err(|e| HarError::Classifier(Box::new(e)))
        }
    }
}
