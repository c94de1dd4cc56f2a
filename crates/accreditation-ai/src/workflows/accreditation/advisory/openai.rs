use serde::Deserialize;
use tracing::debug;

use super::{AdvisoryGenerationError, AdvisoryGenerator, AdvisoryRequest, AdvisoryResponse};
use crate::config::AdvisoryConfig;

/// Chat-completions client for OpenAI-compatible endpoints.
#[derive(Clone)]
pub struct OpenAiAdvisor {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiAdvisor {
    pub fn new(config: &AdvisoryConfig) -> Result<Self, AdvisoryGenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| AdvisoryGenerationError::Transport(err.to_string()))?;
        Ok(Self::with_client(
            http,
            config.base_url.clone(),
            config.api_key.clone(),
        ))
    }

    pub fn with_client(http: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl std::fmt::Debug for OpenAiAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdvisor")
            .field("base_url", &self.base_url)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl AdvisoryGenerator for OpenAiAdvisor {
    async fn generate(
        &self,
        request: AdvisoryRequest,
    ) -> Result<AdvisoryResponse, AdvisoryGenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AdvisoryGenerationError::NotConfigured)?;

        debug!(model = %request.model, "requesting advisory completion");
        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| AdvisoryGenerationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisoryGenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|err| AdvisoryGenerationError::MalformedResponse(err.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AdvisoryGenerationError::MalformedResponse(
                    "response contained no message content".to_string(),
                )
            })?;

        Ok(AdvisoryResponse { content })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
