//! Primary provider: an OpenAI-style responses endpoint.
//!
//! The reply envelope nests the payload under `output[].content[].text`;
//! extraction is delegated to `pagewright_core::extract`.

use crate::error::ProviderError;
use crate::prompt::PromptContext;
use crate::provider::Provider;
use async_trait::async_trait;
use pagewright_core::{extract, Config, FileSet};
use std::time::Duration;
use tracing::debug;

pub struct ChatProvider {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl ChatProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.primary_endpoint.clone(),
            api_key: config.primary_api_key.clone(),
            model: config.primary_model.clone(),
            timeout: config.generation_timeout,
        }
    }
}

#[async_trait]
impl Provider for ChatProvider {
    fn name(&self) -> &str {
        "chat"
    }

    async fn generate(&self, prompt: &PromptContext) -> Result<FileSet, ProviderError> {
        let (Some(endpoint), Some(api_key)) = (&self.endpoint, &self.api_key) else {
            return Err(ProviderError::Unconfigured);
        };

        let body = serde_json::json!({
            "model": self.model,
            "instructions": prompt.system_prompt(),
            "input": prompt.user_prompt(),
        });

        debug!(endpoint = %endpoint, model = %self.model, "requesting generation");
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let files = extract::extract_file_map(&text);
        if files.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(files)
    }
}
