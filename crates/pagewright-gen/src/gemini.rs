//! Secondary provider: a `generateContent`-style endpoint whose reply
//! nests the payload under `candidates[].content.parts[].text`.

use crate::error::ProviderError;
use crate::prompt::PromptContext;
use crate::provider::Provider;
use async_trait::async_trait;
use pagewright_core::{extract, Config, FileSet};
use std::time::Duration;
use tracing::debug;

pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.secondary_endpoint.clone(),
            api_key: config.secondary_api_key.clone(),
            timeout: config.generation_timeout,
        }
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &PromptContext) -> Result<FileSet, ProviderError> {
        let (Some(endpoint), Some(api_key)) = (&self.endpoint, &self.api_key) else {
            return Err(ProviderError::Unconfigured);
        };

        let body = serde_json::json!({
            "system_instruction": {"parts": [{"text": prompt.system_prompt()}]},
            "contents": [{"role": "user", "parts": [{"text": prompt.user_prompt()}]}],
        });

        debug!(endpoint = %endpoint, "requesting generation");
        let response = self
            .client
            .post(endpoint)
            .header("x-goog-api-key", api_key)
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
