use crate::config::ProviderConfig;
use crate::providers::traits::{CompletionProvider, CompletionRequest};
use crate::providers::utils::{build_client, image_data_uri};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

/// OpenAI-compatible chat completions, as served by Groq.
#[derive(Clone)]
pub struct GroqProvider {
    api_key: String,
    api_url: String,
    client: Client,
    chat_model: String,
    vision_model: String,
}

impl GroqProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.clone(),
            client: build_client(config.timeout)?,
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }

        let (model, user_content) = match &request.image {
            Some(image) => (
                &self.vision_model,
                json!([
                    {"type": "text", "text": request.prompt},
                    {"type": "image_url", "image_url": {"url": image_data_uri(image)}}
                ]),
            ),
            None => (&self.chat_model, json!(request.prompt)),
        };
        messages.push(json!({"role": "user", "content": user_content}));

        json!({
            "model": model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens
        })
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("API request failed: Status {}, Body: {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        if let Some(error) = response_json.get("error") {
            return Err(anyhow!("API returned error: {}", error));
        }

        response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("Invalid response format: {}", response_json))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(format!("{} (vision: {})", self.chat_model, self.vision_model))
    }
}
