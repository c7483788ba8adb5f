use crate::config::ProviderConfig;
use crate::providers::traits::{CompletionProvider, CompletionRequest};
use crate::providers::utils::{build_client, encode_image};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

#[derive(Clone)]
pub struct GeminiProvider {
    api_key: String,
    api_url: String,
    client: Client,
    chat_model: String,
    vision_model: String,
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            api_key: config.api_key.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client: build_client(config.timeout)?,
            chat_model: config.chat_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    fn build_body(request: &CompletionRequest) -> Value {
        let mut parts = vec![json!({"text": request.prompt})];
        if let Some(image) = &request.image {
            parts.push(json!({
                "inline_data": {"mime_type": "image/jpeg", "data": encode_image(image)}
            }));
        }

        let mut body = json!({
            "contents": [{"role": "user", "parts": parts}],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens
            }
        });
        if let Some(system) = &request.system {
            body["systemInstruction"] = json!({"parts": [{"text": system}]});
        }
        body
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let model = if request.image.is_some() {
            &self.vision_model
        } else {
            &self.chat_model
        };
        let url = format!("{}/{}:generateContent", self.api_url, model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("API request failed: Status {}, Body: {}", status, error_text));
        }

        let response_json: Value = response.json().await?;

        response_json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("Invalid response format"))
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(format!("{} (vision: {})", self.chat_model, self.vision_model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn reads_first_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/gemini-2.0-flash:generateContent"))
            .and(query_param("key", "g-key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "persona"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "**Great** choice"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ProviderConfig::defaults(ProviderKind::Gemini, "g-key".to_string());
        config.api_url = server.uri();
        let provider = GeminiProvider::new(&config).unwrap();

        let request = CompletionRequest::text("rate this").with_system("persona");
        assert_eq!(provider.complete(&request).await.unwrap(), "**Great** choice");
    }

    #[test]
    fn image_goes_inline() {
        let request = CompletionRequest::text("look").with_image(b"abc".to_vec());
        let body = GeminiProvider::build_body(&request);
        assert_eq!(body["contents"][0]["parts"][1]["inline_data"]["data"], "YWJj");
        assert!(body.get("systemInstruction").is_none());
    }
}
