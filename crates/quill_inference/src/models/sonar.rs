use std::fmt;

use async_trait::async_trait;
use quill_core::{Error, GenerationOptions, InferenceModel, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "sonar-pro";

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-style chat-completions client, pointed at Perplexity Sonar by default.
pub struct SonarModel {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl SonarModel {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("Sonar API key is required".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Debug for SonarModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonarModel")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl InferenceModel for SonarModel {
    fn name(&self) -> &str {
        "Sonar"
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::api(self.name(), response.status().as_u16()));
        }

        let body = response.json::<ChatResponse>().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[test]
    fn test_model_requires_api_key() {
        let result = SonarModel::new(None);
        assert_eq!(
            result.unwrap_err().to_string(),
            "Configuration error: Sonar API key is required"
        );
        assert!(SonarModel::new(Some("  ".to_string())).is_err());
        assert!(SonarModel::new(Some("test-key".to_string())).is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let model = SonarModel::new(Some("secret-key".to_string())).unwrap();
        let debug = format!("{:?}", model);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("sonar-pro"));
    }

    #[tokio::test]
    async fn test_complete_sends_fixed_parameters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .json_body(json!({
                        "model": "sonar-pro",
                        "messages": [{ "role": "user", "content": "Rewrite this" }],
                        "max_tokens": 2500,
                        "temperature": 0.7
                    }));
                then.status(200).json_body(json!({
                    "choices": [{ "message": { "role": "assistant", "content": "  Fresh copy \n" } }]
                }));
            })
            .await;

        let model = SonarModel::new(Some("test-key".to_string()))
            .unwrap()
            .with_base_url(server.base_url());
        let text = model.complete("Rewrite this", &GenerationOptions::default()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Fresh copy");
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let model = SonarModel::new(Some("k".to_string())).unwrap().with_base_url(server.base_url());
        assert_eq!(model.complete("x", &GenerationOptions::default()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_complete_reports_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).body("unauthorized");
            })
            .await;

        let model = SonarModel::new(Some("k".to_string())).unwrap().with_base_url(server.base_url());
        let err = model.complete("x", &GenerationOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));
        assert_eq!(err.to_string(), "Sonar API failed: 401");
    }
}
