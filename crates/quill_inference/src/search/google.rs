use std::fmt;

use async_trait::async_trait;
use quill_core::{Error, Result, SearchHit, SearchProvider};
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Google Programmable Search (Custom Search JSON API) client.
pub struct GoogleSearch {
    client: Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleSearch {
    pub fn new(api_key: Option<String>, engine_id: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("Google search API key is required".to_string()))?;
        let engine_id = engine_id
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| Error::Config("Google search engine id is required".to_string()))?;
        Ok(Self {
            client: Client::new(),
            api_key,
            engine_id,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl fmt::Debug for GoogleSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleSearch")
            .field("api_key", &"<redacted>")
            .field("engine_id", &self.engine_id)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        "Google search"
    }

    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>> {
        let num = limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message);
            return Err(Error::Api {
                service: self.name().to_string(),
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str::<SearchResponse>(&body)?.items)
    }
}
