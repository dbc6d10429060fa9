use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Sampling knobs passed with every generation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2500,
            temperature: 0.7,
        }
    }
}

#[async_trait]
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Send a single user prompt and return the generated text, trimmed.
    /// An empty string means the response carried no usable content.
    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl SearchHit {
    pub fn link(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            title: None,
        }
    }
}

#[async_trait]
pub trait SearchProvider: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Run a web search returning at most `limit` hits in ranking order.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>>;
}
