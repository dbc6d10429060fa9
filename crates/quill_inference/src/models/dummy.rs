use std::fmt;

use quill_core::{GenerationOptions, InferenceModel, Result};

/// Offline model: answers with the article body embedded in the prompt, so the
/// enhancement job can be exercised without credentials.
pub struct DummyModel;

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel").finish()
    }
}

impl DummyModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl InferenceModel for DummyModel {
    fn name(&self) -> &str {
        "Dummy"
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let body = prompt
            .split_once("ORIGINAL CONTENT:\n")
            .map(|(_, rest)| {
                ["\n\nREFERENCE STYLES:", "\n\nTASK:"]
                    .iter()
                    .filter_map(|marker| rest.find(marker))
                    .min()
                    .map_or(rest, |end| &rest[..end])
            })
            .unwrap_or(prompt);
        // Roughly four characters per token.
        let limit = options.max_tokens as usize * 4;
        Ok(body.chars().take(limit).collect::<String>().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dummy_model_echoes_original_content() {
        let model = DummyModel::new();
        let prompt = "Rewrite this blog article:\n\nTITLE: T\n\nORIGINAL CONTENT:\nFirst paragraph.\n\nSecond.\n\nTASK: do it";
        let text = model.complete(prompt, &GenerationOptions::default()).await.unwrap();
        assert_eq!(text, "First paragraph.\n\nSecond.");
    }

    #[tokio::test]
    async fn test_dummy_model_respects_token_cap() {
        let model = DummyModel::new();
        let options = GenerationOptions {
            max_tokens: 2,
            temperature: 0.0,
        };
        let text = model.complete("abcdefghijkl", &options).await.unwrap();
        assert_eq!(text, "abcdefgh");
    }
}
