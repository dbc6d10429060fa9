use std::sync::Arc;

use quill_core::{truncate_chars, GenerationOptions, InferenceModel, Result};

/// Characters of the original article embedded in the prompt.
pub const MAX_ORIGINAL_CHARS: usize = 3000;
/// Characters of each style sample embedded in the prompt.
pub const MAX_STYLE_CHARS: usize = 800;

/// Everything the rewrite prompt is built from.
#[derive(Debug, Clone, Default)]
pub struct RewriteInput<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub style_samples: [&'a str; 2],
    /// Recorded on the stored rewrite; not shown to the model.
    pub references: &'a [String],
}

impl<'a> RewriteInput<'a> {
    pub fn new(title: &'a str, content: &'a str) -> Self {
        Self {
            title,
            content,
            ..Self::default()
        }
    }

    pub fn with_styles(mut self, first: &'a str, second: &'a str) -> Self {
        self.style_samples = [first, second];
        self
    }

    pub fn with_references(mut self, references: &'a [String]) -> Self {
        self.references = references;
        self
    }

    fn has_styles(&self) -> bool {
        self.style_samples.iter().all(|s| !s.trim().is_empty())
    }
}

pub fn build_prompt(input: &RewriteInput<'_>) -> String {
    let style_section = if input.has_styles() {
        format!(
            "REFERENCE STYLES:\n\nStyle 1 sample:\n{}\n\nStyle 2 sample:\n{}\n\n\
             TASK: Rewrite the original article keeping the SAME topic, facts, and structure.\n\
             Match the writing style, tone, and formatting of the reference styles.",
            truncate_chars(input.style_samples[0], MAX_STYLE_CHARS),
            truncate_chars(input.style_samples[1], MAX_STYLE_CHARS),
        )
    } else {
        "TASK: Rewrite this article to be highly professional, engaging, and authoritative.\n\
         Use a tone similar to top tech blogs like TechCrunch or The Verge.\n\
         Focus on clarity, flow, and persuasive writing."
            .to_string()
    };

    format!(
        "Rewrite this blog article:\n\nTITLE: {}\n\nORIGINAL CONTENT:\n{}\n\n{}\n\n\
         Return ONLY the rewritten article content (no quotes, no explanations).",
        input.title,
        truncate_chars(input.content, MAX_ORIGINAL_CHARS),
        style_section,
    )
}

/// Turns an original article into a rewritten one through an [`InferenceModel`].
#[derive(Debug, Clone)]
pub struct RewriteGenerator {
    model: Arc<dyn InferenceModel>,
    options: GenerationOptions,
}

impl RewriteGenerator {
    pub fn new(model: Arc<dyn InferenceModel>) -> Self {
        Self {
            model,
            options: GenerationOptions::default(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Returns the trimmed rewrite, or an empty string when the model produced nothing.
    pub async fn rewrite(&self, input: &RewriteInput<'_>) -> Result<String> {
        let prompt = build_prompt(input);
        tracing::debug!(chars = prompt.len(), model = self.model.name(), "Sending rewrite prompt");
        let text = self.model.complete(&prompt, &self.options).await?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingModel {
        prompts: Mutex<Vec<(String, GenerationOptions)>>,
    }

    #[async_trait]
    impl InferenceModel for RecordingModel {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
            self.prompts.lock().unwrap().push((prompt.to_string(), *options));
            Ok("  rewritten text \n".to_string())
        }
    }

    #[test]
    fn test_prompt_with_styles() {
        let style1 = "a".repeat(900);
        let style2 = "Conversational and punchy.";
        let prompt = build_prompt(&RewriteInput::new("My Title", "Original body.").with_styles(&style1, style2));

        assert!(prompt.starts_with("Rewrite this blog article:\n\nTITLE: My Title\n\nORIGINAL CONTENT:\nOriginal body.\n\n"));
        assert!(prompt.contains("REFERENCE STYLES:"));
        assert!(prompt.contains(&format!("Style 1 sample:\n{}\n\n", "a".repeat(800))));
        assert!(!prompt.contains(&"a".repeat(801)));
        assert!(prompt.contains("Style 2 sample:\nConversational and punchy."));
        assert!(prompt.contains("keeping the SAME topic, facts, and structure"));
        assert!(!prompt.contains("TechCrunch"));
        assert!(prompt.ends_with("Return ONLY the rewritten article content (no quotes, no explanations)."));
    }

    #[test]
    fn test_prompt_default_tone_when_a_style_is_missing() {
        let prompt = build_prompt(&RewriteInput::new("T", "Body").with_styles("only one sample", ""));
        assert!(!prompt.contains("REFERENCE STYLES"));
        assert!(prompt.contains("professional, engaging, and authoritative"));
        assert!(prompt.contains("TechCrunch or The Verge"));
    }

    #[test]
    fn test_prompt_truncates_original_and_hides_references() {
        let content = "é".repeat(3500);
        let refs = vec!["https://secret.example/ref".to_string()];
        let prompt = build_prompt(&RewriteInput::new("T", &content).with_references(&refs));
        assert!(prompt.contains(&"é".repeat(3000)));
        assert!(!prompt.contains(&"é".repeat(3001)));
        assert!(!prompt.contains("secret.example"));
    }

    #[tokio::test]
    async fn test_rewrite_uses_generation_options() {
        let model = Arc::new(RecordingModel::default());
        let generator = RewriteGenerator::new(model.clone());
        let text = generator.rewrite(&RewriteInput::new("T", "Body")).await.unwrap();

        assert_eq!(text, "rewritten text");
        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].1.max_tokens, 2500);
        assert!((prompts[0].1.temperature - 0.7).abs() < f32::EPSILON);
    }
}
