use quill_core::{Error, Result};

pub mod models;
pub mod references;
pub mod rewrite;
pub mod search;

/// Credentials and endpoints for the two external services.
#[derive(Clone, PartialEq, Eq)]
pub struct InferenceConfig {
    pub google_api_key: Option<String>,
    pub google_cx: Option<String>,
    pub sonar_api_key: Option<String>,
    pub model_name: String,
    pub search_endpoint: Option<String>,
    pub model_base_url: Option<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_cx: None,
            sonar_api_key: None,
            model_name: models::sonar::DEFAULT_MODEL.to_string(),
            search_endpoint: None,
            model_base_url: None,
        }
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("InferenceConfig")
            .field("google_api_key", &redact(&self.google_api_key))
            .field("google_cx", &self.google_cx)
            .field("sonar_api_key", &redact(&self.sonar_api_key))
            .field("model_name", &self.model_name)
            .field("search_endpoint", &self.search_endpoint)
            .field("model_base_url", &self.model_base_url)
            .finish()
    }
}

impl InferenceConfig {
    /// Names of the environment variables that are required but unset.
    pub fn missing(&self) -> Vec<&'static str> {
        let unset = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        let mut missing = Vec::new();
        if unset(&self.google_api_key) {
            missing.push("GOOGLE_API");
        }
        if unset(&self.google_cx) {
            missing.push("GOOGLE_CX");
        }
        if self.model_name != "dummy" && unset(&self.sonar_api_key) {
            missing.push("SONAR_API_KEY");
        }
        missing
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(format!("Missing {}", missing.join(", "))))
        }
    }
}

pub use models::create_model;
pub use references::ReferenceFinder;
pub use rewrite::{RewriteGenerator, RewriteInput};
pub use search::create_search;

pub mod prelude {
    pub use super::models::create_model;
    pub use super::search::create_search;
    pub use super::InferenceConfig;
    pub use quill_core::{Error, InferenceModel, Result, SearchProvider};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_names_missing_variables() {
        let config = InferenceConfig::default();
        assert_eq!(config.missing(), vec!["GOOGLE_API", "GOOGLE_CX", "SONAR_API_KEY"]);
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "Configuration error: Missing GOOGLE_API, GOOGLE_CX, SONAR_API_KEY"
        );

        let config = InferenceConfig {
            google_api_key: Some("g".to_string()),
            google_cx: Some("cx".to_string()),
            model_name: "dummy".to_string(),
            ..InferenceConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = InferenceConfig {
            google_api_key: Some("google-secret".to_string()),
            sonar_api_key: Some("sonar-secret".to_string()),
            ..InferenceConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("google-secret"));
        assert!(!debug.contains("sonar-secret"));
    }
}
