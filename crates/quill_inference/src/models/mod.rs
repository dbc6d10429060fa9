use std::sync::Arc;

use quill_core::{Error, InferenceModel, Result};

use crate::InferenceConfig;

pub mod dummy;
pub mod sonar;

pub use dummy::DummyModel;
pub use sonar::SonarModel;

/// Build the generation model named in `config`. `dummy` needs no credentials.
pub fn create_model(config: &InferenceConfig) -> Result<Arc<dyn InferenceModel>> {
    match config.model_name.as_str() {
        "dummy" => Ok(Arc::new(DummyModel::new())),
        name if name.starts_with("sonar") => {
            let mut model = SonarModel::new(config.sonar_api_key.clone())?.with_model(name);
            if let Some(base_url) = &config.model_base_url {
                model = model.with_base_url(base_url);
            }
            Ok(Arc::new(model))
        }
        other => Err(Error::Config(format!("unknown model: {}", other))),
    }
}
