use std::sync::Arc;

use quill_core::{Result, SearchProvider};

use crate::InferenceConfig;

pub mod google;

pub use google::GoogleSearch;

pub fn create_search(config: &InferenceConfig) -> Result<Arc<dyn SearchProvider>> {
    let mut search = GoogleSearch::new(config.google_api_key.clone(), config.google_cx.clone())?;
    if let Some(endpoint) = &config.search_endpoint {
        search = search.with_endpoint(endpoint);
    }
    Ok(Arc::new(search))
}
