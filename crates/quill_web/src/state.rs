use std::sync::Arc;

use quill_core::ArticleStorage;
use quill_scrapers::JobRunner;

/// Shared by every handler: a long-lived storage session for the content
/// routes and the job runner for the script routes.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ArticleStorage>,
    pub jobs: Arc<JobRunner>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ArticleStorage>, jobs: JobRunner) -> Self {
        Self {
            storage,
            jobs: Arc::new(jobs),
        }
    }
}
