pub mod cli;
pub mod enhance;
pub mod fetch;
pub mod jobs;
pub mod manager;
pub mod scrapers;

pub use cli::{handle_command, EnhanceArgs, JobCommands, ScrapeArgs};
pub use enhance::{EnhanceConfig, EnhanceSummary, EnhancementManager};
pub use fetch::{HttpFetcher, PageFetcher};
pub use jobs::{EnhanceServices, JobFailure, JobKind, JobReport, JobRunner};
pub use manager::{ScrapeConfig, ScrapeSummary, ScraperManager, ThinContentPolicy};

pub mod prelude {
    pub use super::fetch::{HttpFetcher, PageFetcher};
    pub use super::jobs::{JobKind, JobRunner};
    pub use quill_core::{Article, Error, Result};
}
