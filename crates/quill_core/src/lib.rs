pub mod config;
pub mod error;
pub mod joblog;
pub mod models;
pub mod storage;
pub mod text;
pub mod types;

pub use config::SiteConfig;
pub use error::{Error, Result};
pub use joblog::JobLog;
pub use models::{GenerationOptions, InferenceModel, SearchHit, SearchProvider};
pub use storage::{with_storage, ArticleStorage, StorageConnector};
pub use text::truncate_chars;
pub use types::{Article, ArticleFilter, ArticleId, ArticlePatch, ArticleStats, NewArticle, SkipReason};

pub mod prelude {
    pub use super::{Article, ArticleStorage, Error, NewArticle, Result};
}
