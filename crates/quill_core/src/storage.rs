use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{Article, ArticleFilter, ArticleId, ArticlePatch, NewArticle};
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Persist a new article and return it with its assigned id and timestamps.
    async fn create(&self, article: NewArticle) -> Result<Article>;

    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>>;

    /// Articles matching `filter`, oldest first.
    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>>;

    /// Apply `patch` in place. Returns `None` when no article has that id.
    async fn update(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>>;

    /// Returns `false` when no article has that id.
    async fn delete(&self, id: ArticleId) -> Result<bool>;

    /// Release the underlying connection.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Opens a storage session for the duration of one batch run.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    fn name(&self) -> &str;

    async fn connect(&self) -> Result<Arc<dyn ArticleStorage>>;
}

/// Runs `job` against a freshly opened session and closes it on every exit path.
pub async fn with_storage<F, Fut, T>(connector: &dyn StorageConnector, job: F) -> Result<T>
where
    F: FnOnce(Arc<dyn ArticleStorage>) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let storage = connector.connect().await?;
    let result = job(storage.clone()).await;
    if let Err(e) = storage.close().await {
        tracing::warn!("⚠️ Failed to close {} storage: {}", connector.name(), e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingStorage {
        closed: AtomicUsize,
    }

    #[async_trait]
    impl ArticleStorage for CountingStorage {
        async fn create(&self, article: NewArticle) -> Result<Article> {
            Ok(Article::from_new(article))
        }

        async fn find_by_id(&self, _id: ArticleId) -> Result<Option<Article>> {
            Ok(None)
        }

        async fn find_by_slug(&self, _slug: &str) -> Result<Option<Article>> {
            Ok(None)
        }

        async fn list(&self, _filter: &ArticleFilter) -> Result<Vec<Article>> {
            Ok(Vec::new())
        }

        async fn update(&self, _id: ArticleId, _patch: ArticlePatch) -> Result<Option<Article>> {
            Ok(None)
        }

        async fn delete(&self, _id: ArticleId) -> Result<bool> {
            Ok(false)
        }

        async fn close(&self) -> Result<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Connector(Arc<CountingStorage>);

    #[async_trait]
    impl StorageConnector for Connector {
        fn name(&self) -> &str {
            "counting"
        }

        async fn connect(&self) -> Result<Arc<dyn ArticleStorage>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_with_storage_closes_on_success_and_failure() {
        let storage = Arc::new(CountingStorage::default());
        let connector = Connector(storage.clone());

        let ok = with_storage(&connector, |s| async move { s.list(&ArticleFilter::all()).await }).await;
        assert!(ok.is_ok());
        assert_eq!(storage.closed.load(Ordering::SeqCst), 1);

        let failed: Result<()> =
            with_storage(&connector, |_| async { Err(Error::Scraping("boom".to_string())) }).await;
        assert!(failed.is_err());
        assert_eq!(storage.closed.load(Ordering::SeqCst), 2);
    }
}
