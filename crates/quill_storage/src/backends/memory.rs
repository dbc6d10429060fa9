use std::sync::Arc;

use async_trait::async_trait;
use quill_core::{
    Article, ArticleFilter, ArticleId, ArticlePatch, ArticleStorage, NewArticle, Result,
    StorageConnector,
};
use tokio::sync::RwLock;

/// Process-local store. Clones share the same articles.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    articles: Arc<RwLock<Vec<Article>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records, keeping their ids and timestamps.
    pub async fn insert(&self, article: Article) {
        self.articles.write().await.push(article);
    }

    pub async fn len(&self) -> usize {
        self.articles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.articles.read().await.is_empty()
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn create(&self, article: NewArticle) -> Result<Article> {
        let article = Article::from_new(article);
        self.articles.write().await.push(article.clone());
        Ok(article)
    }

    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let articles = self.articles.read().await;
        Ok(articles.iter().find(|a| a.slug == slug).cloned())
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let articles = self.articles.read().await;
        let mut found: Vec<Article> = articles.iter().filter(|a| filter.matches(a)).cloned().collect();
        // Stable, so insertion order breaks timestamp ties.
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }

    async fn update(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>> {
        let mut articles = self.articles.write().await;
        Ok(articles.iter_mut().find(|a| a.id == id).map(|article| {
            article.apply(patch);
            article.clone()
        }))
    }

    async fn delete(&self, id: ArticleId) -> Result<bool> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|a| a.id != id);
        Ok(articles.len() != before)
    }
}

#[async_trait]
impl StorageConnector for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self) -> Result<Arc<dyn ArticleStorage>> {
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn original(slug: &str) -> NewArticle {
        NewArticle::original(
            format!("Title {}", slug),
            slug,
            "Some content",
            format!("https://beyondchats.com/blogs/{}/", slug),
        )
    }

    #[tokio::test]
    async fn test_memory_storage_crud() {
        let storage = MemoryStorage::new();
        let first = storage.create(original("first")).await.unwrap();
        let second = storage.create(original("second")).await.unwrap();

        assert_eq!(storage.find_by_slug("second").await.unwrap().unwrap().id, second.id);
        assert!(storage.find_by_slug("missing").await.unwrap().is_none());

        let listed = storage.list(&ArticleFilter::all()).await.unwrap();
        assert_eq!(listed.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(), vec!["first", "second"]);

        let patched = storage.update(first.id, ArticlePatch::mark_enhanced()).await.unwrap().unwrap();
        assert!(patched.is_enhanced);
        assert!(storage.find_by_id(first.id).await.unwrap().unwrap().is_enhanced);

        let unfiltered = storage
            .list(&ArticleFilter {
                is_enhanced: Some(false),
                ..ArticleFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(unfiltered.len(), 1);

        assert!(storage.delete(first.id).await.unwrap());
        assert!(!storage.delete(first.id).await.unwrap());
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_connector_shares_state() {
        let storage = MemoryStorage::new();
        let session = storage.connect().await.unwrap();
        session.create(original("shared")).await.unwrap();
        session.close().await.unwrap();
        assert!(storage.find_by_slug("shared").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_insert_keeps_seeded_records() {
        let storage = MemoryStorage::new();
        let recent = storage.create(original("recent")).await.unwrap();

        let mut seeded = Article::from_new(original("seeded"));
        seeded.created_at = recent.created_at - chrono::Duration::days(1);
        let seeded_id = seeded.id;
        storage.insert(seeded).await;

        assert_eq!(storage.find_by_id(seeded_id).await.unwrap().unwrap().slug, "seeded");
        let listed = storage.list(&ArticleFilter::all()).await.unwrap();
        assert_eq!(listed.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>(), vec!["seeded", "recent"]);
    }
}
