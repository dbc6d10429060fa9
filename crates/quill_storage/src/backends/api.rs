use std::sync::Arc;

use async_trait::async_trait;
use quill_core::{
    Article, ArticleFilter, ArticleId, ArticlePatch, ArticleStorage, Error, NewArticle, Result,
    StorageConnector,
};
use reqwest::{Client, Response, StatusCode};

const SERVICE: &str = "Content";

/// Storage that round-trips through the dashboard's REST API.
#[derive(Debug, Clone)]
pub struct ApiStorage {
    client: Client,
    base_url: String,
}

impl ApiStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn articles_url(&self) -> String {
        format!("{}/api/articles", self.base_url)
    }

    fn article_url(&self, id: ArticleId) -> String {
        format!("{}/api/articles/{}", self.base_url, id)
    }

    fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Error::api(SERVICE, response.status().as_u16()))
        }
    }
}

#[async_trait]
impl ArticleStorage for ApiStorage {
    async fn create(&self, article: NewArticle) -> Result<Article> {
        let response = self.client.post(self.articles_url()).json(&article).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>> {
        let response = self.client.get(self.article_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response)?.json().await?))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        let articles = self.list(&ArticleFilter::all()).await?;
        Ok(articles.into_iter().find(|a| a.slug == slug))
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let mut query = Vec::new();
        if let Some(updated) = filter.updated {
            query.push(("updated", updated.to_string()));
        }
        if let Some(is_enhanced) = filter.is_enhanced {
            query.push(("isEnhanced", is_enhanced.to_string()));
        }
        let response = self.client.get(self.articles_url()).query(&query).send().await?;
        Ok(Self::check(response)?.json().await?)
    }

    async fn update(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>> {
        let response = self.client.put(self.article_url(id)).json(&patch).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response)?.json().await?))
    }

    async fn delete(&self, id: ArticleId) -> Result<bool> {
        let response = self.client.delete(self.article_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response)?;
        Ok(true)
    }
}

#[async_trait]
impl StorageConnector for ApiStorage {
    fn name(&self) -> &str {
        "api"
    }

    async fn connect(&self) -> Result<Arc<dyn ArticleStorage>> {
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn sample() -> Article {
        Article::from_new(NewArticle::original(
            "Sample",
            "sample",
            "Body",
            "https://beyondchats.com/blogs/sample/",
        ))
    }

    #[tokio::test]
    async fn test_list_and_find_by_slug() {
        let server = MockServer::start_async().await;
        let article = sample();
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/articles");
                then.status(200).json_body(serde_json::to_value(vec![article.clone()]).unwrap());
            })
            .await;

        let storage = ApiStorage::new(server.base_url());
        let found = storage.find_by_slug("sample").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(article.id));
        assert!(storage.find_by_slug("other").await.unwrap().is_none());
        mock.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_create_posts_json() {
        let server = MockServer::start_async().await;
        let article = sample();
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/articles").body_contains("\"slug\":\"sample\"");
                then.status(201).json_body(serde_json::to_value(&article).unwrap());
            })
            .await;

        let storage = ApiStorage::new(format!("{}/", server.base_url()));
        let created = storage
            .create(NewArticle::original("Sample", "sample", "Body", "https://beyondchats.com/blogs/sample/"))
            .await
            .unwrap();
        assert_eq!(created.id, article.id);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_and_failing_requests() {
        let server = MockServer::start_async().await;
        let id = ArticleId::new();
        server
            .mock_async(|when, then| {
                when.method(GET).path(format!("/api/articles/{}", id));
                then.status(404).json_body(serde_json::json!({ "message": "Not found" }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path(format!("/api/articles/{}", id));
                then.status(500);
            })
            .await;

        let storage = ApiStorage::new(server.base_url());
        assert!(storage.find_by_id(id).await.unwrap().is_none());

        let err = storage.update(id, ArticlePatch::mark_enhanced()).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));
    }
}
