use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use quill_core::{
    Article, ArticleFilter, ArticleId, ArticlePatch, ArticleStorage, Error, NewArticle, Result,
    StorageConnector,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tokio::sync::OnceCell;

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        slug TEXT NOT NULL,
        content TEXT NOT NULL,
        source_url TEXT,
        updated INTEGER NOT NULL DEFAULT 0,
        is_enhanced INTEGER NOT NULL DEFAULT 0,
        refs TEXT NOT NULL DEFAULT '[]',
        original_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_slug ON articles (slug)",
    // Add future migrations here
];

const SELECT_COLUMNS: &str = "id, title, slug, content, source_url, updated, is_enhanced, refs, \
                              original_id, created_at, updated_at";

fn db_err(context: &str, e: sqlx::Error) -> Error {
    Error::Database(format!("{}: {}", context, e))
}

fn timestamp(at: &DateTime<Utc>) -> String {
    // Fixed width so lexical order matches chronological order.
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date {}: {}", raw, e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    let id: String = row.get("id");
    let refs: String = row.get("refs");
    let original_id: Option<String> = row.get("original_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Article {
        id: id.parse()?,
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        source_url: row.get("source_url"),
        updated: row.get("updated"),
        is_enhanced: row.get("is_enhanced"),
        references: serde_json::from_str(&refs)?,
        original_id: original_id.map(|id| id.parse()).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:")
}

#[derive(Debug, Clone)]
pub struct SQLiteStorage {
    pool: Arc<SqlitePool>,
    /// Set on shared in-memory sessions, whose data lives only as long as the pool.
    keep_open: bool,
}

impl SQLiteStorage {
    /// Connect to `url` (e.g. `sqlite://articles.db` or `sqlite::memory:`), creating the file
    /// and schema when missing.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| db_err("Invalid database url", e))?
            .create_if_missing(true);

        // Each in-memory connection is its own database, so keep exactly one alive.
        let pool_options = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| db_err("Failed to connect to database", e))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| db_err(&format!("Failed to run migration {}", i), e))?;
        }

        Ok(Self {
            pool: Arc::new(pool),
            keep_open: false,
        })
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Article>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM articles WHERE {} = ? ORDER BY created_at ASC, rowid ASC LIMIT 1",
            SELECT_COLUMNS, clause
        ))
        .bind(value)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| db_err("Failed to load article", e))?;

        row.as_ref().map(row_to_article).transpose()
    }
}

#[async_trait]
impl ArticleStorage for SQLiteStorage {
    async fn create(&self, article: NewArticle) -> Result<Article> {
        let article = Article::from_new(article);
        let refs = serde_json::to_string(&article.references)?;

        sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, slug, content, source_url, updated, is_enhanced, refs, original_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(article.source_url.as_deref())
        .bind(article.updated)
        .bind(article.is_enhanced)
        .bind(refs)
        .bind(article.original_id.map(|id| id.to_string()))
        .bind(timestamp(&article.created_at))
        .bind(timestamp(&article.updated_at))
        .execute(&*self.pool)
        .await
        .map_err(|e| db_err("Failed to store article", e))?;

        Ok(article)
    }

    async fn find_by_id(&self, id: ArticleId) -> Result<Option<Article>> {
        self.fetch_one_where("id", &id.to_string()).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>> {
        self.fetch_one_where("slug", slug).await
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>> {
        let mut clauses = Vec::new();
        if filter.updated.is_some() {
            clauses.push("updated = ?");
        }
        if filter.is_enhanced.is_some() {
            clauses.push("is_enhanced = ?");
        }
        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM articles {} ORDER BY created_at ASC, rowid ASC",
            SELECT_COLUMNS, where_clause
        );
        let mut query = sqlx::query(&sql);
        if let Some(updated) = filter.updated {
            query = query.bind(updated);
        }
        if let Some(is_enhanced) = filter.is_enhanced {
            query = query.bind(is_enhanced);
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| db_err("Failed to list articles", e))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn update(&self, id: ArticleId, patch: ArticlePatch) -> Result<Option<Article>> {
        let Some(mut article) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        article.apply(patch);
        let refs = serde_json::to_string(&article.references)?;

        sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, slug = ?, content = ?, source_url = ?, is_enhanced = ?, refs = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&article.title)
        .bind(&article.slug)
        .bind(&article.content)
        .bind(article.source_url.as_deref())
        .bind(article.is_enhanced)
        .bind(refs)
        .bind(timestamp(&article.updated_at))
        .bind(article.id.to_string())
        .execute(&*self.pool)
        .await
        .map_err(|e| db_err("Failed to update article", e))?;

        Ok(Some(article))
    }

    async fn delete(&self, id: ArticleId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?")
            .bind(id.to_string())
            .execute(&*self.pool)
            .await
            .map_err(|e| db_err("Failed to delete article", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) -> Result<()> {
        if self.keep_open {
            return Ok(());
        }
        self.pool.close().await;
        Ok(())
    }
}

/// Opens a new pool per batch run. In-memory urls share one pool across all sessions
/// of this connector.
#[derive(Debug, Clone)]
pub struct SQLiteConnector {
    url: String,
    shared: Arc<OnceCell<SQLiteStorage>>,
}

impl SQLiteConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            shared: Arc::new(OnceCell::new()),
        }
    }
}

#[async_trait]
impl StorageConnector for SQLiteConnector {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn connect(&self) -> Result<Arc<dyn ArticleStorage>> {
        if !is_in_memory(&self.url) {
            return Ok(Arc::new(SQLiteStorage::connect(&self.url).await?));
        }
        let storage = self
            .shared
            .get_or_try_init(|| async {
                let storage = SQLiteStorage::connect(&self.url).await?;
                Ok::<_, Error>(SQLiteStorage {
                    keep_open: true,
                    ..storage
                })
            })
            .await?;
        Ok(Arc::new(storage.clone()))
    }
}
