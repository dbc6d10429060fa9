use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// Suffix appended to the title of an AI rewrite.
pub const ENHANCED_TITLE_SUFFIX: &str = " (AI Enhanced)";
/// Suffix appended to the slug of an AI rewrite.
pub const ENHANCED_SLUG_SUFFIX: &str = "-enhanced";
/// Originals shorter than this are never sent for rewriting.
pub const MIN_ENHANCEABLE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(Uuid);

impl ArticleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArticleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ArticleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| Error::NotFound(format!("invalid article id: {}", s)))
    }
}

/// A persisted article, either scraped from the source blog or generated by a rewrite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub source_url: Option<String>,
    /// True only on records produced by the enhancement job.
    pub updated: bool,
    /// Set on an original once its rewrite exists.
    pub is_enhanced: bool,
    pub references: Vec<String>,
    /// The original this rewrite was generated from.
    pub original_id: Option<ArticleId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    EnhancedRecord,
    AlreadyEnhanced,
    MissingContent,
    ContentTooShort(usize),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EnhancedRecord => write!(f, "record is itself a rewrite"),
            SkipReason::AlreadyEnhanced => write!(f, "already enhanced"),
            SkipReason::MissingContent => write!(f, "no content"),
            SkipReason::ContentTooShort(len) => write!(f, "content too short ({} chars)", len),
        }
    }
}

impl Article {
    pub fn from_new(new: NewArticle) -> Self {
        let now = Utc::now();
        Self {
            id: ArticleId::new(),
            title: new.title,
            slug: new.slug,
            content: new.content,
            source_url: new.source_url,
            updated: new.updated,
            is_enhanced: new.is_enhanced,
            references: new.references,
            original_id: new.original_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, patch: ArticlePatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(slug) = patch.slug {
            self.slug = slug;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(source_url) = patch.source_url {
            self.source_url = Some(source_url);
        }
        if let Some(is_enhanced) = patch.is_enhanced {
            self.is_enhanced = is_enhanced;
        }
        if let Some(references) = patch.references {
            self.references = references;
        }
        self.updated_at = Utc::now();
    }

    /// Returns why this record must not be handed to the rewrite pipeline, if anything.
    pub fn enhancement_skip_reason(&self, min_chars: usize) -> Option<SkipReason> {
        if self.updated {
            return Some(SkipReason::EnhancedRecord);
        }
        if self.is_enhanced {
            return Some(SkipReason::AlreadyEnhanced);
        }
        if self.content.trim().is_empty() {
            return Some(SkipReason::MissingContent);
        }
        let len = self.content.chars().count();
        if len < min_chars {
            return Some(SkipReason::ContentTooShort(len));
        }
        None
    }
}

/// Input for creating an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub updated: bool,
    #[serde(default)]
    pub is_enhanced: bool,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub original_id: Option<ArticleId>,
}

impl NewArticle {
    pub fn original(
        title: impl Into<String>,
        slug: impl Into<String>,
        content: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            content: content.into(),
            source_url: Some(source_url.into()),
            updated: false,
            is_enhanced: false,
            references: Vec::new(),
            original_id: None,
        }
    }

    /// Builds the rewrite record for `original`, linked back to it by id.
    pub fn enhanced(original: &Article, content: impl Into<String>, references: Vec<String>) -> Self {
        Self {
            title: format!("{}{}", original.title, ENHANCED_TITLE_SUFFIX),
            slug: format!("{}{}", original.slug, ENHANCED_SLUG_SUFFIX),
            content: content.into(),
            source_url: original.source_url.clone(),
            updated: true,
            is_enhanced: false,
            references,
            original_id: Some(original.id),
        }
    }
}

/// Partial update. `updated` and `originalId` describe provenance and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enhanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
}

impl ArticlePatch {
    pub fn mark_enhanced() -> Self {
        Self {
            is_enhanced: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enhanced: Option<bool>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn originals() -> Self {
        Self {
            updated: Some(false),
            ..Self::default()
        }
    }

    pub fn enhanced() -> Self {
        Self {
            updated: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        self.updated.map_or(true, |u| article.updated == u)
            && self.is_enhanced.map_or(true, |e| article.is_enhanced == e)
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub total: usize,
    pub originals: usize,
    pub enhanced: usize,
    pub references: usize,
    /// Share of enhanced records among all records, in percent.
    pub enhancement_rate: f64,
}

impl ArticleStats {
    pub fn from_articles(articles: &[Article]) -> Self {
        let total = articles.len();
        let enhanced = articles.iter().filter(|a| a.updated).count();
        let references = articles.iter().map(|a| a.references.len()).sum();
        let enhancement_rate = if total > 0 {
            (enhanced as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            total,
            originals: total - enhanced,
            enhanced,
            references,
            enhancement_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn original() -> Article {
        Article::from_new(NewArticle::original(
            "Chatbots in Healthcare",
            "chatbots-in-healthcare",
            "x".repeat(400),
            "https://beyondchats.com/blogs/chatbots-in-healthcare/",
        ))
    }

    #[test]
    fn test_enhanced_record_links_to_original() {
        let original = original();
        let refs = vec![
            "https://example.com/a".to_string(),
            "https://example.org/b".to_string(),
        ];
        let enhanced = Article::from_new(NewArticle::enhanced(&original, "rewritten", refs));

        assert!(enhanced.updated);
        assert!(!enhanced.is_enhanced);
        assert_eq!(enhanced.references.len(), 2);
        assert_eq!(enhanced.source_url, original.source_url);
        assert_eq!(enhanced.original_id, Some(original.id));
        assert_eq!(enhanced.title, "Chatbots in Healthcare (AI Enhanced)");
        assert_eq!(enhanced.slug, "chatbots-in-healthcare-enhanced");
    }

    #[test]
    fn test_skip_reasons() {
        let mut article = original();
        assert_eq!(article.enhancement_skip_reason(MIN_ENHANCEABLE_CHARS), None);

        article.is_enhanced = true;
        assert_eq!(
            article.enhancement_skip_reason(MIN_ENHANCEABLE_CHARS),
            Some(SkipReason::AlreadyEnhanced)
        );

        article.is_enhanced = false;
        article.content = "short".to_string();
        assert_eq!(
            article.enhancement_skip_reason(MIN_ENHANCEABLE_CHARS),
            Some(SkipReason::ContentTooShort(5))
        );

        article.content = String::new();
        assert_eq!(
            article.enhancement_skip_reason(MIN_ENHANCEABLE_CHARS),
            Some(SkipReason::MissingContent)
        );

        let enhanced = Article::from_new(NewArticle::enhanced(&original(), "y".repeat(600), vec![]));
        assert_eq!(
            enhanced.enhancement_skip_reason(MIN_ENHANCEABLE_CHARS),
            Some(SkipReason::EnhancedRecord)
        );
    }

    #[test]
    fn test_patch_keeps_provenance() {
        let mut article = original();
        let created = article.created_at;
        article.apply(ArticlePatch::mark_enhanced());
        assert!(article.is_enhanced);
        assert!(!article.updated);
        assert_eq!(article.created_at, created);
        assert_eq!(article.title, "Chatbots in Healthcare");
    }

    #[test]
    fn test_article_json_uses_camel_case() {
        let article = original();
        let json = serde_json::to_value(&article).unwrap();
        assert!(json.get("sourceUrl").is_some());
        assert!(json.get("isEnhanced").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["updated"], false);
    }

    #[test]
    fn test_new_article_defaults() {
        let new: NewArticle =
            serde_json::from_str(r#"{"title":"T","slug":"t","content":"body"}"#).unwrap();
        assert!(!new.updated);
        assert!(new.references.is_empty());
        assert!(new.original_id.is_none());
    }

    #[test]
    fn test_filter_and_stats() {
        let original = original();
        let enhanced = Article::from_new(NewArticle::enhanced(
            &original,
            "z".repeat(600),
            vec!["https://a.com".into(), "https://b.com".into()],
        ));
        let articles = vec![original.clone(), enhanced.clone()];

        assert!(ArticleFilter::originals().matches(&original));
        assert!(!ArticleFilter::originals().matches(&enhanced));
        assert!(ArticleFilter::all().matches(&enhanced));

        let stats = ArticleStats::from_articles(&articles);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.originals, 1);
        assert_eq!(stats.enhanced, 1);
        assert_eq!(stats.references, 2);
        assert!((stats.enhancement_rate - 50.0).abs() < f64::EPSILON);

        assert_eq!(ArticleStats::from_articles(&[]).enhancement_rate, 0.0);
    }

    #[test]
    fn test_article_id_parse() {
        let id = ArticleId::new();
        assert_eq!(id.to_string().parse::<ArticleId>().unwrap(), id);
        assert!("not-a-uuid".parse::<ArticleId>().is_err());
    }
}
