use std::sync::Arc;
use std::time::Duration;

use quill_core::types::MIN_ENHANCEABLE_CHARS;
use quill_core::{
    truncate_chars, Article, ArticleFilter, ArticlePatch, ArticleStorage, InferenceModel, JobLog, NewArticle, Result, SearchProvider,
};
use quill_inference::{ReferenceFinder, RewriteGenerator, RewriteInput};
use tokio::time::sleep;

use crate::fetch::PageFetcher;
use crate::scrapers::StyleSampler;

#[derive(Debug, Clone)]
pub struct EnhanceConfig {
    /// Pause after each article that went through the external APIs.
    pub delay: Duration,
    pub min_source_chars: usize,
    pub min_rewrite_chars: usize,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            min_source_chars: MIN_ENHANCEABLE_CHARS,
            min_rewrite_chars: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhanceSummary {
    pub candidates: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum ArticleOutcome {
    Enhanced(Article),
    RewriteTooShort(usize),
}

/// Rewrites original articles in the style of related external posts.
#[derive(Debug, Clone)]
pub struct EnhancementManager {
    finder: ReferenceFinder,
    sampler: StyleSampler,
    rewriter: RewriteGenerator,
    config: EnhanceConfig,
}

impl EnhancementManager {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        model: Arc<dyn InferenceModel>,
        fetcher: Arc<dyn PageFetcher>,
        site_domain: impl Into<String>,
        config: EnhanceConfig,
    ) -> Self {
        Self {
            finder: ReferenceFinder::new(search, site_domain),
            sampler: StyleSampler::new(fetcher),
            rewriter: RewriteGenerator::new(model),
            config,
        }
    }

    async fn enhance_article(&self, storage: &dyn ArticleStorage, article: &Article, log: &JobLog) -> Result<ArticleOutcome> {
        let references = self.finder.find(&article.title, log).await;

        let (style1, style2) = if let [first, second] = references.as_slice() {
            log.info(&format!("🎨 Getting style from: {} & {}", first, second));
            (self.sampler.sample(first, log).await, self.sampler.sample(second, log).await)
        } else {
            log.info("ℹ️ No sufficient references found. Using default professional style.");
            (String::new(), String::new())
        };

        let input = RewriteInput::new(&article.title, &article.content)
            .with_styles(&style1, &style2)
            .with_references(&references);
        log.debug(&format!("Rewriting with {}", self.rewriter.model_name()));
        let rewritten = self.rewriter.rewrite(&input).await?;

        let length = rewritten.chars().count();
        if length < self.config.min_rewrite_chars {
            return Ok(ArticleOutcome::RewriteTooShort(length));
        }

        let created = storage.create(NewArticle::enhanced(article, rewritten, references)).await?;
        if storage.update(article.id, ArticlePatch::mark_enhanced()).await?.is_none() {
            log.warn(&format!("⚠️ Original {} disappeared before it could be marked enhanced", article.id));
        }
        Ok(ArticleOutcome::Enhanced(created))
    }

    pub async fn run(&self, storage: &dyn ArticleStorage, log: &JobLog) -> Result<EnhanceSummary> {
        log.info("🚀 Starting content enhancement...");
        let articles = storage.list(&ArticleFilter::all()).await?;
        log.info(&format!("📚 Found {} articles", articles.len()));

        let mut summary = EnhanceSummary {
            candidates: articles.len(),
            ..EnhanceSummary::default()
        };

        for article in &articles {
            if let Some(reason) = article.enhancement_skip_reason(self.config.min_source_chars) {
                log.info(&format!("⏭️ Skipping: {} ({})", article.title, reason));
                summary.skipped += 1;
                continue;
            }

            let item_log = log.with_prefix(format!("[{}]", article.slug));
            item_log.info(&format!("✍️ Processing: {}...", truncate_chars(&article.title, 50)));

            match self.enhance_article(storage, article, &item_log).await {
                Ok(ArticleOutcome::Enhanced(created)) => {
                    item_log.info(&format!(
                        "✅ SUCCESS! Saved {} chars of clean content as {}",
                        created.content.chars().count(),
                        created.slug
                    ));
                    summary.processed += 1;
                }
                Ok(ArticleOutcome::RewriteTooShort(length)) => {
                    item_log.warn(&format!("⚠️ Rewrite failed or too short ({} chars)", length));
                    summary.failed += 1;
                }
                Err(e) => {
                    item_log.error(&format!("❌ Error: {}", e));
                    summary.failed += 1;
                }
            }

            sleep(self.config.delay).await;
        }

        log.info(&format!(
            "✨ Enhancement complete! Processed {}/{} articles",
            summary.processed, summary.candidates
        ));
        Ok(summary)
    }
}
