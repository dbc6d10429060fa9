use std::sync::Arc;
use std::time::Duration;

use quill_core::{truncate_chars, Article, ArticleStorage, JobLog, NewArticle, Result, SiteConfig};
use tokio::time::sleep;
use url::Url;

use crate::fetch::PageFetcher;
use crate::scrapers::{ArticleLink, ContentExtractor, LinkExtractor, ListingDiscoverer};

/// What to do with a page whose body came out too thin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinContentPolicy {
    /// Store the record with the fixed placeholder as its content.
    #[default]
    Placeholder,
    Skip,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub max_links: usize,
    /// Pause between consecutive link visits.
    pub delay: Duration,
    /// Stop after this many saves; `None` processes every candidate.
    pub max_saves: Option<usize>,
    pub thin_content: ThinContentPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_links: 10,
            delay: Duration::from_secs(1),
            max_saves: Some(1),
            thin_content: ThinContentPolicy::Placeholder,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub candidates: usize,
    pub visited: usize,
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug)]
enum LinkOutcome {
    Saved(Article),
    Duplicate,
    Thin,
}

/// Slug for an article URL: its last non-empty path segment, or `article-{index}`.
pub fn slug_from_url(url: &str, index: usize) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| format!("article-{}", index))
}

/// Sequential scrape of the oldest listing page into storage.
#[derive(Debug)]
pub struct ScraperManager {
    fetcher: Arc<dyn PageFetcher>,
    site: SiteConfig,
    config: ScrapeConfig,
    discoverer: ListingDiscoverer,
    links: LinkExtractor,
    extractor: ContentExtractor,
}

impl ScraperManager {
    pub fn new(fetcher: Arc<dyn PageFetcher>, site: SiteConfig, config: ScrapeConfig) -> Result<Self> {
        Ok(Self {
            discoverer: ListingDiscoverer::new(&site)?,
            links: LinkExtractor::new(&site, config.max_links)?,
            extractor: ContentExtractor::new(site.fallback_title.clone())?,
            fetcher,
            site,
            config,
        })
    }

    /// Fetches the listing, jumps to its last page and returns the candidate links there.
    pub async fn discover(&self, log: &JobLog) -> Result<Vec<ArticleLink>> {
        let listing_url = self.site.listing_url();
        log.info("📋 Getting blog listing...");
        let listing_html = self.fetcher.fetch(&listing_url).await?;
        let last_page = self.discoverer.last_page(&listing_html);

        let page_url = self.site.page_url(last_page);
        log.info(&format!("📖 Scraping oldest articles from page {}: {}", last_page, page_url));
        let page_html = if page_url == listing_url {
            listing_html
        } else {
            self.fetcher.fetch(&page_url).await?
        };

        let links = self.links.extract(&page_html);
        log.info(&format!("🔗 Found {} article links", links.len()));
        for (i, link) in links.iter().enumerate() {
            log.info(&format!("  {}. {} → {}", i + 1, truncate_chars(&link.title, 60), link.url));
        }
        Ok(links)
    }

    async fn process_link(
        &self,
        storage: &dyn ArticleStorage,
        link: &ArticleLink,
        index: usize,
        log: &JobLog,
    ) -> Result<LinkOutcome> {
        let html = self.fetcher.fetch(&link.url).await?;
        let extracted = self.extractor.extract(&html);

        let slug = slug_from_url(&link.url, index);
        if storage.find_by_slug(&slug).await?.is_some() {
            return Ok(LinkOutcome::Duplicate);
        }

        if !extracted.is_complete() {
            log.warn("⚠️ Content extraction came up short");
            if self.config.thin_content == ThinContentPolicy::Skip {
                return Ok(LinkOutcome::Thin);
            }
        }

        let article = storage
            .create(NewArticle::original(
                extracted.title.clone(),
                slug,
                extracted.content(),
                link.url.clone(),
            ))
            .await?;
        Ok(LinkOutcome::Saved(article))
    }

    pub async fn run(&self, storage: &dyn ArticleStorage, log: &JobLog) -> Result<ScrapeSummary> {
        log.info(&format!("🚀 Starting scraper for {}", self.site.origin));
        let links = self.discover(log).await?;
        let mut summary = ScrapeSummary {
            candidates: links.len(),
            ..ScrapeSummary::default()
        };

        for (index, link) in links.iter().enumerate() {
            if index > 0 {
                sleep(self.config.delay).await;
            }
            let item_log = log.with_prefix(format!("[{}/{}]", index + 1, links.len()));
            item_log.info(&format!("📄 Extracting: {}", truncate_chars(&link.title, 60)));
            summary.visited += 1;

            match self.process_link(storage, link, index, &item_log).await {
                Ok(LinkOutcome::Saved(article)) => {
                    item_log.info(&format!("💾 Saved! ({} chars)", article.content.chars().count()));
                    summary.saved += 1;
                    if self.config.max_saves.is_some_and(|max| summary.saved >= max) {
                        break;
                    }
                }
                Ok(LinkOutcome::Duplicate) => {
                    item_log.info("⏭️ Already exists, skipping");
                    summary.skipped += 1;
                }
                Ok(LinkOutcome::Thin) => {
                    item_log.info("⏭️ Not enough content, skipping");
                    summary.skipped += 1;
                }
                Err(e) => {
                    item_log.warn(&format!("❌ Failed {}: {}", link.url, e));
                    summary.failed += 1;
                }
            }
        }

        log.info(&format!(
            "✨ Complete! Saved {}/{} full articles",
            summary.saved, summary.candidates
        ));
        Ok(summary)
    }
}
