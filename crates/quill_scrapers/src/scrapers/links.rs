use quill_core::{Result, SiteConfig};
use scraper::{Html, Selector};
use url::Url;

use super::utils;

/// Candidate article found on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    pub url: String,
    pub title: String,
}

/// Pulls article links out of a listing page.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    anchors: Selector,
    origin: Url,
    marker: String,
    max_links: usize,
}

impl LinkExtractor {
    pub fn new(site: &SiteConfig, max_links: usize) -> Result<Self> {
        let css = format!(
            "article a[href*='{}'], .post-title a, h2 a, h3 a, .entry-title a",
            site.post_marker
        );
        Ok(Self {
            anchors: utils::parse_selector(&css)?,
            origin: site.origin_url()?,
            marker: site.post_marker.clone(),
            max_links,
        })
    }

    fn resolve(&self, href: &str) -> Option<Url> {
        if href.starts_with("http") {
            Url::parse(href).ok()
        } else {
            self.origin.join(href).ok()
        }
    }

    /// Unique links in document order, capped at `max_links`.
    pub fn extract(&self, html: &str) -> Vec<ArticleLink> {
        let document = Html::parse_document(html);
        let mut links: Vec<ArticleLink> = Vec::new();

        for anchor in document.select(&self.anchors) {
            if links.len() == self.max_links {
                break;
            }
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Some(url) = self.resolve(href.trim()) else {
                continue;
            };
            let title = utils::collapse_whitespace(&utils::element_text(&anchor));
            let url = url.to_string();

            if !url.contains(&self.marker) || url.contains('#') || title.is_empty() {
                continue;
            }
            if Url::parse(&url).map(|u| u.origin()).ok() != Some(self.origin.origin()) {
                continue;
            }
            if links.iter().any(|l| l.url == url) {
                continue;
            }
            links.push(ArticleLink { url, title });
        }

        links
    }
}
