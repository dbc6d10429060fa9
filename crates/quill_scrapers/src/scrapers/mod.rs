use quill_core::{Error, Result};
use scraper::{ElementRef, Html, Selector};

pub mod content;
pub mod links;
pub mod listing;
pub mod style;

pub use content::{ContentExtractor, ExtractedArticle, ExtractedBody, ExtractionStrategy};
pub use links::{ArticleLink, LinkExtractor};
pub use listing::ListingDiscoverer;
pub use style::StyleSampler;

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;

    pub fn parse_selector(css: &str) -> Result<Selector> {
        Selector::parse(css).map_err(|e| Error::Scraping(format!("Invalid selector {:?}: {}", css, e)))
    }

    pub fn element_text(element: &ElementRef<'_>) -> String {
        element.text().collect::<String>()
    }

    /// Detach every element matching `selector` from the document.
    pub fn remove_matching(document: &mut Html, selector: &Selector) -> usize {
        let ids: Vec<_> = document.select(selector).map(|el| el.id()).collect();
        for id in &ids {
            if let Some(mut node) = document.tree.get_mut(*id) {
                node.detach();
            }
        }
        ids.len()
    }

    pub fn collapse_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}
