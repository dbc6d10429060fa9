use quill_core::{Result, SiteConfig};
use scraper::{Html, Selector};

use super::utils;

/// Reads the pagination controls of a listing page.
#[derive(Debug, Clone)]
pub struct ListingDiscoverer {
    pagination: Selector,
}

impl ListingDiscoverer {
    pub fn new(site: &SiteConfig) -> Result<Self> {
        Ok(Self {
            pagination: utils::parse_selector(&site.pagination_selector)?,
        })
    }

    /// Highest page number among the pagination controls, or 1 when there are none.
    pub fn last_page(&self, html: &str) -> u32 {
        let document = Html::parse_document(html);
        document
            .select(&self.pagination)
            .filter_map(|el| leading_number(utils::element_text(&el).trim()))
            .max()
            .unwrap_or(1)
    }
}

fn leading_number(text: &str) -> Option<u32> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
