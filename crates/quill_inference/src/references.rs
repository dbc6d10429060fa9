use std::sync::Arc;

use quill_core::{JobLog, SearchHit, SearchProvider};

/// Results requested from the search provider per title.
pub const SEARCH_LIMIT: u32 = 5;
/// Reference links kept per article.
pub const MAX_REFERENCES: usize = 2;

pub fn search_query(title: &str) -> String {
    format!("{} blog article", title)
}

/// Keep absolute http(s) links not on `excluded_domain`, deduplicated, in ranking order.
pub fn select_references(hits: &[SearchHit], excluded_domain: &str, max: usize) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for link in hits.iter().filter_map(|h| h.link.as_deref()) {
        if links.len() == max {
            break;
        }
        if link.contains(excluded_domain) || !link.starts_with("http") {
            continue;
        }
        if !links.iter().any(|l| l == link) {
            links.push(link.to_string());
        }
    }
    links
}

/// Finds external articles on the same topic to use as style references.
#[derive(Debug, Clone)]
pub struct ReferenceFinder {
    search: Arc<dyn SearchProvider>,
    excluded_domain: String,
    max_references: usize,
}

impl ReferenceFinder {
    pub fn new(search: Arc<dyn SearchProvider>, excluded_domain: impl Into<String>) -> Self {
        Self {
            search,
            excluded_domain: excluded_domain.into(),
            max_references: MAX_REFERENCES,
        }
    }

    /// Never fails: a search error yields no references and the rewrite falls back
    /// to the default tone.
    pub async fn find(&self, title: &str, log: &JobLog) -> Vec<String> {
        match self.search.search(&search_query(title), SEARCH_LIMIT).await {
            Ok(hits) => {
                let links = select_references(&hits, &self.excluded_domain, self.max_references);
                log.info(&format!("🔎 Found {} reference links for \"{}\"", links.len(), title));
                links
            }
            Err(e) => {
                log.warn(&format!("⚠️ {} failed for \"{}\": {}", self.search.name(), title, e));
                Vec::new()
            }
        }
    }
}
