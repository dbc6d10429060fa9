use url::Url;

use crate::{Error, Result};

/// Where the source blog lives and how its markup identifies posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Scheme and host, without trailing slash, e.g. `https://beyondchats.com`.
    pub origin: String,
    /// Path of the blog index, e.g. `/blogs/`.
    pub listing_path: String,
    /// Substring every post URL contains.
    pub post_marker: String,
    /// Selector for numbered pagination links on the index.
    pub pagination_selector: String,
    /// Title used when no heading on the article page qualifies.
    pub fallback_title: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://beyondchats.com".to_string(),
            listing_path: "/blogs/".to_string(),
            post_marker: "/blogs/".to_string(),
            pagination_selector: "a.page-numbers".to_string(),
            fallback_title: "BeyondChats Article".to_string(),
        }
    }
}

impl SiteConfig {
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    pub fn origin_url(&self) -> Result<Url> {
        Url::parse(&self.origin).map_err(|e| Error::InvalidUrl(format!("{}: {}", self.origin, e)))
    }

    pub fn listing_url(&self) -> String {
        format!("{}{}", self.origin, self.listing_path)
    }

    /// URL of a numbered listing page. Page 1 is the index itself.
    pub fn page_url(&self, page: u32) -> String {
        if page <= 1 {
            return self.listing_url();
        }
        let listing = self.listing_url();
        let sep = if listing.ends_with('/') { "" } else { "/" };
        format!("{}{}page/{}/", listing, sep, page)
    }

    /// Host of the origin, used to keep the site itself out of search references.
    pub fn domain(&self) -> String {
        self.origin_url()
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| self.origin.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_site_urls() {
        let site = SiteConfig::default();
        assert_eq!(site.listing_url(), "https://beyondchats.com/blogs/");
        assert_eq!(site.page_url(1), "https://beyondchats.com/blogs/");
        assert_eq!(site.page_url(15), "https://beyondchats.com/blogs/page/15/");
        assert_eq!(site.domain(), "beyondchats.com");
    }

    #[test]
    fn test_with_origin_strips_trailing_slash() {
        let site = SiteConfig::default().with_origin("http://127.0.0.1:8080/");
        assert_eq!(site.origin, "http://127.0.0.1:8080");
        assert_eq!(site.page_url(3), "http://127.0.0.1:8080/blogs/page/3/");
        assert_eq!(site.domain(), "127.0.0.1");
    }
}
