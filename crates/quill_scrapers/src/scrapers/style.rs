use std::sync::Arc;

use lazy_static::lazy_static;
use quill_core::{truncate_chars, JobLog};
use scraper::{Html, Selector};

use super::utils;
use crate::fetch::PageFetcher;

pub const MAX_SAMPLE_CHARS: usize = 1000;

lazy_static! {
    static ref STYLE_NOISE: Selector =
        Selector::parse("script, style, nav, header, footer, .sidebar, .comments, .ads").unwrap();
    static ref SAMPLE_CONTAINERS: Vec<Selector> = [".entry-content", ".post-content", ".article-content", "main", "article"]
        .iter()
        .map(|css| Selector::parse(css).unwrap())
        .collect();
}

/// Whitespace-collapsed text of the first content container present, capped.
pub fn style_sample(html: &str) -> String {
    let mut document = Html::parse_document(html);
    utils::remove_matching(&mut document, &STYLE_NOISE);

    SAMPLE_CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .map(|container| {
            let text = utils::collapse_whitespace(&utils::element_text(&container));
            truncate_chars(&text, MAX_SAMPLE_CHARS).to_string()
        })
        .unwrap_or_default()
}

/// Fetches reference pages and reduces them to short writing samples.
#[derive(Debug, Clone)]
pub struct StyleSampler {
    fetcher: Arc<dyn PageFetcher>,
}

impl StyleSampler {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Never fails: an unreachable page gives an empty sample.
    pub async fn sample(&self, url: &str, log: &JobLog) -> String {
        match self.fetcher.fetch(url).await {
            Ok(html) => style_sample(&html),
            Err(e) => {
                log.debug(&format!("Style sample unavailable for {}: {}", url, e));
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quill_core::{Error, Result};

    #[derive(Debug)]
    struct OnePage;

    #[async_trait]
    impl PageFetcher for OnePage {
        async fn fetch(&self, url: &str) -> Result<String> {
            if url.ends_with("/ok") {
                Ok("<main><p>Short,   punchy\n sentences.</p></main>".to_string())
            } else {
                Err(Error::Status { status: 500, url: url.to_string() })
            }
        }
    }

    #[test]
    fn test_style_sample_prefers_first_container() {
        let html = r#"<html><body>
            <header>Logo and menu</header>
            <article><p>Article text</p></article>
            <div class="post-content"><p>Post   content
               text</p><script>noise()</script></div>
        </body></html>"#;
        assert_eq!(style_sample(html), "Post content text");
    }

    #[test]
    fn test_style_sample_is_capped() {
        let html = format!("<main>{}</main>", "word ".repeat(400));
        assert_eq!(style_sample(&html).chars().count(), MAX_SAMPLE_CHARS);
    }

    #[test]
    fn test_style_sample_without_container() {
        assert_eq!(style_sample("<div>Loose text</div>"), "");
    }

    #[tokio::test]
    async fn test_sampler_swallows_fetch_errors() {
        let sampler = StyleSampler::new(Arc::new(OnePage));
        let log = JobLog::new();
        assert_eq!(sampler.sample("https://a.example/ok", &log).await, "Short, punchy sentences.");
        assert_eq!(sampler.sample("https://a.example/broken", &log).await, "");
    }
}
