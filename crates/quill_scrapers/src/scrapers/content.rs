use lazy_static::lazy_static;
use quill_core::{truncate_chars, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::utils;

/// Stored in place of the body when a page yields too little text.
pub const FAILED_PLACEHOLDER: &str = "Full content extraction failed";

pub const MIN_TITLE_CHARS: usize = 10;
pub const MIN_BLOCK_CHARS: usize = 30;
/// Stop trying further containers once this much text has been gathered.
pub const GOOD_ENOUGH_CHARS: usize = 1000;
pub const MAX_CONTENT_CHARS: usize = 15000;
pub const MIN_CONTENT_CHARS: usize = 500;

pub const TITLE_SELECTORS: &[&str] = &[
    "h1.entry-title",
    ".entry-title",
    "h1.post-title",
    ".post-title h1",
    "h1",
    ".article-header h1",
];

pub const CONTENT_SELECTORS: &[&str] = &[
    ".entry-content",
    ".post-content",
    ".article-content",
    ".content-area",
    "main .content",
    ".single-post .content",
    "article",
    "main",
    ".post",
];

lazy_static! {
    static ref BOILERPLATE: Selector =
        Selector::parse("script, style, nav, header, footer, .sidebar, .comments, .related, .ads, .social").unwrap();
    static ref CONTAINER_BOILERPLATE: Selector =
        Selector::parse("script, style, nav, .sidebar, .comments, footer, .related").unwrap();
    static ref BLOCKS: Selector = Selector::parse("p, li, h1, h2, h3, h4, h5, h6, div").unwrap();
    static ref EXCESS_BLANK_LINES: Regex = Regex::new(r"\n\s*\n\s*\n").unwrap();
}

/// One way of pulling text out of a page. Strategies are tried in order.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// `None` when the strategy's element is absent from the document.
    fn extract(&self, document: &mut Html) -> Option<String>;
}

/// Trimmed text of the first element matching a selector.
#[derive(Debug, Clone)]
pub struct FirstMatchText {
    css: String,
    selector: Selector,
}

impl FirstMatchText {
    pub fn new(css: &str) -> Result<Self> {
        Ok(Self {
            css: css.to_string(),
            selector: utils::parse_selector(css)?,
        })
    }
}

impl ExtractionStrategy for FirstMatchText {
    fn name(&self) -> &str {
        &self.css
    }

    fn extract(&self, document: &mut Html) -> Option<String> {
        document
            .select(&self.selector)
            .next()
            .map(|el| utils::element_text(&el).trim().to_string())
    }
}

/// Paragraph-like blocks of the first matching container, boilerplate removed.
#[derive(Debug, Clone)]
pub struct ContainerBlocks {
    css: String,
    container: Selector,
}

impl ContainerBlocks {
    pub fn new(css: &str) -> Result<Self> {
        Ok(Self {
            css: css.to_string(),
            container: utils::parse_selector(css)?,
        })
    }
}

impl ExtractionStrategy for ContainerBlocks {
    fn name(&self) -> &str {
        &self.css
    }

    fn extract(&self, document: &mut Html) -> Option<String> {
        let container_id = document.select(&self.container).next()?.id();

        let noise: Vec<_> = ElementRef::wrap(document.tree.get(container_id)?)?
            .select(&CONTAINER_BOILERPLATE)
            .map(|el| el.id())
            .collect();
        for id in noise {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }

        let container = ElementRef::wrap(document.tree.get(container_id)?)?;
        let mut text = String::new();
        for block in container.select(&BLOCKS) {
            let block_text = utils::element_text(&block);
            let block_text = block_text.trim();
            if block_text.chars().count() > MIN_BLOCK_CHARS {
                text.push_str(block_text);
                text.push_str("\n\n");
            }
        }
        Some(text)
    }
}

/// Outcome of body extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedBody {
    Full(String),
    /// Not enough text was found; keeps what was gathered for diagnostics.
    Insufficient(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub body: ExtractedBody,
}

impl ExtractedArticle {
    pub fn is_complete(&self) -> bool {
        matches!(self.body, ExtractedBody::Full(_))
    }

    /// Text to persist: the body, or the placeholder when extraction came up short.
    pub fn content(&self) -> &str {
        match &self.body {
            ExtractedBody::Full(text) => text,
            ExtractedBody::Insufficient(_) => FAILED_PLACEHOLDER,
        }
    }
}

/// Title and body extraction for a single article page.
pub struct ContentExtractor {
    title_strategies: Vec<Box<dyn ExtractionStrategy>>,
    content_strategies: Vec<Box<dyn ExtractionStrategy>>,
    fallback_title: String,
}

impl std::fmt::Debug for ContentExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = |s: &[Box<dyn ExtractionStrategy>]| s.iter().map(|s| s.name().to_string()).collect::<Vec<_>>();
        f.debug_struct("ContentExtractor")
            .field("title_strategies", &names(&self.title_strategies))
            .field("content_strategies", &names(&self.content_strategies))
            .field("fallback_title", &self.fallback_title)
            .finish()
    }
}

impl ContentExtractor {
    pub fn new(fallback_title: impl Into<String>) -> Result<Self> {
        let mut title_strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
        for css in TITLE_SELECTORS {
            title_strategies.push(Box::new(FirstMatchText::new(css)?));
        }
        let mut content_strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
        for css in CONTENT_SELECTORS {
            content_strategies.push(Box::new(ContainerBlocks::new(css)?));
        }
        Ok(Self {
            title_strategies,
            content_strategies,
            fallback_title: fallback_title.into(),
        })
    }

    pub fn with_title_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.title_strategies = strategies;
        self
    }

    pub fn with_content_strategies(mut self, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        self.content_strategies = strategies;
        self
    }

    pub fn extract(&self, html: &str) -> ExtractedArticle {
        let mut document = Html::parse_document(html);
        utils::remove_matching(&mut document, &BOILERPLATE);

        let title = self.select_title(&mut document);
        let body = self.collect_body(&mut document);
        ExtractedArticle { title, body }
    }

    fn select_title(&self, document: &mut Html) -> String {
        for strategy in &self.title_strategies {
            if let Some(title) = strategy.extract(document) {
                if title.chars().count() > MIN_TITLE_CHARS {
                    return title;
                }
            }
        }
        self.fallback_title.clone()
    }

    fn collect_body(&self, document: &mut Html) -> ExtractedBody {
        let mut gathered = String::new();
        for strategy in &self.content_strategies {
            if let Some(text) = strategy.extract(document) {
                tracing::trace!(strategy = strategy.name(), chars = text.len(), "Container matched");
                gathered.push_str(&text);
                if gathered.chars().count() > GOOD_ENOUGH_CHARS {
                    break;
                }
            }
        }

        let cleaned = EXCESS_BLANK_LINES.replace_all(&gathered, "\n\n");
        let cleaned = truncate_chars(cleaned.trim(), MAX_CONTENT_CHARS).to_string();
        if cleaned.chars().count() > MIN_CONTENT_CHARS {
            ExtractedBody::Full(cleaned)
        } else {
            ExtractedBody::Insufficient(cleaned)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(i: usize) -> String {
        format!("<p>Paragraph {i} explains how support teams can use chatbots to answer faster.</p>")
    }

    fn extractor() -> ContentExtractor {
        ContentExtractor::new("BeyondChats Article").unwrap()
    }

    #[test]
    fn test_extracts_title_and_body() {
        let body: String = (0..12).map(paragraph).collect();
        let html = format!(
            r#"<html><body>
                <nav><h1>Site Navigation Heading</h1></nav>
                <h1 class="entry-title">Why Chatbots Matter In 2024</h1>
                <div class="entry-content">{body}<script>track()</script><div class="sidebar"><p>Subscribe to our newsletter for more updates now.</p></div></div>
            </body></html>"#
        );
        let article = extractor().extract(&html);

        assert_eq!(article.title, "Why Chatbots Matter In 2024");
        assert!(article.is_complete());
        assert!(article.content().starts_with("Paragraph 0 explains"));
        assert!(article.content().contains("\n\nParagraph 1 explains"));
        assert!(!article.content().contains("track()"));
        assert!(!article.content().contains("newsletter"));
        assert!(!article.content().ends_with('\n'));
    }

    #[test]
    fn test_thin_page_yields_placeholder() {
        let html = r#"<html><body><h1>Short</h1><div class="entry-content"><p>Too short.</p>
            <p>This one paragraph is long enough to keep but not enough overall.</p></div></body></html>"#;
        let article = extractor().extract(html);

        assert_eq!(article.title, "BeyondChats Article");
        assert!(!article.is_complete());
        assert_eq!(article.content(), FAILED_PLACEHOLDER);
        assert_eq!(
            article.body,
            ExtractedBody::Insufficient("This one paragraph is long enough to keep but not enough overall.".to_string())
        );
    }

    #[test]
    fn test_accumulates_across_containers_until_enough() {
        let first: String = (0..4).map(paragraph).collect();
        let second: String = (4..20).map(paragraph).collect();
        let third: String = (20..24).map(paragraph).collect();
        let html = format!(
            r#"<html><body>
                <div class="entry-content">{first}</div>
                <div class="post-content">{second}</div>
                <div class="article-content">{third}</div>
            </body></html>"#
        );
        let article = extractor().extract(&html);
        let content = article.content();

        assert!(content.contains("Paragraph 3 explains"));
        assert!(content.contains("Paragraph 19 explains"));
        assert!(!content.contains("Paragraph 20 explains"));
    }

    #[test]
    fn test_caps_content_length() {
        let body: String = (0..400).map(paragraph).collect();
        let html = format!(r#"<html><body><article>{body}</article></body></html>"#);
        let article = extractor().extract(&html);
        assert_eq!(article.content().chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_custom_strategy_order() {
        let html = r#"<html><body><h2 class="headline">A Custom Headline For Testing</h2>
            <h1>Generic heading that is long</h1></body></html>"#;
        let extractor = extractor().with_title_strategies(vec![
            Box::new(FirstMatchText::new(".headline").unwrap()),
            Box::new(FirstMatchText::new("h1").unwrap()),
        ]);
        assert_eq!(extractor.extract(html).title, "A Custom Headline For Testing");
    }

    #[test]
    fn test_custom_content_strategies() {
        let story: String = (0..12).map(paragraph).collect();
        let html = format!(
            r#"<html><body>
                <div class="entry-content"><p>The default container holds this text which must not be used.</p></div>
                <section class="story">{story}</section>
            </body></html>"#
        );
        let extractor =
            extractor().with_content_strategies(vec![Box::new(ContainerBlocks::new(".story").unwrap())]);
        let article = extractor.extract(&html);

        assert!(article.is_complete());
        assert!(article.content().starts_with("Paragraph 0 explains"));
        assert!(!article.content().contains("default container"));
    }
}
