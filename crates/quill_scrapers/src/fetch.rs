use async_trait::async_trait;
use quill_core::{Error, Result};
use reqwest::Client;

const USER_AGENT: &str = concat!("quill/", env!("CARGO_PKG_VERSION"));

/// Source of raw HTML for a page.
#[async_trait]
pub trait PageFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain GET over reqwest. No retries; timeouts are the transport defaults.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}
