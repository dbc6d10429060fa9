use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A fetched page answered with a non-success status.
    #[error("Failed {status}: {url}")]
    Status { status: u16, url: String },

    /// An external API (search, generation, content API) answered with a non-success status.
    #[error("{service} API failed: {status}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
    Api {
        service: String,
        status: u16,
        message: Option<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The {0} job is already running")]
    JobInProgress(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn api(service: impl Into<String>, status: u16) -> Self {
        Self::Api {
            service: service.into(),
            status,
            message: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
