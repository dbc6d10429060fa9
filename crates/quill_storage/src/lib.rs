use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use quill_core::{Error, Result, StorageConnector};

pub mod backends;

pub use backends::*;

/// Which backend a process should talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Memory,
    #[cfg(feature = "sqlite")]
    Sqlite { url: String },
    Api { base_url: String },
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendConfig::Memory => write!(f, "memory"),
            #[cfg(feature = "sqlite")]
            BackendConfig::Sqlite { url } => write!(f, "sqlite ({})", url),
            BackendConfig::Api { base_url } => write!(f, "api ({})", base_url),
        }
    }
}

/// Backend names accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Sqlite,
    Api,
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            "api" | "http" => Ok(Self::Api),
            other => Err(Error::Config(format!("unknown storage backend: {}", other))),
        }
    }
}

impl BackendConfig {
    /// Resolve a backend from its name and the url the caller supplied for it.
    pub fn from_kind(kind: BackendKind, url: Option<&str>) -> Result<Self> {
        match kind {
            BackendKind::Memory => Ok(Self::Memory),
            #[cfg(feature = "sqlite")]
            BackendKind::Sqlite => Ok(Self::Sqlite {
                url: url.unwrap_or("sqlite://articles.db").to_string(),
            }),
            #[cfg(not(feature = "sqlite"))]
            BackendKind::Sqlite => Err(Error::Config(
                "sqlite storage requires the `sqlite` feature".to_string(),
            )),
            BackendKind::Api => url
                .map(|u| Self::Api { base_url: u.to_string() })
                .ok_or_else(|| Error::Config("api storage requires BACKEND_BASE_URL".to_string())),
        }
    }
}

pub fn create_connector(config: &BackendConfig) -> Arc<dyn StorageConnector> {
    match config {
        BackendConfig::Memory => Arc::new(MemoryStorage::new()),
        #[cfg(feature = "sqlite")]
        BackendConfig::Sqlite { url } => Arc::new(SQLiteConnector::new(url.clone())),
        BackendConfig::Api { base_url } => Arc::new(ApiStorage::new(base_url.clone())),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_connector, BackendConfig, BackendKind};
}
