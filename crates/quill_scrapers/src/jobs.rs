use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use quill_core::{with_storage, Error, InferenceModel, JobLog, Result, SearchProvider, SiteConfig, StorageConnector};
use quill_inference::{create_model, create_search, InferenceConfig};
use serde::Serialize;
use thiserror::Error as ThisError;

use crate::enhance::{EnhanceConfig, EnhancementManager};
use crate::fetch::PageFetcher;
use crate::manager::{ScrapeConfig, ScraperManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Scrape,
    Enhance,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Scrape => write!(f, "scrape"),
            JobKind::Enhance => write!(f, "enhance"),
        }
    }
}

/// A finished batch run and everything it logged.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub kind: JobKind,
    pub processed: usize,
    pub candidates: usize,
    pub output: String,
}

/// A batch run that aborted, with the log captured up to that point.
#[derive(Debug, ThisError)]
#[error("{kind} job failed: {source}")]
pub struct JobFailure {
    pub kind: JobKind,
    pub source: Error,
    pub output: String,
}

impl JobFailure {
    pub fn is_conflict(&self) -> bool {
        matches!(self.source, Error::JobInProgress(_))
    }
}

/// The two external services the enhance job talks to.
#[derive(Debug, Clone)]
pub struct EnhanceServices {
    pub search: Arc<dyn SearchProvider>,
    pub model: Arc<dyn InferenceModel>,
}

impl EnhanceServices {
    pub fn from_config(config: &InferenceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            search: create_search(config)?,
            model: create_model(config)?,
        })
    }
}

struct RunningJob<'a> {
    slot: &'a Mutex<Option<JobKind>>,
}

impl Drop for RunningJob<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Runs scrape and enhance jobs, at most one at a time.
pub struct JobRunner {
    connector: Arc<dyn StorageConnector>,
    fetcher: Arc<dyn PageFetcher>,
    site: SiteConfig,
    scrape: ScrapeConfig,
    enhance: EnhanceConfig,
    enhance_services: std::result::Result<EnhanceServices, String>,
    running: Mutex<Option<JobKind>>,
}

impl fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobRunner")
            .field("storage", &self.connector.name())
            .field("site", &self.site)
            .field("scrape", &self.scrape)
            .field("enhance", &self.enhance)
            .field("enhance_ready", &self.enhance_services.is_ok())
            .field("running", &self.active())
            .finish()
    }
}

impl JobRunner {
    pub fn new(connector: Arc<dyn StorageConnector>, fetcher: Arc<dyn PageFetcher>, site: SiteConfig) -> Self {
        Self {
            connector,
            fetcher,
            site,
            scrape: ScrapeConfig::default(),
            enhance: EnhanceConfig::default(),
            enhance_services: Err("Enhancement services are not configured".to_string()),
            running: Mutex::new(None),
        }
    }

    pub fn with_scrape_config(mut self, config: ScrapeConfig) -> Self {
        self.scrape = config;
        self
    }

    pub fn with_enhance_config(mut self, config: EnhanceConfig) -> Self {
        self.enhance = config;
        self
    }

    /// Builds the search and generation clients. Missing credentials are
    /// reported when an enhance job is triggered, not here.
    pub fn with_inference(mut self, config: &InferenceConfig) -> Self {
        self.enhance_services = EnhanceServices::from_config(config).map_err(|e| match e {
            Error::Config(message) => message,
            other => other.to_string(),
        });
        self
    }

    pub fn with_enhance_services(mut self, services: EnhanceServices) -> Self {
        self.enhance_services = Ok(services);
        self
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    /// The job currently holding the lock, if any.
    pub fn active(&self) -> Option<JobKind> {
        *self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, kind: JobKind) -> Result<RunningJob<'_>> {
        let mut slot = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = *slot {
            return Err(Error::JobInProgress(active.to_string()));
        }
        *slot = Some(kind);
        Ok(RunningJob { slot: &self.running })
    }

    pub async fn run(&self, kind: JobKind) -> std::result::Result<JobReport, JobFailure> {
        let log = JobLog::new();
        let _running = self.begin(kind).map_err(|source| JobFailure {
            kind,
            source,
            output: String::new(),
        })?;

        let result = match kind {
            JobKind::Scrape => self.scrape(&log).await,
            JobKind::Enhance => self.enhance(&log).await,
        };

        match result {
            Ok((processed, candidates)) => Ok(JobReport {
                kind,
                processed,
                candidates,
                output: log.output(),
            }),
            Err(source) => {
                log.error(&format!("💥 Fatal error: {}", source));
                Err(JobFailure {
                    kind,
                    source,
                    output: log.output(),
                })
            }
        }
    }

    pub async fn run_scrape(&self) -> std::result::Result<JobReport, JobFailure> {
        self.run(JobKind::Scrape).await
    }

    pub async fn run_enhance(&self) -> std::result::Result<JobReport, JobFailure> {
        self.run(JobKind::Enhance).await
    }

    async fn scrape(&self, log: &JobLog) -> Result<(usize, usize)> {
        let manager = ScraperManager::new(self.fetcher.clone(), self.site.clone(), self.scrape.clone())?;
        let manager = &manager;
        let summary = with_storage(self.connector.as_ref(), |storage| async move {
            manager.run(storage.as_ref(), log).await
        })
        .await?;
        Ok((summary.saved, summary.candidates))
    }

    async fn enhance(&self, log: &JobLog) -> Result<(usize, usize)> {
        let services = self
            .enhance_services
            .as_ref()
            .map_err(|message| Error::Config(message.clone()))?;
        let manager = EnhancementManager::new(
            services.search.clone(),
            services.model.clone(),
            self.fetcher.clone(),
            self.site.domain(),
            self.enhance.clone(),
        );
        let manager = &manager;
        let summary = with_storage(self.connector.as_ref(), |storage| async move {
            manager.run(storage.as_ref(), log).await
        })
        .await?;
        Ok((summary.processed, summary.candidates))
    }
}
