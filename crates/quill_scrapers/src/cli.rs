use std::time::Duration;

use clap::{Args, Subcommand};
use quill_core::Result;

use crate::enhance::EnhanceConfig;
use crate::jobs::{JobKind, JobReport, JobRunner};
use crate::manager::{ScrapeConfig, ThinContentPolicy};

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Maximum candidate links taken from the listing page
    #[arg(long, default_value_t = 10)]
    pub max_links: usize,

    /// Pause between article visits, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub delay_ms: u64,

    /// Stop after this many saved articles (0 = no limit)
    #[arg(long, default_value_t = 1)]
    pub max_saves: usize,

    /// Skip pages with too little content instead of storing a placeholder
    #[arg(long)]
    pub skip_thin: bool,
}

impl ScrapeArgs {
    pub fn config(&self) -> ScrapeConfig {
        ScrapeConfig {
            max_links: self.max_links,
            delay: Duration::from_millis(self.delay_ms),
            max_saves: (self.max_saves > 0).then_some(self.max_saves),
            thin_content: if self.skip_thin {
                ThinContentPolicy::Skip
            } else {
                ThinContentPolicy::Placeholder
            },
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EnhanceArgs {
    /// Pause after each rewritten article, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub delay_ms: u64,

    /// Rewrites shorter than this are discarded
    #[arg(long, default_value_t = 500)]
    pub min_rewrite_chars: usize,
}

impl EnhanceArgs {
    pub fn config(&self) -> EnhanceConfig {
        EnhanceConfig {
            delay: Duration::from_millis(self.delay_ms),
            min_rewrite_chars: self.min_rewrite_chars,
            ..EnhanceConfig::default()
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum JobCommands {
    /// Scrape the oldest listing page and store new articles
    Scrape(ScrapeArgs),
    /// Rewrite stored originals using reference styles
    Enhance(EnhanceArgs),
}

impl JobCommands {
    pub fn kind(&self) -> JobKind {
        match self {
            JobCommands::Scrape(_) => JobKind::Scrape,
            JobCommands::Enhance(_) => JobKind::Enhance,
        }
    }
}

pub async fn handle_command(command: JobCommands, runner: JobRunner) -> Result<JobReport> {
    let runner = match &command {
        JobCommands::Scrape(args) => runner.with_scrape_config(args.config()),
        JobCommands::Enhance(args) => runner.with_enhance_config(args.config()),
    };
    runner.run(command.kind()).await.map_err(|failure| failure.source)
}
