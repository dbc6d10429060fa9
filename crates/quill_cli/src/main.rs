use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use quill_core::{with_storage, ArticleFilter, ArticleStats, Result, SiteConfig, StorageConnector};
use quill_inference::InferenceConfig;
use quill_scrapers::{handle_command, HttpFetcher, JobCommands, JobRunner};
use quill_storage::{create_connector, BackendConfig, BackendKind};
use quill_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quill", author, version, about = "Blog scraping and AI rewriting pipeline", long_about = None)]
pub struct Cli {
    /// Storage backend: memory, sqlite or api
    #[arg(long, env = "QUILL_STORAGE", default_value = "memory")]
    storage: String,

    /// SQLite connection string for the sqlite backend
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Base URL of a running content API for the api backend
    #[arg(long, env = "BACKEND_BASE_URL")]
    api_url: Option<String>,

    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    inference: InferenceArgs,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Origin of the blog to scrape
    #[arg(long, default_value = "https://beyondchats.com")]
    origin: String,

    /// Path of the blog listing under the origin
    #[arg(long, default_value = "/blogs/")]
    listing_path: String,

    /// Path fragment every article URL contains
    #[arg(long, default_value = "/blogs/")]
    post_marker: String,
}

impl SiteArgs {
    fn config(&self) -> SiteConfig {
        SiteConfig {
            listing_path: self.listing_path.clone(),
            post_marker: self.post_marker.clone(),
            ..SiteConfig::default()
        }
        .with_origin(self.origin.clone())
    }
}

#[derive(Args, Debug)]
struct InferenceArgs {
    #[arg(long, env = "GOOGLE_API", hide_env_values = true)]
    google_api: Option<String>,

    #[arg(long, env = "GOOGLE_CX")]
    google_cx: Option<String>,

    #[arg(long, env = "SONAR_API_KEY", hide_env_values = true)]
    sonar_api_key: Option<String>,

    /// Generation model: a sonar model name, or "dummy" for offline runs
    #[arg(long, default_value = "sonar-pro")]
    model: String,

    #[arg(long)]
    model_url: Option<String>,

    #[arg(long)]
    search_url: Option<String>,
}

impl InferenceArgs {
    fn config(&self) -> InferenceConfig {
        InferenceConfig {
            google_api_key: self.google_api.clone(),
            google_cx: self.google_cx.clone(),
            sonar_api_key: self.sonar_api_key.clone(),
            model_name: self.model.clone(),
            search_endpoint: self.search_url.clone(),
            model_base_url: self.model_url.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the content API and the job triggers
    Serve {
        #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
        host: IpAddr,

        #[arg(long, env = "PORT", default_value_t = 5000)]
        port: u16,
    },
    #[command(flatten)]
    Job(JobCommands),
    /// Print stored articles
    List {
        #[arg(long, conflicts_with = "originals")]
        enhanced: bool,

        #[arg(long)]
        originals: bool,

        /// Print JSON instead of one line per article
        #[arg(long)]
        json: bool,
    },
    /// Print dashboard counters
    Stats,
}

fn backend(cli: &Cli) -> Result<BackendConfig> {
    let kind: BackendKind = cli.storage.parse()?;
    let url = match kind {
        BackendKind::Sqlite => cli.database_url.as_deref(),
        BackendKind::Api => cli.api_url.as_deref(),
        BackendKind::Memory => None,
    };
    BackendConfig::from_kind(kind, url)
}

fn job_runner(cli: &Cli, connector: Arc<dyn StorageConnector>) -> Result<JobRunner> {
    let fetcher = Arc::new(HttpFetcher::new()?);
    Ok(JobRunner::new(connector, fetcher, cli.site.config()).with_inference(&cli.inference.config()))
}

fn list_filter(enhanced: bool, originals: bool) -> ArticleFilter {
    if enhanced {
        ArticleFilter::enhanced()
    } else if originals {
        ArticleFilter::originals()
    } else {
        ArticleFilter::all()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let backend = backend(&cli)?;
    let connector = create_connector(&backend);
    info!("💾 Using {} storage", backend);

    match &cli.command {
        Commands::Serve { host, port } => {
            let storage = connector.connect().await?;
            let state = AppState::new(storage.clone(), job_runner(&cli, connector.clone())?);
            let result = quill_web::serve(state, SocketAddr::new(*host, *port)).await;
            storage.close().await?;
            result?;
        }
        Commands::Job(job) => {
            let report = handle_command(job.clone(), job_runner(&cli, connector.clone())?).await?;
            info!(
                "🏁 {} job finished: {}/{}",
                report.kind, report.processed, report.candidates
            );
        }
        Commands::List {
            enhanced,
            originals,
            json,
        } => {
            let filter = list_filter(*enhanced, *originals);
            let articles = with_storage(connector.as_ref(), |storage| async move { storage.list(&filter).await }).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&articles)?);
            } else {
                for article in &articles {
                    let marker = if article.updated {
                        "✨"
                    } else if article.is_enhanced {
                        "✅"
                    } else {
                        "📄"
                    };
                    println!("{} {}  {}  {}", marker, article.id, article.slug, article.title);
                }
                println!("{} articles", articles.len());
            }
        }
        Commands::Stats => {
            let articles =
                with_storage(connector.as_ref(), |storage| async move { storage.list(&ArticleFilter::all()).await })
                    .await?;
            let stats = ArticleStats::from_articles(&articles);
            println!("Total articles:   {}", stats.total);
            println!("Originals:        {}", stats.originals);
            println!("Enhanced:         {}", stats.enhanced);
            println!("References:       {}", stats.references);
            println!("Enhancement rate: {:.0}%", stats.enhancement_rate);
        }
    }

    Ok(())
}
