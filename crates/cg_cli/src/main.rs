use cg_core::config::{StorageConfig, StorageKind, SyncConfig};
use cg_core::{FeedSource, SyncObserver};
use cg_scrapers::{init_logging, FeedArgs, HttpFeedSource, Logger, Paginator, ScrapeArgs};
use cg_storage::{create_connector, JsonFileSink, PersistReport, SinkWriter};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Mirror a paginated news feed into a database and a JSON snapshot", long_about = None)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, env = "CG_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Page through the feed, then write the database and the snapshot
    Sync {
        #[command(flatten)]
        args: SyncArgs,

        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1h15m)
        #[arg(long, env = "CG_INTERVAL")]
        interval: Option<humantime::Duration>,
    },
    /// Print the effective configuration as JSON
    ShowConfig {
        #[command(flatten)]
        args: SyncArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct SyncArgs {
    #[command(flatten)]
    scrape: ScrapeArgs,

    #[command(flatten)]
    feed: FeedArgs,

    /// Database backend for the upsert mirror
    #[arg(long, value_enum, env = "CG_STORAGE", default_value_t = StorageKind::Sqlite)]
    storage: StorageKind,

    /// Database location (SQLite file path or sqlite: URL)
    #[arg(long, env = "CG_DATABASE_URL")]
    database_url: Option<String>,

    /// Where the JSON snapshot is written
    #[arg(long, env = "CG_OUTPUT", default_value = "articles.json")]
    output: PathBuf,
}

impl SyncArgs {
    fn to_config(&self) -> SyncConfig {
        SyncConfig {
            scrape: self.scrape.to_config(),
            feed: self.feed.to_config(),
            storage: StorageConfig {
                kind: self.storage,
                url: self.database_url.clone(),
            },
            snapshot_path: self.output.clone(),
        }
    }
}

async fn run_once(config: &SyncConfig, logger: Logger) -> anyhow::Result<PersistReport> {
    let source = Arc::new(HttpFeedSource::new(&config.feed)?);
    let observer: Arc<dyn SyncObserver> =
        Arc::new(logger.with_prefix(format!("[{}]", source.name())));

    info!("🦗 Scraping {} (last {} days)", source.name(), config.scrape.window_days);
    let paginator = Paginator::new(source, config.scrape.clone())
        .with_observer(observer.clone())
        .with_server_window(config.feed.server_window_days);
    let outcome = paginator.run().await?;

    let writer = SinkWriter::new(
        create_connector(&config.storage)?,
        Box::new(JsonFileSink::new(&config.snapshot_path)),
    )
    .with_observer(observer);
    let report = writer.persist(&outcome.articles).await?;

    info!(
        "✨ Sync finished: {} articles, stopped because {}",
        report.total, outcome.stop
    );
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logger = init_logging(&cli.log_level);

    match cli.command {
        Commands::Sync { args, interval } => {
            let config = args.to_config();
            config.validate()?;

            match interval {
                Some(interval) => {
                    let interval: Duration = interval.into();
                    info!("Running in periodic mode with {} interval", humantime::format_duration(interval));
                    let mut run = 0u64;
                    loop {
                        run += 1;
                        let logger = logger.clone().with_prefix(format!("run#{}", run));
                        if let Err(e) = run_once(&config, logger).await {
                            error!("Error during sync: {:#}", e);
                        }
                        info!("Waiting {} before next sync", humantime::format_duration(interval));
                        tokio::time::sleep(interval).await;
                    }
                }
                None => {
                    run_once(&config, logger).await?;
                }
            }
        }
        Commands::ShowConfig { args } => {
            let config = args.to_config();
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
