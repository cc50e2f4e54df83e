mod display;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use sentinel_core::{FeedbackRecord, FilterSpec, Selection, Sentiment, Source, Urgency};
use sentinel_live::{ViewController, ViewState};
use sentinel_store::{DuckStore, RecordStore};
use sentinel_sync::notify::DEFAULT_FROM;
use sentinel_sync::{
    EmailConfig, EmailNotifier, IngestError, Ingestor, Notifier, SearchClient, SearchConfig,
    SlackNotifier, first_urgent, seed_samples,
};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sentinel", version, about = "Customer feedback triage")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// DuckDB database file (in-memory when omitted)
    #[arg(long, global = true, env = "SENTINEL_DB")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a piece of text without storing it
    Classify {
        text: String,
        #[arg(long)]
        json: bool,
    },
    /// Insert the built-in sample feedback into an empty store
    Seed,
    /// Search for recent posts, classify and store them
    Ingest {
        query: String,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Print stats, trends and the filtered feedback list
    Dashboard {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        json: bool,
    },
    /// Keep the dashboard on screen and redraw on every change
    Watch {
        #[command(flatten)]
        filter: FilterArgs,
        /// Ingest this query periodically while watching
        #[arg(long)]
        ingest: Option<String>,
        /// Seconds between ingest runs
        #[arg(long, default_value_t = 60)]
        interval: u64,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Send an alert for one record
    Alert {
        #[arg(value_enum)]
        channel: Channel,
        /// Record id (defaults to the newest HIGH urgency record)
        #[arg(long)]
        id: Option<String>,
        /// Email recipient
        #[arg(long)]
        to: Option<String>,
        #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
        webhook: Option<String>,
        #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long, env = "ALERT_FROM", default_value = DEFAULT_FROM)]
        from: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Channel {
    Slack,
    Email,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(long, env = "SEARCH_BEARER_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[arg(long, env = "SEARCH_API_BASE", default_value = sentinel_sync::http::DEFAULT_SEARCH_BASE)]
    api_base: String,
    #[arg(long, default_value_t = 10)]
    max_results: u8,
}

impl SearchArgs {
    fn client(&self) -> SearchClient {
        SearchClient::new(SearchConfig {
            base_url: self.api_base.clone(),
            bearer_token: self.token.clone(),
            max_results: self.max_results,
        })
    }
}

#[derive(clap::Args)]
struct FilterArgs {
    /// Case-insensitive text/author match
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, default_value = "all")]
    urgency: Selection<Urgency>,
    #[arg(long, default_value = "all")]
    source: Selection<Source>,
    #[arg(long, default_value = "all")]
    sentiment: Selection<Sentiment>,
}

impl From<FilterArgs> for FilterSpec {
    fn from(args: FilterArgs) -> Self {
        FilterSpec {
            search: args.search,
            urgency: args.urgency,
            source: args.source,
            sentiment: args.sentiment,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Classify { text, json } => {
            let classification = sentinel_ai::classify(&text);
            if json {
                println!("{}", serde_json::to_string_pretty(&classification)?);
            } else {
                display::print_classification(&text, &classification);
            }
        }
        Command::Seed => {
            let store = open_store(cli.db.as_deref())?;
            match seed_samples(store.as_ref(), Utc::now()).await {
                Ok(records) => println!("Seeded {} sample records", records.len()),
                Err(IngestError::AlreadySeeded(count)) => {
                    println!("Store already holds {count} records, nothing seeded")
                }
                Err(e) => return Err(e).context("seeding sample feedback"),
            }
        }
        Command::Ingest { query, search } => {
            let store = open_store(cli.db.as_deref())?;
            let records = Ingestor::new(search.client(), store)
                .ingest(&query)
                .await
                .with_context(|| format!("ingesting '{query}'"))?;
            println!("Ingested {} records", records.len());
            for record in &records {
                println!();
                display::print_record_card(record);
            }
        }
        Command::Dashboard { filter, json } => {
            let store = open_store(cli.db.as_deref())?;
            let mut state = ViewState::new();
            state.set_filter(filter.into());
            state.apply_fetch(store.select_all().await.map_err(|e| e.to_string()));
            if json {
                let out = json!({
                    "stats": state.stats,
                    "trends": state.trends,
                    "feedback": state.visible,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                display::print_dashboard(&state);
            }
        }
        Command::Watch {
            filter,
            ingest,
            interval,
            search,
        } => {
            let store = open_store(cli.db.as_deref())?;
            watch(store, filter.into(), ingest, interval, search).await?;
        }
        Command::Alert {
            channel,
            id,
            to,
            webhook,
            api_key,
            from,
        } => {
            let store = open_store(cli.db.as_deref())?;
            let records = store.select_all().await.context("loading feedback")?;
            let record = pick_record(&records, id.as_deref())?;

            let notifier: Box<dyn Notifier> = match channel {
                Channel::Slack => Box::new(SlackNotifier::new(webhook)),
                Channel::Email => {
                    let config = EmailConfig {
                        api_key,
                        from,
                        ..EmailConfig::default()
                    };
                    Box::new(EmailNotifier::new(config, to.unwrap_or_default()))
                }
            };
            notifier.send(record).await.context("sending alert")?;
            println!("Alert sent for {}", record.id);
            println!();
            display::print_record_card(record);
        }
    }

    Ok(())
}

fn open_store(path: Option<&std::path::Path>) -> Result<Arc<DuckStore>> {
    let store = match path {
        Some(path) => DuckStore::open_persistent(path)
            .with_context(|| format!("opening database {}", path.display()))?,
        None => DuckStore::open().context("opening in-memory database")?,
    };
    Ok(Arc::new(store))
}

fn pick_record<'a>(records: &'a [FeedbackRecord], id: Option<&str>) -> Result<&'a FeedbackRecord> {
    match id {
        Some(id) => match records.iter().find(|r| r.id == id) {
            Some(record) => Ok(record),
            None => bail!("no record with id {id}"),
        },
        None => Ok(first_urgent(records)?),
    }
}

/// Redraw the dashboard until Ctrl-C, optionally ingesting on a timer.
async fn watch(
    store: Arc<DuckStore>,
    filter: FilterSpec,
    query: Option<String>,
    interval: u64,
    search: SearchArgs,
) -> Result<()> {
    let controller = ViewController::spawn(store.clone());
    controller.set_filter(filter).await?;

    let poller = query.map(|query| {
        let ingestor = Ingestor::new(search.client(), store);
        let period = Duration::from_secs(interval.max(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                match ingestor.ingest(&query).await {
                    Ok(records) => info!(count = records.len(), "periodic ingest complete"),
                    Err(e) => warn!(error = %e, "periodic ingest failed"),
                }
            }
        })
    });

    let mut updates = controller.watch();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                // Clear screen, cursor home.
                print!("\x1b[2J\x1b[H");
                display::print_dashboard(&state);
                if state.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(handle) = poller {
        handle.abort();
    }
    controller.shutdown().await?;
    Ok(())
}
