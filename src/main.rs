mod app;
mod collector;
mod config;
mod db;
mod error;
mod extractor;
mod logger;
mod models;
mod naver;
mod scheduler;
mod utils;

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use log::{debug, info};

use crate::app::Job;
use crate::config::Config;
use crate::db::NewsStore;
use crate::logger::init_logger;
use crate::utils::format_record;

#[derive(Parser)]
#[command(name = "naver-news")]
#[command(about = "Collect keyword news from Naver and store it in SQLite")]
struct Cli {
    /// Config file to use instead of the XDG one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect articles through the search API
    Crawl {
        /// Print the articles without storing them
        #[arg(long)]
        no_db: bool,
    },
    /// Collect headlines from the web search results page
    Scrape {
        #[arg(long)]
        no_db: bool,
    },
    /// Run a pipeline once a day at the configured time
    Schedule {
        #[arg(long, value_enum, default_value_t = Job::Api)]
        job: Job,
    },
    /// Inspect or edit stored records
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create the table if needed
    Init,
    /// Check the database can be opened
    Ping,
    List,
    Get { id: i64 },
    UpdateUrl { title: String, url: String },
    Delete { title: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger()?;
    debug!("Logger initialized");

    let config_path = match cli.config {
        Some(path) => path,
        None => {
            let outcome = Config::ensure_user_config()?;
            if outcome.created {
                println!(
                    "Config file created at {}. Please edit it and restart the app.",
                    outcome.path.display()
                );
                return Ok(());
            }
            outcome.path
        }
    };

    let cfg = Config::load(&config_path)?;
    debug!("Config loaded from {}", config_path.display());

    match cli.command {
        Command::Crawl { no_db } => {
            app::run_crawl(&cfg, !no_db).await?;
        }
        Command::Scrape { no_db } => {
            app::run_scrape(&cfg, !no_db).await?;
        }
        Command::Schedule { job } => scheduler::run_daily(&cfg, job).await?,
        Command::Db { action } => run_db(&NewsStore::new(&cfg.db_path), action)?,
    }

    Ok(())
}

fn run_db(store: &NewsStore, action: DbAction) -> Result<()> {
    match action {
        DbAction::Init => {
            store.init_schema()?;
            info!("Schema ready at {}", store.path().display());
            println!("Database setup completed.");
        }
        DbAction::Ping => {
            println!("SQLite version: {}", store.ping()?);
        }
        DbAction::List => {
            let records = store.fetch_all()?;
            println!("All news:");
            if records.is_empty() {
                println!("No news found.");
            }
            for record in &records {
                println!("{}", format_record(record));
            }
        }
        DbAction::Get { id } => match store.fetch_by_id(id)? {
            Some(record) => println!("{}", format_record(&record)),
            None => bail!("No news with id {id}"),
        },
        DbAction::UpdateUrl { title, url } => {
            let changed = store.update_url_by_title(&title, &url)?;
            println!("Updated URL for '{title}' to '{url}' ({changed} rows).");
        }
        DbAction::Delete { title } => {
            let deleted = store.delete_by_title(&title)?;
            println!("News '{title}' deleted ({deleted} rows).");
        }
    }

    Ok(())
}
