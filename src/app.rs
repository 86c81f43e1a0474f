use std::fmt;

use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, error, info};

use crate::collector::collect;
use crate::config::Config;
use crate::db::NewsStore;
use crate::extractor::scrape_search_page;
use crate::models::SortOrder;
use crate::naver::{Credentials, NaverNewsClient};
use crate::utils::{format_article_listing, format_link_listing};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Job {
    /// Search API pipeline
    Api,
    /// HTML search page pipeline
    Scrape,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub collected: usize,
    pub stored: usize,
    pub failed: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} collected, {} stored, {} failed",
            self.collected, self.stored, self.failed
        )
    }
}

pub async fn run_job(cfg: &Config, job: Job) -> Result<RunReport> {
    match job {
        Job::Api => run_crawl(cfg, true).await,
        Job::Scrape => run_scrape(cfg, true).await,
    }
}

/// Search API pipeline: collect every page for the configured keyword, print
/// the listing, then store `(title, link)` pairs unless `store` is off.
pub async fn run_crawl(cfg: &Config, store: bool) -> Result<RunReport> {
    info!(
        "Crawl started: keyword='{}', max_pages={}, sort={}",
        cfg.keyword, cfg.max_pages, cfg.sort
    );

    // bad sort orders and missing credentials are fatal before any request goes out
    let sort: SortOrder = cfg.sort.parse()?;
    let credentials = Credentials::resolve(cfg.client_id.clone(), cfg.client_secret.clone())?;
    let client = NaverNewsClient::new(credentials)?.with_base_url(&cfg.api_url);
    debug!("Search client ready for client id {}", client.credentials().id);

    let articles = collect(&client, &cfg.keyword, cfg.max_pages, sort).await;

    let mut report = RunReport {
        collected: articles.len(),
        ..Default::default()
    };

    if articles.is_empty() {
        info!("No news collected for '{}'", cfg.keyword);
        println!("No news collected.");
        return Ok(report);
    }

    println!("Collected {} articles.\n", articles.len());
    println!("{}", format_article_listing(&articles));

    if store {
        let pairs: Vec<(&str, &str)> = articles
            .iter()
            .map(|a| (a.title.as_str(), a.link.as_str()))
            .collect();
        (report.stored, report.failed) = store_all(&NewsStore::new(&cfg.db_path), &pairs)?;
        println!("\nSaved: {} succeeded, {} failed", report.stored, report.failed);
    }

    info!("Crawl finished: {report}");
    Ok(report)
}

/// HTML pipeline: scrape the web search results page and store every headline.
pub async fn run_scrape(cfg: &Config, store: bool) -> Result<RunReport> {
    info!("Scrape started: keyword='{}'", cfg.keyword);

    let links = scrape_search_page(&cfg.keyword)
        .await
        .with_context(|| format!("Failed to scrape search page for '{}'", cfg.keyword))?;

    let mut report = RunReport {
        collected: links.len(),
        ..Default::default()
    };

    println!("{}", format_link_listing(&links));

    if store && !links.is_empty() {
        let pairs: Vec<(&str, &str)> = links
            .iter()
            .map(|l| (l.title.as_str(), l.url.as_str()))
            .collect();
        (report.stored, report.failed) = store_all(&NewsStore::new(&cfg.db_path), &pairs)?;
    }

    println!("Total articles fetched: {}", links.len());
    info!("Scrape finished: {report}");
    Ok(report)
}

/// Insert each `(title, url)` on its own. A failing row is logged and counted,
/// the rest still go in. Only an unusable database aborts.
pub fn store_all(store: &NewsStore, pairs: &[(&str, &str)]) -> Result<(usize, usize)> {
    store
        .init_schema()
        .with_context(|| format!("Database at {} is not usable", store.path().display()))?;

    let mut stored = 0;
    let mut failed = 0;

    for (title, url) in pairs {
        match store.insert(title, url) {
            Ok(id) => {
                debug!("Stored '{}' with id {}", title, id);
                stored += 1;
            }
            Err(e) => {
                error!("Failed to store '{}': {:?}", title, e);
                failed += 1;
            }
        }
    }

    Ok((stored, failed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_all_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = NewsStore::new(dir.path().join("news.sqlite3"));

        let long_url = format!("https://x/{}", "a".repeat(600));
        let pairs = vec![
            ("first", "https://x/1"),
            ("too long", long_url.as_str()),
            ("third", "https://x/3"),
        ];

        let (stored, failed) = store_all(&store, &pairs).unwrap();

        assert_eq!((stored, failed), (2, 1));
        let titles: Vec<_> = store
            .fetch_all()
            .unwrap()
            .into_iter()
            .filter_map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["first", "third"]);
    }

    #[test]
    fn test_store_all_unusable_database() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as a database file
        let store = NewsStore::new(dir.path());

        assert!(store_all(&store, &[("t", "https://x")]).is_err());
    }

    #[tokio::test]
    async fn test_crawl_rejects_bad_sort_before_credentials() {
        let cfg = Config {
            sort: "bogus".to_string(),
            ..Default::default()
        };

        let err = run_crawl(&cfg, false).await.unwrap_err();
        assert!(err.to_string().contains("sort"));
    }

    #[test]
    fn test_report_display() {
        let report = RunReport {
            collected: 20,
            stored: 19,
            failed: 1,
        };
        assert_eq!(report.to_string(), "20 collected, 19 stored, 1 failed");
    }
}
