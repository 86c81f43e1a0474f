use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveTime;
use serde::Deserialize;
use serde_yaml::Deserializer;

use crate::naver::SEARCH_URL;

const APP_NAME: &str = "naver-news";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub keyword: String,
    pub max_pages: u32,
    pub sort: String,
    pub db_path: PathBuf,
    pub schedule_time: String,
    pub run_on_start: bool,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keyword: "당근마켓".to_string(),
            max_pages: 3,
            sort: "date".to_string(),
            db_path: PathBuf::from("news.sqlite3"),
            schedule_time: "09:00".to_string(),
            run_on_start: false,
            client_id: None,
            client_secret: None,
            api_url: SEARCH_URL.to_string(),
        }
    }
}

pub struct EnsureOutcome {
    pub path: PathBuf,
    pub created: bool,
}

const TEMPLATE: &str = r#"# naver-news config (YAML)
# Every key is optional; the values below are the defaults.
# Environment variables override the file:
#   SEARCH_KEYWORD, MAX_PAGES, SORT_ORDER, NEWS_DB_PATH, CRAWL_SCHEDULE, RUN_ON_START,
#   NAVER_SEARCH_URL

keyword: "당근마켓"
max_pages: 3
# "date" (newest first) or "sim" (best match first)
sort: "date"
db_path: "news.sqlite3"

# Daily run time for `naver-news schedule`, local time
schedule_time: "09:00"
run_on_start: false

# Optional; X_NAVER_CLIENT_ID / X_NAVER_CLIENT_SECRET are used when omitted
# client_id: "<your client id>"
# client_secret: "<your client secret>"

# Optional; search endpoint, e.g. when going through a proxy
# api_url: "https://openapi.naver.com/v1/search/news.json"
"#;

impl Config {
    pub fn ensure_user_config() -> Result<EnsureOutcome> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME);

        if let Some(path) = xdg_dirs.find_config_file("config.yaml") {
            return Ok(EnsureOutcome {
                path,
                created: false,
            });
        }

        let config_path = xdg_dirs
            .place_config_file("config.yaml")
            .context("Cannot create configuration directory")?;
        let mut config_file = File::create(&config_path)?;
        write!(&mut config_file, "{TEMPLATE}")?;

        Ok(EnsureOutcome {
            path: config_path,
            created: true,
        })
    }

    /// Read the YAML file at `path` and apply environment overrides.
    pub fn load(path: &Path) -> Result<Config> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut cfg = Config::from_yaml_str(&raw, &path.display().to_string())?;
        cfg.apply_env_with(|key| env::var(key).ok())?;
        Ok(cfg)
    }

    pub fn from_yaml_str(raw: &str, origin: &str) -> Result<Config> {
        // an empty or all-comment file deserializes as null
        if raw.lines().all(|l| l.trim().is_empty() || l.trim_start().starts_with('#')) {
            return Ok(Config::default());
        }

        let deserialized = Deserializer::from_str(raw);
        serde_path_to_error::deserialize(deserialized).map_err(|e| {
            anyhow!("Invalid YAML in {} at `{}`: {}", origin, e.path(), e.inner())
        })
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(keyword) = lookup("SEARCH_KEYWORD") {
            self.keyword = keyword;
        }
        if let Some(max_pages) = lookup("MAX_PAGES") {
            self.max_pages = max_pages
                .trim()
                .parse()
                .with_context(|| format!("MAX_PAGES must be a non-negative integer, got '{max_pages}'"))?;
        }
        if let Some(sort) = lookup("SORT_ORDER") {
            self.sort = sort;
        }
        if let Some(db_path) = lookup("NEWS_DB_PATH") {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(schedule_time) = lookup("CRAWL_SCHEDULE") {
            self.schedule_time = schedule_time;
        }
        if let Some(run_on_start) = lookup("RUN_ON_START") {
            self.run_on_start = run_on_start.trim().eq_ignore_ascii_case("true");
        }
        if let Some(api_url) = lookup("NAVER_SEARCH_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = api_url;
        }
        Ok(())
    }

    pub fn schedule_time(&self) -> Result<NaiveTime> {
        NaiveTime::parse_from_str(self.schedule_time.trim(), "%H:%M")
            .with_context(|| format!("schedule_time must be HH:MM, got '{}'", self.schedule_time))
    }
}
