//! Client for the Naver news search OpenAPI.

use std::env;
use std::time::Duration;

use log::debug;
use reqwest::{Client, StatusCode};

use crate::error::SearchError;
use crate::models::{SearchQuery, SearchResponse, SortOrder};

pub const SEARCH_URL: &str = "https://openapi.naver.com/v1/search/news.json";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const CLIENT_ID_ENV: &str = "X_NAVER_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "X_NAVER_CLIENT_SECRET";

const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("secret", &"***")
            .finish()
    }
}

impl Credentials {
    /// Explicit values win, the process environment fills in whatever is missing.
    pub fn resolve(id: Option<String>, secret: Option<String>) -> Result<Self, SearchError> {
        Self::resolve_with(id, secret, |key| env::var(key).ok())
    }

    pub fn resolve_with<F>(id: Option<String>, secret: Option<String>, lookup: F) -> Result<Self, SearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |explicit: Option<String>, key: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(key).filter(|v| !v.is_empty()))
        };

        match (pick(id, CLIENT_ID_ENV), pick(secret, CLIENT_SECRET_ENV)) {
            (Some(id), Some(secret)) => Ok(Credentials { id, secret }),
            _ => Err(SearchError::Configuration(format!(
                "Naver OpenAPI credentials are required. Set {CLIENT_ID_ENV} and {CLIENT_SECRET_ENV} environment variables."
            ))),
        }
    }
}

/// Anything that can answer a single page of a news search.
pub trait NewsSearch {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError>;

    /// Validate loose parameters into a [`SearchQuery`] and run it. Nothing
    /// reaches [`NewsSearch::search`] unless every parameter is valid.
    async fn search_news(
        &self,
        keyword: &str,
        display: u32,
        start: u32,
        sort: &str,
    ) -> Result<SearchResponse, SearchError> {
        let sort: SortOrder = sort.parse()?;
        let query = SearchQuery::new(keyword, display, start, sort)?;
        self.search(&query).await
    }
}

/// Statuses that get their own error instead of the generic HTTP failure.
pub fn classify_status(status: StatusCode) -> Option<SearchError> {
    match status {
        StatusCode::UNAUTHORIZED => Some(SearchError::Authentication),
        StatusCode::TOO_MANY_REQUESTS => Some(SearchError::RateLimited),
        _ => None,
    }
}

pub struct NaverNewsClient {
    client: Client,
    credentials: Credentials,
    base_url: String,
}

impl NaverNewsClient {
    pub fn new(credentials: Credentials) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            credentials,
            base_url: SEARCH_URL.to_string(),
        })
    }

    /// Point the client at another endpoint, e.g. a proxy or a local stand-in.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl NewsSearch for NaverNewsClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        debug!(
            "GET {} query='{}' display={} start={} sort={}",
            self.base_url,
            query.keyword(),
            query.display(),
            query.start(),
            query.sort()
        );

        let response = self
            .client
            .get(&self.base_url)
            .header(CLIENT_ID_HEADER, &self.credentials.id)
            .header(CLIENT_SECRET_HEADER, &self.credentials.secret)
            .query(&query.to_params())
            .send()
            .await?;

        if let Some(err) = classify_status(response.status()) {
            return Err(err);
        }

        let body = response.error_for_status()?.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)?;
        debug!(
            "Search returned {} of {} total items (start={}, display={}, built {})",
            parsed.items.len(),
            parsed.total,
            parsed.start,
            parsed.display,
            parsed.last_build_date.as_deref().unwrap_or("-")
        );

        Ok(parsed)
    }
}
