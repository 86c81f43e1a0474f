use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::SearchError;

/// Upper bound the search API accepts for `display`.
pub const MAX_DISPLAY: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first (`date`)
    ByDate,
    /// Best match first (`sim`)
    ByRelevance,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::ByDate => "date",
            SortOrder::ByRelevance => "sim",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

impl FromStr for SortOrder {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(SortOrder::ByDate),
            "sim" => Ok(SortOrder::ByRelevance),
            other => Err(SearchError::Validation(format!(
                "sort must be 'date' or 'sim', got '{other}'"
            ))),
        }
    }
}

/// A single-page request against the news search endpoint.
///
/// Fields are private so a query can only exist once its inputs passed
/// validation in [`SearchQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    keyword: String,
    display: u32,
    start: u32,
    sort: SortOrder,
}

impl SearchQuery {
    pub fn new(keyword: &str, display: u32, start: u32, sort: SortOrder) -> Result<Self, SearchError> {
        if keyword.is_empty() {
            return Err(SearchError::Validation("search keyword is required".to_string()));
        }
        if !(1..=MAX_DISPLAY).contains(&display) {
            return Err(SearchError::Validation(format!(
                "display must be between 1 and {MAX_DISPLAY}, got {display}"
            )));
        }
        if start < 1 {
            return Err(SearchError::Validation("start must be 1 or greater".to_string()));
        }

        Ok(SearchQuery {
            keyword: keyword.to_string(),
            display,
            start,
            sort,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn display(&self) -> u32 {
        self.display
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Query string pairs in the order the API documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("query", self.keyword.clone()),
            ("display", self.display.to_string()),
            ("start", self.start.to_string()),
            ("sort", self.sort.as_param().to_string()),
        ]
    }
}

/// Body of a successful search response, kept as the API sent it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "lastBuildDate", default)]
    pub last_build_date: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub display: u32,
    #[serde(default)]
    pub items: Vec<RawItem>,
}

/// One search hit before sanitization. Text fields still carry `<b>` markup
/// and HTML entities.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub title: String,
    pub link: String,
    pub description: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String, // verbatim, e.g. "Mon, 09 Feb 2026 10:00:00 +0900"
}

/// Row of the `news_urls` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNewsRecord {
    pub id: i64,
    pub title: Option<String>,
    pub url: String,
}

/// Headline link pulled from the HTML search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedLink {
    pub title: String,
    pub url: String,
}
