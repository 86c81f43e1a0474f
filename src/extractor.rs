use std::time::Duration;

use anyhow::{Result, anyhow};
use log::{debug, info};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::models::ScrapedLink;

pub const SEARCH_PAGE_URL: &str = "https://search.naver.com/search.naver";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const HEADLINE_SELECTOR: &str = r#"a[data-heatmap-target=".nav"]"#;

/// Scrape the first page of the web news search for `keyword`, limited to the last 7 days.
pub async fn scrape_search_page(keyword: &str) -> Result<Vec<ScrapedLink>> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(10))
        .build()?;

    let res = client
        .get(SEARCH_PAGE_URL)
        .query(&[
            ("where", "news"),
            ("query", keyword),
            ("start", "0"),
            ("nso", "so:r,p:7d,a:all"),
        ])
        .send()
        .await?
        .error_for_status()?;

    let page_url = res.url().clone();
    let body = res.text().await?;
    debug!("Fetched {} ({} bytes)", page_url, body.len());

    let links = parse_search_page(&body, &page_url)?;
    info!("Scraped {} headlines for '{}'", links.len(), keyword);

    Ok(links)
}

/// Pull headline anchors out of a search results page. Relative hrefs are
/// resolved against `base`; anchors without an href are skipped.
pub fn parse_search_page(html: &str, base: &Url) -> Result<Vec<ScrapedLink>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(HEADLINE_SELECTOR)
        .map_err(|e| anyhow!("Invalid headline selector: {e}"))?;

    let mut links = Vec::new();

    for a in document.select(&selector) {
        let Some(href) = a.value().attr("href") else { continue };

        let url = match base.join(href.trim()) {
            Ok(url) => url.to_string(),
            Err(_) => href.trim().to_string(),
        };

        links.push(ScrapedLink {
            title: a.text().collect::<String>().trim().to_string(),
            url,
        });
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="news_area">
            <a href=" https://news.example.com/a/1 " data-heatmap-target=".nav">
              <span>당근마켓</span> 첫 번째 기사
            </a>
            <a href="/a/2" data-heatmap-target=".nav">두 번째 기사</a>
            <a data-heatmap-target=".nav">no href</a>
            <a href="https://news.example.com/press" data-heatmap-target=".press">press</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_search_page() {
        let base = Url::parse("https://search.naver.com/search.naver?where=news").unwrap();
        let links = parse_search_page(PAGE, &base).unwrap();

        assert_eq!(
            links,
            vec![
                ScrapedLink {
                    title: "당근마켓 첫 번째 기사".to_string(),
                    url: "https://news.example.com/a/1".to_string(),
                },
                ScrapedLink {
                    title: "두 번째 기사".to_string(),
                    url: "https://search.naver.com/a/2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_page_without_headlines() {
        let base = Url::parse(SEARCH_PAGE_URL).unwrap();
        assert!(parse_search_page("<html></html>", &base).unwrap().is_empty());
    }
}
