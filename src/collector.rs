use log::{error, info, warn};

use crate::models::{Article, RawItem, SortOrder};
use crate::naver::NewsSearch;
use crate::utils::clean_html_tags;

/// Results requested per page. The loop always asks for this many, whatever
/// `display` a single search would otherwise accept.
pub const PAGE_SIZE: u32 = 10;

/// Walk up to `max_pages` pages of results for `keyword`, in order.
///
/// Collection stops at the first empty page, and also at the first page that
/// fails for any reason: the failure is logged and whatever was gathered
/// before it is returned. Callers never see an error from here.
pub async fn collect<S: NewsSearch>(
    searcher: &S,
    keyword: &str,
    max_pages: u32,
    sort: SortOrder,
) -> Vec<Article> {
    let mut articles = Vec::new();

    for page in 0..max_pages {
        let Some(start) = page_start(page) else {
            warn!("Page {} is past the last addressable offset, stopping", page + 1);
            break;
        };
        info!("Fetching page {} (start={})", page + 1, start);

        let result = searcher
            .search_news(keyword, PAGE_SIZE, start, sort.as_param())
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                error!("Page {} failed, stopping: {}", page + 1, e);
                break;
            }
        };

        if response.items.is_empty() {
            info!("Page {} returned no articles, stopping", page + 1);
            break;
        }

        let count = response.items.len();
        articles.extend(response.items.iter().map(to_article));
        info!("Page {}: collected {} articles", page + 1, count);
    }

    articles
}

/// 1-based `start` offset of the zero-based `page`, `None` once it no longer fits in a `u32`.
pub fn page_start(page: u32) -> Option<u32> {
    page.checked_mul(PAGE_SIZE)?.checked_add(1)
}

pub fn to_article(item: &RawItem) -> Article {
    Article {
        title: clean_html_tags(&item.title),
        link: item.link.clone(),
        description: clean_html_tags(&item.description),
        pub_date: item.pub_date.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::models::{SearchQuery, SearchResponse};
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Serves canned pages keyed by `start` and remembers every offset it was asked for.
    #[derive(Default)]
    struct FakeBackend {
        pages: HashMap<u32, usize>,
        fail_at: Option<u32>,
        seen: RefCell<Vec<u32>>,
    }

    impl FakeBackend {
        fn with_pages(pages: &[(u32, usize)]) -> Self {
            FakeBackend {
                pages: pages.iter().copied().collect(),
                ..Default::default()
            }
        }

        fn failing_at(mut self, start: u32) -> Self {
            self.fail_at = Some(start);
            self
        }
    }

    impl NewsSearch for FakeBackend {
        async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
            assert_eq!(query.display(), PAGE_SIZE);
            self.seen.borrow_mut().push(query.start());

            if self.fail_at == Some(query.start()) {
                return Err(SearchError::RateLimited);
            }

            let count = self.pages.get(&query.start()).copied().unwrap_or(0);
            let items = (0..count)
                .map(|i| RawItem {
                    title: format!("<b>{}</b> 뉴스 {}", query.keyword(), query.start() + i as u32),
                    link: format!("https://x/{}", query.start() + i as u32),
                    description: "d".to_string(),
                    pub_date: "p".to_string(),
                })
                .collect();

            Ok(SearchResponse {
                total: 20,
                start: query.start(),
                display: count as u32,
                items,
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn test_collect_stops_on_empty_page() {
        let backend = FakeBackend::with_pages(&[(1, 10), (11, 10), (21, 0)]);

        let articles = collect(&backend, "당근마켓", 3, SortOrder::ByDate).await;

        assert_eq!(articles.len(), 20);
        assert_eq!(*backend.seen.borrow(), vec![1, 11, 21]);
        assert_eq!(articles[0].link, "https://x/1");
        assert_eq!(articles[19].link, "https://x/20");
    }

    #[tokio::test]
    async fn test_collect_respects_max_pages() {
        let backend = FakeBackend::with_pages(&[(1, 10), (11, 10), (21, 10), (31, 10)]);

        let articles = collect(&backend, "q", 2, SortOrder::ByRelevance).await;

        assert_eq!(articles.len(), 20);
        assert_eq!(*backend.seen.borrow(), vec![1, 11]);
    }

    #[tokio::test]
    async fn test_collect_keeps_earlier_pages_on_error() {
        let backend = FakeBackend::with_pages(&[(1, 10), (11, 10), (21, 10)]).failing_at(11);

        let articles = collect(&backend, "q", 3, SortOrder::ByDate).await;

        assert_eq!(articles.len(), 10);
        assert_eq!(*backend.seen.borrow(), vec![1, 11]);
    }

    #[tokio::test]
    async fn test_collect_error_on_first_page_yields_nothing() {
        let backend = FakeBackend::with_pages(&[(1, 10)]).failing_at(1);

        let articles = collect(&backend, "q", 3, SortOrder::ByDate).await;

        assert!(articles.is_empty());
    }

    #[tokio::test]
    async fn test_collect_invalid_keyword_stops_before_any_request() {
        let backend = FakeBackend::with_pages(&[(1, 10)]);

        let articles = collect(&backend, "", 3, SortOrder::ByDate).await;

        assert!(articles.is_empty());
        assert!(backend.seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_collect_zero_pages() {
        let backend = FakeBackend::with_pages(&[(1, 10)]);

        assert!(collect(&backend, "q", 0, SortOrder::ByDate).await.is_empty());
        assert!(backend.seen.borrow().is_empty());
    }

    #[test]
    fn test_page_start() {
        assert_eq!(page_start(0), Some(1));
        assert_eq!(page_start(1), Some(11));
        assert_eq!(page_start(2), Some(21));

        let last = (u32::MAX - 1) / PAGE_SIZE;
        assert_eq!(page_start(last), Some(last * PAGE_SIZE + 1));
        assert_eq!(page_start(last + 1), None);
        assert_eq!(page_start(u32::MAX), None);
    }

    #[test]
    fn test_to_article() {
        let item = RawItem {
            title: "<b>당근마켓</b> 뉴스 1".to_string(),
            link: "https://x/1".to_string(),
            description: "d".to_string(),
            pub_date: "p".to_string(),
        };

        assert_eq!(
            to_article(&item),
            Article {
                title: "당근마켓 뉴스 1".to_string(),
                link: "https://x/1".to_string(),
                description: "d".to_string(),
                pub_date: "p".to_string(),
            }
        );
    }

    #[test]
    fn test_to_article_missing_fields() {
        let article = to_article(&RawItem::default());
        assert_eq!(article.title, "");
        assert_eq!(article.link, "");
        assert_eq!(article.pub_date, "");
    }
}
