use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Article, ScrapedLink, StoredNewsRecord};

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Strip markup from a text field returned by the search API.
///
/// Search hits wrap the matched keyword in `<b>` tags and escape quotes and
/// ampersands. This does a naive pass over that:
///
/// - every `<...>` run is removed, with no attribute parsing or nesting awareness
/// - `&quot;`, `&amp;`, `&lt;` and `&gt;` are decoded, in that order, each over the whole string
/// - any other entity is left as is
/// - the result is trimmed
///
/// # Example
///
/// ```ignore
/// assert_eq!(clean_html_tags("<b>&quot;X&quot;</b>"), "\"X\"");
/// ```
pub fn clean_html_tags(text: &str) -> String {
    let cleaned = TAG_REGEX.replace_all(text, "");

    let cleaned = cleaned.replace("&quot;", "\"");
    let cleaned = cleaned.replace("&amp;", "&");
    let cleaned = cleaned.replace("&lt;", "<");
    let cleaned = cleaned.replace("&gt;", ">");

    cleaned.trim().to_string()
}

/// First `max` characters of `text`, with `...` appended when something was cut.
pub fn preview(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn format_article_listing(articles: &[Article]) -> String {
    let mut output = String::new();

    for (i, article) in articles.iter().enumerate() {
        output.push_str(&format!("[{}] {}\n", i + 1, article.title));
        output.push_str(&format!("    link: {}\n", article.link));
        output.push_str(&format!("    date: {}\n", article.pub_date));
        output.push_str(&format!("    summary: {}\n\n", preview(&article.description, 100)));
    }

    output.trim_end().to_string()
}

pub fn format_link_listing(links: &[ScrapedLink]) -> String {
    links
        .iter()
        .map(|l| format!("Title: {}\nURL: {}\n", l.title, l.url))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_record(record: &StoredNewsRecord) -> String {
    format!(
        " ID: {}, Title: {}, URL: {}",
        record.id,
        record.title.as_deref().unwrap_or(""),
        record.url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_html_tags() {
        assert_eq!(clean_html_tags("<b>X</b>"), "X");
        assert_eq!(clean_html_tags("<b>&quot;X&quot;</b>"), "\"X\"");
        assert_eq!(clean_html_tags("&amp;"), "&");
        assert_eq!(clean_html_tags("&lt;tag&gt;"), "<tag>");
        assert_eq!(clean_html_tags("<b>당근마켓</b> 뉴스 1"), "당근마켓 뉴스 1");

        // attributes and self-closing tags go the same way
        assert_eq!(clean_html_tags(r#"<a href="x">link</a><br/>"#), "link");

        // only the fixed entity set is decoded
        assert_eq!(clean_html_tags("&nbsp;a&#39;b"), "&nbsp;a&#39;b");

        // &amp; is decoded before &lt;, so a double-escaped bracket ends up decoded
        assert_eq!(clean_html_tags("&amp;lt;"), "<");

        // an unclosed bracket is not a tag
        assert_eq!(clean_html_tags("a < b"), "a < b");

        assert_eq!(clean_html_tags("   "), "");
        assert_eq!(clean_html_tags("  <p> padded </p>  "), "padded");
    }

    #[test]
    fn test_clean_html_tags_idempotent_on_clean_input() {
        for s in ["plain text", "당근마켓 뉴스", "\"quoted\" & more", "  spaced  "] {
            let once = clean_html_tags(s);
            assert_eq!(clean_html_tags(&once), once);
        }
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", 100), "short");
        assert_eq!(preview("가나다라", 2), "가나...");
        assert_eq!(preview("", 5), "");
    }

    #[test]
    fn test_format_article_listing() {
        let articles = vec![Article {
            title: "Title".to_string(),
            link: "https://x/1".to_string(),
            description: "d".to_string(),
            pub_date: "p".to_string(),
        }];
        let out = format_article_listing(&articles);
        assert!(out.starts_with("[1] Title\n"));
        assert!(out.contains("    link: https://x/1"));
        assert!(out.ends_with("summary: d"));
    }
}
