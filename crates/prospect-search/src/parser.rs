//! DuckDuckGo HTML result extraction.
//!
//! The markup of the `html` results endpoint is an unstable scrape target;
//! this module is the only place that knows its shape. Everything else in
//! the client deals in [`SearchHit`] values, so a markup change stays
//! contained here and testable against fixture documents.

use prospect_core::SearchHit;
use scraper::{Html, Selector};
use url::Url;

/// Base against which relative result links are resolved.
const RESULT_BASE_URL: &str = "https://duckduckgo.com";

/// Extract up to `limit` ranked results from a results-page document.
///
/// Items without a usable link are skipped. A document that matches
/// nothing (including a malformed one) yields an empty vector, never an
/// error; the surface is scraped, not contracted.
#[must_use]
pub fn parse_search_results(html: &str, limit: usize) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let result_selector = Selector::parse("div.results div.result").expect("static selector");
    let link_selector = Selector::parse("a.result__a").expect("static selector");
    let snippet_selector = Selector::parse(".result__snippet").expect("static selector");

    let mut hits = Vec::new();
    for item in document.select(&result_selector) {
        if hits.len() >= limit {
            break;
        }
        let Some(link) = item.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_result_url(href) else {
            continue;
        };

        let title = link.text().collect::<String>().trim().to_string();
        let snippet = item
            .select(&snippet_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        hits.push(SearchHit {
            title,
            url,
            snippet,
        });
    }
    hits
}

/// Unwrap the redirector the results page wraps destinations in.
///
/// Result links usually point at `duckduckgo.com/l/?uddg=<encoded target>`;
/// the caller wants the target. Links that are not redirector links pass
/// through resolved against the page base; anything unparseable passes
/// through literally. Empty hrefs yield `None`.
#[must_use]
pub fn resolve_result_url(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let base = Url::parse(RESULT_BASE_URL).expect("static base url");
    let Ok(parsed) = Url::options().base_url(Some(&base)).parse(raw) else {
        return Some(raw.to_string());
    };
    if parsed.host_str() == Some("duckduckgo.com") {
        if let Some((_, target)) = parsed.query_pairs().find(|(name, _)| name == "uddg") {
            return Some(target.into_owned());
        }
    }
    Some(parsed.to_string())
}
