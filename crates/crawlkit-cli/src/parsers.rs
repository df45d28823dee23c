//! The demo's response parser: extract `<a href=…>` links and anchor texts.
//!
//! Regex-based extraction is enough for the demo; anything the pattern
//! misses is simply not followed. Relative targets are resolved against the
//! page URL, `javascript:` targets and bare fragments are skipped.

use std::io::Read;
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crawlkit::{CrawlRequest, CrawlResponse, CrawlerError, Datum, ErrorKind, HttpRequest, Item, ParseResponse};

fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("anchor pattern compiles")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern compiles"))
}

/// Builds the `<a>`-tag parser used by the demo crawl.
pub fn link_and_text_parser() -> ParseResponse {
    Box::new(|resp: &mut CrawlResponse| parse_anchors(resp))
}

fn parse_anchors(resp: &mut CrawlResponse) -> (Vec<Datum>, Vec<CrawlerError>) {
    let status = resp.http_resp().status();
    let page_url = resp.http_resp().url().clone();
    if status != 200 {
        return (
            Vec::new(),
            vec![CrawlerError::new(
                ErrorKind::Analyzer,
                format!("unsupported status code {status} (url={page_url})"),
            )],
        );
    }

    let mut body = String::new();
    if let Err(err) = resp.http_resp_mut().body_mut().read_to_string(&mut body) {
        return (
            Vec::new(),
            vec![CrawlerError::new(
                ErrorKind::Analyzer,
                format!("failed to read the body of {page_url}: {err}"),
            )],
        );
    }

    let link_depth = resp.depth() + 1;
    let mut data = Vec::new();
    let mut errs = Vec::new();
    for (index, capture) in anchor_pattern().captures_iter(&body).enumerate() {
        let href = capture[1].trim();
        if let Some(target) = resolve_href(&page_url, href) {
            data.push(Datum::Request(CrawlRequest::new(
                HttpRequest::get(target),
                link_depth,
            )));
        } else if !href.is_empty() && !is_skippable(href) {
            errs.push(CrawlerError::new(
                ErrorKind::Analyzer,
                format!("unparsable link target {href:?} on {page_url}"),
            ));
        }

        let text = tag_pattern().replace_all(&capture[2], "");
        let text = text.trim();
        if !text.is_empty() {
            let mut item = Item::new();
            item.insert(
                "parent_url".to_string(),
                serde_json::Value::from(page_url.as_str()),
            );
            item.insert("a.text".to_string(), serde_json::Value::from(text));
            item.insert("a.index".to_string(), serde_json::Value::from(index as u64));
            data.push(Datum::Entry(item));
        }
    }
    (data, errs)
}

fn is_skippable(href: &str) -> bool {
    href.is_empty()
        || href == "#"
        || href == "/"
        || href.starts_with('#')
        || href.to_lowercase().starts_with("javascript")
}

fn resolve_href(page_url: &Url, href: &str) -> Option<Url> {
    if is_skippable(href) {
        return None;
    }
    match Url::parse(href) {
        Ok(absolute) => Some(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => page_url.join(href).ok(),
        Err(_) => None,
    }
}
