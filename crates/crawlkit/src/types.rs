//! Foundational data types flowing through the crawl pipeline.
//!
//! - [`HttpRequest`] / [`HttpResponse`] — the plain HTTP halves, independent
//!   of any particular client implementation.
//! - [`CrawlRequest`] / [`CrawlResponse`] — the HTTP halves paired with the
//!   crawl depth they belong to.
//! - [`Item`] — an insertion-ordered mapping of string keys to arbitrary
//!   values, produced by parsers and consumed by the item pipeline.
//! - [`Datum`] — the tagged variant a parser emits: either a newly discovered
//!   request or an extracted item.

use std::fmt;
use std::io::{self, Cursor, Read};

use url::Url;

/// A response body, readable exactly once.
///
/// Wraps whatever reader the transport produced. Parsers own the read; once a
/// parser has consumed the stream, later parsers see it drained.
pub struct Body(Box<dyn Read + Send>);

impl Body {
    pub fn new(reader: Box<dyn Read + Send>) -> Self {
        Self(reader)
    }

    /// An already-drained body.
    pub fn empty() -> Self {
        Self(Box::new(io::empty()))
    }

    /// A body over an in-memory buffer. Used by stub transports and tests.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(Box::new(Cursor::new(bytes)))
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body(..)")
    }
}

/// An HTTP request: method, URL, headers, optional body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: String,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self {
            method: method.into(),
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// A bodyless GET request, the common case for page fetches.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// An HTTP response: status, headers, the final URL, and a one-shot body.
#[derive(Debug)]
pub struct HttpResponse {
    status: u16,
    url: Url,
    headers: Vec<(String, String)>,
    body: Body,
}

impl HttpResponse {
    pub fn new(status: u16, url: Url, headers: Vec<(String, String)>, body: Body) -> Self {
        Self { status, url, headers, body }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

/// A request paired with its crawl depth.
///
/// The seed request is depth 0; every request extracted from a page at depth
/// `d` is depth `d + 1`.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    http_req: HttpRequest,
    depth: u32,
}

impl CrawlRequest {
    pub fn new(http_req: HttpRequest, depth: u32) -> Self {
        Self { http_req, depth }
    }

    pub fn http_req(&self) -> &HttpRequest {
        &self.http_req
    }

    pub fn into_http_req(self) -> HttpRequest {
        self.http_req
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn valid(&self) -> bool {
        self.http_req.url().has_host()
    }
}

/// A response paired with the depth of the request that produced it.
#[derive(Debug)]
pub struct CrawlResponse {
    http_resp: HttpResponse,
    depth: u32,
}

impl CrawlResponse {
    pub fn new(http_resp: HttpResponse, depth: u32) -> Self {
        Self { http_resp, depth }
    }

    pub fn http_resp(&self) -> &HttpResponse {
        &self.http_resp
    }

    pub fn http_resp_mut(&mut self) -> &mut HttpResponse {
        &mut self.http_resp
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// An extracted item: an insertion-ordered string-to-value mapping.
pub type Item = serde_json::Map<String, serde_json::Value>;

/// What a parser yields: a request to follow or an item to process.
#[derive(Debug)]
pub enum Datum {
    Request(CrawlRequest),
    Entry(Item),
}

impl Datum {
    pub fn valid(&self) -> bool {
        match self {
            Datum::Request(req) => req.valid(),
            Datum::Entry(item) => !item.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(url: &str) -> Url {
        Url::parse(url).expect("test url")
    }

    #[test]
    fn test_get_request_defaults() {
        let req = HttpRequest::get(parse("http://example.com/a"));
        assert_eq!(req.method(), "GET");
        assert_eq!(req.url().as_str(), "http://example.com/a");
        assert!(req.headers().is_empty());
        assert!(req.body().is_none());
    }

    #[test]
    fn test_request_builder_headers_and_body() {
        let req = HttpRequest::get(parse("http://example.com/"))
            .with_header("Accept", "text/html")
            .with_body(b"payload".to_vec());
        assert_eq!(req.headers(), &[("Accept".to_string(), "text/html".to_string())]);
        assert_eq!(req.body(), Some(&b"payload"[..]));
    }

    #[test]
    fn test_body_reads_once() {
        let mut body = Body::from_bytes(b"hello".to_vec());
        let mut first = String::new();
        body.read_to_string(&mut first).expect("read");
        assert_eq!(first, "hello");

        let mut second = String::new();
        body.read_to_string(&mut second).expect("read");
        assert_eq!(second, "", "a drained body yields nothing on re-read");
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let resp = HttpResponse::new(
            200,
            parse("http://example.com/"),
            vec![("Content-Type".to_string(), "text/html".to_string())],
            Body::empty(),
        );
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert_eq!(resp.header("x-missing"), None);
    }

    #[test]
    fn test_crawl_request_depth_and_validity() {
        let req = CrawlRequest::new(HttpRequest::get(parse("http://example.com/")), 2);
        assert_eq!(req.depth(), 2);
        assert!(req.valid());

        let no_host = CrawlRequest::new(HttpRequest::get(parse("data:text/plain,x")), 0);
        assert!(!no_host.valid());
    }

    #[test]
    fn test_datum_validity() {
        let req = CrawlRequest::new(HttpRequest::get(parse("http://example.com/")), 0);
        assert!(Datum::Request(req).valid());

        let empty = Item::new();
        assert!(!Datum::Entry(empty).valid());

        let mut item = Item::new();
        item.insert("k".to_string(), serde_json::Value::from(1));
        assert!(Datum::Entry(item).valid());
    }
}
