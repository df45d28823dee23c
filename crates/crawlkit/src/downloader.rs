//! Page downloader and the HTTP transport seam.
//!
//! The scheduling core never talks to `ureq` directly: downloaders hold a
//! boxed [`HttpClient`], so tests substitute a canned transport and the demo
//! supplies [`UreqClient`]. The factory is invoked once per downloader at
//! pool construction, giving each worker its own connection-reusing agent.

use std::error::Error;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::pool::HasId;
use crate::types::{Body, CrawlRequest, CrawlResponse, HttpRequest, HttpResponse};

/// Transport-level failure. Status codes are not errors; only failures to
/// produce a response at all (connect, DNS, timeout) surface here.
pub type HttpClientError = Box<dyn Error + Send + Sync>;

/// The transport a downloader drives.
pub trait HttpClient: Send {
    fn fetch(&self, req: &HttpRequest) -> Result<HttpResponse, HttpClientError>;
}

/// Builds one transport per downloader instance.
pub type GenHttpClient = Box<dyn Fn() -> Box<dyn HttpClient> + Send + Sync>;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Production transport over a `ureq::Agent`.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqClient {
    fn fetch(&self, req: &HttpRequest) -> Result<HttpResponse, HttpClientError> {
        let mut request = self.agent.request(req.method(), req.url().as_str());
        for (name, value) in req.headers() {
            request = request.set(name, value);
        }
        let result = match req.body() {
            Some(body) => request.send_bytes(body),
            None => request.call(),
        };
        let response = match result {
            Ok(response) => response,
            // A non-2xx status is still a response; parsers decide what to
            // do with it.
            Err(ureq::Error::Status(_, response)) => response,
            Err(err) => return Err(err.into()),
        };
        Ok(into_http_response(req.url(), response))
    }
}

fn into_http_response(request_url: &Url, response: ureq::Response) -> HttpResponse {
    let status = response.status();
    let url = Url::parse(response.get_url()).unwrap_or_else(|_| request_url.clone());
    let headers: Vec<(String, String)> = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            response
                .header(&name)
                .map(|value| (name.clone(), value.to_string()))
        })
        .collect();
    let body = Body::new(Box::new(response.into_reader()));
    HttpResponse::new(status, url, headers, body)
}

/// A pooled worker performing one HTTP fetch at a time.
pub struct PageDownloader {
    id: u32,
    client: Box<dyn HttpClient>,
}

impl PageDownloader {
    pub fn new(id: u32, client: Box<dyn HttpClient>) -> Self {
        Self { id, client }
    }

    /// Fetches the page and tags the response with the request's depth.
    pub fn download(&self, req: &CrawlRequest) -> Result<CrawlResponse, HttpClientError> {
        debug!(url = %req.http_req().url(), depth = req.depth(), "fetching page");
        let http_resp = self.client.fetch(req.http_req())?;
        Ok(CrawlResponse::new(http_resp, req.depth()))
    }
}

impl HasId for PageDownloader {
    fn id(&self) -> u32 {
        self.id
    }
}
