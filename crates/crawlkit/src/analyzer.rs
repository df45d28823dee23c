//! Analyzer workers: run the caller-supplied parser chain over one response.
//!
//! Parsers are opaque callbacks. The harness's own job is small but load
//! bearing: requests a parser emits must sit exactly one level below the page
//! they came from, so any request whose depth disagrees is re-wrapped before
//! it continues toward the admission gate.

use crate::error::{CrawlerError, ErrorKind};
use crate::pool::HasId;
use crate::types::{CrawlRequest, CrawlResponse, Datum};

/// A response parser: consumes (part of) the response body and yields
/// discovered requests and items, plus any parse errors.
///
/// The response value carries its own depth; parsers for extracted links may
/// use any depth, the harness normalizes it.
pub type ParseResponse =
    Box<dyn Fn(&mut CrawlResponse) -> (Vec<Datum>, Vec<CrawlerError>) + Send + Sync>;

/// A pooled worker applying the parser chain to one response at a time.
pub struct Analyzer {
    id: u32,
}

impl Analyzer {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    /// Runs every parser, in order, against `resp`.
    ///
    /// The body is a one-shot stream shared by the whole chain: once a parser
    /// consumes it, later parsers see it drained. All errors are concatenated
    /// in parser order.
    pub fn analyze(
        &self,
        parsers: &[ParseResponse],
        mut resp: CrawlResponse,
    ) -> (Vec<Datum>, Vec<CrawlerError>) {
        if parsers.is_empty() {
            return (
                Vec::new(),
                vec![CrawlerError::new(ErrorKind::Analyzer, "the response parser list is empty")],
            );
        }

        let resp_depth = resp.depth();
        let mut data = Vec::new();
        let mut errs = Vec::new();
        for parser in parsers {
            let (parsed, parse_errs) = parser(&mut resp);
            for datum in parsed {
                match datum {
                    Datum::Request(req) if req.depth() != resp_depth + 1 => {
                        let rewrapped = CrawlRequest::new(req.into_http_req(), resp_depth + 1);
                        data.push(Datum::Request(rewrapped));
                    }
                    datum => data.push(datum),
                }
            }
            errs.extend(parse_errs);
        }
        (data, errs)
    }
}

impl HasId for Analyzer {
    fn id(&self) -> u32 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use url::Url;

    use crate::types::{Body, HttpRequest, HttpResponse, Item};

    fn response(depth: u32, body: &str) -> CrawlResponse {
        let url = Url::parse("http://example.com/").expect("test url");
        let http_resp =
            HttpResponse::new(200, url, Vec::new(), Body::from_bytes(body.as_bytes().to_vec()));
        CrawlResponse::new(http_resp, depth)
    }

    fn link_datum(url: &str, depth: u32) -> Datum {
        let url = Url::parse(url).expect("test url");
        Datum::Request(CrawlRequest::new(HttpRequest::get(url), depth))
    }

    #[test]
    fn test_empty_parser_list_yields_one_error() {
        let analyzer = Analyzer::new(0);
        let (data, errs) = analyzer.analyze(&[], response(0, ""));
        assert!(data.is_empty());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind(), ErrorKind::Analyzer);
    }

    #[test]
    fn test_requests_are_rewrapped_to_resp_depth_plus_one() {
        let parser: ParseResponse = Box::new(|resp: &mut CrawlResponse| {
            // Depths 0, 9, and the correct 3 — only the last passes through
            // untouched.
            (
                vec![
                    link_datum("http://example.com/a", 0),
                    link_datum("http://example.com/b", 9),
                    link_datum("http://example.com/c", resp.depth() + 1),
                ],
                Vec::new(),
            )
        });
        let analyzer = Analyzer::new(0);
        let (data, errs) = analyzer.analyze(&[parser], response(2, ""));
        assert!(errs.is_empty());
        assert_eq!(data.len(), 3);
        for datum in &data {
            match datum {
                Datum::Request(req) => assert_eq!(req.depth(), 3),
                Datum::Entry(_) => panic!("expected only requests"),
            }
        }
    }

    #[test]
    fn test_items_pass_through_unchanged() {
        let parser: ParseResponse = Box::new(|_: &mut CrawlResponse| {
            let mut item = Item::new();
            item.insert("title".to_string(), serde_json::Value::from("index"));
            (vec![Datum::Entry(item)], Vec::new())
        });
        let analyzer = Analyzer::new(1);
        let (data, errs) = analyzer.analyze(&[parser], response(0, ""));
        assert!(errs.is_empty());
        assert_eq!(data.len(), 1);
        match &data[0] {
            Datum::Entry(item) => assert_eq!(item["title"], "index"),
            Datum::Request(_) => panic!("expected an item"),
        }
    }

    #[test]
    fn test_errors_from_all_parsers_are_concatenated() {
        let failing = |msg: &'static str| -> ParseResponse {
            Box::new(move |_: &mut CrawlResponse| {
                (Vec::new(), vec![CrawlerError::new(ErrorKind::Analyzer, msg)])
            })
        };
        let analyzer = Analyzer::new(2);
        let (data, errs) = analyzer.analyze(&[failing("first"), failing("second")], response(0, ""));
        assert!(data.is_empty());
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].message(), "first");
        assert_eq!(errs[1].message(), "second");
    }

    #[test]
    fn test_body_is_consumed_once_across_the_chain() {
        let reader = |label: &'static str| -> ParseResponse {
            Box::new(move |resp: &mut CrawlResponse| {
                let mut body = String::new();
                resp.http_resp_mut()
                    .body_mut()
                    .read_to_string(&mut body)
                    .expect("read body");
                let mut item = Item::new();
                item.insert(label.to_string(), serde_json::Value::from(body));
                (vec![Datum::Entry(item)], Vec::new())
            })
        };
        let analyzer = Analyzer::new(3);
        let (data, _) = analyzer.analyze(&[reader("first"), reader("second")], response(0, "page"));
        assert_eq!(data.len(), 2);
        match (&data[0], &data[1]) {
            (Datum::Entry(first), Datum::Entry(second)) => {
                assert_eq!(first["first"], "page");
                assert_eq!(second["second"], "", "the second parser sees a drained body");
            }
            _ => panic!("expected two items"),
        }
    }
}
