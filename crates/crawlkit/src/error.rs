//! Error taxonomy and component codes.
//!
//! Every error that travels through the crawl carries an [`ErrorKind`] naming
//! the stage it originated from, and renders on the wire as
//! `Crawler Error:<kind>:<message>` followed by a newline. Component codes
//! (`downloader-3`, `analyzer-0`, …) identify the worker instance an error or
//! a stop-sign acknowledgement came from; the scheduler itself uses the bare
//! `scheduler` code.

use std::fmt;

use thiserror::Error;

/// Code prefix for downloader workers.
pub const DOWNLOADER_CODE: &str = "downloader";
/// Code prefix for analyzer workers.
pub const ANALYZER_CODE: &str = "analyzer";
/// Code prefix for item-pipeline subtasks.
pub const ITEM_PIPELINE_CODE: &str = "item_pipeline";
/// Code used by the scheduler and its feeder loop (no id suffix).
pub const SCHEDULER_CODE: &str = "scheduler";

/// The stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Downloader,
    Analyzer,
    ItemProcessor,
    Scheduler,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Downloader => "Downloader Error",
            ErrorKind::Analyzer => "Analyzer Error",
            ErrorKind::ItemProcessor => "Item Processor Error",
            ErrorKind::Scheduler => "Scheduler Error",
        };
        f.write_str(name)
    }
}

/// A tagged crawl error.
///
/// The `Display` form is the exact wire format consumed from the error
/// channel, trailing newline included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Crawler Error:{kind}:{msg}\n")]
pub struct CrawlerError {
    kind: ErrorKind,
    msg: String,
}

impl CrawlerError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, msg: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

/// Formats a component code from a prefix and a worker id.
pub fn generate_code(prefix: &str, id: u32) -> String {
    format!("{prefix}-{id}")
}

/// Splits a component code into its prefix and optional id part.
///
/// A code without a dash (the scheduler code) yields `(code, None)`.
pub fn parse_code(code: &str) -> (&str, Option<&str>) {
    match code.find('-') {
        Some(index) if index > 0 => (&code[..index], Some(&code[index + 1..])),
        _ => (code, None),
    }
}

/// Maps a component code to the error kind used when forwarding an error on
/// that component's behalf. Unknown prefixes fall back to the scheduler kind.
pub fn kind_for_code(code: &str) -> ErrorKind {
    let (prefix, _) = parse_code(code);
    match prefix {
        DOWNLOADER_CODE => ErrorKind::Downloader,
        ANALYZER_CODE => ErrorKind::Analyzer,
        ITEM_PIPELINE_CODE => ErrorKind::ItemProcessor,
        _ => ErrorKind::Scheduler,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_trailing_newline() {
        let err = CrawlerError::new(ErrorKind::Downloader, "connection refused");
        assert_eq!(
            err.to_string(),
            "Crawler Error:Downloader Error:connection refused\n"
        );
    }

    #[test]
    fn test_display_for_every_kind() {
        let cases = [
            (ErrorKind::Downloader, "Downloader Error"),
            (ErrorKind::Analyzer, "Analyzer Error"),
            (ErrorKind::ItemProcessor, "Item Processor Error"),
            (ErrorKind::Scheduler, "Scheduler Error"),
        ];
        for (kind, label) in cases {
            let err = CrawlerError::new(kind, "x");
            assert_eq!(err.to_string(), format!("Crawler Error:{label}:x\n"));
        }
    }

    #[test]
    fn test_generate_and_parse_code_round_trip() {
        let code = generate_code(DOWNLOADER_CODE, 7);
        assert_eq!(code, "downloader-7");
        assert_eq!(parse_code(&code), ("downloader", Some("7")));
    }

    #[test]
    fn test_parse_code_without_id() {
        assert_eq!(parse_code(SCHEDULER_CODE), ("scheduler", None));
    }

    #[test]
    fn test_kind_for_code_by_prefix() {
        assert_eq!(kind_for_code("downloader-0"), ErrorKind::Downloader);
        assert_eq!(kind_for_code("analyzer-12"), ErrorKind::Analyzer);
        assert_eq!(kind_for_code("item_pipeline-3"), ErrorKind::ItemProcessor);
        assert_eq!(kind_for_code("scheduler"), ErrorKind::Scheduler);
        assert_eq!(kind_for_code("something-else"), ErrorKind::Scheduler);
    }
}
