//! Configuration arguments supplied to the scheduler.
//!
//! Both argument structs are plain data: validated once by `check()` at
//! `start` time and immutable afterwards. They derive serde traits so callers
//! can load them from configuration files.

use serde::{Deserialize, Serialize};

use crate::error::{CrawlerError, ErrorKind};

/// Capacities of the four pipeline channels. Each must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelArgs {
    req_chan_len: usize,
    resp_chan_len: usize,
    item_chan_len: usize,
    err_chan_len: usize,
}

impl ChannelArgs {
    pub fn new(
        req_chan_len: usize,
        resp_chan_len: usize,
        item_chan_len: usize,
        err_chan_len: usize,
    ) -> Self {
        Self { req_chan_len, resp_chan_len, item_chan_len, err_chan_len }
    }

    pub fn check(&self) -> Result<(), CrawlerError> {
        let fields = [
            ("request channel length", self.req_chan_len),
            ("response channel length", self.resp_chan_len),
            ("item channel length", self.item_chan_len),
            ("error channel length", self.err_chan_len),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(CrawlerError::new(
                    ErrorKind::Scheduler,
                    format!("invalid channel arguments: {name} must be >= 1"),
                ));
            }
        }
        Ok(())
    }

    pub fn req_chan_len(&self) -> usize {
        self.req_chan_len
    }

    pub fn resp_chan_len(&self) -> usize {
        self.resp_chan_len
    }

    pub fn item_chan_len(&self) -> usize {
        self.item_chan_len
    }

    pub fn err_chan_len(&self) -> usize {
        self.err_chan_len
    }

    pub fn summary(&self) -> String {
        format!(
            "reqChanLen: {}, respChanLen: {}, itemChanLen: {}, errChanLen: {}",
            self.req_chan_len, self.resp_chan_len, self.item_chan_len, self.err_chan_len
        )
    }
}

impl Default for ChannelArgs {
    fn default() -> Self {
        Self::new(10, 10, 10, 10)
    }
}

/// Sizes of the two worker pools. Each must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBaseArgs {
    page_downloader_pool_size: u32,
    analyzer_pool_size: u32,
}

impl PoolBaseArgs {
    pub fn new(page_downloader_pool_size: u32, analyzer_pool_size: u32) -> Self {
        Self { page_downloader_pool_size, analyzer_pool_size }
    }

    pub fn check(&self) -> Result<(), CrawlerError> {
        if self.page_downloader_pool_size == 0 {
            return Err(CrawlerError::new(
                ErrorKind::Scheduler,
                "invalid pool arguments: page downloader pool size must be >= 1",
            ));
        }
        if self.analyzer_pool_size == 0 {
            return Err(CrawlerError::new(
                ErrorKind::Scheduler,
                "invalid pool arguments: analyzer pool size must be >= 1",
            ));
        }
        Ok(())
    }

    pub fn page_downloader_pool_size(&self) -> u32 {
        self.page_downloader_pool_size
    }

    pub fn analyzer_pool_size(&self) -> u32 {
        self.analyzer_pool_size
    }

    pub fn summary(&self) -> String {
        format!(
            "pageDownloaderPoolSize: {}, analyzerPoolSize: {}",
            self.page_downloader_pool_size, self.analyzer_pool_size
        )
    }
}

impl Default for PoolBaseArgs {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_channel_args_pass_check() {
        assert!(ChannelArgs::default().check().is_ok());
    }

    #[test]
    fn test_zero_capacity_fails_check() {
        for args in [
            ChannelArgs::new(0, 1, 1, 1),
            ChannelArgs::new(1, 0, 1, 1),
            ChannelArgs::new(1, 1, 0, 1),
            ChannelArgs::new(1, 1, 1, 0),
        ] {
            let err = args.check().expect_err("zero capacity must fail");
            assert!(err.message().contains("must be >= 1"), "message: {}", err.message());
        }
    }

    #[test]
    fn test_default_pool_args_pass_check() {
        assert!(PoolBaseArgs::default().check().is_ok());
    }

    #[test]
    fn test_zero_pool_size_fails_check() {
        assert!(PoolBaseArgs::new(0, 1).check().is_err());
        assert!(PoolBaseArgs::new(1, 0).check().is_err());
    }

    #[test]
    fn test_channel_args_serde_round_trip() {
        let args = ChannelArgs::new(4, 5, 6, 7);
        let json = serde_json::to_string(&args).expect("serialize");
        let back: ChannelArgs = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, args);
    }

    #[test]
    fn test_summaries_mention_every_field() {
        let summary = ChannelArgs::new(1, 2, 3, 4).summary();
        assert_eq!(summary, "reqChanLen: 1, respChanLen: 2, itemChanLen: 3, errChanLen: 4");
        let summary = PoolBaseArgs::new(5, 6).summary();
        assert_eq!(summary, "pageDownloaderPoolSize: 5, analyzerPoolSize: 6");
    }
}
