// crawlkit: bounded-depth single-origin web crawler built around a
// channel-and-pool scheduling core.

pub mod analyzer;
pub mod cache;
pub mod chanman;
pub mod config;
pub mod domain;
pub mod downloader;
pub mod error;
pub mod id;
pub mod monitor;
pub mod pipeline;
pub mod pool;
pub mod scheduler;
pub mod stop;
pub mod types;

pub use analyzer::{Analyzer, ParseResponse};
pub use chanman::{ChannelManager, ChannelManagerStatus, CrawlChannel};
pub use config::{ChannelArgs, PoolBaseArgs};
pub use downloader::{GenHttpClient, HttpClient, HttpClientError, PageDownloader, UreqClient};
pub use error::{CrawlerError, ErrorKind};
pub use monitor::{monitor, MonitorArgs, Record, RecordLevel};
pub use pipeline::{ItemPipeline, ProcessItem};
pub use scheduler::Scheduler;
pub use types::{Body, CrawlRequest, CrawlResponse, Datum, HttpRequest, HttpResponse, Item};
