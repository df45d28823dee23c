mod parsers;
mod processors;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use crawlkit::{
    monitor, ChannelArgs, GenHttpClient, HttpClient, HttpRequest, MonitorArgs, PoolBaseArgs,
    RecordLevel, Scheduler, UreqClient,
};

/// Crawl one site breadth-first down to a depth limit.
#[derive(Parser, Debug)]
#[command(name = "crawlkit-cli", about = "Crawl one site breadth-first down to a depth limit")]
struct Args {
    /// Seed URL; only plain http links on the same primary domain are followed
    seed: String,

    /// Maximum link depth (0 crawls the seed only)
    #[arg(long, default_value_t = 1)]
    depth: u32,

    /// Downloader pool size
    #[arg(long, default_value_t = 3)]
    downloaders: u32,

    /// Analyzer pool size
    #[arg(long, default_value_t = 3)]
    analyzers: u32,

    /// Capacity of each pipeline channel
    #[arg(long, default_value_t = 10)]
    channel_len: usize,

    /// Consecutive idle checks (at 10 ms each) before the crawl is declared done
    #[arg(long, default_value_t = 1000)]
    max_idle_count: u32,

    /// Log the scheduler summary whenever it changes
    #[arg(long)]
    detail: bool,
}

fn record_sink() -> crawlkit::Record {
    Box::new(|level: RecordLevel, content: &str| match level {
        RecordLevel::Info => info!("{content}"),
        RecordLevel::Warn => warn!("{content}"),
        RecordLevel::Error => error!("{content}"),
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let seed = match Url::parse(&args.seed) {
        Ok(url) => url,
        Err(err) => {
            eprintln!("invalid seed url {:?}: {err}", args.seed);
            std::process::exit(1);
        }
    };

    let scheduler = Arc::new(Scheduler::new());
    let done = monitor(
        Arc::clone(&scheduler),
        MonitorArgs {
            interval: Duration::from_millis(10),
            max_idle_count: args.max_idle_count,
            auto_stop: true,
            detail_summary: args.detail,
        },
        record_sink(),
    );

    let factory: GenHttpClient = Box::new(|| Box::new(UreqClient::new()) as Box<dyn HttpClient>);
    let started = scheduler.start(
        ChannelArgs::new(args.channel_len, args.channel_len, args.channel_len, args.channel_len),
        PoolBaseArgs::new(args.downloaders, args.analyzers),
        args.depth,
        factory,
        vec![parsers::link_and_text_parser()],
        vec![processors::numbering_processor()],
        HttpRequest::get(seed),
    );
    if let Err(err) = started {
        error!("failed to start the crawl: {}", err.to_string().trim_end());
        std::process::exit(1);
    }
    info!(seed = %args.seed, depth = args.depth, "crawl started");

    // The monitor stops the scheduler once the crawl drains.
    let checks = done.recv().unwrap_or(0);
    info!(checks, "crawl finished");
    print!("{}", scheduler.summary("  "));
}
