//! The scheduler: owns every pipeline component and drives the crawl.
//!
//! `start` builds the channel manager, both worker pools, the item pipeline,
//! the request cache and the seen-URL set, then spawns four long-running
//! driver threads:
//!
//! - the **feeder** meters cached requests into the request channel, never
//!   sending more than the channel's free capacity per tick;
//! - the **downloader driver** moves requests to responses through the
//!   downloader pool;
//! - the **analyzer driver** moves responses through the analyzer pool and
//!   routes what the parsers found: requests to the admission gate, items to
//!   the item channel;
//! - the **item driver** feeds items through the shared item pipeline.
//!
//! Each driver spawns a short-lived thread per element; the pools bound how
//! many of those make progress at once. Stopping is cooperative: `stop`
//! raises the stop sign, closes the channels to unblock the drivers, and
//! closes the cache to starve the feeder. In-flight work finishes on its own.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::analyzer::{Analyzer, ParseResponse};
use crate::cache::RequestCache;
use crate::chanman::{ChannelManager, CrawlChannel};
use crate::config::{ChannelArgs, PoolBaseArgs};
use crate::domain::get_primary_domain;
use crate::downloader::{GenHttpClient, PageDownloader};
use crate::error::{
    generate_code, kind_for_code, CrawlerError, ErrorKind, ANALYZER_CODE, DOWNLOADER_CODE,
    ITEM_PIPELINE_CODE, SCHEDULER_CODE,
};
use crate::id::IdGenerator;
use crate::pipeline::{ItemPipeline, ProcessItem};
use crate::pool::{HasId, Pool};
use crate::stop::StopSign;
use crate::types::{CrawlRequest, CrawlResponse, Datum, HttpRequest, Item};

const NOT_STARTED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// How often the feeder wakes to top up the request channel.
const FEEDER_TICK: Duration = Duration::from_millis(10);

/// Everything a crawl shares between the driver threads.
struct CrawlContext {
    channel_args: ChannelArgs,
    pool_args: PoolBaseArgs,
    crawl_depth: u32,
    primary_domain: String,
    chanman: ChannelManager,
    dl_pool: Pool<PageDownloader>,
    analyzer_pool: Pool<Analyzer>,
    item_pipeline: ItemPipeline,
    req_cache: RequestCache,
    url_map: Mutex<HashSet<String>>,
    stop_sign: Arc<StopSign>,
    item_code_ids: IdGenerator,
}

pub struct Scheduler {
    running: AtomicU8,
    stop_sign: Arc<StopSign>,
    ctx: RwLock<Option<Arc<CrawlContext>>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            running: AtomicU8::new(NOT_STARTED),
            stop_sign: Arc::new(StopSign::new()),
            ctx: RwLock::new(None),
        }
    }

    /// Starts the crawl from `first_req` at depth 0.
    ///
    /// Validates every argument before any side effect; a panic while wiring
    /// the components is caught and returned as an error. On success the
    /// scheduler transitions to running and the driver threads are live.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        &self,
        channel_args: ChannelArgs,
        pool_args: PoolBaseArgs,
        crawl_depth: u32,
        client_factory: GenHttpClient,
        resp_parsers: Vec<ParseResponse>,
        item_processors: Vec<ProcessItem>,
        first_req: HttpRequest,
    ) -> Result<(), CrawlerError> {
        let mut ctx_slot = self.ctx.write().expect("scheduler context lock poisoned");
        if self.running.load(Ordering::SeqCst) != NOT_STARTED {
            return Err(CrawlerError::new(
                ErrorKind::Scheduler,
                "the scheduler has already been started",
            ));
        }
        channel_args.check()?;
        pool_args.check()?;
        if item_processors.is_empty() {
            return Err(CrawlerError::new(
                ErrorKind::Scheduler,
                "invalid item processor list: it is empty",
            ));
        }
        let host = first_req.url().host_str().ok_or_else(|| {
            CrawlerError::new(ErrorKind::Scheduler, "the first request has no host")
        })?;
        let primary_domain = get_primary_domain(host)?;

        let stop_sign = Arc::clone(&self.stop_sign);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            build_and_launch(
                channel_args,
                pool_args,
                crawl_depth,
                primary_domain,
                client_factory,
                resp_parsers,
                item_processors,
                first_req,
                stop_sign,
            )
        }));
        let ctx = match outcome {
            Ok(result) => result?,
            Err(payload) => {
                return Err(CrawlerError::new(
                    ErrorKind::Scheduler,
                    format!("panic while starting the scheduler: {}", panic_message(&payload)),
                ));
            }
        };

        *ctx_slot = Some(ctx);
        self.running.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    /// Stops the crawl: raises the stop sign, closes the channels and the
    /// request cache. Returns `false` unless the scheduler was running.
    pub fn stop(&self) -> bool {
        if self
            .running
            .compare_exchange(RUNNING, STOPPED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        let guard = self.ctx.read().expect("scheduler context lock poisoned");
        if let Some(ctx) = guard.as_ref() {
            ctx.stop_sign.sign();
            ctx.chanman.close();
            ctx.req_cache.close();
        }
        debug!("scheduler stopped");
        true
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst) == RUNNING
    }

    /// The read side of the error channel, while the channel manager is
    /// initialized; `None` before start and after stop.
    pub fn error_chan(&self) -> Option<CrawlChannel<CrawlerError>> {
        let guard = self.ctx.read().expect("scheduler context lock poisoned");
        guard.as_ref().and_then(|ctx| ctx.chanman.err_chan().ok())
    }

    /// True when no downloader is out, no analyzer is out, and no item is
    /// inside the pipeline, all at the same instant.
    pub fn idle(&self) -> bool {
        let guard = self.ctx.read().expect("scheduler context lock poisoned");
        match guard.as_ref() {
            Some(ctx) => {
                ctx.dl_pool.used() == 0
                    && ctx.analyzer_pool.used() == 0
                    && ctx.item_pipeline.processing_number() == 0
            }
            None => false,
        }
    }

    /// Human-readable snapshot; every line starts with `prefix`.
    pub fn summary(&self, prefix: &str) -> String {
        let guard = self.ctx.read().expect("scheduler context lock poisoned");
        let mut out = format!("{prefix}running: {}\n", self.running());
        if let Some(ctx) = guard.as_ref() {
            let url_count = ctx.url_map.lock().expect("url map mutex poisoned").len();
            out.push_str(&format!("{prefix}channelArgs: {}\n", ctx.channel_args.summary()));
            out.push_str(&format!("{prefix}poolBaseArgs: {}\n", ctx.pool_args.summary()));
            out.push_str(&format!("{prefix}crawlDepth: {}\n", ctx.crawl_depth));
            out.push_str(&format!("{prefix}primaryDomain: {}\n", ctx.primary_domain));
            out.push_str(&format!("{prefix}channelManager: {}\n", ctx.chanman.summary()));
            out.push_str(&format!("{prefix}requestCache: {}\n", ctx.req_cache.summary()));
            out.push_str(&format!("{prefix}pageDownloaderPool: {}\n", ctx.dl_pool.summary()));
            out.push_str(&format!("{prefix}analyzerPool: {}\n", ctx.analyzer_pool.summary()));
            out.push_str(&format!("{prefix}itemPipeline: {}\n", ctx.item_pipeline.summary()));
            out.push_str(&format!("{prefix}urlCount: {url_count}\n"));
            out.push_str(&format!("{prefix}stopSign: {}\n", ctx.stop_sign.summary()));
        }
        out
    }

    /// Stop-sign acknowledgement count for one component code.
    pub fn deal_count(&self, code: &str) -> u32 {
        self.stop_sign.deal_count(code)
    }

    /// Total stop-sign acknowledgements across all components.
    pub fn deal_total(&self) -> u32 {
        self.stop_sign.deal_total()
    }

    /// Number of distinct URLs admitted so far in this crawl.
    pub fn seen_url_count(&self) -> usize {
        let guard = self.ctx.read().expect("scheduler context lock poisoned");
        match guard.as_ref() {
            Some(ctx) => ctx.url_map.lock().expect("url map mutex poisoned").len(),
            None => 0,
        }
    }

    /// Whether `url` has been admitted during this crawl.
    pub fn has_seen_url(&self, url: &str) -> bool {
        let guard = self.ctx.read().expect("scheduler context lock poisoned");
        match guard.as_ref() {
            Some(ctx) => ctx.url_map.lock().expect("url map mutex poisoned").contains(url),
            None => false,
        }
    }
}

/// Builds the crawl context, spawns the four drivers, seeds the cache.
#[allow(clippy::too_many_arguments)]
fn build_and_launch(
    channel_args: ChannelArgs,
    pool_args: PoolBaseArgs,
    crawl_depth: u32,
    primary_domain: String,
    client_factory: GenHttpClient,
    resp_parsers: Vec<ParseResponse>,
    item_processors: Vec<ProcessItem>,
    first_req: HttpRequest,
    stop_sign: Arc<StopSign>,
) -> Result<Arc<CrawlContext>, CrawlerError> {
    let chanman = ChannelManager::new(channel_args)?;

    let dl_ids = IdGenerator::new();
    let dl_pool = Pool::new(pool_args.page_downloader_pool_size(), || {
        PageDownloader::new(dl_ids.next_id(), client_factory())
    })
    .map_err(|err| {
        CrawlerError::new(ErrorKind::Scheduler, format!("downloader pool: {err}"))
    })?;

    let analyzer_ids = IdGenerator::new();
    let analyzer_pool = Pool::new(pool_args.analyzer_pool_size(), || {
        Analyzer::new(analyzer_ids.next_id())
    })
    .map_err(|err| CrawlerError::new(ErrorKind::Scheduler, format!("analyzer pool: {err}")))?;

    let item_pipeline = ItemPipeline::new(item_processors)?;

    stop_sign.reset();

    let ctx = Arc::new(CrawlContext {
        channel_args,
        pool_args,
        crawl_depth,
        primary_domain,
        chanman,
        dl_pool,
        analyzer_pool,
        item_pipeline,
        req_cache: RequestCache::new(),
        url_map: Mutex::new(HashSet::new()),
        stop_sign,
        item_code_ids: IdGenerator::new(),
    });

    let req_ch = ctx.chanman.req_chan()?;
    let resp_ch = ctx.chanman.resp_chan()?;
    let item_ch = ctx.chanman.item_chan()?;
    let err_ch = ctx.chanman.err_chan()?;

    spawn_driver("crawlkit-downloader-driver", {
        let ctx = Arc::clone(&ctx);
        let req_ch = req_ch.clone();
        let resp_ch = resp_ch.clone();
        let err_ch = err_ch.clone();
        move || run_download_loop(&ctx, &req_ch, &resp_ch, &err_ch)
    })?;

    spawn_driver("crawlkit-analyzer-driver", {
        let ctx = Arc::clone(&ctx);
        let parsers = Arc::new(resp_parsers);
        let resp_ch = resp_ch.clone();
        let item_ch = item_ch.clone();
        let err_ch = err_ch.clone();
        move || run_analyze_loop(&ctx, parsers, &resp_ch, &item_ch, &err_ch)
    })?;

    spawn_driver("crawlkit-item-driver", {
        let ctx = Arc::clone(&ctx);
        let item_ch = item_ch.clone();
        let err_ch = err_ch.clone();
        move || run_item_loop(&ctx, &item_ch, &err_ch)
    })?;

    spawn_driver("crawlkit-feeder", {
        let ctx = Arc::clone(&ctx);
        let req_ch = req_ch.clone();
        move || run_feeder(&ctx, &req_ch)
    })?;

    let seed = CrawlRequest::new(first_req, 0);
    ctx.save_req_to_cache(seed, SCHEDULER_CODE);

    Ok(ctx)
}

fn spawn_driver(
    name: &str,
    body: impl FnOnce() + Send + 'static,
) -> Result<(), CrawlerError> {
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map(|_| ())
        .map_err(|err| {
            CrawlerError::new(ErrorKind::Scheduler, format!("failed to spawn {name}: {err}"))
        })
}

impl CrawlContext {
    /// The admission gate for discovered requests.
    ///
    /// Rejections are logged and return `false`; an admitted request is
    /// marked seen and queued in the cache. The whole gate runs under the
    /// seen-URL lock so two workers discovering the same URL cannot both
    /// admit it.
    fn save_req_to_cache(&self, req: CrawlRequest, code: &str) -> bool {
        let mut url_map = self.url_map.lock().expect("url map mutex poisoned");

        if !req.valid() {
            warn!(code, "ignored a request without a host");
            return false;
        }
        let url = req.http_req().url();
        if !url.scheme().eq_ignore_ascii_case("http") {
            warn!(code, %url, "ignored a request with a non-http scheme");
            return false;
        }
        let url_str = url.as_str().to_string();
        if url_map.contains(&url_str) {
            debug!(code, url = %url_str, "ignored a request whose url has been seen");
            return false;
        }
        let host = match url.host_str() {
            Some(host) => host,
            None => {
                warn!(code, url = %url_str, "ignored a request without a host");
                return false;
            }
        };
        match get_primary_domain(host) {
            Ok(domain) if domain == self.primary_domain => {}
            Ok(domain) => {
                warn!(code, url = %url_str, %domain, "ignored a request outside the primary domain");
                return false;
            }
            Err(err) => {
                warn!(code, url = %url_str, "ignored a request with an unusable host: {err}");
                return false;
            }
        }
        if req.depth() > self.crawl_depth {
            warn!(
                code,
                url = %url_str,
                depth = req.depth(),
                "ignored a request beyond the crawl depth"
            );
            return false;
        }
        if self.stop_sign.signed() {
            self.stop_sign.deal(code);
            return false;
        }

        url_map.insert(url_str);
        self.req_cache.put(req);
        true
    }

    /// Forwards an item toward the item driver, unless stopping.
    fn send_item(&self, item_ch: &CrawlChannel<Item>, item: Item, code: &str) -> bool {
        if self.stop_sign.signed() {
            self.stop_sign.deal(code);
            return false;
        }
        item_ch.send(item).is_ok()
    }

    /// Fire-and-forget error forwarding.
    ///
    /// The send happens on its own thread so a slow or absent error consumer
    /// can never block a worker; when stopping, the error is acknowledged
    /// and dropped instead.
    fn send_error(&self, err_ch: &CrawlChannel<CrawlerError>, code: &str, msg: String) {
        if self.stop_sign.signed() {
            self.stop_sign.deal(code);
            return;
        }
        let err = CrawlerError::new(kind_for_code(code), msg);
        let err_ch = err_ch.clone();
        let spawned = thread::Builder::new()
            .name("crawlkit-error-send".to_string())
            .spawn(move || {
                let _ = err_ch.send(err);
            });
        if let Err(spawn_err) = spawned {
            error!("failed to spawn error forwarder: {spawn_err}");
        }
    }
}

fn run_download_loop(
    ctx: &Arc<CrawlContext>,
    req_ch: &CrawlChannel<CrawlRequest>,
    resp_ch: &CrawlChannel<CrawlResponse>,
    err_ch: &CrawlChannel<CrawlerError>,
) {
    while let Ok(req) = req_ch.recv() {
        let ctx = Arc::clone(ctx);
        let resp_ch = resp_ch.clone();
        let err_ch = err_ch.clone();
        let spawned = thread::Builder::new()
            .name("crawlkit-download".to_string())
            .spawn(move || download_one(&ctx, req, &resp_ch, &err_ch));
        if let Err(err) = spawned {
            error!("failed to spawn download subtask: {err}");
        }
    }
    debug!("downloader driver exiting");
}

fn download_one(
    ctx: &Arc<CrawlContext>,
    req: CrawlRequest,
    resp_ch: &CrawlChannel<CrawlResponse>,
    err_ch: &CrawlChannel<CrawlerError>,
) {
    let downloader = match ctx.dl_pool.take() {
        Ok(downloader) => downloader,
        Err(err) => {
            ctx.send_error(
                err_ch,
                SCHEDULER_CODE,
                format!("failed to take a page downloader: {err}"),
            );
            return;
        }
    };
    let code = generate_code(DOWNLOADER_CODE, downloader.id());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| downloader.download(&req)));
    match outcome {
        Ok(Ok(resp)) => {
            // A failed send means the crawl is stopping; the response is
            // dropped with it.
            let _ = resp_ch.send(resp);
        }
        Ok(Err(err)) => ctx.send_error(err_ch, &code, err.to_string()),
        Err(payload) => {
            error!(%code, "download subtask panicked: {}", panic_message(&payload));
        }
    }

    if let Err(err) = ctx.dl_pool.put_back(downloader) {
        error!(%code, "failed to return a page downloader: {err}");
    }
}

fn run_analyze_loop(
    ctx: &Arc<CrawlContext>,
    parsers: Arc<Vec<ParseResponse>>,
    resp_ch: &CrawlChannel<CrawlResponse>,
    item_ch: &CrawlChannel<Item>,
    err_ch: &CrawlChannel<CrawlerError>,
) {
    while let Ok(resp) = resp_ch.recv() {
        let ctx = Arc::clone(ctx);
        let parsers = Arc::clone(&parsers);
        let item_ch = item_ch.clone();
        let err_ch = err_ch.clone();
        let spawned = thread::Builder::new()
            .name("crawlkit-analyze".to_string())
            .spawn(move || analyze_one(&ctx, &parsers, resp, &item_ch, &err_ch));
        if let Err(err) = spawned {
            error!("failed to spawn analyze subtask: {err}");
        }
    }
    debug!("analyzer driver exiting");
}

fn analyze_one(
    ctx: &Arc<CrawlContext>,
    parsers: &[ParseResponse],
    resp: CrawlResponse,
    item_ch: &CrawlChannel<Item>,
    err_ch: &CrawlChannel<CrawlerError>,
) {
    let analyzer = match ctx.analyzer_pool.take() {
        Ok(analyzer) => analyzer,
        Err(err) => {
            ctx.send_error(
                err_ch,
                SCHEDULER_CODE,
                format!("failed to take an analyzer: {err}"),
            );
            return;
        }
    };
    let code = generate_code(ANALYZER_CODE, analyzer.id());

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(parsers, resp)));
    match outcome {
        Ok((data, errs)) => {
            for datum in data {
                match datum {
                    Datum::Request(req) => {
                        ctx.save_req_to_cache(req, &code);
                    }
                    Datum::Entry(item) => {
                        ctx.send_item(item_ch, item, &code);
                    }
                }
            }
            for err in errs {
                ctx.send_error(err_ch, &code, err.message().to_string());
            }
        }
        Err(payload) => {
            error!(%code, "analyze subtask panicked: {}", panic_message(&payload));
        }
    }

    if let Err(err) = ctx.analyzer_pool.put_back(analyzer) {
        error!(%code, "failed to return an analyzer: {err}");
    }
}

fn run_item_loop(
    ctx: &Arc<CrawlContext>,
    item_ch: &CrawlChannel<Item>,
    err_ch: &CrawlChannel<CrawlerError>,
) {
    ctx.item_pipeline.set_fail_fast(true);
    while let Ok(item) = item_ch.recv() {
        let ctx = Arc::clone(ctx);
        let err_ch = err_ch.clone();
        let spawned = thread::Builder::new()
            .name("crawlkit-item".to_string())
            .spawn(move || {
                let code = generate_code(ITEM_PIPELINE_CODE, ctx.item_code_ids.next_id());
                let outcome =
                    panic::catch_unwind(AssertUnwindSafe(|| ctx.item_pipeline.send(item)));
                match outcome {
                    Ok(errs) => {
                        for err in errs {
                            ctx.send_error(&err_ch, &code, err.message().to_string());
                        }
                    }
                    Err(payload) => {
                        error!(%code, "item subtask panicked: {}", panic_message(&payload));
                    }
                }
            });
        if let Err(err) = spawned {
            error!("failed to spawn item subtask: {err}");
        }
    }
    debug!("item driver exiting");
}

/// The scheduler loop: every tick, move as many cached requests into the
/// request channel as its free capacity allows. Never overfills the channel.
fn run_feeder(ctx: &Arc<CrawlContext>, req_ch: &CrawlChannel<CrawlRequest>) {
    loop {
        if ctx.stop_sign.signed() {
            ctx.stop_sign.deal(SCHEDULER_CODE);
            debug!("feeder exiting");
            return;
        }
        let mut slack = req_ch.capacity().saturating_sub(req_ch.len());
        while slack > 0 {
            let req = match ctx.req_cache.get() {
                Some(req) => req,
                None => break,
            };
            if ctx.stop_sign.signed() {
                ctx.stop_sign.deal(SCHEDULER_CODE);
                debug!("feeder exiting");
                return;
            }
            let _ = req_ch.send(req);
            slack -= 1;
        }
        thread::sleep(FEEDER_TICK);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    use crate::downloader::{HttpClient, HttpClientError};
    use crate::types::{Body, HttpResponse};

    struct NullClient;

    impl HttpClient for NullClient {
        fn fetch(&self, req: &HttpRequest) -> Result<HttpResponse, HttpClientError> {
            Ok(HttpResponse::new(200, req.url().clone(), Vec::new(), Body::empty()))
        }
    }

    fn null_factory() -> GenHttpClient {
        Box::new(|| Box::new(NullClient) as Box<dyn HttpClient>)
    }

    fn noop_processors() -> Vec<ProcessItem> {
        vec![Box::new(|item: &Item| Ok(item.clone()))]
    }

    fn silent_parsers() -> Vec<ParseResponse> {
        vec![Box::new(|_: &mut CrawlResponse| (Vec::new(), Vec::new()))]
    }

    fn seed(url: &str) -> HttpRequest {
        HttpRequest::get(Url::parse(url).expect("test url"))
    }

    #[test]
    fn test_stop_before_start_returns_false() {
        let scheduler = Scheduler::new();
        assert!(!scheduler.stop());
        assert!(!scheduler.running());
        assert!(!scheduler.idle(), "an unstarted scheduler is not idle");
        assert!(scheduler.error_chan().is_none());
    }

    #[test]
    fn test_start_rejects_invalid_channel_args() {
        let scheduler = Scheduler::new();
        let result = scheduler.start(
            ChannelArgs::new(0, 1, 1, 1),
            PoolBaseArgs::default(),
            0,
            null_factory(),
            silent_parsers(),
            noop_processors(),
            seed("http://example.com/"),
        );
        assert!(result.is_err());
        assert!(!scheduler.running(), "a failed start leaves the scheduler unstarted");
    }

    #[test]
    fn test_start_rejects_empty_processor_list() {
        let scheduler = Scheduler::new();
        let result = scheduler.start(
            ChannelArgs::default(),
            PoolBaseArgs::default(),
            0,
            null_factory(),
            silent_parsers(),
            Vec::new(),
            seed("http://example.com/"),
        );
        let err = result.expect_err("empty processors must fail");
        assert!(err.message().contains("item processor"));
    }

    #[test]
    fn test_start_rejects_unusable_seed_host() {
        let scheduler = Scheduler::new();
        let result = scheduler.start(
            ChannelArgs::default(),
            PoolBaseArgs::default(),
            0,
            null_factory(),
            silent_parsers(),
            noop_processors(),
            seed("http://localhost/"),
        );
        assert!(result.is_err(), "a host with no recognizable domain must fail start");
    }

    #[test]
    fn test_second_start_reports_already_started() {
        let scheduler = Scheduler::new();
        scheduler
            .start(
                ChannelArgs::default(),
                PoolBaseArgs::new(1, 1),
                0,
                null_factory(),
                silent_parsers(),
                noop_processors(),
                seed("http://example.com/"),
            )
            .expect("first start");
        assert!(scheduler.running());

        let second = scheduler.start(
            ChannelArgs::default(),
            PoolBaseArgs::new(1, 1),
            0,
            null_factory(),
            silent_parsers(),
            noop_processors(),
            seed("http://example.com/"),
        );
        let err = second.expect_err("second start must fail");
        assert!(err.message().contains("already been started"));

        assert!(scheduler.stop());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let scheduler = Scheduler::new();
        scheduler
            .start(
                ChannelArgs::default(),
                PoolBaseArgs::new(1, 1),
                0,
                null_factory(),
                silent_parsers(),
                noop_processors(),
                seed("http://example.com/"),
            )
            .expect("start");
        assert!(scheduler.stop(), "first stop succeeds");
        assert!(!scheduler.stop(), "second stop reports false");
        assert!(!scheduler.running());
        assert!(scheduler.error_chan().is_none(), "the error channel is gone after stop");
    }

    #[test]
    fn test_summary_lines_carry_the_prefix() {
        let scheduler = Scheduler::new();
        scheduler
            .start(
                ChannelArgs::default(),
                PoolBaseArgs::new(1, 1),
                1,
                null_factory(),
                silent_parsers(),
                noop_processors(),
                seed("http://example.com/"),
            )
            .expect("start");

        let summary = scheduler.summary("  * ");
        assert!(summary.contains("  * running: true\n"));
        assert!(summary.contains("  * crawlDepth: 1\n"));
        assert!(summary.contains("  * primaryDomain: example.com\n"));
        for line in summary.lines() {
            assert!(line.starts_with("  * "), "unprefixed summary line: {line}");
        }

        scheduler.stop();
    }
}
