//! External monitor: watches a running scheduler, drains its error channel,
//! and stops the crawl once it has been idle long enough.
//!
//! The monitor is a collaborator of the scheduling core, not part of it: it
//! only uses the public surface (`running`, `idle`, `error_chan`, `summary`,
//! `stop`). Log output goes through a caller-supplied record callback so the
//! embedding program owns the sink.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use tracing::error;

use crate::scheduler::Scheduler;

/// Severity passed to the record callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLevel {
    Info,
    Warn,
    Error,
}

/// The logging sink supplied by the embedding program.
pub type Record = Box<dyn Fn(RecordLevel, &str) + Send>;

/// Monitor tuning.
#[derive(Debug, Clone, Copy)]
pub struct MonitorArgs {
    /// Delay between two checks.
    pub interval: Duration,
    /// Consecutive idle observations required before the crawl is considered
    /// drained.
    pub max_idle_count: u32,
    /// Stop the scheduler once drained.
    pub auto_stop: bool,
    /// Record the full multi-line summary on every change instead of nothing.
    pub detail_summary: bool,
}

impl Default for MonitorArgs {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            max_idle_count: 1000,
            auto_stop: true,
            detail_summary: false,
        }
    }
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);
const MIN_IDLE_COUNT: u32 = 10;
const SUMMARY_PREFIX: &str = "    ";

/// Spawns the monitor thread.
///
/// The returned channel yields a single value once the monitor finishes: the
/// number of checks it performed. The monitor waits for the scheduler to
/// start, then on every interval drains and records pending errors, records
/// summary changes when asked to, and counts consecutive idle observations;
/// at `max_idle_count` it stops the scheduler (when `auto_stop`) and exits.
/// A scheduler stopped by anyone else ends the monitor too.
pub fn monitor(scheduler: Arc<Scheduler>, args: MonitorArgs, record: Record) -> Receiver<u64> {
    let interval = args.interval.max(MIN_INTERVAL);
    let max_idle_count = args.max_idle_count.max(MIN_IDLE_COUNT);

    let (done_tx, done_rx) = bounded(1);
    let spawned = thread::Builder::new()
        .name("crawlkit-monitor".to_string())
        .spawn(move || {
            while !scheduler.running() {
                thread::sleep(interval);
            }

            let mut check_count: u64 = 0;
            let mut idle_count: u32 = 0;
            let mut last_summary = String::new();

            loop {
                if let Some(err_chan) = scheduler.error_chan() {
                    while let Some(err) = err_chan.try_recv() {
                        record(RecordLevel::Error, err.to_string().trim_end());
                    }
                }

                if args.detail_summary {
                    let summary = scheduler.summary(SUMMARY_PREFIX);
                    if summary != last_summary {
                        record(RecordLevel::Info, &format!("scheduler summary:\n{summary}"));
                        last_summary = summary;
                    }
                }

                if !scheduler.running() {
                    record(RecordLevel::Info, "the scheduler has been stopped elsewhere");
                    break;
                }

                if scheduler.idle() {
                    idle_count += 1;
                    if idle_count >= max_idle_count {
                        if args.auto_stop {
                            let stopped = scheduler.stop();
                            record(
                                RecordLevel::Info,
                                &format!("the crawl has drained; stop accepted: {stopped}"),
                            );
                        } else {
                            record(RecordLevel::Info, "the crawl has drained");
                        }
                        break;
                    }
                } else {
                    idle_count = 0;
                }

                check_count += 1;
                thread::sleep(interval);
            }

            let _ = done_tx.send(check_count);
        });
    if let Err(err) = spawned {
        error!("failed to spawn the monitor thread: {err}");
    }

    done_rx
}
