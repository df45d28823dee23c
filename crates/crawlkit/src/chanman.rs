//! Bounded, closeable channels and the manager that owns the four of them.
//!
//! crossbeam channels disconnect when one side is fully dropped, but the
//! pipeline hands both ends of every channel to long-lived driver threads, so
//! an explicit close is needed: each [`CrawlChannel`] carries the receiving
//! half of a closer channel that is never sent on. Dropping the manager's
//! closer sender makes that receiver report disconnection, which `select!`
//! observes to wake every blocked sender and receiver at once.

use std::sync::RwLock;

use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use thiserror::Error;

use crate::config::ChannelArgs;
use crate::error::{CrawlerError, ErrorKind};
use crate::types::{CrawlRequest, CrawlResponse, Item};

enum Never {}

/// Error returned by channel operations after close.
///
/// Receivers treat it as end-of-stream; senders drop the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the channel is closed")]
pub struct ChannelClosed;

/// A bounded channel that can be closed while both ends are shared.
pub struct CrawlChannel<T> {
    sender: Sender<T>,
    receiver: Receiver<T>,
    closer: Receiver<Never>,
    cap: usize,
}

impl<T> Clone for CrawlChannel<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            closer: self.closer.clone(),
            cap: self.cap,
        }
    }
}

impl<T> CrawlChannel<T> {
    fn new(cap: usize, closer: Receiver<Never>) -> Self {
        let (sender, receiver) = bounded(cap);
        Self { sender, receiver, closer, cap }
    }

    /// Sends `value`, blocking while the channel is full. Fails once closed;
    /// a blocked send wakes and fails when the close happens.
    pub fn send(&self, value: T) -> Result<(), ChannelClosed> {
        if self.is_closed() {
            return Err(ChannelClosed);
        }
        select! {
            send(self.sender, value) -> result => result.map_err(|_| ChannelClosed),
            recv(self.closer) -> _ => Err(ChannelClosed),
        }
    }

    /// Receives the next value, blocking while the channel is empty.
    ///
    /// Values buffered at close time are still delivered; after the buffer
    /// drains, `Err(ChannelClosed)` marks end-of-stream.
    pub fn recv(&self) -> Result<T, ChannelClosed> {
        match self.receiver.try_recv() {
            Ok(value) => return Ok(value),
            Err(TryRecvError::Disconnected) => return Err(ChannelClosed),
            Err(TryRecvError::Empty) => {}
        }
        select! {
            recv(self.receiver) -> result => result.map_err(|_| ChannelClosed),
            recv(self.closer) -> _ => self.receiver.try_recv().map_err(|_| ChannelClosed),
        }
    }

    /// Non-blocking receive; `None` when empty or closed.
    pub fn try_recv(&self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.closer.try_recv(), Err(TryRecvError::Disconnected))
    }
}

/// Lifecycle of the channel manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelManagerStatus {
    Uninitialized,
    Initialized,
    Closed,
}

impl ChannelManagerStatus {
    fn name(self) -> &'static str {
        match self {
            ChannelManagerStatus::Uninitialized => "uninitialized",
            ChannelManagerStatus::Initialized => "initialized",
            ChannelManagerStatus::Closed => "closed",
        }
    }
}

struct ChannelSet {
    req: CrawlChannel<CrawlRequest>,
    resp: CrawlChannel<CrawlResponse>,
    item: CrawlChannel<Item>,
    err: CrawlChannel<CrawlerError>,
    /// Dropping this sender closes all four channels at once.
    closer: Option<Sender<Never>>,
}

struct ManagerState {
    channels: Option<ChannelSet>,
    status: ChannelManagerStatus,
}

/// Owns the four pipeline channels as one lifecycle unit.
///
/// Accessors hand out clones under a read lock; `init` and `close` take the
/// write lock, so an accessor can never observe a half-closed set.
pub struct ChannelManager {
    state: RwLock<ManagerState>,
}

impl ChannelManager {
    /// Creates a manager and initializes it with `args`.
    pub fn new(args: ChannelArgs) -> Result<Self, CrawlerError> {
        let manager = Self {
            state: RwLock::new(ManagerState {
                channels: None,
                status: ChannelManagerStatus::Uninitialized,
            }),
        };
        manager.init(args, true)?;
        Ok(manager)
    }

    /// (Re-)creates the channels.
    ///
    /// In the initialized state this is a no-op unless `reset` is set, in
    /// which case the caller is responsible for having detached all producers
    /// and consumers first. Returns whether the channels were (re)built.
    pub fn init(&self, args: ChannelArgs, reset: bool) -> Result<bool, CrawlerError> {
        args.check()?;
        let mut state = self.state.write().expect("channel manager lock poisoned");
        if state.status == ChannelManagerStatus::Initialized && !reset {
            return Ok(false);
        }
        let (closer_tx, closer_rx) = bounded::<Never>(0);
        state.channels = Some(ChannelSet {
            req: CrawlChannel::new(args.req_chan_len(), closer_rx.clone()),
            resp: CrawlChannel::new(args.resp_chan_len(), closer_rx.clone()),
            item: CrawlChannel::new(args.item_chan_len(), closer_rx.clone()),
            err: CrawlChannel::new(args.err_chan_len(), closer_rx),
            closer: Some(closer_tx),
        });
        state.status = ChannelManagerStatus::Initialized;
        Ok(true)
    }

    /// Closes all four channels. Valid only while initialized.
    pub fn close(&self) -> bool {
        let mut state = self.state.write().expect("channel manager lock poisoned");
        if state.status != ChannelManagerStatus::Initialized {
            return false;
        }
        if let Some(set) = state.channels.as_mut() {
            set.closer.take();
        }
        state.status = ChannelManagerStatus::Closed;
        true
    }

    pub fn status(&self) -> ChannelManagerStatus {
        self.state.read().expect("channel manager lock poisoned").status
    }

    pub fn req_chan(&self) -> Result<CrawlChannel<CrawlRequest>, CrawlerError> {
        self.with_channels(|set| set.req.clone())
    }

    pub fn resp_chan(&self) -> Result<CrawlChannel<CrawlResponse>, CrawlerError> {
        self.with_channels(|set| set.resp.clone())
    }

    pub fn item_chan(&self) -> Result<CrawlChannel<Item>, CrawlerError> {
        self.with_channels(|set| set.item.clone())
    }

    pub fn err_chan(&self) -> Result<CrawlChannel<CrawlerError>, CrawlerError> {
        self.with_channels(|set| set.err.clone())
    }

    pub fn summary(&self) -> String {
        let state = self.state.read().expect("channel manager lock poisoned");
        match &state.channels {
            Some(set) if state.status == ChannelManagerStatus::Initialized => format!(
                "status: {}, requestChannel: {}/{}, responseChannel: {}/{}, itemChannel: {}/{}, errorChannel: {}/{}",
                state.status.name(),
                set.req.len(),
                set.req.capacity(),
                set.resp.len(),
                set.resp.capacity(),
                set.item.len(),
                set.item.capacity(),
                set.err.len(),
                set.err.capacity(),
            ),
            _ => format!("status: {}", state.status.name()),
        }
    }

    fn with_channels<R>(&self, f: impl FnOnce(&ChannelSet) -> R) -> Result<R, CrawlerError> {
        let state = self.state.read().expect("channel manager lock poisoned");
        match &state.channels {
            Some(set) if state.status == ChannelManagerStatus::Initialized => Ok(f(set)),
            _ => Err(CrawlerError::new(
                ErrorKind::Scheduler,
                format!(
                    "undesirable channel manager status: {}",
                    state.status.name()
                ),
            )),
        }
    }
}
