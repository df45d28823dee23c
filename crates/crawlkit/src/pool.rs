//! Generic fixed-capacity worker pool with checkout/return accounting.
//!
//! Idle entities sit in a bounded channel; `take()` blocks on that channel,
//! which is what enforces the concurrency bound. A side ledger keyed by
//! entity id tracks which ids this pool issued and whether each is currently
//! checked out, so a return of an entity the pool never issued, or one that
//! is not out, is rejected without corrupting the counts.

use std::collections::HashMap;
use std::sync::Mutex;

use crossbeam_channel::{bounded, Receiver, Sender};
use thiserror::Error;

/// Capability required of pool entities: a stable 32-bit id.
pub trait HasId {
    fn id(&self) -> u32;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("the pool is closed")]
    Closed,
    #[error("the factory produced a duplicate entity id {0}")]
    DuplicateId(u32),
    #[error("entity id {0} was not issued by this pool")]
    UnknownId(u32),
    #[error("entity id {0} is not checked out")]
    NotCheckedOut(u32),
}

pub struct Pool<T: HasId + Send> {
    total: u32,
    sender: Mutex<Option<Sender<T>>>,
    receiver: Receiver<T>,
    /// id -> currently checked out?
    ledger: Mutex<HashMap<u32, bool>>,
}

impl<T: HasId + Send> Pool<T> {
    /// Eagerly builds `total` entities via `factory`.
    ///
    /// Two entities sharing an id abort construction: the ledger could no
    /// longer tell their checkouts apart.
    pub fn new(total: u32, mut factory: impl FnMut() -> T) -> Result<Self, PoolError> {
        let (sender, receiver) = bounded(total as usize);
        let mut ledger = HashMap::with_capacity(total as usize);
        for _ in 0..total {
            let entity = factory();
            let id = entity.id();
            if ledger.insert(id, false).is_some() {
                return Err(PoolError::DuplicateId(id));
            }
            sender.send(entity).expect("pool channel sized to hold every entity");
        }
        Ok(Self {
            total,
            sender: Mutex::new(Some(sender)),
            receiver,
            ledger: Mutex::new(ledger),
        })
    }

    /// Reserves an entity, blocking until one is idle or the pool is closed.
    pub fn take(&self) -> Result<T, PoolError> {
        let entity = self.receiver.recv().map_err(|_| PoolError::Closed)?;
        let mut ledger = self.ledger.lock().expect("pool ledger mutex poisoned");
        ledger.insert(entity.id(), true);
        Ok(entity)
    }

    /// Releases an entity back into the pool.
    ///
    /// Rejects entities whose id the pool never issued and entities whose id
    /// is not currently checked out; neither case disturbs the counts.
    pub fn put_back(&self, entity: T) -> Result<(), PoolError> {
        let id = entity.id();
        {
            let mut ledger = self.ledger.lock().expect("pool ledger mutex poisoned");
            match ledger.get(&id) {
                None => return Err(PoolError::UnknownId(id)),
                Some(false) => return Err(PoolError::NotCheckedOut(id)),
                Some(true) => {
                    ledger.insert(id, false);
                }
            }
        }
        let guard = self.sender.lock().expect("pool sender mutex poisoned");
        match guard.as_ref() {
            Some(sender) => sender.send(entity).map_err(|_| PoolError::Closed),
            None => {
                // Closed between the ledger update and here; the entity is
                // gone, so leave it marked idle and report the closure.
                Err(PoolError::Closed)
            }
        }
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    /// Number of entities currently checked out.
    pub fn used(&self) -> u32 {
        let ledger = self.ledger.lock().expect("pool ledger mutex poisoned");
        ledger.values().filter(|&&out| out).count() as u32
    }

    /// Closes the pool: blocked and future `take()` calls fail once the idle
    /// entities are drained, and returns are rejected.
    pub fn close(&self) {
        self.sender.lock().expect("pool sender mutex poisoned").take();
    }

    pub fn summary(&self) -> String {
        format!("total: {}, used: {}", self.total, self.used())
    }
}
