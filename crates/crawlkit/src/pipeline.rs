//! The item pipeline: an immutable, ordered chain of item processors.
//!
//! Each processor borrows the current item and either yields the item for the
//! next stage or an error. Errors accumulate; with fail-fast set, the first
//! error ends the chain for that item. Counters are atomics because many
//! items flow through the shared pipeline concurrently.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::error::{CrawlerError, ErrorKind};
use crate::types::Item;

/// One stage of the pipeline.
///
/// On `Ok(next)` the returned item feeds the following stage; on `Err` the
/// current item is retained, so later stages (when fail-fast is off) still
/// see the last good value.
pub type ProcessItem = Box<dyn Fn(&Item) -> Result<Item, CrawlerError> + Send + Sync>;

pub struct ItemPipeline {
    processors: Vec<ProcessItem>,
    fail_fast: AtomicBool,
    sent: AtomicU64,
    accepted: AtomicU64,
    processed: AtomicU64,
    processing_number: AtomicU64,
}

/// Decrements the in-flight gauge on every exit path, panics included.
struct ProcessingGuard<'a>(&'a AtomicU64);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ItemPipeline {
    /// Builds a pipeline over `processors`. An empty chain is invalid.
    pub fn new(processors: Vec<ProcessItem>) -> Result<Self, CrawlerError> {
        if processors.is_empty() {
            return Err(CrawlerError::new(
                ErrorKind::Scheduler,
                "invalid item processor list: it is empty",
            ));
        }
        Ok(Self {
            processors,
            fail_fast: AtomicBool::new(false),
            sent: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            processing_number: AtomicU64::new(0),
        })
    }

    /// Threads `item` through the processor chain and returns the errors the
    /// stages produced.
    pub fn send(&self, item: Item) -> Vec<CrawlerError> {
        self.processing_number.fetch_add(1, Ordering::SeqCst);
        let _guard = ProcessingGuard(&self.processing_number);
        self.sent.fetch_add(1, Ordering::SeqCst);

        if item.is_empty() {
            return vec![CrawlerError::new(ErrorKind::ItemProcessor, "the item is empty")];
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);

        let mut errs = Vec::new();
        let mut current = item;
        for processor in &self.processors {
            match processor(&current) {
                Ok(next) => current = next,
                Err(err) => {
                    errs.push(err);
                    if self.fail_fast() {
                        break;
                    }
                }
            }
        }
        self.processed.fetch_add(1, Ordering::SeqCst);
        errs
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast.load(Ordering::SeqCst)
    }

    pub fn set_fail_fast(&self, fail_fast: bool) {
        self.fail_fast.store(fail_fast, Ordering::SeqCst);
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::SeqCst)
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Number of items currently inside `send`.
    pub fn processing_number(&self) -> u64 {
        self.processing_number.load(Ordering::SeqCst)
    }

    pub fn summary(&self) -> String {
        format!(
            "failFast: {}, processorNumber: {}, sent: {}, accepted: {}, processed: {}, processingNumber: {}",
            self.fail_fast(),
            self.processors.len(),
            self.sent(),
            self.accepted(),
            self.processed(),
            self.processing_number()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn item_with(key: &str, value: i64) -> Item {
        let mut item = Item::new();
        item.insert(key.to_string(), Value::from(value));
        item
    }

    fn passthrough() -> ProcessItem {
        Box::new(|item: &Item| Ok(item.clone()))
    }

    fn failing(msg: &'static str) -> ProcessItem {
        Box::new(move |_: &Item| Err(CrawlerError::new(ErrorKind::ItemProcessor, msg)))
    }

    #[test]
    fn test_empty_processor_list_is_invalid() {
        assert!(ItemPipeline::new(Vec::new()).is_err());
    }

    #[test]
    fn test_item_threads_through_stages_in_order() {
        let add_stage = |name: &'static str| -> ProcessItem {
            Box::new(move |item: &Item| {
                let mut next = item.clone();
                next.insert(name.to_string(), Value::from(next.len() as i64));
                Ok(next)
            })
        };
        let pipeline = ItemPipeline::new(vec![add_stage("first"), add_stage("second")])
            .expect("pipeline");

        let errs = pipeline.send(item_with("seed", 0));
        assert!(errs.is_empty());
        assert_eq!(pipeline.sent(), 1);
        assert_eq!(pipeline.accepted(), 1);
        assert_eq!(pipeline.processed(), 1);
        assert_eq!(pipeline.processing_number(), 0);
    }

    #[test]
    fn test_empty_item_short_circuits() {
        let pipeline = ItemPipeline::new(vec![passthrough()]).expect("pipeline");
        let errs = pipeline.send(Item::new());
        assert_eq!(errs.len(), 1);
        assert_eq!(pipeline.sent(), 1);
        assert_eq!(pipeline.accepted(), 0, "an empty item is never accepted");
        assert_eq!(pipeline.processed(), 0);
        assert_eq!(pipeline.processing_number(), 0);
    }

    #[test]
    fn test_errors_accumulate_without_fail_fast() {
        let pipeline = ItemPipeline::new(vec![failing("one"), failing("two"), passthrough()])
            .expect("pipeline");
        assert!(!pipeline.fail_fast());

        let errs = pipeline.send(item_with("k", 1));
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].message(), "one");
        assert_eq!(errs[1].message(), "two");
        assert_eq!(pipeline.processed(), 1);
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        let pipeline = ItemPipeline::new(vec![failing("one"), failing("two")])
            .expect("pipeline");
        pipeline.set_fail_fast(true);

        let errs = pipeline.send(item_with("k", 1));
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].message(), "one");
    }

    #[test]
    fn test_erroring_stage_keeps_current_item_for_later_stages() {
        let observe: ProcessItem = Box::new(|item: &Item| {
            assert!(item.contains_key("seed"), "stage after an error sees the last good item");
            Ok(item.clone())
        });
        let pipeline =
            ItemPipeline::new(vec![failing("boom"), observe]).expect("pipeline");
        let errs = pipeline.send(item_with("seed", 1));
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_counter_ordering_holds() {
        let pipeline = ItemPipeline::new(vec![passthrough()]).expect("pipeline");
        pipeline.send(item_with("a", 1));
        pipeline.send(Item::new());
        pipeline.send(item_with("b", 2));
        assert!(pipeline.sent() >= pipeline.accepted());
        assert!(pipeline.accepted() >= pipeline.processed());
        assert_eq!(pipeline.sent(), 3);
        assert_eq!(pipeline.accepted(), 2);
        assert_eq!(pipeline.processed(), 2);
    }

    #[test]
    fn test_summary_shape() {
        let pipeline = ItemPipeline::new(vec![passthrough()]).expect("pipeline");
        pipeline.send(item_with("a", 1));
        assert_eq!(
            pipeline.summary(),
            "failFast: false, processorNumber: 1, sent: 1, accepted: 1, processed: 1, processingNumber: 0"
        );
    }
}
