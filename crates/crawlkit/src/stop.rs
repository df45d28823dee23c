//! One-shot stop signal with per-component acknowledgement accounting.
//!
//! `sign()` raises the signal; each component that notices it calls
//! `deal(code)` once per observation, so the final summary shows which
//! components acknowledged the stop and how often.

use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct StopSign {
    state: Mutex<StopState>,
}

#[derive(Debug, Default)]
struct StopState {
    signed: bool,
    deal_counts: BTreeMap<String, u32>,
}

impl StopSign {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal. Returns `true` only for the first call.
    pub fn sign(&self) -> bool {
        let mut state = self.state.lock().expect("stop sign mutex poisoned");
        if state.signed {
            return false;
        }
        state.signed = true;
        true
    }

    pub fn signed(&self) -> bool {
        self.state.lock().expect("stop sign mutex poisoned").signed
    }

    /// Clears the signal and all acknowledgement counters.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("stop sign mutex poisoned");
        state.signed = false;
        state.deal_counts.clear();
    }

    /// Records that `code` observed the signal. No-op while unsigned.
    pub fn deal(&self, code: &str) {
        let mut state = self.state.lock().expect("stop sign mutex poisoned");
        if !state.signed {
            return;
        }
        *state.deal_counts.entry(code.to_string()).or_insert(0) += 1;
    }

    pub fn deal_count(&self, code: &str) -> u32 {
        let state = self.state.lock().expect("stop sign mutex poisoned");
        state.deal_counts.get(code).copied().unwrap_or(0)
    }

    pub fn deal_total(&self) -> u32 {
        let state = self.state.lock().expect("stop sign mutex poisoned");
        state.deal_counts.values().sum()
    }

    pub fn summary(&self) -> String {
        let state = self.state.lock().expect("stop sign mutex poisoned");
        let total: u32 = state.deal_counts.values().sum();
        let counts: Vec<String> = state
            .deal_counts
            .iter()
            .map(|(code, count)| format!("{code}: {count}"))
            .collect();
        format!(
            "signed: {}, dealCount: {{{}}}, dealTotal: {}",
            state.signed,
            counts.join(", "),
            total
        )
    }
}
