//! Monotonically increasing 32-bit id generator.

use std::sync::Mutex;

/// Hands out ids 0, 1, 2, … under concurrent callers.
///
/// The sequence runs to `u32::MAX` inclusive, then wraps to 0 and resumes.
#[derive(Debug, Default)]
pub struct IdGenerator {
    state: Mutex<IdState>,
}

#[derive(Debug, Default)]
struct IdState {
    sn: u32,
    ended: bool,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u32 {
        let mut state = self.state.lock().expect("id generator mutex poisoned");
        if state.ended {
            state.ended = false;
            state.sn = 1;
            return 0;
        }
        let id = state.sn;
        if id < u32::MAX {
            state.sn += 1;
        } else {
            state.ended = true;
        }
        id
    }
}
