//! The readiness barrier.

use parking_lot::Mutex;
use tracing::info;

/// Holds command dispatch back until the offline backlog has been replayed.
///
/// Starts closed and opens exactly once. Messages keep being classified and
/// logged while it is closed; only command evaluation waits.
#[derive(Debug, Default)]
pub struct ReadinessBarrier {
    ready: Mutex<bool>,
}

impl ReadinessBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the barrier. Returns `true` only for the call that opened it.
    pub fn mark_ready(&self) -> bool {
        let mut ready = self.ready.lock();
        if *ready {
            return false;
        }
        *ready = true;
        info!("Offline sync completed, commands are now dispatched");
        true
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.lock()
    }
}
