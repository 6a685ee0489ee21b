//! Progress Simulator: cosmetic percentage shown while an upload is in flight.
//!
//! Not derived from bytes transferred: reqwest reports no granular upload
//! progress for a buffered multipart body.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::store::{Attempt, ResultStore};

#[derive(Debug, Clone, Copy)]
pub struct ProgressSettings {
    pub step: u8,
    pub interval: Duration,
    /// Highest value reachable before the request resolves.
    pub cap: u8,
    /// How long 100% stays visible after a success.
    pub settle_delay: Duration,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            step: 10,
            interval: Duration::from_millis(200),
            cap: 90,
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Owns the periodic tick task for one attempt.
///
/// The task is aborted by `stop` or on drop, whichever comes first; the
/// handle is taken on the first abort so it is released exactly once.
pub struct ProgressTicker {
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    pub fn start(store: ResultStore, attempt: Attempt, settings: ProgressSettings) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + settings.interval, settings.interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                store.advance(attempt, settings.step, settings.cap);
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.release();
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.release();
    }
}
