//! Result Store: the single owner of a view's `UploadState`.
//!
//! Backed by a `watch` channel: writers mutate in place, dependent views
//! either take a snapshot or subscribe for changes.
//!
//! State machine: Idle → Uploading → {Succeeded, Failed} → Idle.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::models::resume::UploadResult;

/// Identifies one upload attempt within a store.
pub type Attempt = u64;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UploadState {
    pub is_uploading: bool,
    /// 0–100, never decreases while `is_uploading` is true.
    pub progress: u8,
    pub error: Option<String>,
    pub result: Option<UploadResult>,
}

#[derive(Clone)]
pub struct ResultStore {
    tx: Arc<watch::Sender<UploadState>>,
    // Only touched inside `send_if_modified`, which serializes writers.
    attempt: Arc<AtomicU64>,
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UploadState::default());
        Self {
            tx: Arc::new(tx),
            attempt: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn snapshot(&self) -> UploadState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.tx.subscribe()
    }

    /// Begins a new attempt. Returns `None` while another attempt is in flight.
    pub fn start(&self) -> Option<Attempt> {
        let mut started = None;
        self.tx.send_if_modified(|state| {
            if state.is_uploading {
                return false;
            }
            state.is_uploading = true;
            state.error = None;
            state.progress = 0;
            started = Some(self.attempt.fetch_add(1, Ordering::SeqCst) + 1);
            true
        });
        if let Some(attempt) = started {
            debug!("Upload attempt {attempt} started");
        }
        started
    }

    /// Records a successful attempt. Progress jumps to 100 until `settle`.
    pub fn succeed(&self, result: UploadResult) {
        self.tx.send_modify(|state| {
            state.result = Some(result);
            state.is_uploading = false;
            state.error = None;
            state.progress = 100;
        });
    }

    /// Records a failed attempt. A previously successful result is kept.
    pub fn fail(&self, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|state| {
            state.error = Some(message);
            state.is_uploading = false;
            state.progress = 0;
        });
    }

    /// Records a file refused before upload. Never touches `is_uploading`.
    /// Returns false, leaving the state alone, while an attempt is in flight.
    pub fn reject(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        self.tx.send_if_modified(|state| {
            if state.is_uploading {
                return false;
            }
            state.error = Some(message);
            state.progress = 0;
            true
        })
    }

    /// Empties result, error and progress. Does not cancel an in-flight attempt.
    pub fn clear(&self) {
        self.tx.send_if_modified(|state| {
            let changed = state.result.is_some() || state.error.is_some() || state.progress != 0;
            state.result = None;
            state.error = None;
            state.progress = 0;
            changed
        });
    }

    pub fn dismiss_error(&self) {
        self.tx.send_if_modified(|state| state.error.take().is_some());
    }

    /// One simulator tick: `progress += step`, capped, for the current attempt only.
    pub(crate) fn advance(&self, attempt: Attempt, step: u8, cap: u8) -> bool {
        self.tx.send_if_modified(|state| {
            if !state.is_uploading
                || self.attempt.load(Ordering::SeqCst) != attempt
                || state.progress >= cap
            {
                return false;
            }
            state.progress = state.progress.saturating_add(step).min(cap);
            true
        })
    }

    /// Drops the 100% marker after a success, unless a newer attempt began.
    pub(crate) fn settle(&self, attempt: Attempt) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_uploading || self.attempt.load(Ordering::SeqCst) != attempt {
                return false;
            }
            let changed = state.progress != 0;
            state.progress = 0;
            changed
        })
    }
}
