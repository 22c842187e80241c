//! State shared between a background write and the poller that observes it.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::error::JigError;

const PPM: u32 = 1_000_000;

/// Progress of one programming session. Cheap to clone; every clone observes
/// the same session.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    inner: Arc<ProgressState>,
}

#[derive(Debug)]
struct ProgressState {
    /// Fraction done in parts per million; only ever raised.
    done_ppm: AtomicU32,
    active: AtomicBool,
    failure: Mutex<Option<JigError>>,
}

impl ProgressHandle {
    /// A handle for a session that has been submitted and is running.
    pub fn started() -> Self {
        ProgressHandle {
            inner: Arc::new(ProgressState {
                done_ppm: AtomicU32::new(0),
                active: AtomicBool::new(true),
                failure: Mutex::new(None),
            }),
        }
    }

    /// Raise the completed fraction. Values below the current one are ignored.
    pub fn advance_to(&self, fraction: f64) {
        let ppm = (fraction.clamp(0.0, 1.0) * PPM as f64).round() as u32;
        self.inner.done_ppm.fetch_max(ppm, Ordering::AcqRel);
    }

    pub fn fraction(&self) -> f64 {
        self.inner.done_ppm.load(Ordering::Acquire) as f64 / PPM as f64
    }

    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Record the terminal state. The failure cell is written before the
    /// active flag drops, so a reader that sees `!is_active()` sees the cause.
    pub fn finish(&self, outcome: Result<(), JigError>) {
        if let Err(e) = outcome {
            match self.inner.failure.lock() {
                Ok(mut cell) => *cell = Some(e),
                Err(poisoned) => *poisoned.into_inner() = Some(e),
            }
        }
        self.inner.active.store(false, Ordering::Release);
    }

    pub fn failure(&self) -> Option<JigError> {
        match self.inner.failure.lock() {
            Ok(cell) => cell.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Cooperative cancellation shared between a requester and a worker.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (flag, wake) = &*self.inner;
        match flag.lock() {
            Ok(mut cancelled) => *cancelled = true,
            Err(poisoned) => *poisoned.into_inner() = true,
        }
        wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        match flag.lock() {
            Ok(cancelled) => *cancelled,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Sleep for up to `timeout`, waking early on cancellation. Returns true
    /// if the token is cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, wake) = &*self.inner;
        let guard = match flag.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match wake.wait_timeout_while(guard, timeout, |cancelled| !*cancelled) {
            Ok((cancelled, _)) => *cancelled,
            Err(poisoned) => *poisoned.into_inner().0,
        }
    }
}
