//! Bounded-time wrapper around a grid data source.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

use forecast_common::{GridDataSource, GridError, GridResult, GridSample, LevelSelector};

/// Runs each decode on a helper thread and gives up after `timeout`.
///
/// A decode that overruns is abandoned, not cancelled: the helper thread
/// finishes in the background and its result is dropped. Only one decode
/// runs at a time; while an abandoned one is still going, further loads
/// fail straight away with [`GridError::Aborted`].
pub struct TimeoutGridSource<G> {
    inner: Arc<G>,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
}

/// Holds the single decode slot and frees it on drop.
struct DecodeSlot(Arc<AtomicBool>);

impl DecodeSlot {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DecodeSlot(Arc::clone(flag)))
    }
}

impl Drop for DecodeSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<G> TimeoutGridSource<G>
where
    G: GridDataSource + 'static,
{
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// True while a decode, finished or abandoned by its caller, is still running.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

impl<G> GridDataSource for TimeoutGridSource<G>
where
    G: GridDataSource + 'static,
{
    fn load(&self, path: &Path, level: &LevelSelector) -> GridResult<GridSample> {
        let slot = match DecodeSlot::acquire(&self.in_flight) {
            Some(slot) => slot,
            None => {
                warn!(path = %path.display(), "Previous grid decode still running");
                return Err(GridError::Aborted(format!(
                    "previous decode still running, skipped {}",
                    path.display()
                )));
            }
        };

        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned_path = path.to_path_buf();
        let owned_level = level.clone();

        // A failed spawn drops the closure, and the slot with it.
        thread::Builder::new()
            .name("grid-decode".to_string())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    inner.load(&owned_path, &owned_level)
                }))
                .unwrap_or_else(|_| Err(GridError::Aborted("grid decoder panicked".to_string())));
                // Free the slot before the caller can see the result.
                drop(slot);
                // Receiver is gone when the caller already timed out.
                let _ = tx.send(result);
            })
            .map_err(|e| GridError::Aborted(format!("spawn decode thread: {}", e)))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(path = %path.display(), timeout = ?self.timeout, "Grid decode timed out");
                Err(GridError::Timeout {
                    path: path.to_path_buf(),
                    timeout: self.timeout,
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(GridError::Aborted(
                "decode thread exited without a result".to_string(),
            )),
        }
    }
}
