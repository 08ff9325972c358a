//! Scrub controller: maps a slider position to a frame and renders it.
//!
//! Renders are serialized on one [`RenderState`]. Every scrub takes a ticket
//! before queueing for the state; when it gets the lock and a newer ticket
//! exists, it is superseded and returns the displayed frame instead of
//! rendering one nobody is waiting for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

use forecast_common::{ForecastCatalog, GridDataSource};
use renderer::{
    BasemapRenderer, ColorBandTable, DrawingSurface, FrameRenderer, RenderError, RenderState,
    RenderedFrame,
};

use crate::metrics;

/// Floor a fractional slider position to a frame index in `[0, frame_count)`.
///
/// NaN and negative positions select the first frame, anything at or past
/// the end selects the last.
pub fn quantize(position: f64, frame_count: usize) -> usize {
    if frame_count == 0 || position.is_nan() || position <= 0.0 {
        return 0;
    }
    let last = frame_count - 1;
    let index = position.floor();
    if index >= last as f64 {
        last
    } else {
        index as usize
    }
}

/// Result of one scrub.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrubOutcome {
    Rendered(RenderedFrame),
    /// A newer scrub was waiting; carries the frame still on screen
    Superseded(Option<RenderedFrame>),
}

impl ScrubOutcome {
    /// The frame the surface shows after this scrub.
    pub fn displayed(&self) -> Option<&RenderedFrame> {
        match self {
            ScrubOutcome::Rendered(frame) => Some(frame),
            ScrubOutcome::Superseded(frame) => frame.as_ref(),
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ScrubOutcome::Superseded(_))
    }
}

/// Scrub outcome plus a snapshot of the surface taken under the same lock.
#[derive(Debug)]
pub struct Scrubbed<R> {
    pub outcome: ScrubOutcome,
    pub snapshot: R,
}

pub struct ScrubController<G, B, S: DrawingSurface> {
    catalog: ForecastCatalog,
    table: ColorBandTable,
    renderer: FrameRenderer<G, B>,
    state: Mutex<RenderState<S>>,
    latest_ticket: AtomicU64,
}

impl<G, B, S> ScrubController<G, B, S>
where
    G: GridDataSource,
    B: BasemapRenderer<S>,
    S: DrawingSurface,
{
    pub fn new(
        catalog: ForecastCatalog,
        table: ColorBandTable,
        renderer: FrameRenderer<G, B>,
        surface: S,
    ) -> Self {
        Self {
            catalog,
            table,
            renderer,
            state: Mutex::new(RenderState::new(surface)),
            latest_ticket: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &ForecastCatalog {
        &self.catalog
    }

    pub fn table(&self) -> &ColorBandTable {
        &self.table
    }

    pub fn frame_count(&self) -> usize {
        self.catalog.len()
    }

    /// Register a new scrub; earlier tickets still waiting become stale.
    pub fn ticket(&self) -> u64 {
        self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `f` on the render state, blocking until no render is in progress.
    /// Must not be called from an async context.
    pub fn inspect_blocking<R>(&self, f: impl FnOnce(&RenderState<S>) -> R) -> R {
        let state = self.state.blocking_lock();
        f(&*state)
    }

    /// Quantize `position` and render that frame, blocking the calling
    /// thread. Must not be called from an async context.
    pub fn scrub_blocking<R>(
        &self,
        ticket: u64,
        position: f64,
        snapshot: impl FnOnce(&RenderState<S>) -> R,
    ) -> Result<Scrubbed<R>, RenderError> {
        let index = quantize(position, self.catalog.len());
        let mut state = self.state.blocking_lock();

        if self.latest_ticket.load(Ordering::SeqCst) != ticket {
            debug!(ticket, index, "Scrub superseded");
            metrics::record_superseded();
            return Ok(Scrubbed {
                outcome: ScrubOutcome::Superseded(state.current_frame().cloned()),
                snapshot: snapshot(&*state),
            });
        }

        let started = Instant::now();
        match self.renderer.render(index, &self.catalog, &self.table, &mut *state) {
            Ok(frame) => {
                metrics::record_render(started.elapsed());
                Ok(Scrubbed {
                    outcome: ScrubOutcome::Rendered(frame),
                    snapshot: snapshot(&*state),
                })
            }
            Err(e) => {
                if e.is_frame_load() {
                    metrics::record_frame_load_error();
                }
                Err(e)
            }
        }
    }
}
