//! Prometheus metrics for the viewer.

use metrics::{counter, histogram};
use std::time::Duration;

pub fn record_render(duration: Duration) {
    counter!("viewer_frames_rendered_total").increment(1);
    histogram!("viewer_render_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_frame_load_error() {
    counter!("viewer_frame_load_errors_total").increment(1);
}

pub fn record_superseded() {
    counter!("viewer_scrubs_superseded_total").increment(1);
}
