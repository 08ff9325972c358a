//! Forecast viewer service.
//!
//! Serves 850 hPa temperature frames over HTTP: a client drives a slider and
//! requests `/frame?position=<f64>`; the service quantizes the position to a
//! forecast frame, renders it and returns the PNG.

pub mod config;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod metrics;
pub mod scrub;
pub mod state;

use axum::{extract::Extension, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the HTTP router. `/metrics` is only mounted with a Prometheus handle.
pub fn router(state: Arc<AppState>, prometheus: Option<PrometheusHandle>) -> Router {
    let mut app = Router::new()
        .route("/frames", get(handlers::frames_handler))
        .route("/frame", get(handlers::frame_handler))
        .route("/frame/current", get(handlers::current_frame_handler))
        .route("/legend", get(handlers::legend_handler))
        .route("/health", get(handlers::health_handler));

    if let Some(handle) = prometheus {
        app = app
            .route("/metrics", get(handlers::metrics_handler))
            .layer(Extension(handle));
    }

    app.layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
