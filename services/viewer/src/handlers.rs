//! HTTP request handlers.

use axum::{
    extract::{Extension, Query},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument, warn};

use renderer::{RenderError, RenderedFrame};

use crate::scrub::ScrubOutcome;
use crate::state::AppState;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct FrameInfo {
    pub index: usize,
    pub file_name: String,
    pub base_date: NaiveDate,
    pub forecast_hour: u32,
    pub forecast_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FramesResponse {
    pub count: usize,
    pub frames: Vec<FrameInfo>,
}

pub async fn frames_handler(Extension(state): Extension<Arc<AppState>>) -> Json<FramesResponse> {
    let catalog = state.controller.catalog();
    let frames = catalog
        .iter()
        .enumerate()
        .map(|(index, frame)| FrameInfo {
            index,
            file_name: frame.file_name(),
            base_date: frame.base_date(),
            forecast_hour: frame.forecast_hour(),
            forecast_time: frame.forecast_time(),
        })
        .collect();

    Json(FramesResponse {
        count: catalog.len(),
        frames,
    })
}

/// Color bands of the scale.
pub async fn legend_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(state.controller.table().clone())
}

// ============================================================================
// Scrubbing
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ScrubParams {
    /// Slider position, `0..=frame_count-1`
    pub position: f64,
}

/// Scrub to `position` and return the displayed frame as PNG.
///
/// The picture comes from the flat raster basemap: ocean fill under the
/// temperature mesh, colorbar, gridlines and title. It carries no land,
/// coastline or border geography; the coastline color only outlines the plot.
#[instrument(skip(state))]
pub async fn frame_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ScrubParams>,
) -> Response {
    let controller = Arc::clone(&state.controller);
    let ticket = controller.ticket();

    let result = tokio::task::spawn_blocking(move || {
        controller.scrub_blocking(ticket, params.position, |state| state.surface().frame_png())
    })
    .await;

    match result {
        Ok(Ok(scrubbed)) => match scrubbed.snapshot {
            Ok(png) => png_response(png, Some(&scrubbed.outcome), scrubbed.outcome.displayed()),
            Err(e) => internal_error(&e),
        },
        Ok(Err(e)) => render_error(&e),
        Err(e) => {
            error!(error = %e, "Render task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Render task failed", None)
        }
    }
}

/// The frame currently displayed, without rendering.
pub async fn current_frame_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    let controller = Arc::clone(&state.controller);
    let result = tokio::task::spawn_blocking(move || {
        controller.inspect_blocking(|state| {
            state
                .current_frame()
                .cloned()
                .map(|frame| (frame, state.surface().frame_png()))
        })
    })
    .await;

    match result {
        Ok(Some((frame, Ok(png)))) => png_response(png, None, Some(&frame)),
        Ok(Some((_, Err(e)))) => internal_error(&e),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "No frame displayed yet", None),
        Err(e) => {
            error!(error = %e, "Snapshot task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Snapshot task failed", None)
        }
    }
}

fn png_response(
    png: Vec<u8>,
    outcome: Option<&ScrubOutcome>,
    frame: Option<&RenderedFrame>,
) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/png"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    if let Some(frame) = frame {
        headers.insert("x-frame-index", HeaderValue::from(frame.index));
        if let Ok(value) = HeaderValue::from_str(&frame.forecast_time.to_rfc3339()) {
            headers.insert("x-forecast-time", value);
        }
    }
    if let Some(outcome) = outcome {
        let superseded = if outcome.is_superseded() { "true" } else { "false" };
        headers.insert("x-frame-superseded", HeaderValue::from_static(superseded));
    }

    (StatusCode::OK, headers, png).into_response()
}

fn render_error(e: &RenderError) -> Response {
    match e {
        RenderError::FrameLoad { path, .. } => {
            // Already logged by the renderer; the previous frame stays up.
            json_error(
                StatusCode::BAD_GATEWAY,
                &e.to_string(),
                Some(path.display().to_string()),
            )
        }
        RenderError::IndexOutOfRange { .. } => {
            warn!(error = %e, "Scrub resolved outside the catalog");
            json_error(StatusCode::BAD_REQUEST, &e.to_string(), None)
        }
        other => internal_error(other),
    }
}

fn internal_error(e: &RenderError) -> Response {
    error!(error = %e, "Frame output failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string(), None)
}

fn json_error(status: StatusCode, message: &str, path: Option<String>) -> Response {
    let body = match path {
        Some(path) => serde_json::json!({ "error": message, "path": path }),
        None => serde_json::json!({ "error": message }),
    };
    (status, Json(body)).into_response()
}

// ============================================================================
// Operational
// ============================================================================

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
}
