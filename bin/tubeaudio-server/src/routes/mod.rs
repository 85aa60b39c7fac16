//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (forwarded-header resolution, per-request trace id,
//!   panic-to-500 conversion)
//! - Optional Swagger UI / OpenAPI spec endpoint (disable with
//!   `TUBEAUDIO_ENABLE_SWAGGER=false`)
//! - Health / heartbeat route
//! - The `/download` route

pub mod doc;
mod download;
mod health;

use std::sync::Arc;

use axum::middleware;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::error;
use crate::middleware::{forwarded, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(download::router());

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Last added runs first: forwarded info is in place before the
        // trace span reads it, and panics surface inside the span as 500s.
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::from_fn(trace::trace_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            forwarded::forwarded_middleware,
        ))
        .with_state(state)
}
