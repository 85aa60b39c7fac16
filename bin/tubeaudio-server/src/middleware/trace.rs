use std::time::Instant;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::middleware::forwarded::ClientInfo;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Wrap each request in a span carrying a trace id, and log its start and
/// completion.
///
/// Bodies are passed through untouched: the download response is streamed
/// and must not be buffered here. The second log line marks the handler
/// returning headers, not the last body byte leaving the socket.
pub async fn trace_middleware(
    mut req: Request,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let (client, scheme) = req
        .extensions()
        .get::<ClientInfo>()
        .map(|c| (c.addr.clone().unwrap_or_else(|| "-".to_owned()), c.scheme.clone()))
        .unwrap_or_else(|| ("-".to_owned(), "http".to_owned()));

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
        client = %client,
        scheme = %scheme,
    );

    async move {
        info!("→ request started");

        let header = HeaderValue::from_str(&trace_id.to_string()).ok();
        if let Some(v) = &header {
            req.headers_mut().insert(X_TRACE_ID, v.clone());
        }

        let mut response = next.run(req).await;

        if let Some(v) = header {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "← response started"
        );

        response
    }
    .instrument(span)
    .await
}
