//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON-body HTTP response with an appropriate status code.
//!
//! Tool stderr, paths and i/o detail are logged in full but never returned
//! to the caller.

use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use tubeaudio_core::FetchError;

const UNEXPECTED: &str = "An unexpected error occurred";

/// All errors that can occur in the tubeaudio-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The download tool failed for this id.
    #[error("download failed: {0}")]
    DownloadFailed(#[from] FetchError),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            // Logged by the handler, which knows the video id.
            ServerError::DownloadFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Download failed: {}", e.summary()),
            ),
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, UNEXPECTED.to_owned())
            }
        };
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(format!("{e:#}"))
    }
}

/// Response for a handler that panicked, installed through
/// `tower_http::catch_panic::CatchPanicLayer`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    ServerError::Internal(format!("handler panicked: {detail}")).into_response()
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let resp = ServerError::BadRequest("Invalid videoId".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "Invalid videoId");
    }

    #[tokio::test]
    async fn internal_error_hides_detail() {
        let resp = ServerError::Internal("/dev/shm/tubeaudio-abc: EACCES".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], UNEXPECTED);
    }

    #[tokio::test]
    async fn panicking_handler_becomes_generic_500() {
        use axum::body::Body;
        use axum::http::Request;
        use axum::routing::get;
        use axum::Router;
        use tower::ServiceExt;
        use tower_http::catch_panic::CatchPanicLayer;

        async fn boom() -> &'static str {
            panic!("temp root vanished")
        }

        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));
        let resp = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await["error"], UNEXPECTED);
    }

    #[tokio::test]
    async fn download_failure_is_summarised() {
        let err = FetchError::MissingOutput {
            program: "yt-dlp".into(),
            path: "/dev/shm/tubeaudio-abc/x.mp3".into(),
        };
        let resp = ServerError::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        let msg = body["error"].as_str().unwrap();
        assert!(msg.starts_with("Download failed:"));
        assert!(!msg.contains("/dev/shm"));
    }
}
