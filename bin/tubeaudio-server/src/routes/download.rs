//! `GET /download?videoId=<id or url>` – fetch a video's audio as mp3.
//!
//! Lifecycle of one request:
//!
//! 1. Reduce `videoId` to a [`VideoId`]; 400 if it does not reduce.
//! 2. Create a fresh [`WorkDir`] under the configured temp root.
//! 3. Await the download tool (a child process, so no runtime thread is
//!    held while it runs).
//! 4. Stream `<id>.mp3` back as an attachment.
//!
//! The work directory guard travels inside the response body stream, so
//! it is removed once the body has been fully sent or the client goes
//! away. On every error path the guard is dropped before the handler
//! returns.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::Stream;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};
use tubeaudio_core::{FetchError, VideoId, WorkDir, AUDIO_FORMAT};
use utoipa::{IntoParams, OpenApi};

use crate::error::ServerError;
use crate::state::AppState;

const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(OpenApi)]
#[openapi(paths(download))]
pub struct DownloadApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/download", get(download))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DownloadQuery {
    /// Bare 11-character id, or a URL containing `v=<id>` / `youtu.be/<id>`.
    #[serde(rename = "videoId", default)]
    pub video_id: String,
}

impl DownloadQuery {
    /// Build from raw query pairs. A repeated `videoId` keeps its first
    /// value; unknown keys are ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        pairs
            .into_iter()
            .find(|(k, _)| k == "videoId")
            .map(|(_, video_id)| Self { video_id })
            .unwrap_or_default()
    }
}

#[utoipa::path(
    get,
    path = "/download",
    tag = "download",
    params(DownloadQuery),
    responses(
        (status = 200, description = "mp3 attachment", content_type = "audio/mpeg", body = Vec<u8>),
        (status = 400, description = "Invalid videoId"),
        (status = 500, description = "Download failed or unexpected error"),
    )
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, ServerError> {
    let query = DownloadQuery::from_pairs(pairs);
    let id = VideoId::extract(&query.video_id).map_err(|e| {
        warn!(error = %e, "rejected invalid video id");
        ServerError::BadRequest("Invalid videoId".into())
    })?;
    info!(video_id = %id, "received valid request");

    let workdir = WorkDir::create_in(&state.config.temp_root).map_err(|e| {
        ServerError::Internal(format!(
            "creating work dir under {}: {e}",
            state.config.temp_root.display()
        ))
    })?;
    let output = workdir.output_path(&id);

    info!(video_id = %id, workdir = %workdir.path().display(), "running download tool");
    if let Err(e) = state.fetcher.fetch(&id, &output).await {
        match &e {
            FetchError::ExitStatus { stderr_tail, .. } => {
                error!(video_id = %id, error = %e, stderr = %stderr_tail, "download failed")
            }
            _ => error!(video_id = %id, error = %e, "download failed"),
        }
        return Err(e.into());
    }
    info!(video_id = %id, "download and processing successful");

    let file = tokio::fs::File::open(&output).await?;
    let len = file.metadata().await?.len();

    let body = Body::from_stream(CleanupOnDrop {
        inner: ReaderStream::new(file),
        _workdir: workdir,
    });

    let headers = [
        (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_owned()),
        (header::CONTENT_LENGTH, len.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", id.file_name(AUDIO_FORMAT)),
        ),
    ];
    Ok((headers, body).into_response())
}

/// Body stream that owns the request's work directory.
///
/// Field order matters: `inner` (the open file) is dropped before the
/// directory is removed.
struct CleanupOnDrop<S> {
    inner: S,
    _workdir: WorkDir,
}

impl<S: Stream + Unpin> Stream for CleanupOnDrop<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
