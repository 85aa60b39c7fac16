//! `GET /health` – liveness plus a look at what a download will need.
//!
//! The route always answers 200 while the process is serving. `status`
//! drops to `degraded` when the cookie jar handed to yt-dlp is missing,
//! since most downloads fail without it.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(Health)))]
pub struct HealthApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    /// `ok`, or `degraded` when a download prerequisite is missing.
    pub status: &'static str,
    pub version: &'static str,
    /// Program invoked for downloads.
    pub downloader: String,
    pub cookies_present: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = Health)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<Health> {
    let cookies_present = state.config.cookies_path.is_file();
    Json(Health {
        status: if cookies_present { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        downloader: state.config.ytdlp_program.display().to_string(),
        cookies_present,
    })
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::routes;

    use super::*;

    async fn health(cookies: &Path) -> Value {
        let config = Config {
            cookies_path: cookies.to_path_buf(),
            ytdlp_program: "/opt/bin/yt-dlp".into(),
            enable_swagger: false,
            ..Config::default()
        };
        let resp = routes::build(Arc::new(AppState::new(config)))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ok_when_cookie_jar_exists() {
        let dir = tempfile::tempdir().unwrap();
        let cookies = dir.path().join("cookies.txt");
        std::fs::write(&cookies, "# Netscape HTTP Cookie File\n").unwrap();

        let body = health(&cookies).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(body["downloader"], "/opt/bin/yt-dlp");
        assert_eq!(body["cookies_present"], true);
    }

    #[tokio::test]
    async fn degraded_without_cookie_jar() {
        let dir = tempfile::tempdir().unwrap();
        let body = health(&dir.path().join("missing.txt")).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["cookies_present"], false);
    }
}
