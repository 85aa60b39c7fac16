//! Shared application state injected into every Axum handler.

use std::fmt;
use std::sync::Arc;

use tubeaudio_core::{AudioFetcher, YtDlp};

use crate::config::Config;

/// State shared across all HTTP handlers. Nothing in here is mutated after
/// startup; requests never share anything but these read-only handles.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Download tool behind the `/download` route.
    pub fetcher: Arc<dyn AudioFetcher>,
}

impl AppState {
    /// Production wiring: the real `yt-dlp` driven by `config`.
    pub fn new(config: Config) -> Self {
        let fetcher = Arc::new(YtDlp::new(config.ytdlp_options()));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn AudioFetcher>) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
