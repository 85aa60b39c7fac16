//! External download-and-transcode tool.
//!
//! [`AudioFetcher`] is the seam the HTTP layer talks to; [`YtDlp`] drives
//! the real `yt-dlp` binary as a child process. The child is awaited
//! through `tokio::process`, so a long download parks only the request
//! that started it and never a runtime worker thread.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::FetchError;
use crate::video_id::VideoId;

/// Container/codec of every file handed back to callers.
pub const AUDIO_FORMAT: &str = "mp3";

/// Bytes of stderr kept for diagnostics.
const STDERR_TAIL_BYTES: usize = 2000;

/// Downloads the audio track of a video into a given file.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Fetch and transcode `id`, leaving the result at `output`.
    ///
    /// Returns only once the tool has finished; `output` exists on `Ok`.
    async fn fetch(&self, id: &VideoId, output: &Path) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct YtDlpOptions {
    /// Executable name or path (default: `yt-dlp` from `PATH`).
    pub program: PathBuf,
    /// Netscape-format cookie jar passed with `--cookies`.
    pub cookies: PathBuf,
    /// Kill the tool after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for YtDlpOptions {
    fn default() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            program: PathBuf::from("yt-dlp"),
            cookies: cwd.join("cookies").join("cookies.txt"),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct YtDlp {
    opts: YtDlpOptions,
}

impl YtDlp {
    pub fn new(opts: YtDlpOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &YtDlpOptions {
        &self.opts
    }

    /// Full argument vector for one invocation.
    ///
    /// Audio only, mp3 at best VBR quality, 8 parallel fragments in 10M
    /// chunks, aria2c as the transfer backend.
    pub fn args(&self, id: &VideoId, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(24);
        args.push("--cookies".into());
        args.push(self.opts.cookies.clone().into_os_string());
        args.extend(
            [
                "-x",
                "--audio-format",
                AUDIO_FORMAT,
                "--audio-quality",
                "0",
                "-N",
                "8",
                "--http-chunk-size",
                "10M",
                "--downloader",
                "aria2c",
                "--downloader-args",
                "aria2c:-x16 -j16 -k1M",
                "--postprocessor-args",
                "ffmpeg:-threads 4",
                "-o",
            ]
            .map(OsString::from),
        );
        args.push(output.as_os_str().to_owned());
        args.push(id.watch_url().into());
        args
    }

    fn program_name(&self) -> String {
        self.opts.program.display().to_string()
    }
}

#[async_trait]
impl AudioFetcher for YtDlp {
    async fn fetch(&self, id: &VideoId, output: &Path) -> Result<(), FetchError> {
        let program = self.program_name();
        let args = self.args(id, output);
        debug!(%program, ?args, "spawning download tool");

        let child = Command::new(&self.opts.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let waited = match self.opts.timeout {
            Some(after) => tokio::time::timeout(after, child.wait_with_output())
                .await
                .map_err(|_| FetchError::Timeout {
                    program: program.clone(),
                    after,
                })?,
            None => child.wait_with_output().await,
        };
        let result = waited?;

        if !result.status.success() {
            return Err(FetchError::ExitStatus {
                program,
                status: result.status,
                stderr_tail: stderr_tail(&result.stderr),
            });
        }

        if !tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(FetchError::MissingOutput {
                program,
                path: output.display().to_string(),
            });
        }

        Ok(())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_owned()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
