use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// The query value does not reduce to a valid video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VideoIdError {
    #[error("invalid video id: {candidate:?}")]
    Invalid { candidate: String },
}

/// Failure of a single download-and-transcode attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The tool could not be started at all (missing binary, permissions).
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{program} exited with {status}")]
    ExitStatus {
        program: String,
        status: ExitStatus,
        /// Trailing part of the tool's stderr, for the server log only.
        stderr_tail: String,
    },

    /// Exit status was zero but the expected output file is absent.
    #[error("{program} reported success but produced no file at {path}")]
    MissingOutput { program: String, path: String },

    #[error("{program} did not finish within {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("i/o error while waiting for download: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Short description safe to hand back to the HTTP caller.
    pub fn summary(&self) -> String {
        match self {
            FetchError::ExitStatus { program, status, .. } => match status.code() {
                Some(code) => format!("{program} exited with status {code}"),
                None => format!("{program} was terminated by a signal"),
            },
            FetchError::Timeout { after, .. } => {
                format!("download timed out after {}s", after.as_secs())
            }
            FetchError::MissingOutput { .. } => "no audio file was produced".to_owned(),
            FetchError::Spawn { program, .. } => format!("could not start {program}"),
            FetchError::Io(_) => "i/o error".to_owned(),
        }
    }
}
