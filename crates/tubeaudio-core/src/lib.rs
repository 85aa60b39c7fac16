//! tubeaudio-core: the pieces of an audio download request that do not
//! depend on HTTP.
//!
//! - [`VideoId`] turns a raw query value (bare id or watch / short URL)
//!   into a validated 11-character identifier.
//! - [`WorkDir`] is a per-request scratch directory that removes itself on
//!   drop.
//! - [`AudioFetcher`] is the seam in front of the external download tool;
//!   [`YtDlp`] is the production implementation.

mod error;
mod fetcher;
mod video_id;
mod workdir;

pub use error::{FetchError, VideoIdError};
pub use fetcher::{AudioFetcher, YtDlp, YtDlpOptions, AUDIO_FORMAT};
pub use video_id::VideoId;
pub use workdir::{default_temp_root, WorkDir};
