use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::VideoIdError;

/// Finds an id embedded in a watch URL (`v=<id>`) or a short link
/// (`youtu.be/<id>`). First match wins; anything after the 11th char is
/// ignored.
static EMBEDDED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|youtu\.be/)([0-9A-Za-z_-]{11})").expect("embedded id pattern is valid")
});

static BARE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").expect("bare id pattern is valid"));

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

/// An 11-character video identifier drawn from `[0-9A-Za-z_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Reduce a raw query value to an identifier.
    ///
    /// `raw` may be the bare id or any string containing `v=<id>` or
    /// `youtu.be/<id>`. When no embedded id is found the whole value is
    /// treated as the candidate.
    pub fn extract(raw: &str) -> Result<Self, VideoIdError> {
        let candidate = EMBEDDED_ID
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map_or(raw, |m| m.as_str());

        if BARE_ID.is_match(candidate) {
            Ok(Self(candidate.to_owned()))
        } else {
            Err(VideoIdError::Invalid {
                candidate: candidate.to_owned(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch page the download tool is pointed at.
    pub fn watch_url(&self) -> String {
        format!("{WATCH_URL_PREFIX}{}", self.0)
    }

    /// `<id>.<ext>`; safe as a file name since the alphabet has no separators.
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{ext}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VideoId {
    type Err = VideoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::extract(s)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
