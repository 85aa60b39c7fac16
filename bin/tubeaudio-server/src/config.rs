//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use tubeaudio_core::{default_temp_root, YtDlpOptions};

/// Runtime configuration for tubeaudio-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8080"`).
    pub bind_address: String,

    /// Parent of the per-request work directories. Defaults to `/dev/shm`
    /// when present so downloads never touch disk.
    pub temp_root: PathBuf,

    /// Download tool executable.
    pub ytdlp_program: PathBuf,

    /// Cookie jar handed to the download tool.
    pub cookies_path: PathBuf,

    /// Upper bound on a single download. `None` lets the tool run until it
    /// exits on its own.
    pub download_timeout: Option<Duration>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// Append-only log file.
    pub log_file: PathBuf,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Honour one hop of `X-Forwarded-*` headers from a reverse proxy.
    pub trust_proxy: bool,

    /// Serve `/swagger-ui` and `/api-docs/openapi.json`.
    pub enable_swagger: bool,
}

impl Default for Config {
    fn default() -> Self {
        let ytdlp = YtDlpOptions::default();
        Self {
            bind_address: "0.0.0.0:8080".to_owned(),
            temp_root: default_temp_root(),
            ytdlp_program: ytdlp.program,
            cookies_path: ytdlp.cookies,
            download_timeout: None,
            log_level: "info".to_owned(),
            log_file: PathBuf::from("server.log"),
            log_json: false,
            trust_proxy: true,
            enable_swagger: true,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            bind_address: lookup("TUBEAUDIO_BIND").unwrap_or(d.bind_address),
            temp_root: lookup("TUBEAUDIO_TEMP_ROOT").map_or(d.temp_root, PathBuf::from),
            ytdlp_program: lookup("TUBEAUDIO_YTDLP").map_or(d.ytdlp_program, PathBuf::from),
            cookies_path: lookup("TUBEAUDIO_COOKIES").map_or(d.cookies_path, PathBuf::from),
            download_timeout: lookup("TUBEAUDIO_DOWNLOAD_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            log_level: lookup("TUBEAUDIO_LOG").unwrap_or(d.log_level),
            log_file: lookup("TUBEAUDIO_LOG_FILE").map_or(d.log_file, PathBuf::from),
            log_json: lookup("TUBEAUDIO_LOG_JSON").map_or(d.log_json, |v| parse_bool(&v)),
            trust_proxy: lookup("TUBEAUDIO_TRUST_PROXY").map_or(d.trust_proxy, |v| parse_bool(&v)),
            enable_swagger: lookup("TUBEAUDIO_ENABLE_SWAGGER")
                .map_or(d.enable_swagger, |v| parse_bool(&v)),
        }
    }

    /// Options for the download tool derived from this configuration.
    pub fn ytdlp_options(&self) -> YtDlpOptions {
        YtDlpOptions {
            program: self.ytdlp_program.clone(),
            cookies: self.cookies_path.clone(),
            timeout: self.download_timeout,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_bool(v: &str) -> bool {
    v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_listen_on_all_interfaces_port_8080() {
        let cfg = from_pairs(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:8080");
        assert_eq!(cfg.log_file, PathBuf::from("server.log"));
        assert!(cfg.download_timeout.is_none());
        assert!(cfg.trust_proxy);
        assert!(!cfg.log_json);
    }

    #[test]
    fn env_overrides_are_applied() {
        let cfg = from_pairs(&[
            ("TUBEAUDIO_BIND", "127.0.0.1:9000"),
            ("TUBEAUDIO_TEMP_ROOT", "/var/tmp"),
            ("TUBEAUDIO_YTDLP", "/opt/bin/yt-dlp"),
            ("TUBEAUDIO_COOKIES", "/etc/tubeaudio/cookies.txt"),
            ("TUBEAUDIO_DOWNLOAD_TIMEOUT_SECS", "600"),
            ("TUBEAUDIO_LOG_JSON", "true"),
            ("TUBEAUDIO_TRUST_PROXY", "0"),
        ]);
        assert_eq!(cfg.bind_address, "127.0.0.1:9000");
        assert_eq!(cfg.temp_root, PathBuf::from("/var/tmp"));
        assert_eq!(cfg.download_timeout, Some(Duration::from_secs(600)));
        assert!(cfg.log_json);
        assert!(!cfg.trust_proxy);

        let opts = cfg.ytdlp_options();
        assert_eq!(opts.program, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(opts.cookies, PathBuf::from("/etc/tubeaudio/cookies.txt"));
        assert_eq!(opts.timeout, Some(Duration::from_secs(600)));
    }

    #[test]
    fn zero_or_garbage_timeout_means_none() {
        assert!(from_pairs(&[("TUBEAUDIO_DOWNLOAD_TIMEOUT_SECS", "0")]).download_timeout.is_none());
        assert!(from_pairs(&[("TUBEAUDIO_DOWNLOAD_TIMEOUT_SECS", "soon")]).download_timeout.is_none());
    }
}
