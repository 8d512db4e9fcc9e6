//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_CHUNK_SIZE};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration injected into the transfer client and tools.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the processing backend, without a trailing slash.
    pub api_url: String,
    pub timeout_secs: u64,
    pub upload_chunk_size: usize,
    /// Directory where processed results are downloaded.
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            upload_chunk_size: DEFAULT_UPLOAD_CHUNK_SIZE,
            output_dir: PathBuf::from("."),
        }
    }
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Trim whitespace and trailing slashes from a backend base URL.
pub fn normalize_api_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: env::var("AIDIT_API_URL")
                .ok()
                .map(|url| normalize_api_url(&url))
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.api_url),
            timeout_secs: env::var("AIDIT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.timeout_secs),
            upload_chunk_size: env::var("AIDIT_UPLOAD_CHUNK_SIZE")
                .ok()
                .and_then(|s| s.trim().parse().ok())
                .filter(|size| *size > 0)
                .unwrap_or(defaults.upload_chunk_size),
            output_dir: env::var("AIDIT_OUTPUT_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(expand_tilde)
                .unwrap_or(defaults.output_dir),
        }
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_api_url, Config};
    use crate::constants::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_UPLOAD_CHUNK_SIZE};
    use crate::env::{env_lock, EnvGuard};
    use std::path::PathBuf;

    const KEYS: [&str; 4] = [
        "AIDIT_API_URL",
        "AIDIT_TIMEOUT_SECS",
        "AIDIT_UPLOAD_CHUNK_SIZE",
        "AIDIT_OUTPUT_DIR",
    ];

    fn cleared_env() -> Vec<EnvGuard> {
        KEYS.iter().map(|key| EnvGuard::remove(key)).collect()
    }

    #[test]
    fn from_env_uses_defaults_when_unset() {
        let _lock = env_lock().lock().expect("env lock");
        let _guards = cleared_env();
        let config = Config::from_env();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.upload_chunk_size, DEFAULT_UPLOAD_CHUNK_SIZE);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn from_env_reads_overrides_and_rejects_zero_values() {
        let _lock = env_lock().lock().expect("env lock");
        let _guards = cleared_env();
        let _url = EnvGuard::set("AIDIT_API_URL", " http://10.0.0.5:9000/ ");
        let _timeout = EnvGuard::set("AIDIT_TIMEOUT_SECS", "0");
        let _chunk = EnvGuard::set("AIDIT_UPLOAD_CHUNK_SIZE", "4096");
        let _dir = EnvGuard::set("AIDIT_OUTPUT_DIR", "/tmp/aidit-out");

        let config = Config::from_env();
        assert_eq!(config.api_url, "http://10.0.0.5:9000");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.upload_chunk_size, 4096);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/aidit-out"));
    }

    #[test]
    fn output_dir_expands_home() {
        let _lock = env_lock().lock().expect("env lock");
        let _guards = cleared_env();
        let _home = EnvGuard::set("HOME", "/home/aidit");
        let _dir = EnvGuard::set("AIDIT_OUTPUT_DIR", "~/Pictures");
        let config = Config::from_env();
        assert_eq!(config.output_dir, PathBuf::from("/home/aidit/Pictures"));
    }

    #[test]
    fn normalize_api_url_strips_trailing_slashes() {
        assert_eq!(
            normalize_api_url("http://127.0.0.1:8000///"),
            "http://127.0.0.1:8000"
        );
    }
}
