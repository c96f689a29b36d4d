use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

use crate::overpass::DEFAULT_OVERPASS_URL;
use crate::services::settings::SETTINGS_KEY;

const MAX_COMMIT_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct HydrantMapConfig {
    pub overpass_url: String,
    pub settings_path: PathBuf,
    pub static_root: Option<PathBuf>,
    pub commit_delay_ms: u64,
    pub request_timeout_seconds: u64,
}

impl HydrantMapConfig {
    pub fn from_env(cli_static_root: Option<PathBuf>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let overpass_url = parse_overpass_url(&env_string(
            "HYDRANT_MAP_OVERPASS_URL",
            DEFAULT_OVERPASS_URL,
        ))?;
        let data_root = env_path("HYDRANT_MAP_DATA_ROOT", ".")?;
        let settings_default = data_root.join(format!("{SETTINGS_KEY}.json"));
        let settings_path = env_path(
            "HYDRANT_MAP_SETTINGS_PATH",
            &settings_default.to_string_lossy(),
        )?;
        let static_root = cli_static_root.or_else(|| env_optional_path("HYDRANT_MAP_STATIC_ROOT"));
        let commit_delay_ms = env_u64("HYDRANT_MAP_COMMIT_DELAY_MS", 100).min(MAX_COMMIT_DELAY_MS);
        let request_timeout_seconds =
            env_u64("HYDRANT_MAP_REQUEST_TIMEOUT_SECONDS", 60).clamp(1, 600);

        Ok(Self {
            overpass_url,
            settings_path,
            static_root,
            commit_delay_ms,
            request_timeout_seconds,
        })
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse_overpass_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        anyhow::bail!("HYDRANT_MAP_OVERPASS_URL must be an http(s) URL, got {trimmed:?}");
    }
    Ok(trimmed.to_string())
}

fn env_string(key: &str, default: &str) -> String {
    env_optional_string(key).unwrap_or_else(|| default.to_string())
}

fn env_optional_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_optional_path(key: &str) -> Option<PathBuf> {
    env_optional_string(key).map(PathBuf::from)
}

fn env_path(key: &str, default: &str) -> Result<PathBuf> {
    let value = env_optional_string(key).unwrap_or_else(|| default.to_string());
    let path = PathBuf::from(value);
    if path.as_os_str().is_empty() {
        anyhow::bail!("{key} resolved to an empty path");
    }
    Ok(path)
}
