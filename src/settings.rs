use std::env;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

pub const DEFAULT_FAL_ENDPOINT: &str = "https://fal.run/fal-ai/nano-banana-pro/edit";

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_env")]
    pub env: String, // file / server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub prefix: Option<String>,

    /// fal.ai credential, checked per request rather than at startup
    pub fal_key: Option<String>,
    #[serde(default = "default_fal_endpoint")]
    pub fal_endpoint: String,
    #[serde(default = "default_fal_timeout_secs")]
    pub fal_timeout_secs: u64,

    /// Enables downscaling + JPEG re-encoding in the thumb relay
    pub thumb_max_width: Option<u32>,
    #[serde(default = "default_thumb_timeout_secs")]
    pub thumb_timeout_secs: u64,
    /// Upstream images larger than this are refused with 502
    #[serde(default = "default_thumb_max_bytes")]
    pub thumb_max_bytes: u64,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_env() -> String {
    "file".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_fal_endpoint() -> String {
    DEFAULT_FAL_ENDPOINT.to_string()
}

fn default_fal_timeout_secs() -> u64 {
    90
}

fn default_thumb_timeout_secs() -> u64 {
    60
}

fn default_thumb_max_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_log_dir() -> String {
    "./logs".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            host: default_host(),
            port: default_port(),
            prefix: None,
            fal_key: None,
            fal_endpoint: default_fal_endpoint(),
            fal_timeout_secs: default_fal_timeout_secs(),
            thumb_max_width: None,
            thumb_timeout_secs: default_thumb_timeout_secs(),
            thumb_max_bytes: default_thumb_max_bytes(),
            log_dir: default_log_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Route prefix without a trailing slash; empty when mounted at the root.
    pub fn prefix(&self) -> String {
        let prefix = self.prefix.clone().unwrap_or("/api".to_string());
        let trimmed = prefix.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        }
    }

    /// The credential, if one is set and non-blank.
    pub fn fal_key(&self) -> Option<&str> {
        self.fal_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn fal_timeout(&self) -> Duration {
        Duration::from_secs(self.fal_timeout_secs.max(1))
    }

    pub fn thumb_timeout(&self) -> Duration {
        Duration::from_secs(self.thumb_timeout_secs.max(1))
    }
}

pub fn get_config() -> anyhow::Result<Config> {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environment as environment variable");
    }
    Ok(envy::from_env::<Config>()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_normalized() {
        let mut config = Config::default();
        assert_eq!(config.prefix(), "/api");

        config.prefix = Some("v1/".to_string());
        assert_eq!(config.prefix(), "/v1");

        config.prefix = Some("/".to_string());
        assert_eq!(config.prefix(), "");
    }

    #[test]
    fn blank_fal_key_counts_as_missing() {
        let mut config = Config::default();
        assert!(config.fal_key().is_none());

        config.fal_key = Some("   ".to_string());
        assert!(config.fal_key().is_none());

        config.fal_key = Some(" abc ".to_string());
        assert_eq!(config.fal_key(), Some("abc"));
    }

    #[test]
    fn timeouts_never_drop_to_zero() {
        let mut config = Config::default();
        assert_eq!(config.fal_timeout(), Duration::from_secs(90));
        assert_eq!(config.thumb_timeout(), Duration::from_secs(60));

        config.fal_timeout_secs = 0;
        config.thumb_timeout_secs = 0;
        assert_eq!(config.fal_timeout(), Duration::from_secs(1));
        assert_eq!(config.thumb_timeout(), Duration::from_secs(1));
    }
}
