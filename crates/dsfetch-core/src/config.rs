use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::DEFAULT_CONCURRENCY;
use crate::downloader::{TransferOptions, DEFAULT_USER_AGENT};
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per entry (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: secs_f64(self.base_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// libcurl transfer tuning (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferConfig {
    pub connect_timeout_secs: u64,
    /// Abort a transfer slower than this many bytes/sec ...
    pub low_speed_limit_bytes: u32,
    /// ... sustained for this many seconds.
    pub low_speed_time_secs: u64,
    /// Hard cap per attempt. Unset = no cap.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Unset = `dsfetch/<version>`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            low_speed_limit_bytes: 1024,
            low_speed_time_secs: 60,
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl TransferConfig {
    pub fn to_options(&self) -> TransferOptions {
        TransferOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
            timeout: self.timeout_secs.map(Duration::from_secs),
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}

/// Global configuration loaded from `~/.config/dsfetch/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DsfetchConfig {
    /// Maximum number of entries fetched at once.
    pub concurrency: usize,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional transfer tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub transfer: Option<TransferConfig>,
}

impl Default for DsfetchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry: None,
            transfer: None,
        }
    }
}

impl DsfetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn transfer_options(&self) -> TransferOptions {
        self.transfer.clone().unwrap_or_default().to_options()
    }
}

fn secs_f64(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dsfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DsfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DsfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_from_path(path: &Path) -> Result<DsfetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: DsfetchConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DsfetchConfig::default();
        assert_eq!(cfg.concurrency, 4);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(500));
        assert_eq!(policy.max_delay, Duration::from_secs(30));
        assert_eq!(cfg.transfer_options(), TransferOptions::default());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DsfetchConfig {
            concurrency: 2,
            retry: Some(RetryConfig::default()),
            transfer: Some(TransferConfig::default()),
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DsfetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_sections() {
        let toml = r#"
            concurrency = 8

            [retry]
            max_attempts = 5
            base_delay_secs = 0.25
            max_delay_secs = 10

            [transfer]
            connect_timeout_secs = 5
            low_speed_limit_bytes = 10
            low_speed_time_secs = 20
            timeout_secs = 600
            user_agent = "kg-builder/1.0"
        "#;
        let cfg: DsfetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.concurrency, 8);
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
        let opts = cfg.transfer_options();
        assert_eq!(opts.connect_timeout, Duration::from_secs(5));
        assert_eq!(opts.low_speed_limit, 10);
        assert_eq!(opts.timeout, Some(Duration::from_secs(600)));
        assert_eq!(opts.user_agent, "kg-builder/1.0");
    }

    #[test]
    fn transfer_section_optional_keys_default() {
        let toml = r#"
            concurrency = 1

            [transfer]
            connect_timeout_secs = 10
            low_speed_limit_bytes = 1024
            low_speed_time_secs = 60
        "#;
        let cfg: DsfetchConfig = toml::from_str(toml).unwrap();
        let opts = cfg.transfer_options();
        assert!(opts.timeout.is_none());
        assert_eq!(opts.user_agent, DEFAULT_USER_AGENT);
        assert!(cfg.retry.is_none());
    }

    #[test]
    fn zero_attempts_in_config_means_one() {
        let retry = RetryConfig {
            max_attempts: 0,
            base_delay_secs: -1.0,
            max_delay_secs: 1,
        };
        let policy = retry.to_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.base_delay, Duration::ZERO);
    }

    #[test]
    fn load_from_path_reads_and_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "concurrency = 3\n").unwrap();
        assert_eq!(load_from_path(&path).unwrap().concurrency, 3);

        std::fs::write(&path, "concurrency = \"many\"\n").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("parsing config"));

        let missing = dir.path().join("absent.toml");
        assert!(load_from_path(&missing).is_err());
    }
}
