use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::scheduler::DEFAULT_WORKERS;

/// Largest worker pool accepted from config or CLI.
pub const MAX_WORKER_POOL_SIZE: usize = 10;

/// Upper bound for the request delay and the retry base delay, in seconds.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Upper bound for `retry.max_delay_secs`.
pub const MAX_BACKOFF_SECS: u64 = 24 * 3600;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Number of attempts per image (including the first).
    pub retry_count: u32,
    /// Base delay in seconds between attempts; later attempts back off exponentially from here.
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/chapterdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterDlConfig {
    /// Root folder; each series gets `<output_folder>/<series>/`.
    pub output_folder: PathBuf,
    /// Concurrent image downloads per chapter.
    pub worker_pool_size: usize,
    /// Minimum spacing between any two outbound requests, process-wide.
    pub delay_between_requests_secs: f64,
    /// Bundle each completed chapter into `Chapter_<NN>.cbz`.
    pub create_archive: bool,
    /// Remove the per-image folder once its archive has been verified.
    pub cleanup_after_packaging: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional User-Agent header for image requests.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional connect timeout in seconds (None = 30s).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ChapterDlConfig {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("manga_downloads"),
            worker_pool_size: DEFAULT_WORKERS,
            delay_between_requests_secs: 1.0,
            create_archive: true,
            cleanup_after_packaging: false,
            retry: None,
            user_agent: None,
            connect_timeout_secs: None,
        }
    }
}

impl ChapterDlConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.worker_pool_size == 0 || self.worker_pool_size > MAX_WORKER_POOL_SIZE {
            anyhow::bail!(
                "worker_pool_size must be between 1 and {}, got {}",
                MAX_WORKER_POOL_SIZE,
                self.worker_pool_size
            );
        }
        check_delay("delay_between_requests_secs", self.delay_between_requests_secs)?;
        let retry = self.retry_config();
        if retry.retry_count == 0 {
            anyhow::bail!("retry.retry_count must be at least 1");
        }
        check_delay("retry.base_delay_secs", retry.base_delay_secs)?;
        if retry.max_delay_secs > MAX_BACKOFF_SECS {
            anyhow::bail!(
                "retry.max_delay_secs must be at most {}, got {}",
                MAX_BACKOFF_SECS,
                retry.max_delay_secs
            );
        }
        Ok(())
    }

    /// Effective retry section (config value or defaults).
    pub fn retry_config(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Retry policy built from the `[retry]` section.
    pub fn retry_policy(&self) -> RetryPolicy {
        let retry = self.retry_config();
        RetryPolicy {
            max_attempts: retry.retry_count.max(1),
            base_delay: delay_duration(retry.base_delay_secs),
            max_delay: Duration::from_secs(retry.max_delay_secs.min(MAX_BACKOFF_SECS)),
        }
    }

    /// Interval enforced by the shared rate limiter.
    pub fn request_interval(&self) -> Duration {
        delay_duration(self.delay_between_requests_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs.unwrap_or(30))
    }
}

fn check_delay(name: &str, secs: f64) -> Result<()> {
    if !secs.is_finite() || !(0.0..=MAX_DELAY_SECS).contains(&secs) {
        anyhow::bail!("{} must be between 0 and {} seconds, got {}", name, MAX_DELAY_SECS, secs);
    }
    Ok(())
}

/// Seconds to `Duration`, clamped to `[0, MAX_DELAY_SECS]`; non-finite values become zero.
fn delay_duration(secs: f64) -> Duration {
    if !secs.is_finite() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(secs.clamp(0.0, MAX_DELAY_SECS))
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chapterdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ChapterDlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ChapterDlConfig::default();
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

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<ChapterDlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: ChapterDlConfig = toml::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
