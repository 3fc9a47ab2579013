//! Configuration structures for pacing, providers and storage.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from storyboard.toml)
//! - User overrides (~/.config/storyboard/storyboard.toml or ./storyboard.toml)
//! - Environment overrides (`STORYBOARD_PACING__ADAPTIVE=true`)
//!
//! Credentials are never read from these files; the provider key comes from
//! the environment.

use crate::INTER_REQUEST_DELAY;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use storyboard_error::{ConfigError, StoryboardError, StoryboardResult};
use tracing::{debug, instrument};

/// Pacing between consecutive renders of one batch.
///
/// # Example
///
/// ```toml
/// [pacing]
/// inter_request_delay_ms = 3000
/// adaptive = true
/// max_delay_ms = 30000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay before every render except the first, in milliseconds
    pub inter_request_delay_ms: u64,
    /// Back off exponentially after rate-limited renders
    pub adaptive: bool,
    /// Upper bound for the adaptive delay, in milliseconds
    pub max_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_request_delay_ms: INTER_REQUEST_DELAY.as_millis() as u64,
            adaptive: false,
            max_delay_ms: 30_000,
        }
    }
}

/// Upstream provider settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// REST endpoint root
    pub base_url: String,
    /// Model used for scene analysis and prompt repair
    pub text_model: String,
    /// Model used for image rendering
    pub image_model: String,
    /// Style directive prepended to every image prompt
    pub house_style: String,
    /// Requests per minute across all calls (None = unlimited)
    pub rpm: Option<u32>,
    /// Maximum concurrent requests (None = unlimited)
    pub max_concurrent: Option<u32>,
    /// Override the retry count derived from the error kind
    pub max_retries: Option<usize>,
    /// Override the initial retry backoff derived from the error kind
    pub retry_backoff_ms: Option<u64>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            house_style: String::new(),
            rpm: None,
            max_concurrent: None,
            max_retries: None,
            retry_backoff_ms: None,
            timeout_secs: 120,
        }
    }
}

/// Where history and exported images live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// History snapshot file; defaults to the platform data directory
    pub history_path: Option<PathBuf>,
    /// Default directory for downloaded images
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: None,
            export_dir: PathBuf::from("./storyboard_exports"),
        }
    }
}

impl StorageConfig {
    /// Resolved history file location.
    ///
    /// Uses `history_path` when set, otherwise
    /// `<data_dir>/storyboard/history.json`, falling back to the current
    /// directory on platforms without a data directory.
    pub fn resolved_history_path(&self) -> PathBuf {
        if let Some(path) = &self.history_path {
            return path.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("storyboard").join("history.json"))
            .unwrap_or_else(|| PathBuf::from("storyboard_history.json"))
    }
}

/// Top-level storyboard configuration.
///
/// # Example
///
/// ```no_run
/// use storyboard_rate_limit::StoryboardConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryboardConfig::load()?;
/// assert_eq!(config.pacing.inter_request_delay_ms, 3000);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StoryboardConfig {
    /// Inter-request pacing
    pub pacing: PacingConfig,
    /// Provider settings
    pub provider: ProviderConfig,
    /// Persistence settings
    pub storage: StorageConfig,
}

impl StoryboardConfig {
    /// Load configuration from a single file.
    ///
    /// Values missing from the file take their built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StoryboardResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: env > current dir > home dir > bundled default.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> StoryboardResult<Self> {
        Self::load_with_override(None)
    }

    /// Like [`StoryboardConfig::load`], with an extra required file layered
    /// above the user files (the CLI's `--config`).
    #[instrument]
    pub fn load_with_override(extra: Option<PathBuf>) -> StoryboardResult<Self> {
        debug!("Loading configuration with precedence: env > explicit > current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../storyboard.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyboard/storyboard.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyboard").required(false));

        if let Some(path) = extra {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("STORYBOARD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StoryboardError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}
