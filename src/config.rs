use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calculator::DEFAULT_GRID_INTENSITY;
use crate::cli::{
    Cli, DEFAULT_CONCURRENCY, DEFAULT_OUTPUT, DEFAULT_PAGE_TIMEOUT_SECS,
    DEFAULT_RESOURCE_TIMEOUT_SECS,
};
use crate::http_client::{DEFAULT_USER_AGENT, HttpClientConfig};

pub const DEFAULT_RETENTION_DAYS: u32 = 365;

/// Runtime settings consumed by the analysis pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// Hosting runs on renewable energy, zeroing the data-center segment
    pub green_hosting: bool,
    /// Grams CO₂ per kWh
    pub grid_intensity: f64,
    pub resource_timeout_secs: u64,
    pub page_timeout_secs: u64,
    /// Days a stored report is kept. Carried for whatever persists reports;
    /// the analysis itself never reads it.
    pub retention_days: u32,
    /// Upper bound on simultaneous resource fetches
    pub concurrency: usize,
    pub requests_per_second: Option<f64>,
    pub user_agent: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            green_hosting: false,
            grid_intensity: DEFAULT_GRID_INTENSITY,
            resource_timeout_secs: DEFAULT_RESOURCE_TIMEOUT_SECS,
            page_timeout_secs: DEFAULT_PAGE_TIMEOUT_SECS,
            retention_days: DEFAULT_RETENTION_DAYS,
            concurrency: DEFAULT_CONCURRENCY,
            requests_per_second: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.grid_intensity.is_finite() || self.grid_intensity < 0.0 {
            bail!(
                "Grid intensity must be a non-negative number, got {}",
                self.grid_intensity
            );
        }
        if self.concurrency == 0 {
            bail!("Concurrency must be at least 1");
        }
        if self.resource_timeout_secs == 0 || self.page_timeout_secs == 0 {
            bail!("Timeouts must be at least 1 second");
        }
        if let Some(rps) = self.requests_per_second
            && (!rps.is_finite() || rps <= 0.0)
        {
            bail!("Rate limit must be a positive number, got {}", rps);
        }
        Ok(())
    }

    /// The page deadline is enforced by the analyzer; the client timeout is
    /// only a backstop and must not fire first
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout_secs: self.page_timeout_secs + self.resource_timeout_secs,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Output format: text or json
    pub output: Option<String>,

    /// Save report to file
    pub save: Option<String>,

    /// Hosting uses renewable energy
    pub green_hosting: Option<bool>,

    /// Grid carbon intensity in grams CO₂ per kWh
    pub grid_intensity: Option<f64>,

    /// Per-resource timeout in seconds
    pub resource_timeout: Option<u64>,

    /// Whole page timeout in seconds
    pub page_timeout: Option<u64>,

    /// Number of concurrent resource fetches
    pub concurrency: Option<usize>,

    /// Rate limit for resource requests per second
    pub rate_limit: Option<f64>,

    /// Verbose output
    pub verbose: Option<bool>,

    /// Days to keep stored reports
    pub retention_days: Option<u32>,

    /// User agent sent with every request
    pub user_agent: Option<String>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Default configuration file paths, highest priority first:
    /// the current directory, then the user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("carbonscout.{}", ext)));
            }
        }

        // XDG_CONFIG_HOME wins over ~/.config when set and non-empty
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let app_dir = config_home.join("carbonscout");
            for format in &[ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml] {
                for ext in format.extensions() {
                    paths.push(app_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Loads the explicit `--config` file, or falls back to the default paths
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(Path::new(path)),
            None => Ok(Self::from_default_paths()?.unwrap_or_default()),
        }
    }

    /// Whether debug logging was asked for, by flag or by config file.
    /// Runs before the subscriber is installed; a file that fails to load is
    /// reported later by `run`.
    pub fn verbose_requested(cli: &Cli) -> bool {
        cli.verbose
            || Self::load(cli.config.as_deref())
                .ok()
                .and_then(|config| config.verbose)
                .unwrap_or(false)
    }

    /// Merge this configuration with CLI arguments
    /// CLI arguments take precedence over config file values
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        Cli {
            url: cli.url.clone(),
            content_id: cli.content_id,
            output: if cli.output != DEFAULT_OUTPUT {
                cli.output.clone()
            } else {
                self.output.clone().unwrap_or_else(|| cli.output.clone())
            },
            save: cli.save.clone().or_else(|| self.save.clone()),
            green_hosting: if cli.green_hosting {
                cli.green_hosting
            } else {
                self.green_hosting.unwrap_or(cli.green_hosting)
            },
            grid_intensity: if cli.grid_intensity != DEFAULT_GRID_INTENSITY {
                cli.grid_intensity
            } else {
                self.grid_intensity.unwrap_or(cli.grid_intensity)
            },
            resource_timeout: if cli.resource_timeout != DEFAULT_RESOURCE_TIMEOUT_SECS {
                cli.resource_timeout
            } else {
                self.resource_timeout.unwrap_or(cli.resource_timeout)
            },
            page_timeout: if cli.page_timeout != DEFAULT_PAGE_TIMEOUT_SECS {
                cli.page_timeout
            } else {
                self.page_timeout.unwrap_or(cli.page_timeout)
            },
            concurrency: if cli.concurrency != DEFAULT_CONCURRENCY {
                cli.concurrency
            } else {
                self.concurrency.unwrap_or(cli.concurrency)
            },
            rate_limit: cli.rate_limit.or(self.rate_limit),
            verbose: if cli.verbose {
                cli.verbose
            } else {
                self.verbose.unwrap_or(cli.verbose)
            },
            config: cli.config.clone(),
        }
    }

    /// Builds the pipeline settings from merged CLI arguments plus the
    /// file-only keys
    pub fn tracker_config(&self, cli: &Cli) -> TrackerConfig {
        TrackerConfig {
            green_hosting: cli.green_hosting,
            grid_intensity: cli.grid_intensity,
            resource_timeout_secs: cli.resource_timeout,
            page_timeout_secs: cli.page_timeout,
            retention_days: self.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS),
            concurrency: cli.concurrency,
            requests_per_second: cli.rate_limit,
            user_agent: self
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        }
    }
}
