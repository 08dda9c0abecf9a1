//! ---
//! eco_section: "01-core-functionality"
//! eco_subsection: "module"
//! eco_type: "source"
//! eco_scope: "code"
//! eco_description: "Shared primitives and utilities for the EcoSphere workspace."
//! eco_version: "v0.1.0"
//! eco_owner: "tbd"
//! ---
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use tracing::debug;
use url::Url;

use crate::logging::LogFormat;

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_archetype() -> String {
    "Campus".to_owned()
}

fn default_history_hours() -> u32 {
    24
}

fn default_forecast_horizon() -> u32 {
    48
}

fn default_insights_enabled() -> bool {
    true
}

fn default_insights_endpoint() -> Url {
    Url::parse("https://generativelanguage.googleapis.com/").expect("valid default endpoint")
}

fn default_insights_model() -> String {
    "gemini-3-flash-preview".to_owned()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_owned()
}

fn default_insights_timeout() -> Duration {
    Duration::from_secs(20)
}

fn default_base_score() -> u32 {
    68
}

fn default_api_listen() -> SocketAddr {
    "127.0.0.1:8080".parse().expect("valid default api address")
}

/// Primary configuration object for EcoSphere tooling.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub insights: InsightsConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &'static str = "ECOSPHERE_CONFIG";

    /// Load configuration from disk, respecting the `ECOSPHERE_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        if let Some(path) = Self::env_override() {
            return Self::from_path(&path);
        }
        for candidate in candidates {
            if candidate.as_ref().exists() {
                return Self::from_path(candidate.as_ref());
            }
        }
        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    /// Like [`AppConfig::load`], but falls back to defaults when no candidate exists.
    ///
    /// An explicit `ECOSPHERE_CONFIG` path must still exist and parse.
    pub fn load_or_default<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Some(path) = Self::env_override() {
            let config = Self::from_path(&path)?;
            return Ok(LoadedAppConfig {
                config,
                source: Some(path),
            });
        }
        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }
        debug!("no configuration file found, using defaults");
        Ok(LoadedAppConfig {
            config: Self::default(),
            source: None,
        })
    }

    /// Load one explicit file, ignoring `ECOSPHERE_CONFIG` and the candidate list.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_path(path.as_ref())
    }

    fn env_override() -> Option<PathBuf> {
        std::env::var(Self::ENV_CONFIG_PATH)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<AppConfig>()
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        self.insights.validate()?;
        if self.dashboard.base_score > 100 {
            return Err(anyhow!(
                "dashboard.base_score must be within 0..=100, got {}",
                self.dashboard.base_score
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

/// Telemetry simulator and forecast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Building archetype name (`Campus`, `Office`, `Residential`, `Hospital`).
    #[serde(default = "default_archetype")]
    pub archetype: String,
    #[serde(default = "default_history_hours")]
    pub history_hours: u32,
    #[serde(default = "default_forecast_horizon")]
    pub forecast_horizon: u32,
    /// Fixed offset used to derive the hour of day for the diurnal cycle.
    #[serde(default)]
    pub utc_offset_hours: i32,
    /// Seed for the pseudo-random source; entropy seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            archetype: default_archetype(),
            history_hours: default_history_hours(),
            forecast_horizon: default_forecast_horizon(),
            utc_offset_hours: 0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.forecast_horizon == 0 {
            return Err(anyhow!("simulation.forecast_horizon must be at least 1"));
        }
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(anyhow!(
                "simulation.utc_offset_hours must be within -12..=14, got {}",
                self.utc_offset_hours
            ));
        }
        Ok(())
    }
}

/// Settings for the text-generation collaborator.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    #[serde(default = "default_insights_enabled")]
    pub enabled: bool,
    #[serde(default = "default_insights_endpoint")]
    pub endpoint: Url,
    #[serde(default = "default_insights_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_insights_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub timeout: Duration,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            enabled: default_insights_enabled(),
            endpoint: default_insights_endpoint(),
            model: default_insights_model(),
            api_key_env: default_api_key_env(),
            timeout: default_insights_timeout(),
        }
    }
}

impl InsightsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(anyhow!("insights.timeout must be greater than zero"));
        }
        if self.model.trim().is_empty() {
            return Err(anyhow!("insights.model must not be empty"));
        }
        Ok(())
    }

    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_base_score")]
    pub base_score: u32,
    #[serde(default)]
    pub institution: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
            institution: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_listen")]
    pub listen: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            listen: default_api_listen(),
        }
    }
}
