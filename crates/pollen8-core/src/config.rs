use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::validation::{
    INVITE_CODE_MAX_LEN, INVITE_CODE_MIN_LEN, MAX_CLICK_WINDOW_DAYS, MAX_GROWTH_WINDOW_DAYS,
};
use crate::CONNECTION_VALUE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsConfig {
    /// Weight applied to each connection when computing network value
    #[serde(default = "AnalyticsConfig::default_connection_value")]
    pub connection_value: f64,
    /// Look-back window for the growth rate in the network summary
    #[serde(default = "AnalyticsConfig::default_growth_window_days")]
    pub growth_window_days: u32,
    /// Number of industries reported in the summary
    #[serde(default = "AnalyticsConfig::default_top_industries")]
    pub top_industries: usize,
}

impl AnalyticsConfig {
    fn default_connection_value() -> f64 {
        CONNECTION_VALUE
    }

    fn default_growth_window_days() -> u32 {
        30
    }

    fn default_top_industries() -> usize {
        5
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            connection_value: Self::default_connection_value(),
            growth_window_days: Self::default_growth_window_days(),
            top_industries: Self::default_top_industries(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InviteConfig {
    #[serde(default = "InviteConfig::default_code_length")]
    pub code_length: usize,
    /// Days covered by the invite click trend
    #[serde(default = "InviteConfig::default_trend_window_days")]
    pub trend_window_days: u32,
}

impl InviteConfig {
    fn default_code_length() -> usize {
        8
    }

    fn default_trend_window_days() -> u32 {
        7
    }
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            code_length: Self::default_code_length(),
            trend_window_days: Self::default_trend_window_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub invites: InviteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            analytics: AnalyticsConfig::default(),
            invites: InviteConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    pub fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        let value = self.analytics.connection_value;
        anyhow::ensure!(
            value.is_finite() && value >= 0.0,
            "analytics.connection_value must be a finite, non-negative number"
        );
        anyhow::ensure!(
            (1..=MAX_GROWTH_WINDOW_DAYS).contains(&self.analytics.growth_window_days),
            "analytics.growth_window_days must be 1..={}",
            MAX_GROWTH_WINDOW_DAYS
        );
        anyhow::ensure!(
            self.analytics.top_industries > 0,
            "analytics.top_industries must be > 0"
        );
        anyhow::ensure!(
            (INVITE_CODE_MIN_LEN..=INVITE_CODE_MAX_LEN).contains(&self.invites.code_length),
            "invites.code_length must be {}..={}",
            INVITE_CODE_MIN_LEN,
            INVITE_CODE_MAX_LEN
        );
        anyhow::ensure!(
            (1..=MAX_CLICK_WINDOW_DAYS).contains(&self.invites.trend_window_days),
            "invites.trend_window_days must be 1..={}",
            MAX_CLICK_WINDOW_DAYS
        );
        anyhow::ensure!(
            !self.logging.level.trim().is_empty(),
            "logging.level cannot be empty"
        );
        Ok(())
    }
}

/// Loads layered settings; holds no global state, callers pass the result on.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings: Settings,
    config_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_dir: Option<PathBuf>, env_override: Option<String>) -> Result<Self> {
        let env_name = env_override.unwrap_or_else(Settings::default_env);
        let config_dir = Self::get_config_dir(config_dir);
        let settings = Self::load_from_sources(&config_dir, &env_name)?;
        settings.validate()?;
        Ok(Self {
            settings,
            config_dir,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.pollen8/
    /// 2. ./config/
    /// 3. Current directory
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".pollen8");
            if user_dir.exists() {
                info!("Using config directory: {:?}", user_dir);
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn get_config_dir(custom_path: Option<PathBuf>) -> PathBuf {
        custom_path.unwrap_or_else(Self::default_config_dir)
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.yaml")).required(false))
            .add_source(cfg::File::from(config_dir.join("default.json")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.yaml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("POLLEN8").separator("__"))
            .set_override("env", env_name)
            .context("setting env override")?
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        info!(env = env_name, dir = ?config_dir, "Configuration loaded");
        Ok(settings)
    }

    pub fn to_toml(settings: &Settings) -> Result<String> {
        toml::to_string_pretty(settings).context("serializing settings to TOML")
    }

    pub fn schema() -> Result<String> {
        let schema = schemars::schema_for!(Settings);
        serde_json::to_string_pretty(&schema).context("serializing settings schema")
    }
}
