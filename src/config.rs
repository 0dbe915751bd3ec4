use chrono::FixedOffset;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Minutes east of UTC for the civil-day boundaries used by the reports.
/// 390 minutes is UTC+6:30 (Myanmar time), the market the source system
/// operates in.
const DEFAULT_REPORT_OFFSET_MINUTES: i32 = 390;

#[derive(Debug, thiserror::Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Fixed offset, in minutes east of UTC, defining the local civil day
    /// for report windowing.
    #[serde(default = "default_report_offset")]
    pub report_utc_offset_minutes: i32,
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_report_offset() -> i32 {
    DEFAULT_REPORT_OFFSET_MINUTES
}

impl AppConfig {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Sanity checks that serde cannot express. Real-world offsets sit in
    /// [-12h, +14h].
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if !(-720..=840).contains(&self.report_utc_offset_minutes) {
            return Err(AppConfigError::Invalid(format!(
                "report_utc_offset_minutes must be between -720 and 840, got {}",
                self.report_utc_offset_minutes
            )));
        }
        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// The report timezone as a chrono offset. The validated range keeps
    /// this constructor infallible.
    pub fn report_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.report_utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("parceltrack_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration.
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. config/default.toml, then config/{env}.toml (both optional)
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("host", "0.0.0.0")?
        .set_default("port", 8080)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("report_utc_offset_minutes", DEFAULT_REPORT_OFFSET_MINUTES as i64)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}
