//! Logging configuration and the structured startup events of the dashboard server.

use std::env;
use std::net::SocketAddr;

use chrono_tz::Tz;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{parse_bool, warn_invalid, ApiConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

const LEVEL_KEY: &str = "DYNASTY_LOG_LEVEL";
const FORMAT_KEY: &str = "DYNASTY_LOG_FORMAT";
const TARGET_KEY: &str = "DYNASTY_LOG_TARGET";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info` or `dynasty=debug,tower=warn`.
    pub level: String,
    pub format: LogFormat,
    pub include_target: bool,
    /// Settings that did not parse and were replaced by their default.
    pub ignored: Vec<IgnoredSetting>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredSetting {
    pub key: &'static str,
    pub value: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_target: true,
            ignored: Vec::new(),
        }
    }
}

impl LoggingConfig {
    fn ignore(&mut self, key: &'static str, value: &str) {
        self.ignored.push(IgnoredSetting {
            key,
            value: value.to_string(),
        });
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("invalid log level {level:?}: {reason}")]
    InvalidLevel { level: String, reason: String },
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub fn logging_config_from_env() -> LoggingConfig {
    logging_config_from(|key| env::var(key).ok())
}

/// Builds the logging config from `DYNASTY_LOG_*` values supplied by `lookup`.
///
/// No subscriber exists yet while this runs, so rejected values are collected in
/// [`LoggingConfig::ignored`] and reported by [`log_app_start`].
pub fn logging_config_from(lookup: impl Fn(&str) -> Option<String>) -> LoggingConfig {
    let mut config = LoggingConfig::default();

    if let Some(raw) = lookup(LEVEL_KEY) {
        let level = raw.trim();
        match EnvFilter::try_new(level) {
            _ if level.is_empty() => {}
            Ok(_) => config.level = level.to_string(),
            Err(_) => config.ignore(LEVEL_KEY, &raw),
        }
    }

    if let Some(raw) = lookup(FORMAT_KEY) {
        match parse_log_format(&raw) {
            Some(format) => config.format = format,
            None => config.ignore(FORMAT_KEY, &raw),
        }
    }

    if let Some(raw) = lookup(TARGET_KEY) {
        match parse_bool(&raw) {
            Some(include_target) => config.include_target = include_target,
            None => config.ignore(TARGET_KEY, &raw),
        }
    }

    config
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(&config.level).map_err(|err| LoggingInitError::InvalidLevel {
            level: config.level.clone(),
            reason: err.to_string(),
        })?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(config.include_target)
        .with_ansi(matches!(config.format, LogFormat::Pretty));

    match config.format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Pretty => tracing::subscriber::set_global_default(builder.pretty().finish())?,
    }

    Ok(())
}

pub fn log_app_start(config: &LoggingConfig, timezone: Tz) {
    info!(
        component = "dashboard_server",
        event = "app.start",
        version = env!("CARGO_PKG_VERSION"),
        log_level = %config.level,
        log_format = ?config.format,
        include_target = config.include_target,
        timezone = %timezone
    );
    for setting in &config.ignored {
        warn_invalid(setting.key, &setting.value);
    }
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = "dashboard_server",
        event = "app.bind",
        bind_addr = %bound_addr,
        routes = "/dashboard/home,/dashboard/player/{slug},/dashboard/search,/dashboard/profile/{slug}"
    );
}

/// Records where player data comes from: `live_api` or `static_index`.
pub fn log_source_selected(source: &str, config: &ApiConfig) {
    match (config.base_url.as_deref(), config.player_index_path.as_deref()) {
        (Some(base_url), _) => info!(
            component = "dashboard_server",
            event = "source.selected",
            source,
            base_url,
            api_prefix = %config.api_prefix,
            token = config.frontend_token.is_some()
        ),
        (None, Some(path)) => info!(
            component = "dashboard_server",
            event = "source.selected",
            source,
            player_index_path = %path.display()
        ),
        (None, None) => info!(
            component = "dashboard_server",
            event = "source.selected",
            source,
            reason = "no backend url and no static player index"
        ),
    }
}

fn parse_log_format(raw: &str) -> Option<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Some(LogFormat::Json),
        "pretty" => Some(LogFormat::Pretty),
        _ => None,
    }
}
