//! Backend and session configuration read from the environment.

use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::warn;

pub const DEFAULT_API_PREFIX: &str = "/api/sorare";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://backend.example.com`. `None` means the
    /// dashboard runs against the static player dataset only.
    pub base_url: Option<String>,
    pub frontend_token: Option<String>,
    pub api_prefix: String,
    pub timeout_ms: u64,
    pub price_page_size: u32,
    pub player_pool_page_size: u32,
    /// Upper bound on pages per paginated fetch; `None` follows cursors to the end.
    pub max_pages: Option<usize>,
    pub search_limit: usize,
    pub search_domestic_only: bool,
    pub player_index_path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            frontend_token: None,
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_ms: 15_000,
            price_page_size: 500,
            player_pool_page_size: 2_000,
            max_pages: None,
            search_limit: 10,
            search_domestic_only: true,
            player_index_path: None,
        }
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Path segments of the endpoint prefix (`/api/sorare` -> `["api", "sorare"]`).
    pub fn prefix_segments(&self) -> Vec<String> {
        self.api_prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub fn api_config_from_env() -> ApiConfig {
    let mut config = ApiConfig::default();

    if let Ok(url) = env::var("DYNASTY_API_URL") {
        config.base_url = normalize_base_url(&url);
    }

    if let Ok(token) = env::var("DYNASTY_FRONTEND_TOKEN") {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            config.frontend_token = Some(trimmed.to_string());
        }
    }

    if let Ok(prefix) = env::var("DYNASTY_API_PREFIX") {
        let trimmed = prefix.trim();
        if !trimmed.is_empty() {
            config.api_prefix = trimmed.to_string();
        }
    }

    if let Some(timeout_ms) = parse_env_number::<u64>("DYNASTY_TIMEOUT_MS") {
        config.timeout_ms = timeout_ms;
    }

    if let Some(size) = parse_env_number::<u32>("DYNASTY_PRICE_PAGE_SIZE").filter(|size| *size > 0) {
        config.price_page_size = size;
    }

    if let Some(size) = parse_env_number::<u32>("DYNASTY_PLAYER_POOL_PAGE_SIZE").filter(|size| *size > 0)
    {
        config.player_pool_page_size = size;
    }

    if let Some(max_pages) = parse_env_number::<usize>("DYNASTY_MAX_PAGES").filter(|pages| *pages > 0) {
        config.max_pages = Some(max_pages);
    }

    if let Ok(path) = env::var("DYNASTY_PLAYER_INDEX_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            config.player_index_path = Some(PathBuf::from(trimmed));
        }
    }

    if let Ok(raw) = env::var("DYNASTY_SEARCH_DOMESTIC_ONLY") {
        match parse_bool(&raw) {
            Some(parsed) => config.search_domestic_only = parsed,
            None => warn_invalid("DYNASTY_SEARCH_DOMESTIC_ONLY", &raw),
        }
    }

    config
}

/// Timezone that defines "today" for range and season filters. Defaults to UTC.
pub fn timezone_from_env() -> Tz {
    match env::var("DYNASTY_TIMEZONE") {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse::<Tz>().unwrap_or_else(|_| {
            warn_invalid("DYNASTY_TIMEZONE", &raw);
            Tz::UTC
        }),
        _ => Tz::UTC,
    }
}

fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn_invalid(key, &raw);
            None
        }
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub(crate) fn warn_invalid(key: &str, raw: &str) {
    warn!(
        component = "config",
        event = "config.invalid_value",
        key,
        value = raw,
        "ignoring invalid value, using default"
    );
}
