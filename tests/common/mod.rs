//! Shared fixtures for the integration tests: an in-memory backend that
//! replays scripted responses per endpoint and records every request.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use dynasty::{ApiClient, ApiConfig, ApiError, ApiTransport, DashboardSession, SessionClock};
use serde_json::{json, Value};

pub const TOKEN_PRICES: &str = "api/sorare/token_prices";
pub const PLAYER_POOL: &str = "api/sorare/player_pool";
pub const PLAYERS: &str = "api/sorare/players";
pub const MARKET_OVERVIEW: &str = "api/sorare/market_overview_24h";
pub const TOP_AUCTIONS: &str = "api/sorare/top_auctions_24h";
pub const MOST_TRADED: &str = "api/sorare/most_traded_24h";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Responses are served first-in first-out per endpoint path. An endpoint with
/// nothing left answers 404.
#[derive(Default)]
pub struct ScriptedTransport {
    unconfigured: bool,
    responses: Mutex<HashMap<String, VecDeque<Result<Value, ApiError>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    pub fn respond(&self, path: &str, body: Value) -> &Self {
        self.push(path, Ok(body))
    }

    pub fn fail(&self, path: &str, err: ApiError) -> &Self {
        self.push(path, Err(err))
    }

    fn push(&self, path: &str, response: Result<Value, ApiError>) -> &Self {
        self.responses
            .lock()
            .expect("responses lock should not be poisoned")
            .entry(path.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("requests lock should not be poisoned")
            .clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.path == path)
            .collect()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn get_json(&self, path: &[String], query: &[(&str, String)]) -> Result<Value, ApiError> {
        if self.unconfigured {
            return Err(ApiError::NotConfigured);
        }

        let path = path.join("/");
        self.requests
            .lock()
            .expect("requests lock should not be poisoned")
            .push(RecordedRequest {
                path: path.clone(),
                query: query
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.clone()))
                    .collect(),
            });

        // Let concurrently polled callers interleave with this request.
        tokio::task::yield_now().await;

        self.responses
            .lock()
            .expect("responses lock should not be poisoned")
            .get_mut(&path)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(ApiError::Status {
                    status: 404,
                    reason: "Not Found".to_string(),
                })
            })
    }
}

pub fn client_with(transport: &Arc<ScriptedTransport>) -> Arc<ApiClient> {
    client_with_config(transport, ApiConfig::with_base_url("https://backend.test"))
}

pub fn client_with_config(transport: &Arc<ScriptedTransport>, config: ApiConfig) -> Arc<ApiClient> {
    let transport: Arc<dyn ApiTransport> = Arc::clone(transport) as Arc<dyn ApiTransport>;
    Arc::new(ApiClient::new(transport, config))
}

pub fn fixed_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 4, 15).expect("valid date")
}

pub fn session_with(transport: &Arc<ScriptedTransport>) -> Arc<DashboardSession> {
    Arc::new(DashboardSession::new(
        client_with(transport),
        SessionClock::Fixed(fixed_today()),
    ))
}

/// A backend price row as returned newest-first by `token_prices`.
pub fn price_row(id: &str, occurred_at: &str, wei: &str) -> Value {
    json!({
        "token_price_id": id,
        "occurred_at": occurred_at,
        "wei": wei,
        "usd_cents": 150_000,
        "buyer_slug": "buyer-one",
        "seller_slug": "seller-one",
        "serial_number": 12,
        "supply": 1000,
        "season_year": 2025,
        "team_name": "Real Madrid",
        "tx_type": "secondary",
        "rarity_typed": "limited",
        "player_slug": "kylian-mbappe-lottin",
        "player_display_name": "Kylian Mbappé"
    })
}

pub fn page(rows: Vec<Value>, next_cursor: Option<&str>) -> Value {
    json!({
        "rows": rows,
        "has_more": next_cursor.is_some(),
        "next_cursor": next_cursor
    })
}

pub fn pool_row(slug: &str, name: &str, team: &str) -> Value {
    json!({
        "player_slug": slug,
        "player_display_name": name,
        "meta": { "team_name": team, "position": ["Forward"] }
    })
}
