//! HTTP routes serving the home and player pages as JSON.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::client::ApiClient;
use crate::filter::{parse_collection_filter, parse_time_range, parse_tx_type_filter};
use crate::index::IndexStatus;
use crate::model::{
    parse_currency, parse_rarity, MarketOverview24h, MostTraded24h, ParseError, PlayerIndexEntry,
    PlayerProfile, TopAuctions24h,
};
use crate::session::DashboardSession;
use crate::transport::ApiError;
use crate::view::{PlayerPriceView, ViewSelection};

/// One independently loaded section of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Panel<T> {
    Ok { data: T },
    Error { message: String },
}

impl<T> From<Result<T, ApiError>> for Panel<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Panel::Ok { data },
            Err(err) => Panel::Error {
                message: err.to_string(),
            },
        }
    }
}

impl<T> Panel<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, Panel::Ok { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeSnapshot {
    /// Whether a backend is configured; otherwise only the static directory is used.
    pub live: bool,
    pub index_status: IndexStatus,
    pub player_count: Panel<usize>,
    pub market_overview: Panel<MarketOverview24h>,
    pub top_auctions: Panel<TopAuctions24h>,
    pub most_traded: Panel<MostTraded24h>,
}

/// Loads every home panel concurrently; a failing panel does not affect the others.
pub async fn home_snapshot(client: &ApiClient) -> HomeSnapshot {
    let live = client.is_configured();

    let (player_count, market_overview, top_auctions, most_traded) = if live {
        let (index, overview, auctions, traded) = tokio::join!(
            client.get_player_index(),
            client.fetch_market_overview_24h(),
            client.fetch_top_auctions_24h(),
            client.fetch_most_traded_24h(None),
        );
        (
            index.map(|entries| entries.len()),
            overview,
            auctions,
            traded,
        )
    } else {
        (
            client.get_player_index().await.map(|entries| entries.len()),
            Err(ApiError::NotConfigured),
            Err(ApiError::NotConfigured),
            Err(ApiError::NotConfigured),
        )
    };

    HomeSnapshot {
        live,
        index_status: client.index_status(),
        player_count: player_count.into(),
        market_overview: market_overview.into(),
        top_auctions: top_auctions.into(),
        most_traded: most_traded.into(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerQuery {
    pub rarity: Option<String>,
    pub range: Option<String>,
    pub tx_type: Option<String>,
    pub collection: Option<String>,
    pub currency: Option<String>,
}

impl PlayerQuery {
    /// Starts from the default page selection and overrides what is given.
    pub fn selection(&self) -> Result<ViewSelection, ParseError> {
        let mut selection = ViewSelection::default();
        if let Some(raw) = self.rarity.as_deref() {
            selection.rarity = parse_rarity(raw)?;
        }
        if let Some(raw) = self.currency.as_deref() {
            selection.currency = parse_currency(raw)?;
        }
        if let Some(raw) = self.range.as_deref() {
            selection.filters.time_range = parse_time_range(raw)?;
        }
        if let Some(raw) = self.tx_type.as_deref() {
            selection.filters.tx_type = parse_tx_type_filter(raw)?;
        }
        if let Some(raw) = self.collection.as_deref() {
            selection.filters.collection = parse_collection_filter(raw)?;
        }
        Ok(selection)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// JSON `{"error": "..."}` with a status code.
#[derive(Debug)]
pub struct DashboardError {
    pub status: StatusCode,
    pub message: String,
}

impl DashboardError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.into(),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ParseError> for DashboardError {
    fn from(err: ParseError) -> Self {
        DashboardError::bad_request(err.to_string())
    }
}

impl From<ApiError> for DashboardError {
    fn from(err: ApiError) -> Self {
        warn!(
            component = "dashboard",
            event = "http.upstream_error",
            error = %err
        );
        match err {
            ApiError::NotConfigured => DashboardError::unavailable(err.to_string()),
            other => DashboardError::bad_gateway(other.to_string()),
        }
    }
}

pub fn dashboard_router(session: Arc<DashboardSession>) -> Router {
    Router::new()
        .route("/dashboard/home", get(get_home))
        .route("/dashboard/player/{slug}", get(get_player))
        .route("/dashboard/search", get(get_search))
        .route("/dashboard/profile/{slug}", get(get_profile))
        .with_state(DashboardAppState { session })
}

#[derive(Clone)]
struct DashboardAppState {
    session: Arc<DashboardSession>,
}

async fn get_home(State(state): State<DashboardAppState>) -> Json<HomeSnapshot> {
    let snapshot = home_snapshot(state.session.client()).await;
    info!(
        component = "dashboard",
        event = "http.home.request",
        live = snapshot.live,
        market_overview_ok = snapshot.market_overview.is_ok(),
        top_auctions_ok = snapshot.top_auctions.is_ok(),
        most_traded_ok = snapshot.most_traded.is_ok()
    );
    Json(snapshot)
}

async fn get_player(
    State(state): State<DashboardAppState>,
    Path(slug): Path<String>,
    Query(query): Query<PlayerQuery>,
) -> Result<Json<PlayerPriceView>, DashboardError> {
    let selection = query.selection()?;
    info!(
        component = "dashboard",
        event = "http.player.request",
        slug = %slug,
        rarity = selection.rarity.as_str(),
        currency = selection.currency.as_str(),
        range = selection.filters.time_range.as_str(),
        tx_type = selection.filters.tx_type.as_str(),
        collection = selection.filters.collection.as_str()
    );

    let view = state.session.player_view(&slug, &selection).await?;
    Ok(Json(view))
}

async fn get_search(
    State(state): State<DashboardAppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Vec<PlayerIndexEntry>> {
    let q = query.q.unwrap_or_default();
    Json(state.session.client().search_players(&q).await)
}

async fn get_profile(
    State(state): State<DashboardAppState>,
    Path(slug): Path<String>,
) -> Result<Json<PlayerProfile>, DashboardError> {
    let profile = state.session.client().fetch_player(&slug).await?;
    Ok(Json(profile))
}
