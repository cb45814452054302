//! Backend API client: request shaping, cursor pagination, normalization and
//! the player directory.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::index::{load_static_index, search_index, IndexStatus, PlayerIndex, PlayerIndexCell};
use crate::model::{
    MarketOverview24h, MostTraded24h, Page, PlayerIndexEntry, PlayerProfile, Rarity, Sale,
    TopAuctions24h, TxType,
};
use crate::normalize::{normalize_sale, player_from_pool_row, players_from_search_response};
use crate::pagination::CursorWalk;
use crate::transport::{ApiError, ApiTransport, HttpTransport};

pub const DEFAULT_MOST_TRADED_LIMIT: usize = 8;

/// Options for the `token_prices` endpoint. Absent values are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub tx_type: Option<TxType>,
    pub cursor: Option<String>,
    /// Page size; the configured `price_page_size` when `None`.
    pub limit: Option<u32>,
}

pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    config: ApiConfig,
    index: PlayerIndexCell,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn ApiTransport>, config: ApiConfig) -> Self {
        Self {
            transport,
            config,
            index: PlayerIndexCell::default(),
        }
    }

    /// Client over HTTP using the configured base URL and token.
    pub fn from_config(config: ApiConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(Arc::new(transport), config))
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_configured()
    }

    pub fn index_status(&self) -> IndexStatus {
        self.index.status()
    }

    pub async fn fetch_token_prices(
        &self,
        player_slug: Option<&str>,
        rarity: Option<Rarity>,
        options: &PriceQuery,
    ) -> Result<Page<Value>, ApiError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(slug) = player_slug {
            query.push(("player_slug", slug.to_string()));
        }
        if let Some(rarity) = rarity {
            query.push(("rarity", rarity.as_str().to_string()));
        }
        if let Some(from) = &options.from {
            query.push(("from", from.clone()));
        }
        if let Some(to) = &options.to {
            query.push(("to", to.clone()));
        }
        if let Some(tx_type) = options.tx_type {
            query.push(("tx_type", tx_type.as_str().to_string()));
        }
        if let Some(cursor) = &options.cursor {
            query.push(("cursor", cursor.clone()));
        }
        let limit = options.limit.unwrap_or(self.config.price_page_size);
        query.push(("limit", limit.to_string()));

        get_typed(
            self.transport.as_ref(),
            endpoint(&self.config, &["token_prices"]),
            &query,
        )
        .await
    }

    /// Every sale for the selection, oldest first, ETH price strictly positive.
    ///
    /// Pages are requested one after another, each with the cursor returned by
    /// the previous page.
    pub async fn get_player_price_history(
        &self,
        player_slug: Option<&str>,
        rarity: Option<Rarity>,
        options: &PriceQuery,
    ) -> Result<Vec<Sale>, ApiError> {
        let mut walk = CursorWalk::new(self.config.max_pages);
        let mut rows: Vec<Value> = Vec::new();
        let mut page_options = options.clone();

        while !walk.is_finished() {
            if let Some(cursor) = walk.begin_page()? {
                page_options.cursor = Some(cursor);
            }
            let page = self
                .fetch_token_prices(player_slug, rarity, &page_options)
                .await?;
            debug!(
                component = "api_client",
                event = "api.paginate.page",
                endpoint = "token_prices",
                page = walk.pages(),
                rows = page.rows.len(),
                has_more = page.has_more
            );
            rows.extend(page.rows);
            walk.advance(page.has_more, page.next_cursor)?;
        }

        let mut sales: Vec<Sale> = rows
            .iter()
            .map(normalize_sale)
            .filter(Sale::has_positive_eth)
            .collect();
        sales.reverse();

        info!(
            component = "api_client",
            event = "api.paginate.done",
            endpoint = "token_prices",
            player_slug = player_slug.unwrap_or_default(),
            rarity = rarity.map(Rarity::as_str).unwrap_or_default(),
            pages = walk.pages(),
            raw_rows = rows.len(),
            sales = sales.len()
        );

        Ok(sales)
    }

    /// Best-effort player search; never fails.
    ///
    /// A ready index is searched locally. Otherwise the backend search endpoint
    /// answers, or the static dataset when no backend is configured.
    pub async fn search_players(&self, query: &str) -> Vec<PlayerIndexEntry> {
        if query.is_empty() {
            return Vec::new();
        }
        let limit = self.config.search_limit;

        if let Some(index) = self.index.ready() {
            return search_index(&index, query, limit);
        }

        if !self.is_configured() {
            return match self.get_player_index().await {
                Ok(index) => search_index(&index, query, limit),
                Err(err) => {
                    warn!(
                        component = "api_client",
                        event = "search.degraded.index",
                        error = %err
                    );
                    Vec::new()
                }
            };
        }

        let path = endpoint(&self.config, &["players"]);
        match self
            .transport
            .get_json(&path, &[("q", query.to_string())])
            .await
        {
            Ok(body) => {
                players_from_search_response(&body, self.config.search_domestic_only, limit)
            }
            Err(err) => {
                warn!(
                    component = "api_client",
                    event = "search.degraded.transport",
                    error = %err
                );
                Vec::new()
            }
        }
    }

    /// The session's player directory, built at most once at a time.
    pub async fn get_player_index(&self) -> Result<PlayerIndex, ApiError> {
        let transport = Arc::clone(&self.transport);
        let config = self.config.clone();
        self.index
            .get_or_build(move || build_player_index(transport, config))
            .await
    }

    pub async fn fetch_market_overview_24h(&self) -> Result<MarketOverview24h, ApiError> {
        get_typed(
            self.transport.as_ref(),
            endpoint(&self.config, &["market_overview_24h"]),
            &[],
        )
        .await
    }

    pub async fn fetch_top_auctions_24h(&self) -> Result<TopAuctions24h, ApiError> {
        get_typed(
            self.transport.as_ref(),
            endpoint(&self.config, &["top_auctions_24h"]),
            &[],
        )
        .await
    }

    pub async fn fetch_most_traded_24h(
        &self,
        limit: Option<usize>,
    ) -> Result<MostTraded24h, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_MOST_TRADED_LIMIT);
        get_typed(
            self.transport.as_ref(),
            endpoint(&self.config, &["most_traded_24h"]),
            &[("limit", limit.to_string())],
        )
        .await
    }

    pub async fn fetch_player(&self, slug: &str) -> Result<PlayerProfile, ApiError> {
        get_typed(
            self.transport.as_ref(),
            endpoint(&self.config, &["player", slug]),
            &[],
        )
        .await
    }
}

fn endpoint(config: &ApiConfig, tail: &[&str]) -> Vec<String> {
    let mut path = config.prefix_segments();
    path.extend(tail.iter().map(|segment| segment.to_string()));
    path
}

async fn get_typed<T: DeserializeOwned>(
    transport: &dyn ApiTransport,
    path: Vec<String>,
    query: &[(&str, String)],
) -> Result<T, ApiError> {
    let body = transport.get_json(&path, query).await?;
    serde_json::from_value(body).map_err(|err| ApiError::Decode(err.to_string()))
}

async fn build_player_index(
    transport: Arc<dyn ApiTransport>,
    config: ApiConfig,
) -> Result<Vec<PlayerIndexEntry>, ApiError> {
    if !transport.is_configured() {
        let path = config
            .player_index_path
            .as_deref()
            .ok_or(ApiError::NotConfigured)?;
        let entries = load_static_index(path).await?;
        debug!(
            component = "player_index",
            event = "player_index.static.loaded",
            path = %path.display(),
            entries = entries.len()
        );
        return Ok(entries);
    }

    let path = endpoint(&config, &["player_pool"]);
    let mut walk = CursorWalk::new(config.max_pages);
    let mut entries: Vec<PlayerIndexEntry> = Vec::new();

    while !walk.is_finished() {
        let mut query = Vec::with_capacity(2);
        if let Some(cursor) = walk.begin_page()? {
            query.push(("cursor", cursor));
        }
        query.push(("limit", config.player_pool_page_size.to_string()));

        let page: Page<Value> = get_typed(transport.as_ref(), path.clone(), &query).await?;
        debug!(
            component = "api_client",
            event = "api.paginate.page",
            endpoint = "player_pool",
            page = walk.pages(),
            rows = page.rows.len(),
            has_more = page.has_more
        );
        entries.extend(page.rows.iter().filter_map(player_from_pool_row));
        walk.advance(page.has_more, page.next_cursor)?;
    }

    info!(
        component = "api_client",
        event = "api.paginate.done",
        endpoint = "player_pool",
        pages = walk.pages(),
        entries = entries.len()
    );

    Ok(entries)
}
