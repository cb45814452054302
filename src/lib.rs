//! Dynasty card-price dashboard core.
//!
//! - backend API client with cursor pagination and sale normalization
//! - single-flight player directory with local search
//! - client-side price-view slicing, season rules and summary stats
//! - per-session sale cache with typed view actions
//! - axum routes serving the home and player pages as JSON

mod client;
mod config;
mod dashboard;
mod display;
mod filter;
mod index;
mod model;
mod normalize;
mod observability;
mod pagination;
mod season;
mod session;
mod stats;
mod transport;
mod view;

pub use client::{ApiClient, PriceQuery, DEFAULT_MOST_TRADED_LIMIT};
pub use config::{api_config_from_env, timezone_from_env, ApiConfig, DEFAULT_API_PREFIX};
pub use dashboard::{
    dashboard_router, home_snapshot, DashboardError, HomeSnapshot, Panel, PlayerQuery, SearchQuery,
};
pub use display::{
    display_or_dash, format_currency_value, slug_to_display_name, truncate_label, PLACEHOLDER,
};
pub use filter::{
    filter_by_collection, filter_by_time_range, filter_by_tx_type, filter_sales,
    parse_collection_filter, parse_time_range, parse_tx_type_filter, CollectionFilter, SaleFilters,
    TimeRange, TxTypeFilter, ALL_TIME_RANGES,
};
pub use index::{load_static_index, search_index, IndexStatus, PlayerIndex, PlayerIndexCell};
pub use model::{
    parse_currency, parse_rarity, parse_tx_type, Currency, MarketOverview24h, MostTraded24h,
    MostTradedPlayer, Page, ParseError, PlayerIndexEntry, PlayerProfile, Prices, Rarity, Sale,
    TopAuction, TopAuctions24h, TxType, ALL_RARITIES,
};
pub use normalize::{
    normalize_sale, player_from_pool_row, player_from_search_row, player_from_static_row,
    players_from_search_response, wei_to_eth, WEI_PER_ETH,
};
pub use observability::{
    init_logging, log_app_bind, log_app_start, log_source_selected, logging_config_from,
    logging_config_from_env, IgnoredSetting, LogFormat, LoggingConfig, LoggingInitError,
};
pub use season::{format_season_year, is_domestic_team, is_in_season, DOMESTIC_TEAM_NAMES};
pub use session::{
    DashboardSession, LoadOutcome, PriceKey, SelectionTicket, SessionClock, ViewAction, ViewUpdate,
};
pub use stats::{summarize_sales, SaleStats};
pub use transport::{ApiError, ApiTransport, HttpTransport};
pub use view::{
    build_player_view, AppliedFilters, PlayerPriceView, SalesTableRow, ViewSelection,
    PARTY_LABEL_MAX_CHARS, SALES_TABLE_ROWS,
};
