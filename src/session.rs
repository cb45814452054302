//! Per-session dashboard state: the sale cache, the open player page and the
//! typed actions that change it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::client::{ApiClient, PriceQuery};
use crate::filter::{CollectionFilter, TimeRange, TxTypeFilter};
use crate::model::{Currency, Rarity, Sale};
use crate::transport::ApiError;
use crate::view::{build_player_view, PlayerPriceView, ViewSelection};

/// Source of "today" for range and season filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClock {
    System(Tz),
    Fixed(NaiveDate),
}

impl SessionClock {
    pub fn today(&self) -> NaiveDate {
        match self {
            SessionClock::System(tz) => Utc::now().with_timezone(tz).date_naive(),
            SessionClock::Fixed(date) => *date,
        }
    }
}

/// Cache key: one unfiltered sale list per player and rarity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub slug: String,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    OpenPlayer(String),
    SelectRarity(Rarity),
    SelectCurrency(Currency),
    SelectTimeRange(TimeRange),
    SelectTxType(TxTypeFilter),
    SelectCollection(CollectionFilter),
}

/// Identifies the selection a fetch was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTicket {
    generation: u64,
    key: PriceKey,
}

impl SelectionTicket {
    pub fn key(&self) -> &PriceKey {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewUpdate {
    /// Cached data covers the new selection; call `current_view`.
    Reslice,
    /// Sales must be loaded first; pass the ticket to `load`.
    Fetch(SelectionTicket),
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Applied(PlayerPriceView),
    /// The selection moved on while loading; the result was cached only.
    Stale,
}

#[derive(Debug, Default)]
struct SelectionState {
    slug: Option<String>,
    view: ViewSelection,
    generation: u64,
}

pub struct DashboardSession {
    client: Arc<ApiClient>,
    clock: SessionClock,
    price_cache: Mutex<HashMap<PriceKey, Arc<Vec<Sale>>>>,
    selection: Mutex<SelectionState>,
}

impl DashboardSession {
    pub fn new(client: Arc<ApiClient>, clock: SessionClock) -> Self {
        Self {
            client,
            clock,
            price_cache: Mutex::new(HashMap::new()),
            selection: Mutex::new(SelectionState::default()),
        }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn selection(&self) -> (Option<String>, ViewSelection) {
        let state = self.selection.lock().expect("selection lock should not be poisoned");
        (state.slug.clone(), state.view)
    }

    pub fn cached_sales(&self, key: &PriceKey) -> Option<Arc<Vec<Sale>>> {
        self.price_cache
            .lock()
            .expect("price cache lock should not be poisoned")
            .get(key)
            .cloned()
    }

    pub fn dispatch(&self, action: ViewAction) -> ViewUpdate {
        let mut state = self.selection.lock().expect("selection lock should not be poisoned");

        match action {
            ViewAction::OpenPlayer(slug) => state.slug = Some(slug),
            ViewAction::SelectRarity(rarity) => {
                if state.view.rarity == rarity {
                    return ViewUpdate::Idle;
                }
                state.view.rarity = rarity;
            }
            ViewAction::SelectCurrency(currency) => {
                let changed = state.view.currency != currency;
                state.view.currency = currency;
                return reslice_if(changed && state.slug.is_some());
            }
            ViewAction::SelectTimeRange(range) => {
                let changed = state.view.filters.time_range != range;
                state.view.filters.time_range = range;
                return reslice_if(changed && state.slug.is_some());
            }
            ViewAction::SelectTxType(tx_type) => {
                let changed = state.view.filters.tx_type != tx_type;
                state.view.filters.tx_type = tx_type;
                return reslice_if(changed && state.slug.is_some());
            }
            ViewAction::SelectCollection(collection) => {
                let changed = state.view.filters.collection != collection;
                state.view.filters.collection = collection;
                return reslice_if(changed && state.slug.is_some());
            }
        }

        state.generation += 1;
        let Some(slug) = state.slug.clone() else {
            return ViewUpdate::Idle;
        };
        let key = PriceKey {
            slug,
            rarity: state.view.rarity,
        };
        if self.cached_sales(&key).is_some() {
            return ViewUpdate::Reslice;
        }
        ViewUpdate::Fetch(SelectionTicket {
            generation: state.generation,
            key,
        })
    }

    /// Loads the ticket's sales. The result becomes the view only if no newer
    /// player or rarity was selected in the meantime.
    pub async fn load(&self, ticket: SelectionTicket) -> Result<LoadOutcome, ApiError> {
        let result = self.sales_for(&ticket.key.slug, ticket.key.rarity).await;

        if !self.is_current(&ticket) {
            info!(
                component = "session",
                event = "session.response.stale",
                slug = %ticket.key.slug,
                rarity = ticket.key.rarity.as_str(),
                ok = result.is_ok()
            );
            return Ok(LoadOutcome::Stale);
        }

        let sales = result?;
        let view = self.selection().1;
        Ok(LoadOutcome::Applied(build_player_view(
            &ticket.key.slug,
            &view,
            &sales,
            self.today(),
        )))
    }

    /// Cache-through history fetch. Only successful loads are cached.
    pub async fn sales_for(&self, slug: &str, rarity: Rarity) -> Result<Arc<Vec<Sale>>, ApiError> {
        let key = PriceKey {
            slug: slug.to_string(),
            rarity,
        };
        if let Some(sales) = self.cached_sales(&key) {
            debug!(component = "session", event = "session.cache.hit", slug, rarity = rarity.as_str());
            return Ok(sales);
        }

        let sales = self
            .client
            .get_player_price_history(Some(slug), Some(rarity), &PriceQuery::default())
            .await?;

        let mut cache = self
            .price_cache
            .lock()
            .expect("price cache lock should not be poisoned");
        Ok(Arc::clone(cache.entry(key).or_insert_with(|| Arc::new(sales))))
    }

    /// View for any player and selection, independent of the session's own page.
    pub async fn player_view(
        &self,
        slug: &str,
        selection: &ViewSelection,
    ) -> Result<PlayerPriceView, ApiError> {
        let sales = self.sales_for(slug, selection.rarity).await?;
        Ok(build_player_view(slug, selection, &sales, self.today()))
    }

    /// The open page re-derived from cache, `None` until its sales are loaded.
    pub fn current_view(&self) -> Option<PlayerPriceView> {
        let (slug, view) = self.selection();
        let slug = slug?;
        let sales = self.cached_sales(&PriceKey {
            slug: slug.clone(),
            rarity: view.rarity,
        })?;
        Some(build_player_view(&slug, &view, &sales, self.today()))
    }

    fn is_current(&self, ticket: &SelectionTicket) -> bool {
        let state = self.selection.lock().expect("selection lock should not be poisoned");
        state.generation == ticket.generation
    }
}

fn reslice_if(changed: bool) -> ViewUpdate {
    if changed {
        ViewUpdate::Reslice
    } else {
        ViewUpdate::Idle
    }
}
