//! Player price page, derived from a cached sale list and a selection.

use chrono::NaiveDate;
use serde::Serialize;

use crate::display::{display_or_dash, format_currency_value, slug_to_display_name, truncate_label};
use crate::filter::{CollectionFilter, SaleFilters, TimeRange, TxTypeFilter};
use crate::model::{Currency, Rarity, Sale, TxType};
use crate::stats::{summarize_sales, SaleStats};

pub const SALES_TABLE_ROWS: usize = 25;
pub const PARTY_LABEL_MAX_CHARS: usize = 25;

/// What the player page shows, independent of which player is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSelection {
    pub rarity: Rarity,
    pub currency: Currency,
    pub filters: SaleFilters,
}

impl Default for ViewSelection {
    fn default() -> Self {
        Self {
            rarity: Rarity::Limited,
            currency: Currency::Eth,
            filters: SaleFilters {
                time_range: TimeRange::ThreeMonths,
                tx_type: TxTypeFilter::All,
                collection: CollectionFilter::All,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedFilters {
    pub rarity: Rarity,
    pub currency: Currency,
    pub range: TimeRange,
    pub tx_type: &'static str,
    pub collection: CollectionFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesTableRow {
    pub date: String,
    pub price: String,
    pub buyer: String,
    pub seller: String,
    pub serial: String,
    pub season: String,
    pub tx_type: Option<TxType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerPriceView {
    pub slug: String,
    pub player_name: String,
    pub team: String,
    pub filters: AppliedFilters,
    /// Size of the unfiltered list the view was sliced from.
    pub total_cached: usize,
    pub stats: Option<SaleStats>,
    /// Filtered sales, oldest first (chart order).
    pub sales: Vec<Sale>,
    /// Most recent sales first, capped at [`SALES_TABLE_ROWS`].
    pub table: Vec<SalesTableRow>,
}

pub fn build_player_view(
    slug: &str,
    selection: &ViewSelection,
    all_sales: &[Sale],
    today: NaiveDate,
) -> PlayerPriceView {
    let sales = selection.filters.apply(all_sales, today);
    let latest_known = all_sales.iter().rev();

    let player_name = latest_known
        .clone()
        .find_map(|sale| sale.player_name.clone())
        .unwrap_or_else(|| slug_to_display_name(slug));
    let team = latest_known.clone().find_map(|sale| sale.team_name.clone());

    let table = sales
        .iter()
        .rev()
        .take(SALES_TABLE_ROWS)
        .map(|sale| table_row(sale, selection))
        .collect();

    PlayerPriceView {
        slug: slug.to_string(),
        player_name,
        team: display_or_dash(&team),
        filters: AppliedFilters {
            rarity: selection.rarity,
            currency: selection.currency,
            range: selection.filters.time_range,
            tx_type: selection.filters.tx_type.as_str(),
            collection: selection.filters.collection,
        },
        total_cached: all_sales.len(),
        stats: summarize_sales(&sales, selection.currency),
        sales,
        table,
    }
}

fn table_row(sale: &Sale, selection: &ViewSelection) -> SalesTableRow {
    SalesTableRow {
        date: sale.date.clone(),
        price: format_currency_value(sale.price(selection.currency), selection.currency),
        buyer: truncate_label(sale.buyer_label(), PARTY_LABEL_MAX_CHARS),
        seller: truncate_label(sale.seller_label(), PARTY_LABEL_MAX_CHARS),
        serial: sale.serial_label(selection.rarity),
        season: sale.season_label(),
        tx_type: sale.tx_type,
    }
}
