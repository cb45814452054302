//! Client-side slicing of a cached sale list.
//!
//! The three dimensions (time range, transaction type, collection era) are
//! independent predicates combined with AND, so any application order yields
//! the same order-preserving subset.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{parse_tx_type, ParseError, Sale, TxType};
use crate::season::is_in_season;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "2w")]
    TwoWeeks,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "12m")]
    TwelveMonths,
    #[serde(rename = "all")]
    All,
}

pub const ALL_TIME_RANGES: [TimeRange; 5] = [
    TimeRange::TwoWeeks,
    TimeRange::ThreeMonths,
    TimeRange::SixMonths,
    TimeRange::TwelveMonths,
    TimeRange::All,
];

impl TimeRange {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::TwoWeeks => "2w",
            TimeRange::ThreeMonths => "3m",
            TimeRange::SixMonths => "6m",
            TimeRange::TwelveMonths => "12m",
            TimeRange::All => "all",
        }
    }

    pub fn days(self) -> Option<u64> {
        match self {
            TimeRange::TwoWeeks => Some(14),
            TimeRange::ThreeMonths => Some(90),
            TimeRange::SixMonths => Some(180),
            TimeRange::TwelveMonths => Some(365),
            TimeRange::All => None,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TimeRange::TwoWeeks => "2 weeks",
            TimeRange::ThreeMonths => "3 months",
            TimeRange::SixMonths => "6 months",
            TimeRange::TwelveMonths => "12 months",
            TimeRange::All => "all data",
        }
    }

    /// First calendar day kept by this range, `None` for an unbounded range.
    pub fn from_date(self, today: NaiveDate) -> Option<NaiveDate> {
        let days = self.days()?;
        Some(today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN))
    }

    pub fn matches(self, sale: &Sale, today: NaiveDate) -> bool {
        match self.from_date(today) {
            // ISO day strings order the same way as the dates they name.
            Some(from) => sale.date.as_str() >= from.format("%Y-%m-%d").to_string().as_str(),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxTypeFilter {
    #[default]
    All,
    Only(TxType),
}

impl TxTypeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            TxTypeFilter::All => "all",
            TxTypeFilter::Only(tx_type) => tx_type.as_str(),
        }
    }

    pub fn matches(self, sale: &Sale) -> bool {
        match self {
            TxTypeFilter::All => true,
            TxTypeFilter::Only(tx_type) => sale.tx_type == Some(tx_type),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionFilter {
    #[default]
    All,
    InSeason,
    Classic,
}

impl CollectionFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionFilter::All => "all",
            CollectionFilter::InSeason => "in_season",
            CollectionFilter::Classic => "classic",
        }
    }

    pub fn matches(self, sale: &Sale, today: NaiveDate) -> bool {
        match self {
            CollectionFilter::All => true,
            CollectionFilter::InSeason => {
                is_in_season(sale.season_year, sale.team_name.as_deref(), today)
            }
            CollectionFilter::Classic => {
                !is_in_season(sale.season_year, sale.team_name.as_deref(), today)
            }
        }
    }
}

pub fn parse_time_range(input: &str) -> Result<TimeRange, ParseError> {
    match input {
        "2w" => Ok(TimeRange::TwoWeeks),
        "3m" => Ok(TimeRange::ThreeMonths),
        "6m" => Ok(TimeRange::SixMonths),
        "12m" => Ok(TimeRange::TwelveMonths),
        "all" => Ok(TimeRange::All),
        other => Err(ParseError::UnknownTimeRange(other.to_string())),
    }
}

pub fn parse_tx_type_filter(input: &str) -> Result<TxTypeFilter, ParseError> {
    match input {
        "all" => Ok(TxTypeFilter::All),
        other => parse_tx_type(other).map(TxTypeFilter::Only),
    }
}

pub fn parse_collection_filter(input: &str) -> Result<CollectionFilter, ParseError> {
    match input {
        "all" => Ok(CollectionFilter::All),
        "in_season" => Ok(CollectionFilter::InSeason),
        "classic" => Ok(CollectionFilter::Classic),
        other => Err(ParseError::UnknownCollection(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleFilters {
    pub time_range: TimeRange,
    pub tx_type: TxTypeFilter,
    pub collection: CollectionFilter,
}

impl Default for SaleFilters {
    fn default() -> Self {
        Self {
            time_range: TimeRange::All,
            tx_type: TxTypeFilter::All,
            collection: CollectionFilter::All,
        }
    }
}

impl SaleFilters {
    pub fn matches(&self, sale: &Sale, today: NaiveDate) -> bool {
        self.time_range.matches(sale, today)
            && self.tx_type.matches(sale)
            && self.collection.matches(sale, today)
    }

    pub fn apply(&self, sales: &[Sale], today: NaiveDate) -> Vec<Sale> {
        filter_sales(sales, self, today)
    }
}

pub fn filter_sales(sales: &[Sale], filters: &SaleFilters, today: NaiveDate) -> Vec<Sale> {
    sales
        .iter()
        .filter(|sale| filters.matches(sale, today))
        .cloned()
        .collect()
}

pub fn filter_by_time_range(sales: &[Sale], range: TimeRange, today: NaiveDate) -> Vec<Sale> {
    sales
        .iter()
        .filter(|sale| range.matches(sale, today))
        .cloned()
        .collect()
}

pub fn filter_by_tx_type(sales: &[Sale], tx_type: TxTypeFilter) -> Vec<Sale> {
    sales
        .iter()
        .filter(|sale| tx_type.matches(sale))
        .cloned()
        .collect()
}

pub fn filter_by_collection(
    sales: &[Sale],
    collection: CollectionFilter,
    today: NaiveDate,
) -> Vec<Sale> {
    sales
        .iter()
        .filter(|sale| collection.matches(sale, today))
        .cloned()
        .collect()
}
