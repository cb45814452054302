//! Card-market domain types shared by the client, filters and dashboard views.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::display::{slug_to_display_name, PLACEHOLDER};
use crate::normalize::lenient;
use crate::season::format_season_year;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Limited,
    Rare,
    SuperRare,
    Unique,
}

pub const ALL_RARITIES: [Rarity; 4] = [
    Rarity::Limited,
    Rarity::Rare,
    Rarity::SuperRare,
    Rarity::Unique,
];

impl Rarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Limited => "limited",
            Rarity::Rare => "rare",
            Rarity::SuperRare => "super_rare",
            Rarity::Unique => "unique",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Rarity::Limited => "Limited",
            Rarity::Rare => "Rare",
            Rarity::SuperRare => "Super Rare",
            Rarity::Unique => "Unique",
        }
    }

    /// Print run of the tier, used when a sale does not report its own supply.
    pub fn default_supply(self) -> i64 {
        match self {
            Rarity::Limited => 1000,
            Rarity::Rare => 100,
            Rarity::SuperRare => 10,
            Rarity::Unique => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Auction,
    Secondary,
    InstantBuy,
}

impl TxType {
    pub fn as_str(self) -> &'static str {
        match self {
            TxType::Auction => "auction",
            TxType::Secondary => "secondary",
            TxType::InstantBuy => "instant_buy",
        }
    }

    /// Auctions and instant buys are primary sales made by the marketplace itself.
    pub fn is_primary(self) -> bool {
        matches!(self, TxType::Auction | TxType::InstantBuy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Eth,
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Eth => "eth",
            Currency::Eur => "eur",
            Currency::Usd => "usd",
            Currency::Gbp => "gbp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Currency::Eth => "ETH",
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Eth => "",
            Currency::Eur => "\u{20ac}",
            Currency::Usd => "$",
            Currency::Gbp => "\u{a3}",
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Currency::Eth => " ETH",
            Currency::Eur | Currency::Usd | Currency::Gbp => "",
        }
    }

    pub fn decimals(self) -> usize {
        match self {
            Currency::Eth => 4,
            Currency::Eur | Currency::Usd | Currency::Gbp => 2,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown rarity: {0}")]
    UnknownRarity(String),
    #[error("unknown transaction type: {0}")]
    UnknownTxType(String),
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("unknown time range: {0}")]
    UnknownTimeRange(String),
    #[error("unknown collection filter: {0}")]
    UnknownCollection(String),
}

pub fn parse_rarity(input: &str) -> Result<Rarity, ParseError> {
    match input {
        "limited" => Ok(Rarity::Limited),
        "rare" => Ok(Rarity::Rare),
        "super_rare" => Ok(Rarity::SuperRare),
        "unique" => Ok(Rarity::Unique),
        other => Err(ParseError::UnknownRarity(other.to_string())),
    }
}

pub fn parse_tx_type(input: &str) -> Result<TxType, ParseError> {
    match input {
        "auction" => Ok(TxType::Auction),
        "secondary" => Ok(TxType::Secondary),
        "instant_buy" => Ok(TxType::InstantBuy),
        other => Err(ParseError::UnknownTxType(other.to_string())),
    }
}

pub fn parse_currency(input: &str) -> Result<Currency, ParseError> {
    match input {
        "eth" => Ok(Currency::Eth),
        "eur" => Ok(Currency::Eur),
        "usd" => Ok(Currency::Usd),
        "gbp" => Ok(Currency::Gbp),
        other => Err(ParseError::UnknownCurrency(other.to_string())),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Prices {
    pub eth: Option<f64>,
    pub eur: Option<f64>,
    pub usd: Option<f64>,
    pub gbp: Option<f64>,
}

impl Prices {
    pub fn get(&self, currency: Currency) -> Option<f64> {
        match currency {
            Currency::Eth => self.eth,
            Currency::Eur => self.eur,
            Currency::Usd => self.usd,
            Currency::Gbp => self.gbp,
        }
    }
}

/// One normalized marketplace sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub date: String,
    pub occurred_at: Option<String>,
    pub prices: Prices,
    pub buyer: String,
    pub buyer_display_name: Option<String>,
    pub seller: String,
    pub seller_display_name: Option<String>,
    pub card_slug: Option<String>,
    pub card_asset_id: Option<String>,
    pub serial_number: Option<i64>,
    pub supply: Option<i64>,
    pub season_year: Option<i32>,
    pub tx_type: Option<TxType>,
    pub deal_type: Option<String>,
    pub rarity: Option<Rarity>,
    pub player_slug: Option<String>,
    pub player_name: Option<String>,
    pub team_name: Option<String>,
    pub picture_url: Option<String>,
    pub token_price_id: Option<String>,
}

impl Default for Sale {
    fn default() -> Self {
        Self {
            date: String::new(),
            occurred_at: None,
            prices: Prices::default(),
            buyer: PLACEHOLDER.to_string(),
            buyer_display_name: None,
            seller: PLACEHOLDER.to_string(),
            seller_display_name: None,
            card_slug: None,
            card_asset_id: None,
            serial_number: None,
            supply: None,
            season_year: None,
            tx_type: None,
            deal_type: None,
            rarity: None,
            player_slug: None,
            player_name: None,
            team_name: None,
            picture_url: None,
            token_price_id: None,
        }
    }
}

impl Sale {
    pub fn price(&self, currency: Currency) -> Option<f64> {
        self.prices.get(currency)
    }

    pub fn has_positive_eth(&self) -> bool {
        self.prices.eth.is_some_and(|eth| eth > 0.0)
    }

    pub fn buyer_label(&self) -> &str {
        self.buyer_display_name.as_deref().unwrap_or(&self.buyer)
    }

    pub fn seller_label(&self) -> &str {
        if let Some(name) = self.seller_display_name.as_deref() {
            return name;
        }
        if self.tx_type.is_some_and(TxType::is_primary) {
            return "Sorare";
        }
        &self.seller
    }

    /// `#12/1000`, falling back to the tier's print run when the sale has no supply.
    pub fn serial_label(&self, rarity: Rarity) -> String {
        match self.serial_number {
            Some(serial) => {
                let supply = self.supply.unwrap_or_else(|| rarity.default_supply());
                format!("#{serial}/{supply}")
            }
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn season_label(&self) -> String {
        format_season_year(self.season_year, self.team_name.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIndexEntry {
    pub slug: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub picture_url: Option<String>,
}

/// Cursor-paginated response envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketOverview24h {
    #[serde(deserialize_with = "lenient::float")]
    pub volume_eth: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub cards_sold: Option<u64>,
    #[serde(deserialize_with = "lenient::float")]
    pub avg_price_eth: Option<f64>,
    #[serde(deserialize_with = "lenient::count")]
    pub unique_buyers: Option<u64>,
    #[serde(deserialize_with = "lenient::count")]
    pub unique_sellers: Option<u64>,
    #[serde(deserialize_with = "lenient::float")]
    pub trend_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopAuction {
    #[serde(deserialize_with = "lenient::text")]
    pub player_slug: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub player_display_name: Option<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub price_eth: Option<f64>,
    #[serde(deserialize_with = "lenient::int")]
    pub usd_cents: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub serial_number: Option<i64>,
    #[serde(deserialize_with = "lenient::int")]
    pub supply: Option<i64>,
    #[serde(deserialize_with = "lenient::year")]
    pub season_year: Option<i32>,
    #[serde(deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
}

impl TopAuction {
    pub fn display_name(&self) -> String {
        match self.player_display_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => slug_to_display_name(self.player_slug.as_deref().unwrap_or_default()),
        }
    }

    pub fn season_label(&self) -> String {
        format_season_year(self.season_year, self.team_name.as_deref())
    }
}

/// Best sale of the last 24h for each rarity tier; tiers without auctions are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopAuctions24h {
    #[serde(deserialize_with = "lenient::record")]
    pub limited: Option<TopAuction>,
    #[serde(deserialize_with = "lenient::record")]
    pub rare: Option<TopAuction>,
    #[serde(deserialize_with = "lenient::record")]
    pub super_rare: Option<TopAuction>,
    #[serde(deserialize_with = "lenient::record")]
    pub unique: Option<TopAuction>,
}

impl TopAuctions24h {
    pub fn get(&self, rarity: Rarity) -> Option<&TopAuction> {
        match rarity {
            Rarity::Limited => self.limited.as_ref(),
            Rarity::Rare => self.rare.as_ref(),
            Rarity::SuperRare => self.super_rare.as_ref(),
            Rarity::Unique => self.unique.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MostTradedPlayer {
    #[serde(deserialize_with = "lenient::text")]
    pub player_slug: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub player_display_name: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub team_name: Option<String>,
    #[serde(deserialize_with = "lenient::count")]
    pub sale_count: Option<u64>,
    #[serde(deserialize_with = "lenient::float")]
    pub total_volume_eth: Option<f64>,
}

impl MostTradedPlayer {
    pub fn display_name(&self) -> String {
        match self.player_display_name.as_deref() {
            Some(name) => name.to_string(),
            None => self
                .player_slug
                .as_deref()
                .map(slug_to_display_name)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MostTraded24h {
    #[serde(deserialize_with = "lenient::rows")]
    pub players: Vec<MostTradedPlayer>,
}

/// Player profile as returned by the backend; the shape is owned by the backend,
/// so it is kept verbatim and read through accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerProfile {
    pub raw: serde_json::Value,
}

impl PlayerProfile {
    pub fn slug(&self) -> Option<&str> {
        self.first_text(&["player_slug", "slug"])
    }

    pub fn display_name(&self) -> Option<&str> {
        self.first_text(&["player_display_name", "display_name", "name"])
    }

    pub fn team_name(&self) -> Option<&str> {
        self.first_text(&["team_name", "team"])
    }

    fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.raw.get(*key).and_then(|value| value.as_str()))
            .find(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_helpers_accept_wire_names_only() {
        assert_eq!(parse_rarity("super_rare"), Ok(Rarity::SuperRare));
        assert_eq!(
            parse_rarity("Super Rare"),
            Err(ParseError::UnknownRarity("Super Rare".to_string()))
        );
        assert_eq!(parse_tx_type("instant_buy"), Ok(TxType::InstantBuy));
        assert!(parse_tx_type("gift").is_err());
        assert_eq!(parse_currency("gbp"), Ok(Currency::Gbp));
        assert!(parse_currency("btc").is_err());
    }

    #[test]
    fn seller_label_prefers_display_name_then_marketplace_for_primary_sales() {
        let mut sale = Sale {
            tx_type: Some(TxType::Auction),
            ..Sale::default()
        };
        assert_eq!(sale.seller_label(), "Sorare");

        sale.tx_type = Some(TxType::Secondary);
        assert_eq!(sale.seller_label(), PLACEHOLDER);

        sale.seller = "manager-a".to_string();
        sale.seller_display_name = Some("Manager A".to_string());
        assert_eq!(sale.seller_label(), "Manager A");
    }

    #[test]
    fn serial_label_falls_back_to_tier_supply() {
        let mut sale = Sale {
            serial_number: Some(12),
            ..Sale::default()
        };
        assert_eq!(sale.serial_label(Rarity::Rare), "#12/100");

        sale.supply = Some(250);
        assert_eq!(sale.serial_label(Rarity::Rare), "#12/250");

        sale.serial_number = None;
        assert_eq!(sale.serial_label(Rarity::Rare), PLACEHOLDER);
    }

    #[test]
    fn page_envelope_tolerates_missing_fields() {
        let page: Page<serde_json::Value> = serde_json::from_str("{}").unwrap();
        assert!(page.rows.is_empty());
        assert!(!page.has_more);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn top_auctions_missing_tiers_are_none() {
        let data: TopAuctions24h = serde_json::from_value(serde_json::json!({
            "rare": { "player_slug": "john-doe", "price_eth": 0.42 }
        }))
        .unwrap();

        assert!(data.get(Rarity::Limited).is_none());
        let rare = data.get(Rarity::Rare).unwrap();
        assert_eq!(rare.display_name(), "John Doe");
        assert_eq!(rare.price_eth, Some(0.42));
    }

    #[test]
    fn most_traded_rows_without_slug_still_decode() {
        let data: MostTraded24h = serde_json::from_value(serde_json::json!({
            "players": [
                { "player_slug": null, "sale_count": 7.0 },
                { "player_slug": "denis-bouanga", "sale_count": "3" },
                "garbage"
            ]
        }))
        .unwrap();

        assert_eq!(data.players.len(), 2);
        assert_eq!(data.players[0].sale_count, Some(7));
        assert_eq!(data.players[0].display_name(), PLACEHOLDER);
        assert_eq!(data.players[1].display_name(), "Denis Bouanga");
        assert_eq!(data.players[1].sale_count, Some(3));
    }

    #[test]
    fn market_overview_reads_wrongly_typed_counts_as_absent() {
        let data: MarketOverview24h = serde_json::from_value(serde_json::json!({
            "cards_sold": -2,
            "unique_sellers": "many",
            "trend_pct": null
        }))
        .unwrap();

        assert_eq!(data, MarketOverview24h::default());
    }

    #[test]
    fn profile_accessors_follow_key_precedence() {
        let profile = PlayerProfile {
            raw: serde_json::json!({
                "slug": "fallback-slug",
                "player_slug": "primary-slug",
                "name": "Jane Roe",
                "team": "LA Galaxy"
            }),
        };

        assert_eq!(profile.slug(), Some("primary-slug"));
        assert_eq!(profile.display_name(), Some("Jane Roe"));
        assert_eq!(profile.team_name(), Some("LA Galaxy"));
    }
}
