//! Total mappings from raw backend rows to [`Sale`] and [`PlayerIndexEntry`].
//!
//! Rows are read as untyped JSON so that a wrongly-typed optional field degrades
//! to its default instead of failing a whole page. Each field lists its source
//! keys in precedence order; empty strings count as absent.

use serde_json::Value;
use tracing::debug;

use crate::display::{slug_to_display_name, PLACEHOLDER};
use crate::model::{parse_rarity, parse_tx_type, PlayerIndexEntry, Prices, Sale};
use crate::season::is_domestic_team;

pub const WEI_PER_ETH: i128 = 1_000_000_000_000_000_000;

/// Convert wei to ETH without routing the full magnitude through `f64`.
pub fn wei_to_eth(wei: i128) -> f64 {
    let whole = wei / WEI_PER_ETH;
    let fraction = wei % WEI_PER_ETH;
    whole as f64 + fraction as f64 / WEI_PER_ETH as f64
}

/// Field precedence:
/// - `date`: `occurred_at` up to the first `T`, else `""`
/// - `prices.eth`: `wei` / 10^18 (decimal string or integer)
/// - `prices.{eur,usd,gbp}`: `{eur,usd,gbp}_cents` / 100
/// - `buyer`: `buyer_slug`, else placeholder;
///   `buyer_display_name`: `buyer_display_name`, else `buyer_slug`
/// - `seller` / `seller_display_name`: as for buyer
/// - `rarity`: `rarity_typed`; `player_name`: `player_display_name`
/// - all other fields map from their snake_case key
pub fn normalize_sale(row: &Value) -> Sale {
    let occurred_at = text(row, "occurred_at");
    let date = occurred_at
        .as_deref()
        .and_then(|ts| ts.split('T').next())
        .unwrap_or_default()
        .to_string();

    let buyer_slug = text(row, "buyer_slug");
    let seller_slug = text(row, "seller_slug");

    let tx_type = text(row, "tx_type").and_then(|raw| match parse_tx_type(&raw) {
        Ok(tx_type) => Some(tx_type),
        Err(err) => {
            debug!(component = "normalize", event = "normalize.tx_type.unknown", error = %err);
            None
        }
    });

    Sale {
        date,
        prices: Prices {
            eth: row.get("wei").and_then(parse_wei).map(wei_to_eth),
            eur: cents(row, "eur_cents"),
            usd: cents(row, "usd_cents"),
            gbp: cents(row, "gbp_cents"),
        },
        buyer: buyer_slug.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
        buyer_display_name: text(row, "buyer_display_name").or(buyer_slug),
        seller: seller_slug.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
        seller_display_name: text(row, "seller_display_name").or(seller_slug),
        card_slug: text(row, "card_slug"),
        card_asset_id: text(row, "card_asset_id"),
        serial_number: integer(row, "serial_number"),
        supply: integer(row, "supply"),
        season_year: integer(row, "season_year").and_then(|year| i32::try_from(year).ok()),
        tx_type,
        deal_type: text(row, "deal_type"),
        rarity: text(row, "rarity_typed").and_then(|raw| parse_rarity(&raw).ok()),
        player_slug: text(row, "player_slug"),
        player_name: text(row, "player_display_name"),
        team_name: text(row, "team_name"),
        picture_url: text(row, "picture_url"),
        token_price_id: text(row, "token_price_id"),
        occurred_at,
    }
}

/// Player-pool row: `player_slug` is required; `name` is `player_display_name`
/// else the slug as a display name; `team` is `meta.team_name`, else `meta.team`;
/// `position` is `meta.position` (lists joined with `/`); `picture_url` is
/// `meta.picture_url`.
pub fn player_from_pool_row(row: &Value) -> Option<PlayerIndexEntry> {
    let slug = required_slug(row, &["player_slug"])?;
    let meta = row.get("meta").unwrap_or(&Value::Null);

    Some(PlayerIndexEntry {
        name: text(row, "player_display_name").unwrap_or_else(|| slug_to_display_name(&slug)),
        team: first_text(meta, &["team_name", "team"]).unwrap_or_default(),
        position: meta.get("position").map(position_text).unwrap_or_default(),
        picture_url: text(meta, "picture_url"),
        slug,
    })
}

/// Static dataset row: `{slug, name, team, position, pictureUrl}`.
pub fn player_from_static_row(row: &Value) -> Option<PlayerIndexEntry> {
    let slug = required_slug(row, &["slug"])?;

    Some(PlayerIndexEntry {
        name: text(row, "name").unwrap_or_else(|| slug_to_display_name(&slug)),
        team: text(row, "team").unwrap_or_default(),
        position: row.get("position").map(position_text).unwrap_or_default(),
        picture_url: text(row, "pictureUrl"),
        slug,
    })
}

/// Live search row: `player_slug|slug`, `player_display_name|name`,
/// `team_name|team`, `positions|position`, `picture_url|pictureUrl`.
pub fn player_from_search_row(row: &Value) -> Option<PlayerIndexEntry> {
    let slug = required_slug(row, &["player_slug", "slug"])?;
    let position = ["positions", "position"]
        .iter()
        .filter_map(|key| row.get(*key))
        .map(position_text)
        .find(|value| !value.is_empty())
        .unwrap_or_default();

    Some(PlayerIndexEntry {
        name: first_text(row, &["player_display_name", "name"]).unwrap_or_default(),
        team: first_text(row, &["team_name", "team"]).unwrap_or_default(),
        position,
        picture_url: first_text(row, &["picture_url", "pictureUrl"]),
        slug,
    })
}

/// The search endpoint answers either `{ "players": [...] }` or a bare list.
pub fn players_from_search_response(
    body: &Value,
    domestic_only: bool,
    limit: usize,
) -> Vec<PlayerIndexEntry> {
    let rows = body
        .get("players")
        .and_then(Value::as_array)
        .or_else(|| body.as_array())
        .map(Vec::as_slice)
        .unwrap_or_default();

    rows.iter()
        .filter_map(player_from_search_row)
        .filter(|player| !domestic_only || is_domestic_team(Some(&player.team)))
        .take(limit)
        .collect()
}

pub(crate) fn parse_wei(value: &Value) -> Option<i128> {
    match value {
        Value::String(raw) => raw.trim().parse::<i128>().ok(),
        Value::Number(number) => number
            .as_i64()
            .map(i128::from)
            .or_else(|| number.as_u64().map(i128::from))
            .or_else(|| number.as_f64().map(|float| float as i128)),
        _ => None,
    }
}

fn cents(row: &Value, key: &str) -> Option<f64> {
    Some(float_value(row.get(key)?)? / 100.0)
}

fn float_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn text(row: &Value, key: &str) -> Option<String> {
    text_value(row.get(key)?)
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(value) if !value.is_empty() => Some(value.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn first_text(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(row, key))
}

fn integer(row: &Value, key: &str) -> Option<i64> {
    integer_value(row.get(key)?)
}

fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.fract() == 0.0)
                .map(|float| float as i64)
        }),
        Value::String(raw) => raw.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn position_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("/"),
        Value::String(value) => value.clone(),
        _ => String::new(),
    }
}

fn required_slug(row: &Value, keys: &[&str]) -> Option<String> {
    let slug = first_text(row, keys);
    if slug.is_none() {
        debug!(component = "normalize", event = "normalize.player.missing_slug");
    }
    slug
}

/// `deserialize_with` adapters for the typed home panels, applying the same
/// null-safe reading as the row mappings above.
pub(crate) mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub(crate) fn text<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        Ok(super::text_value(&Value::deserialize(de)?))
    }

    pub(crate) fn float<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
        Ok(super::float_value(&Value::deserialize(de)?))
    }

    pub(crate) fn int<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
        Ok(super::integer_value(&Value::deserialize(de)?))
    }

    pub(crate) fn year<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i32>, D::Error> {
        Ok(int(de)?.and_then(|year| i32::try_from(year).ok()))
    }

    pub(crate) fn count<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
        Ok(int(de)?.and_then(|count| u64::try_from(count).ok()))
    }

    /// A nested record that is absent or not an object reads as `None`.
    pub(crate) fn record<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(serde_json::from_value(Value::deserialize(de)?).ok())
    }

    /// Rows that do not decode are dropped; a non-array reads as empty.
    pub(crate) fn rows<'de, D, T>(de: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let rows = match Value::deserialize(de)? {
            Value::Array(rows) => rows,
            _ => return Ok(Vec::new()),
        };
        Ok(rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rarity, TxType};
    use serde_json::json;

    #[test]
    fn half_eth_in_wei_is_exact() {
        let sale = normalize_sale(&json!({ "wei": "500000000000000000" }));
        assert_eq!(sale.prices.eth, Some(0.5));
    }

    #[test]
    fn large_wei_keeps_fractional_precision() {
        // 123456789.000000000000000001 ETH; the whole part must survive intact.
        let sale = normalize_sale(&json!({ "wei": "123456789000000000000000001" }));
        assert_eq!(sale.prices.eth, Some(123_456_789.0));

        let sale = normalize_sale(&json!({ "wei": "1234500000000000000" }));
        let eth = sale.prices.eth.unwrap();
        assert!((eth - 1.2345).abs() < 1e-12);
    }

    #[test]
    fn numeric_wei_is_accepted() {
        let sale = normalize_sale(&json!({ "wei": 250_000_000_000_000_000_i64 }));
        assert_eq!(sale.prices.eth, Some(0.25));
    }

    #[test]
    fn cents_become_fiat_amounts() {
        let sale = normalize_sale(&json!({
            "eur_cents": 1234,
            "usd_cents": "999",
            "gbp_cents": null
        }));
        assert_eq!(sale.prices.eur, Some(12.34));
        assert_eq!(sale.prices.usd, Some(9.99));
        assert_eq!(sale.prices.gbp, None);
    }

    #[test]
    fn empty_row_normalizes_to_defaults() {
        let sale = normalize_sale(&json!({}));
        assert_eq!(sale, Sale::default());
        assert!(!sale.has_positive_eth());

        let sale = normalize_sale(&json!("not an object"));
        assert_eq!(sale, Sale::default());
    }

    #[test]
    fn full_row_maps_every_field() {
        let sale = normalize_sale(&json!({
            "occurred_at": "2026-03-14T18:22:01.000Z",
            "wei": "1000000000000000000",
            "usd_cents": 310000,
            "buyer_slug": "buyer-one",
            "buyer_display_name": "",
            "seller_slug": "seller-one",
            "seller_display_name": "Seller One",
            "card_slug": "jane-roe-2026-limited-12",
            "card_asset_id": "0xabc",
            "serial_number": 12,
            "supply": 1000,
            "season_year": 2026,
            "tx_type": "secondary",
            "deal_type": "single_sale_offer",
            "rarity_typed": "limited",
            "player_slug": "jane-roe",
            "player_display_name": "Jane Roe",
            "team_name": "LA Galaxy",
            "picture_url": "https://img.example/jane.png",
            "token_price_id": 98765
        }));

        assert_eq!(sale.date, "2026-03-14");
        assert_eq!(sale.occurred_at.as_deref(), Some("2026-03-14T18:22:01.000Z"));
        assert_eq!(sale.prices.eth, Some(1.0));
        assert_eq!(sale.prices.usd, Some(3100.0));
        assert_eq!(sale.buyer, "buyer-one");
        assert_eq!(sale.buyer_display_name.as_deref(), Some("buyer-one"));
        assert_eq!(sale.seller_display_name.as_deref(), Some("Seller One"));
        assert_eq!(sale.serial_number, Some(12));
        assert_eq!(sale.supply, Some(1000));
        assert_eq!(sale.season_year, Some(2026));
        assert_eq!(sale.tx_type, Some(TxType::Secondary));
        assert_eq!(sale.rarity, Some(Rarity::Limited));
        assert_eq!(sale.player_name.as_deref(), Some("Jane Roe"));
        assert_eq!(sale.token_price_id.as_deref(), Some("98765"));
    }

    #[test]
    fn wrongly_typed_optional_fields_default_instead_of_failing() {
        let sale = normalize_sale(&json!({
            "wei": { "nested": true },
            "serial_number": "twelve",
            "season_year": [2026],
            "tx_type": "gift",
            "rarity_typed": 3
        }));

        assert_eq!(sale.prices.eth, None);
        assert_eq!(sale.serial_number, None);
        assert_eq!(sale.season_year, None);
        assert_eq!(sale.tx_type, None);
        assert_eq!(sale.rarity, None);
    }

    #[test]
    fn pool_row_uses_meta_and_slug_fallback_name() {
        let entry = player_from_pool_row(&json!({
            "player_slug": "el-hadji-diouf",
            "meta": { "team": "FC Dallas", "position": ["Forward", "Midfielder"] }
        }))
        .unwrap();

        assert_eq!(entry.name, "El Hadji Diouf");
        assert_eq!(entry.team, "FC Dallas");
        assert_eq!(entry.position, "Forward/Midfielder");
        assert_eq!(entry.picture_url, None);

        assert!(player_from_pool_row(&json!({ "meta": {} })).is_none());
    }

    #[test]
    fn search_response_accepts_both_shapes_and_filters_domestic() {
        let wrapped = json!({ "players": [
            { "player_slug": "a-one", "player_display_name": "A One", "team_name": "Toronto FC" },
            { "slug": "b-two", "name": "B Two", "team": "Real Madrid" }
        ]});
        let bare = json!([
            { "slug": "b-two", "name": "B Two", "team": "Real Madrid", "positions": ["Goalkeeper"] }
        ]);

        let domestic = players_from_search_response(&wrapped, true, 10);
        assert_eq!(domestic.len(), 1);
        assert_eq!(domestic[0].slug, "a-one");

        let all = players_from_search_response(&bare, false, 10);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].position, "Goalkeeper");

        assert!(players_from_search_response(&json!({ "error": "x" }), false, 10).is_empty());
    }
}
