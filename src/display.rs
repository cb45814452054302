//! Text formatting for dashboard cells.

use crate::model::Currency;

/// Shown wherever a value is missing.
pub const PLACEHOLDER: &str = "\u{2014}";

pub fn format_currency_value(value: Option<f64>, currency: Currency) -> String {
    match value {
        Some(value) => format!(
            "{}{:.*}{}",
            currency.symbol(),
            currency.decimals(),
            value,
            currency.suffix()
        ),
        None => PLACEHOLDER.to_string(),
    }
}

/// Truncate to at most `max` characters, ending with an ellipsis when cut.
pub fn truncate_label(input: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if input.chars().count() <= max {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max - 1).collect();
    out.push('\u{2026}');
    out
}

/// "el-hadji-diouf" -> "El Hadji Diouf"
pub fn slug_to_display_name(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn display_or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
}
