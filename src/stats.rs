//! Summary figures for a filtered sale list.

use serde::Serialize;

use crate::model::{Currency, Sale};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SaleStats {
    pub latest: f64,
    pub highest: f64,
    pub lowest: f64,
    pub average: f64,
    pub total_sales: usize,
    pub trend_pct: f64,
}

/// Stats over the sales priced in `currency`, oldest first. `total_sales`
/// counts every sale in the slice, priced or not.
pub fn summarize_sales(sales: &[Sale], currency: Currency) -> Option<SaleStats> {
    let values: Vec<f64> = sales.iter().filter_map(|sale| sale.price(currency)).collect();
    let first = *values.first()?;
    let latest = *values.last()?;

    let highest = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = values.iter().copied().fold(f64::INFINITY, f64::min);
    let average = values.iter().sum::<f64>() / values.len() as f64;
    let trend_pct = if first == 0.0 {
        0.0
    } else {
        (latest - first) / first * 100.0
    };

    Some(SaleStats {
        latest,
        highest,
        lowest,
        average,
        total_sales: sales.len(),
        trend_pct,
    })
}
