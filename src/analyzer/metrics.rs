use crate::model::{CoreSet, MarketMetrics};
use crate::utils::round2;

/// Min/max/average/spread over the core set prices.
/// An empty core set yields zeroed metrics; `count == 0` means no judgment is possible.
pub fn compute_metrics(core: &CoreSet) -> MarketMetrics {
    let mut prices: Vec<f64> = core
        .prices()
        .into_iter()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    if prices.is_empty() {
        return MarketMetrics::default();
    }
    prices.sort_by(|a, b| a.total_cmp(b));

    let count = prices.len();
    let min = prices[0];
    let max = prices[count - 1];
    // rounding must not push the mean outside the observed range
    let avg = round2(prices.iter().sum::<f64>() / count as f64).clamp(min, max);
    let spread_pct = if avg > 0.0 {
        round2((max - min) / avg * 100.0)
    } else {
        0.0
    };

    MarketMetrics {
        count,
        min,
        max,
        avg,
        spread_pct,
    }
}
