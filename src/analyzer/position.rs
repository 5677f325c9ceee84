use crate::model::{MarketMetrics, Position};
use crate::utils::round2;

pub const FAR_BELOW_PCT: f64 = -15.0;
pub const BELOW_PCT: f64 = -5.0;
pub const ABOVE_PCT: f64 = 5.0;
pub const FAR_ABOVE_PCT: f64 = 20.0;

// Float noise allowed around a boundary, e.g. 39.96 against 33.3.
const BOUNDARY_EPSILON: f64 = 1e-9;

fn raw_diff_pct(merchant_price: f64, metrics: &MarketMetrics) -> Option<f64> {
    if metrics.count == 0 || metrics.avg <= 0.0 || !merchant_price.is_finite() {
        return None;
    }
    Some((merchant_price - metrics.avg) * 100.0 / metrics.avg)
}

/// Percentage deviation of the merchant price from the market average,
/// rounded to two decimals. `None` when no average exists.
pub fn diff_pct(merchant_price: f64, metrics: &MarketMetrics) -> Option<f64> {
    raw_diff_pct(merchant_price, metrics).map(round2)
}

/// Buckets a deviation into a position:
/// `< -15` far below, `[-15, -5)` below, `[-5, 5]` at average,
/// `(5, 20]` above, `> 20` far above.
pub fn bucket(diff_pct: f64) -> Position {
    if diff_pct < FAR_BELOW_PCT - BOUNDARY_EPSILON {
        Position::FarBelow
    } else if diff_pct < BELOW_PCT - BOUNDARY_EPSILON {
        Position::Below
    } else if diff_pct <= ABOVE_PCT + BOUNDARY_EPSILON {
        Position::AtAverage
    } else if diff_pct <= FAR_ABOVE_PCT + BOUNDARY_EPSILON {
        Position::Above
    } else {
        Position::FarAbove
    }
}

/// Buckets the unrounded deviation; the two-decimal `diff_pct` is for display only.
pub fn resolve_position(merchant_price: f64, metrics: &MarketMetrics) -> Position {
    raw_diff_pct(merchant_price, metrics).map_or(Position::Unknown, bucket)
}
