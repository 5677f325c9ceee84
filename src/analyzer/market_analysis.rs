use crate::analyzer::metrics::compute_metrics;
use crate::analyzer::position::{diff_pct, resolve_position};
use crate::analyzer::quality::{QualityThresholds, assess_quality, reliability};
use crate::model::{CoreSet, MarketMetrics, Position, QualityAssessment, Reliability};

/// Trait defining the interface for a market analyzer.
pub trait Analyzer {
    fn compute_metrics(&self, core: &CoreSet) -> MarketMetrics;
    fn resolve_position(&self, merchant_price: f64, metrics: &MarketMetrics) -> Position;
    fn diff_pct(&self, merchant_price: f64, metrics: &MarketMetrics) -> Option<f64>;
    /// Detailed assessment with every applicable reason.
    fn assess_quality(
        &self,
        core: &CoreSet,
        metrics: &MarketMetrics,
        data_age_days: i64,
    ) -> QualityAssessment;
    /// Coarse reliable / limited label over the same thresholds.
    fn reliability(&self, metrics: &MarketMetrics) -> Reliability;
}

/// Implementation of the market analyzer.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerImpl {
    thresholds: QualityThresholds,
}

impl AnalyzerImpl {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }
}

impl Analyzer for AnalyzerImpl {
    fn compute_metrics(&self, core: &CoreSet) -> MarketMetrics {
        compute_metrics(core)
    }

    fn resolve_position(&self, merchant_price: f64, metrics: &MarketMetrics) -> Position {
        resolve_position(merchant_price, metrics)
    }

    fn diff_pct(&self, merchant_price: f64, metrics: &MarketMetrics) -> Option<f64> {
        diff_pct(merchant_price, metrics)
    }

    fn assess_quality(
        &self,
        core: &CoreSet,
        metrics: &MarketMetrics,
        data_age_days: i64,
    ) -> QualityAssessment {
        assess_quality(core, metrics, data_age_days, &self.thresholds)
    }

    fn reliability(&self, metrics: &MarketMetrics) -> Reliability {
        reliability(metrics, &self.thresholds)
    }
}
