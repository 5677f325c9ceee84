use crate::model::{CoreSet, MarketMetrics, QualityAssessment, QualityReason, Reliability};
use serde::Deserialize;

/// Thresholds shared by the detailed assessment and the coarse reliability label.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub min_core_offers: usize,
    pub max_age_days: i64,
    pub max_spread_pct: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_core_offers: 3,
            max_age_days: 7,
            max_spread_pct: 40.0,
        }
    }
}

impl QualityThresholds {
    fn too_few(&self, count: usize) -> bool {
        count < self.min_core_offers
    }

    fn too_dispersed(&self, metrics: &MarketMetrics) -> bool {
        metrics.spread_pct > self.max_spread_pct
    }
}

/// Collects every applicable reason; uncertain iff at least one applies.
pub fn assess_quality(
    core: &CoreSet,
    metrics: &MarketMetrics,
    data_age_days: i64,
    thresholds: &QualityThresholds,
) -> QualityAssessment {
    let mut reasons = Vec::new();

    if thresholds.too_few(core.len()) {
        reasons.push(QualityReason::TooFewOffers);
    }
    if data_age_days > thresholds.max_age_days {
        reasons.push(QualityReason::StaleData {
            days: data_age_days,
        });
    }
    if thresholds.too_dispersed(metrics) {
        reasons.push(QualityReason::HighDispersion);
    }

    QualityAssessment {
        is_uncertain: !reasons.is_empty(),
        reasons,
    }
}

/// Two-level label ignoring data age.
pub fn reliability(metrics: &MarketMetrics, thresholds: &QualityThresholds) -> Reliability {
    if thresholds.too_few(metrics.count) || thresholds.too_dispersed(metrics) {
        Reliability::Limited
    } else {
        Reliability::Reliable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::metrics::compute_metrics;
    use crate::model::{ClassifiedOffer, Condition, Offer};

    fn core(prices: &[f64]) -> CoreSet {
        let offers: Vec<ClassifiedOffer> = prices
            .iter()
            .map(|&price| ClassifiedOffer {
                offer: Offer {
                    source: "Shop".into(),
                    title: "Item".into(),
                    price,
                    rating: None,
                    url: String::new(),
                    scraped_at: None,
                },
                condition: Condition::New,
                exclusion: None,
            })
            .collect();
        CoreSet::from_classified(&offers)
    }

    #[test]
    fn healthy_market_is_certain_and_reliable() {
        let t = QualityThresholds::default();
        let c = core(&[100.0, 110.0, 90.0]);
        let m = compute_metrics(&c);
        let q = assess_quality(&c, &m, 0, &t);
        assert!(!q.is_uncertain);
        assert!(q.reasons.is_empty());
        assert_eq!(reliability(&m, &t), Reliability::Reliable);
    }

    #[test]
    fn empty_core_set_has_too_few_offers() {
        let t = QualityThresholds::default();
        let c = core(&[]);
        let q = assess_quality(&c, &compute_metrics(&c), 0, &t);
        assert!(q.is_uncertain);
        assert!(q.has_reason("too few comparable offers"));
    }

    #[test]
    fn all_reasons_are_collected() {
        let t = QualityThresholds::default();
        let c = core(&[50.0, 150.0]);
        let m = compute_metrics(&c);
        let q = assess_quality(&c, &m, 12, &t);
        assert_eq!(
            q.reason_messages(),
            vec![
                "too few comparable offers",
                "data is 12 days old",
                "very high price dispersion"
            ]
        );
    }

    #[test]
    fn age_threshold_is_exclusive() {
        let t = QualityThresholds::default();
        let c = core(&[100.0, 100.0, 100.0]);
        let m = compute_metrics(&c);
        assert!(!assess_quality(&c, &m, 7, &t).is_uncertain);
        assert!(assess_quality(&c, &m, 8, &t).has_reason("data is 8 days old"));
    }

    #[test]
    fn spread_of_exactly_forty_percent_is_acceptable() {
        let t = QualityThresholds::default();
        // avg 100, (120 - 80) / 100 = 40 %
        let c = core(&[80.0, 100.0, 120.0]);
        let m = compute_metrics(&c);
        assert_eq!(m.spread_pct, 40.0);
        assert!(!assess_quality(&c, &m, 0, &t).is_uncertain);
        assert_eq!(reliability(&m, &t), Reliability::Reliable);
    }

    #[test]
    fn coarse_label_ignores_age_but_not_dispersion() {
        let t = QualityThresholds::default();
        let c = core(&[60.0, 100.0, 140.0]);
        let m = compute_metrics(&c);
        assert_eq!(reliability(&m, &t), Reliability::Limited);

        let c = core(&[100.0, 101.0, 99.0]);
        let m = compute_metrics(&c);
        assert!(assess_quality(&c, &m, 30, &t).is_uncertain);
        assert_eq!(reliability(&m, &t), Reliability::Reliable);
    }
}
