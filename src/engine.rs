// Pipeline: ingest -> classify -> filter -> metrics -> position -> quality
use crate::analyzer::{Analyzer, AnalyzerImpl, QualityThresholds};
use crate::classifier::condition::Classifier;
use crate::classifier::{ClassificationRules, ComparabilityFilter, ConditionClassifier};
use crate::model::{
    ClassifiedOffer, Condition, Exclusion, MarketJudgment, MarketSnapshot, Offer, SearchResult,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

pub struct MarketEngine {
    classifier: ConditionClassifier,
    filter: ComparabilityFilter,
    analyzer: AnalyzerImpl,
}

impl MarketEngine {
    pub fn new(rules: ClassificationRules, thresholds: QualityThresholds) -> Self {
        Self {
            classifier: ConditionClassifier::new(rules.clone()),
            filter: ComparabilityFilter::new(rules),
            analyzer: AnalyzerImpl::new(thresholds),
        }
    }

    /// Labels every offer with a valid price. The input batch is left untouched.
    pub fn classify_batch(&self, offers: &[Offer]) -> Vec<ClassifiedOffer> {
        let mut dropped = 0;
        let classified: Vec<ClassifiedOffer> = offers
            .iter()
            .filter(|o| {
                let valid = o.has_valid_price();
                if !valid {
                    dropped += 1;
                }
                valid
            })
            .map(|o| self.filter.annotate(o, self.classifier.classify(o)))
            .collect();

        if dropped > 0 {
            warn!("⚠️ Dropped {} offers without a positive price", dropped);
        }
        classified
    }

    /// Builds the cacheable, merchant-price independent part of a judgment.
    pub fn snapshot(
        &self,
        product_id: &str,
        result: &SearchResult,
        fetched_at: DateTime<Utc>,
    ) -> MarketSnapshot {
        let offers = self.classify_batch(&result.offers);
        let core = self.filter.filter_comparable(&offers);
        let metrics = self.analyzer.compute_metrics(&core);

        let data_as_of = offers
            .iter()
            .filter_map(|o| o.offer.scraped_at)
            .min()
            .map_or(fetched_at, |t| t.min(fetched_at));

        info!(
            "📦 {}: {} offers, {} comparable, avg {:.2} €",
            product_id,
            offers.len(),
            metrics.count,
            metrics.avg
        );

        if let Some(upstream_avg) = result.summary.as_ref().and_then(|s| s.avg_price) {
            if metrics.avg > 0.0 && ((upstream_avg - metrics.avg) / metrics.avg).abs() > 0.01 {
                debug!(
                    "upstream summary avg {:.2} € differs from comparable avg {:.2} € for {}",
                    upstream_avg, metrics.avg, product_id
                );
            }
        }

        MarketSnapshot {
            product_id: product_id.to_string(),
            offers,
            metrics,
            fetched_at,
            data_as_of,
        }
    }

    /// Position and quality for one merchant price, recomputed from scratch.
    pub fn judge(
        &self,
        snapshot: &MarketSnapshot,
        merchant_price: f64,
        now: DateTime<Utc>,
    ) -> MarketJudgment {
        let core = snapshot.core_set();
        let metrics = snapshot.metrics;
        let data_age_days = (now - snapshot.data_as_of).num_days().max(0);

        let used_excluded = snapshot.count_excluded(Exclusion::NotNew(Condition::Used))
            + snapshot.count_excluded(Exclusion::NotNew(Condition::Refurbished));

        MarketJudgment {
            product_id: snapshot.product_id.clone(),
            merchant_price,
            total_offers: snapshot.offers.len(),
            used_excluded,
            source_excluded: snapshot.count_excluded(Exclusion::ExcludedSource),
            bundle_excluded: snapshot.count_excluded(Exclusion::Bundle),
            metrics,
            diff_pct: self.analyzer.diff_pct(merchant_price, &metrics),
            position: self.analyzer.resolve_position(merchant_price, &metrics),
            quality: self.analyzer.assess_quality(&core, &metrics, data_age_days),
            reliability: self.analyzer.reliability(&metrics),
            data_age_days,
        }
    }
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self::new(ClassificationRules::default(), QualityThresholds::default())
    }
}
