use crate::classifier::rules::ClassificationRules;
use crate::model::{ClassifiedOffer, Condition, CoreSet, Exclusion, Offer};
use crate::utils::{contains_any, find_keyword};
use tracing::debug;

/// Decides which offers are fair to compare against the merchant's price.
pub struct ComparabilityFilter {
    rules: ClassificationRules,
}

impl ComparabilityFilter {
    pub fn new(rules: ClassificationRules) -> Self {
        Self {
            rules: rules.normalized(),
        }
    }

    /// First failing rule, checked in order: condition, source, bundle.
    pub fn exclusion(&self, offer: &Offer, condition: Condition) -> Option<Exclusion> {
        if condition != Condition::New {
            return Some(Exclusion::NotNew(condition));
        }

        let source = offer.source.to_lowercase();
        if let Some(entry) = find_keyword(&source, &self.rules.excluded_sources) {
            debug!("excluded source '{}': {}", entry, offer.source);
            return Some(Exclusion::ExcludedSource);
        }

        if self.is_bundle(&offer.title) {
            debug!("bundle/variant title: {}", offer.title);
            return Some(Exclusion::Bundle);
        }

        None
    }

    pub fn annotate(&self, offer: &Offer, condition: Condition) -> ClassifiedOffer {
        ClassifiedOffer {
            offer: offer.clone(),
            condition,
            exclusion: self.exclusion(offer, condition),
        }
    }

    /// Core subset of an annotated batch, in input order.
    pub fn filter_comparable(&self, offers: &[ClassifiedOffer]) -> CoreSet {
        CoreSet::from_classified(offers)
    }

    pub fn is_bundle(&self, title: &str) -> bool {
        let mut title = title.to_lowercase();
        for exception in &self.rules.bundle_exceptions {
            title = title.replace(exception.as_str(), " ");
        }

        contains_any(&title, &self.rules.bundle_keywords)
            || plus_before_letter(&title)
            || mit_before_letter(&title)
    }
}

impl Default for ComparabilityFilter {
    fn default() -> Self {
        Self::new(ClassificationRules::default())
    }
}

/// "Konsole + Controller", "Konsole+Controller"
fn plus_before_letter(title: &str) -> bool {
    let chars: Vec<char> = title.chars().collect();
    chars.iter().enumerate().any(|(i, &c)| {
        c == '+'
            && chars[i + 1..]
                .iter()
                .find(|c| !c.is_whitespace())
                .is_some_and(|c| c.is_alphabetic())
    })
}

/// "Kamera mit Tasche"; "mit" must start a word.
fn mit_before_letter(title: &str) -> bool {
    let chars: Vec<char> = title.chars().collect();
    let n = chars.len();
    (0..n.saturating_sub(3)).any(|i| {
        let word_start = i == 0 || !chars[i - 1].is_alphanumeric();
        word_start
            && chars[i..i + 3] == ['m', 'i', 't']
            && chars[i + 3].is_whitespace()
            && chars[i + 3..]
                .iter()
                .find(|c| !c.is_whitespace())
                .is_some_and(|c| c.is_alphabetic())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::condition::{Classifier, ConditionClassifier};

    fn offer(source: &str, title: &str, price: f64) -> Offer {
        Offer {
            source: source.to_string(),
            title: title.to_string(),
            price,
            rating: Some(4.5),
            url: format!("https://{}.test", source),
            scraped_at: None,
        }
    }

    fn annotate_all(offers: &[Offer]) -> Vec<ClassifiedOffer> {
        let classifier = ConditionClassifier::default();
        let filter = ComparabilityFilter::default();
        offers
            .iter()
            .map(|o| filter.annotate(o, classifier.classify(o)))
            .collect()
    }

    #[test]
    fn bundle_title_is_excluded_regardless_of_price() {
        let filter = ComparabilityFilter::default();
        for price in [1.0, 100.0, 10_000.0] {
            let o = offer("Shop", "Product Bundle Set mit Zubehör", price);
            assert_eq!(filter.exclusion(&o, Condition::New), Some(Exclusion::Bundle));
        }
    }

    #[test]
    fn standard_edition_is_not_a_bundle() {
        let filter = ComparabilityFilter::default();
        assert!(!filter.is_bundle("Spiel XY Standard Edition PS5"));
        assert!(filter.is_bundle("Spiel XY Limited Edition PS5"));
        assert!(filter.is_bundle("Spiel XY Deluxe Edition"));
    }

    #[test]
    fn ad_hoc_plus_and_mit_listings_are_bundles() {
        let filter = ComparabilityFilter::new(ClassificationRules {
            bundle_keywords: vec![],
            ..ClassificationRules::default()
        });
        assert!(filter.is_bundle("Konsole + Controller"));
        assert!(filter.is_bundle("Konsole+Controller"));
        assert!(filter.is_bundle("Kamera mit Tasche"));
        assert!(!filter.is_bundle("Kamera Schmit Tasche"));
        assert!(!filter.is_bundle("Nintendo Switch 2"));
        assert!(!filter.is_bundle("Laufzeit 12+"));
    }

    #[test]
    fn excluded_sources_match_case_insensitive_substrings() {
        let filter = ComparabilityFilter::default();
        let o = offer("eBay.de - Händler", "Kopfhörer", 50.0);
        assert_eq!(filter.exclusion(&o, Condition::New), Some(Exclusion::ExcludedSource));
    }

    #[test]
    fn non_new_condition_is_reported_first() {
        let filter = ComparabilityFilter::default();
        let o = offer("ebay", "Bundle", 50.0);
        assert_eq!(
            filter.exclusion(&o, Condition::Refurbished),
            Some(Exclusion::NotNew(Condition::Refurbished))
        );
    }

    #[test]
    fn filter_preserves_order_and_keeps_only_new() {
        let offers = vec![
            offer("Shop A", "Kopfhörer X", 100.0),
            offer("Shop B", "Kopfhörer X gebraucht", 60.0),
            offer("Shop C", "Kopfhörer X", 90.0),
            offer("Shop D", "Kopfhörer X inkl. Case", 120.0),
            offer("Shop E", "Kopfhörer X", 110.0),
        ];
        let classified = annotate_all(&offers);
        let core = ComparabilityFilter::default().filter_comparable(&classified);

        assert_eq!(core.prices(), vec![100.0, 90.0, 110.0]);
        assert!(core.offers().iter().all(|o| o.condition == Condition::New));
    }

    #[test]
    fn filtering_is_pure_and_repeatable() {
        let offers = vec![
            offer("Shop A", "Kopfhörer X", 100.0),
            offer("momox", "Kopfhörer X", 40.0),
        ];
        let first = annotate_all(&offers);
        let second = annotate_all(&offers);
        assert_eq!(first, second);
        assert_eq!(first[0].offer, offers[0]);

        let filter = ComparabilityFilter::default();
        assert_eq!(filter.filter_comparable(&first), filter.filter_comparable(&first));
    }
}
