use chrono::{Duration, Utc};
use price_scout::MarketEngine;
use price_scout::model::{Offer, Position, Reliability, SearchResult};
use price_scout::narrative::build_narrative;

fn offer(source: &str, title: &str, price: f64) -> Offer {
    Offer {
        source: source.to_string(),
        title: title.to_string(),
        price,
        rating: Some(4.2),
        url: format!("https://{}.test/item", source.to_lowercase().replace(' ', "-")),
        scraped_at: Some(Utc::now() - Duration::hours(2)),
    }
}

fn batch(offers: Vec<Offer>) -> SearchResult {
    SearchResult {
        product_id: "sku-42".to_string(),
        offers,
        summary: None,
    }
}

#[test]
fn scenario_a_three_new_offers_at_average() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    let snapshot = engine.snapshot(
        "sku-42",
        &batch(vec![
            offer("Shop A", "Funkkopfhörer Pro", 100.0),
            offer("Shop B", "Funkkopfhörer Pro", 110.0),
            offer("Shop C", "Funkkopfhörer Pro", 90.0),
        ]),
        now,
    );
    let judgment = engine.judge(&snapshot, 105.0, now);

    assert_eq!(judgment.metrics.avg, 100.0);
    assert_eq!(judgment.metrics.spread_pct, 20.0);
    assert_eq!(judgment.diff_pct, Some(5.0));
    assert_eq!(judgment.position, Position::AtAverage);
    assert!(!judgment.quality.is_uncertain);
    assert_eq!(judgment.reliability, Reliability::Reliable);
}

#[test]
fn scenario_b_single_offer_far_above_and_uncertain() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    let snapshot = engine.snapshot(
        "sku-42",
        &batch(vec![
            offer("Shop A", "Funkkopfhörer Pro", 80.0),
            offer("Shop B", "Funkkopfhörer Pro gebraucht", 50.0),
        ]),
        now,
    );
    let judgment = engine.judge(&snapshot, 120.0, now);

    assert_eq!(judgment.metrics.count, 1);
    assert_eq!(judgment.metrics.avg, 80.0);
    assert_eq!(judgment.diff_pct, Some(50.0));
    assert_eq!(judgment.position, Position::FarAbove);
    assert!(judgment.quality.is_uncertain);
    assert_eq!(judgment.quality.reason_messages(), vec!["too few comparable offers"]);
    assert_eq!(judgment.reliability, Reliability::Limited);

    let narrative = build_narrative(&judgment);
    assert!(narrative.summary.contains("nur ein vergleichbares Angebot"));
}

#[test]
fn scenario_c_all_used_falls_back_to_no_comparable_offers() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    let snapshot = engine.snapshot(
        "sku-42",
        &batch(vec![
            offer("Kleinanzeigen", "Funkkopfhörer Pro", 60.0),
            offer("Shop A", "Funkkopfhörer Pro wie neu", 70.0),
            offer("Shop B", "Funkkopfhörer Pro, guter Zustand", 65.0),
        ]),
        now,
    );
    let judgment = engine.judge(&snapshot, 99.0, now);

    assert_eq!(judgment.metrics.count, 0);
    assert_eq!(judgment.position, Position::Unknown);
    assert_eq!(judgment.diff_pct, None);
    assert_eq!(judgment.used_excluded, 3);

    let narrative = build_narrative(&judgment);
    assert!(narrative.summary.contains("keine vergleichbaren Angebote"));
    assert!(narrative.position.contains("keine Einordnung"));
}

#[test]
fn empty_batch_is_a_valid_zero_state() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    let snapshot = engine.snapshot("sku-42", &batch(vec![]), now);
    let judgment = engine.judge(&snapshot, 10.0, now);

    assert_eq!(judgment.metrics.count, 0);
    assert_eq!(judgment.metrics.avg, 0.0);
    assert_eq!(judgment.position, Position::Unknown);
    assert!(judgment.quality.has_reason("too few comparable offers"));
    assert_eq!(judgment.total_offers, 0);
}

#[test]
fn bundle_listing_never_enters_the_core_set() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    for price in [1.0, 100.0, 5000.0] {
        let snapshot = engine.snapshot(
            "sku-42",
            &batch(vec![
                offer("Shop A", "Product Bundle Set mit Zubehör", price),
                offer("Shop B", "Product", 100.0),
            ]),
            now,
        );
        let core = snapshot.core_set();
        assert_eq!(core.prices(), vec![100.0]);
        assert_eq!(engine.judge(&snapshot, 100.0, now).bundle_excluded, 1);
    }
}

#[test]
fn excluded_marketplaces_and_unknown_sources() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    let snapshot = engine.snapshot(
        "sku-42",
        &batch(vec![
            offer("eBay", "Product", 40.0),
            offer("Back Market", "Product", 45.0),
            offer("", "", 100.0),
        ]),
        now,
    );
    let judgment = engine.judge(&snapshot, 100.0, now);
    assert_eq!(judgment.source_excluded, 2);
    // An unlabelled offer from an unknown source counts as a new, comparable listing.
    assert_eq!(judgment.metrics.count, 1);
}

#[test]
fn stale_and_dispersed_market_collects_every_reason() {
    let engine = MarketEngine::default();
    let now = Utc::now();
    let mut offers = vec![
        offer("Shop A", "Product", 50.0),
        offer("Shop B", "Product", 100.0),
        offer("Shop C", "Product", 150.0),
    ];
    offers[0].scraped_at = Some(now - Duration::days(10));
    let snapshot = engine.snapshot("sku-42", &batch(offers), now);
    let judgment = engine.judge(&snapshot, 100.0, now);

    assert_eq!(
        judgment.quality.reason_messages(),
        vec!["data is 10 days old", "very high price dispersion"]
    );
    assert_eq!(judgment.reliability, Reliability::Limited);
}

#[test]
fn noisy_provider_batch_still_yields_a_market() {
    let json = r#"{
        "productId": "sku-42",
        "offers": [
            {"source": null, "title": "Product", "price": 100.0, "scrapedAt": "2026-10-01"},
            {"source": "Shop B", "title": null, "price": 110.0, "scrapedAt": "kürzlich"},
            {"source": "Shop C", "title": "Product", "price": null},
            {"source": "Shop D", "title": "Product gebraucht", "price": 60.0, "url": null}
        ]
    }"#;
    let result: SearchResult = serde_json::from_str(json).unwrap();
    let engine = MarketEngine::default();
    let now = Utc::now();
    let snapshot = engine.snapshot("sku-42", &result, now);
    let judgment = engine.judge(&snapshot, 105.0, now);

    // the null-priced offer is dropped, the used one excluded
    assert_eq!(judgment.total_offers, 3);
    assert_eq!(judgment.used_excluded, 1);
    assert_eq!(judgment.metrics.count, 2);
    assert_eq!(judgment.metrics.avg, 105.0);
    assert_eq!(judgment.position, Position::AtAverage);
}
