// Core structs: Offer, ClassifiedOffer, MarketMetrics, judgments and errors
use crate::utils::parse_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::warn;

// Provider payloads are noisy: a bad field degrades to its default instead of
// failing the whole batch.

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn number_or_none(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// An unreadable price becomes 0.0 and is dropped at ingest.
fn lenient_price<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(number_or_none(&Value::deserialize(d)?).unwrap_or(0.0))
}

fn lenient_rating<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number_or_none(&Value::deserialize(d)?))
}

fn lenient_datetime<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => parse_datetime(&s),
        _ => None,
    })
}

fn lenient_offers<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Offer>, D::Error> {
    let raw = match Value::deserialize(d)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    let total = raw.len();
    let offers: Vec<Offer> = raw
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if offers.len() < total {
        warn!("⚠️ Skipped {} unreadable offer entries", total - offers.len());
    }
    Ok(offers)
}

fn lenient_summary<'de, D: Deserializer<'de>>(d: D) -> Result<Option<SearchSummary>, D::Error> {
    Ok(serde_json::from_value(Value::deserialize(d)?).ok())
}

/// One third-party listing for a product, as returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_rating")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub scraped_at: Option<DateTime<Utc>>,
}

impl Offer {
    /// An offer can only be ingested with a positive, finite price.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Refurbished => "refurbished",
        };
        f.write_str(s)
    }
}

/// First rule that removed an offer from the core set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "condition")]
pub enum Exclusion {
    NotNew(Condition),
    ExcludedSource,
    Bundle,
}

/// Offer plus derived facts. The wrapped offer is never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedOffer {
    pub offer: Offer,
    pub condition: Condition,
    pub exclusion: Option<Exclusion>,
}

impl ClassifiedOffer {
    pub fn is_comparable(&self) -> bool {
        self.exclusion.is_none()
    }
}

/// Offers judged fair to compare against the merchant's price.
/// Every member has `Condition::New` and no exclusion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreSet {
    offers: Vec<ClassifiedOffer>,
}

impl CoreSet {
    /// Keeps only comparable offers, preserving input order.
    pub fn from_classified(offers: &[ClassifiedOffer]) -> Self {
        Self {
            offers: offers
                .iter()
                .filter(|o| o.is_comparable() && o.condition == Condition::New)
                .cloned()
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.offers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn offers(&self) -> &[ClassifiedOffer] {
        &self.offers
    }

    pub fn prices(&self) -> Vec<f64> {
        self.offers.iter().map(|o| o.offer.price).collect()
    }
}

/// Aggregates over core set prices. All zero when `count == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMetrics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub spread_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    FarBelow,
    Below,
    AtAverage,
    Above,
    FarAbove,
    Unknown,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::FarBelow => "far_below",
            Position::Below => "below",
            Position::AtAverage => "at_average",
            Position::Above => "above",
            Position::FarAbove => "far_above",
            Position::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityReason {
    TooFewOffers,
    StaleData { days: i64 },
    HighDispersion,
}

impl fmt::Display for QualityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityReason::TooFewOffers => f.write_str("too few comparable offers"),
            QualityReason::StaleData { days } => write!(f, "data is {} days old", days),
            QualityReason::HighDispersion => f.write_str("very high price dispersion"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityAssessment {
    pub is_uncertain: bool,
    pub reasons: Vec<QualityReason>,
}

impl QualityAssessment {
    pub fn reason_messages(&self) -> Vec<String> {
        self.reasons.iter().map(|r| r.to_string()).collect()
    }

    pub fn has_reason(&self, message: &str) -> bool {
        self.reasons.iter().any(|r| r.to_string() == message)
    }
}

/// Coarse two-level label consumed where the detailed reasons are not shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Reliable,
    Limited,
}

/// Cached, merchant-price independent result of one ingestion batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub product_id: String,
    pub offers: Vec<ClassifiedOffer>,
    pub metrics: MarketMetrics,
    pub fetched_at: DateTime<Utc>,
    pub data_as_of: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn core_set(&self) -> CoreSet {
        CoreSet::from_classified(&self.offers)
    }

    pub fn count_excluded(&self, exclusion: Exclusion) -> usize {
        self.offers
            .iter()
            .filter(|o| o.exclusion == Some(exclusion))
            .count()
    }
}

/// Market judgment for one merchant price, recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketJudgment {
    pub product_id: String,
    pub merchant_price: f64,
    pub total_offers: usize,
    pub used_excluded: usize,
    pub source_excluded: usize,
    pub bundle_excluded: usize,
    pub metrics: MarketMetrics,
    pub diff_pct: Option<f64>,
    pub position: Position,
    pub quality: QualityAssessment,
    pub reliability: Reliability,
    pub data_age_days: i64,
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub product_id: String,
    pub max_results: u32,
    pub force_refresh: bool,
}

/// Upstream aggregates. Parsed for logging only, never trusted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSummary {
    pub found: usize,
    pub avg_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub your_position: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub product_id: String,
    #[serde(default, deserialize_with = "lenient_offers")]
    pub offers: Vec<Offer>,
    #[serde(default, deserialize_with = "lenient_summary")]
    pub summary: Option<SearchSummary>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    #[error("product not found by search provider")]
    NotFound,
    #[error("search provider quota exhausted")]
    RateLimited,
    #[error("search provider failed: {0}")]
    ServerError(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::ServerError(_))
    }

    /// Message shown to the merchant.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::NotFound => "Für dieses Produkt wurden keine Angebote gefunden.",
            FetchError::RateLimited => {
                "Das Suchkontingent ist erschöpft. Bitte versuche es später erneut."
            }
            FetchError::ServerError(_) => {
                "Die Konkurrenzsuche ist fehlgeschlagen. Bitte versuche es erneut."
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}
