// German market texts built from a judgment
use crate::model::{MarketJudgment, Position, QualityReason, Reliability};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub summary: String,
    pub overview: Vec<String>,
    pub position: String,
    pub data_quality: String,
}

impl Narrative {
    /// Plain-text rendering for logs and terminals.
    pub fn to_text(&self) -> String {
        let mut text = format!("{}\n", self.summary);
        for bullet in &self.overview {
            text.push_str(&format!("• {}\n", bullet));
        }
        text.push_str(&format!("{}\n{}", self.position, self.data_quality));
        text
    }
}

pub fn position_label(position: Position) -> &'static str {
    match position {
        Position::FarBelow => "deutlich unter dem Marktdurchschnitt",
        Position::Below => "unter dem Marktdurchschnitt",
        Position::AtAverage => "im Marktdurchschnitt",
        Position::Above => "über dem Marktdurchschnitt",
        Position::FarAbove => "deutlich über dem Marktdurchschnitt",
        Position::Unknown => "nicht einordenbar",
    }
}

pub fn reliability_label(reliability: Reliability) -> &'static str {
    match reliability {
        Reliability::Reliable => "zuverlässig",
        Reliability::Limited => "eingeschränkt zuverlässig",
    }
}

fn reason_text(reason: &QualityReason) -> String {
    match reason {
        QualityReason::TooFewOffers => "zu wenige vergleichbare Angebote".to_string(),
        QualityReason::StaleData { days } => format!("die Daten sind {} Tage alt", days),
        QualityReason::HighDispersion => "sehr hohe Preisstreuung".to_string(),
    }
}

fn euro(value: f64) -> String {
    format!("{:.2} €", value)
}

fn offers_word(n: usize) -> &'static str {
    if n == 1 { "Angebot" } else { "Angebote" }
}

fn exclusion_bullet(j: &MarketJudgment) -> Option<String> {
    let mut parts = Vec::new();
    if j.used_excluded > 0 {
        parts.push(format!("{} gebraucht/generalüberholt", j.used_excluded));
    }
    if j.source_excluded > 0 {
        parts.push(format!("{} von Marktplätzen", j.source_excluded));
    }
    if j.bundle_excluded > 0 {
        parts.push(format!("{} Bundles/Varianten", j.bundle_excluded));
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("Nicht berücksichtigt: {}", parts.join(", ")))
    }
}

fn deviation_sentence(j: &MarketJudgment, reference: &str) -> String {
    match j.diff_pct {
        Some(d) if d > 0.0 => format!(
            "Dein Preis von {} liegt {:.2} % über {}.",
            euro(j.merchant_price),
            d,
            reference
        ),
        Some(d) if d < 0.0 => format!(
            "Dein Preis von {} liegt {:.2} % unter {}.",
            euro(j.merchant_price),
            d.abs(),
            reference
        ),
        Some(_) => format!(
            "Dein Preis von {} entspricht genau {}.",
            euro(j.merchant_price),
            reference
        ),
        None => format!("Dein Preis lässt sich nicht mit {} vergleichen.", reference),
    }
}

fn data_quality_sentence(j: &MarketJudgment) -> String {
    if j.quality.is_uncertain {
        let reasons: Vec<String> = j.quality.reasons.iter().map(reason_text).collect();
        format!("Eingeschränkte Aussagekraft: {}.", reasons.join(", "))
    } else {
        format!(
            "Die Markteinschätzung ist {} ({} vergleichbare Angebote).",
            reliability_label(j.reliability),
            j.metrics.count
        )
    }
}

pub fn build_narrative(j: &MarketJudgment) -> Narrative {
    let m = &j.metrics;
    let mut overview = Vec::new();

    let (summary, position) = match m.count {
        0 => {
            overview.push(format!(
                "{} {} gefunden, keines davon vergleichbar.",
                j.total_offers,
                offers_word(j.total_offers)
            ));
            (
                "Es wurden keine vergleichbaren Angebote gefunden.".to_string(),
                "Ohne vergleichbare Angebote ist keine Einordnung deines Preises möglich."
                    .to_string(),
            )
        }
        1 => {
            overview.push(format!("Einziges vergleichbares Angebot: {}", euro(m.avg)));
            (
                format!(
                    "Es wurde nur ein vergleichbares Angebot gefunden ({}).",
                    euro(m.avg)
                ),
                format!(
                    "{} Ein einzelnes Angebot erlaubt keine belastbare Einordnung.",
                    deviation_sentence(j, "diesem Angebot")
                ),
            )
        }
        n => {
            overview.push(format!("Günstigstes Angebot: {}", euro(m.min)));
            overview.push(format!("Teuerstes Angebot: {}", euro(m.max)));
            overview.push(format!("Durchschnittspreis: {}", euro(m.avg)));
            overview.push(format!("Preisspanne: {:.2} %", m.spread_pct));
            (
                format!(
                    "{} vergleichbare Angebote zwischen {} und {} (Ø {}).",
                    n,
                    euro(m.min),
                    euro(m.max),
                    euro(m.avg)
                ),
                match j.position {
                    Position::Unknown => deviation_sentence(j, "dem Durchschnitt"),
                    position => format!(
                        "{} Damit liegst du {}.",
                        deviation_sentence(j, "dem Durchschnitt"),
                        position_label(position)
                    ),
                },
            )
        }
    };

    if let Some(bullet) = exclusion_bullet(j) {
        overview.push(bullet);
    }

    Narrative {
        summary,
        overview,
        position,
        data_quality: data_quality_sentence(j),
    }
}
