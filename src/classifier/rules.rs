use serde::Deserialize;

/// Keyword tables driving condition classification and comparability.
/// All matching is case-insensitive substring matching.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassificationRules {
    pub used_title_keywords: Vec<String>,
    /// Classifieds and resale channels whose listings are second-hand.
    pub used_sources: Vec<String>,
    pub refurbished_title_keywords: Vec<String>,
    /// Marketplaces never compared against the merchant's price.
    pub excluded_sources: Vec<String>,
    pub bundle_keywords: Vec<String>,
    /// Phrases removed from the title before bundle keywords are checked.
    pub bundle_exceptions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ClassificationRules {
    fn default() -> Self {
        Self {
            used_title_keywords: strings(&["gebraucht", "used", "wie neu", "zustand"]),
            used_sources: strings(&[
                "kleinanzeigen",
                "willhaben",
                "shpock",
                "quoka",
                "vinted",
                "rebuy",
                "momox",
                "medimops",
            ]),
            refurbished_title_keywords: strings(&["refurbished", "generalüberholt"]),
            excluded_sources: strings(&[
                "ebay",
                "kleinanzeigen",
                "willhaben",
                "shpock",
                "quoka",
                "vinted",
                "rebuy",
                "momox",
                "medimops",
                "back market",
                "backmarket",
                "refurbed",
            ]),
            bundle_keywords: strings(&[
                "bundle",
                "set",
                "kit",
                "paket",
                "creator edition",
                "limited edition",
                "edition",
                "combo",
                "+",
                "mit ",
                "inkl",
                "zubehör",
            ]),
            bundle_exceptions: strings(&["standard edition"]),
        }
    }
}

impl ClassificationRules {
    /// Lower-cases every table once so matching can compare directly.
    pub fn normalized(mut self) -> Self {
        for table in [
            &mut self.used_title_keywords,
            &mut self.used_sources,
            &mut self.refurbished_title_keywords,
            &mut self.excluded_sources,
            &mut self.bundle_keywords,
            &mut self.bundle_exceptions,
        ] {
            for entry in table.iter_mut() {
                *entry = entry.to_lowercase();
            }
            table.retain(|e| !e.trim().is_empty());
        }
        self
    }
}
