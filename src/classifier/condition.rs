use crate::classifier::rules::ClassificationRules;
use crate::model::{Condition, Offer};
use crate::utils::find_keyword;
use tracing::debug;

pub trait Classifier {
    fn classify(&self, offer: &Offer) -> Condition;
}

/// Labels offers from title and source keywords. Used signals win over
/// refurbished ones; an offer with no signal is treated as new.
pub struct ConditionClassifier {
    rules: ClassificationRules,
}

impl ConditionClassifier {
    pub fn new(rules: ClassificationRules) -> Self {
        Self {
            rules: rules.normalized(),
        }
    }
}

impl Default for ConditionClassifier {
    fn default() -> Self {
        Self::new(ClassificationRules::default())
    }
}

impl Classifier for ConditionClassifier {
    fn classify(&self, offer: &Offer) -> Condition {
        let title = offer.title.to_lowercase();
        let source = offer.source.to_lowercase();

        if let Some(keyword) = find_keyword(&title, &self.rules.used_title_keywords) {
            debug!("used by title keyword '{}': {}", keyword, offer.title);
            return Condition::Used;
        }
        if let Some(keyword) = find_keyword(&source, &self.rules.used_sources) {
            debug!("used by source '{}': {}", keyword, offer.source);
            return Condition::Used;
        }
        if find_keyword(&title, &self.rules.refurbished_title_keywords).is_some() {
            return Condition::Refurbished;
        }

        Condition::New
    }
}
