// Classifier module: condition labelling and comparability filtering.

pub mod comparability;
pub mod condition;
pub mod rules;

pub use comparability::ComparabilityFilter;
pub use condition::ConditionClassifier;
pub use rules::ClassificationRules;
