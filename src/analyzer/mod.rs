// Analyzer module: aggregates submodules for different aspects of analysis.

pub mod market_analysis;
pub mod metrics;
pub mod position;
pub mod quality;

// Re-export the main Analyzer implementation for ease of use.
pub use market_analysis::{Analyzer, AnalyzerImpl};
pub use quality::QualityThresholds;
