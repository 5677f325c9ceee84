use crate::analyzer::quality::QualityThresholds;
use crate::classifier::ClassificationRules;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    pub search_path: String,
    pub api_key: Option<String>,
    pub max_results: u32,
    pub timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            search_path: "/competitors/search".to_string(),
            api_key: None,
            max_results: 20,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub path: String,
    pub ttl_hours: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: "cache.db".to_string(),
            ttl_hours: 24,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProductConfig {
    pub product_id: String,
    pub merchant_price: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub rules: ClassificationRules,
    pub quality: QualityThresholds,
    pub products: Vec<ProductConfig>,
    pub check_interval_seconds: Option<u64>,
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_json::from_str(content)?;
    Ok(config)
}
