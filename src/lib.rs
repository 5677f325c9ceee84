pub mod analyzer;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod model;
pub mod narrative;
pub mod service;
pub mod source;
pub mod storage;
pub mod utils;

pub use engine::MarketEngine;
pub use service::MarketService;
