use clap::Parser;
use futures::future::join_all;
use price_scout::MarketEngine;
use price_scout::MarketService;
use price_scout::config::{ProductConfig, load_config};
use price_scout::model::SearchRequest;
use price_scout::narrative::build_narrative;
use price_scout::source::HttpOfferSource;
use price_scout::storage::{KeyValueStore, MemoryStore, OfferCache, SqliteStore};
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Competitor market position for configured products.
#[derive(Debug, Parser)]
#[command(name = "price-scout", version)]
struct Args {
    /// Path to the JSON configuration
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Only evaluate these product ids (repeatable)
    #[arg(short, long)]
    product: Vec<String>,

    /// Skip the cache on the first run
    #[arg(long)]
    force_refresh: bool,

    /// Keep re-evaluating every `check_interval_seconds`
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // Load configuration from file
    let config = match load_config(&args.config) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let source = match HttpOfferSource::new(&config.search) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to initialize search client: {}", e);
            return;
        }
    };

    let store: Arc<dyn KeyValueStore> = match SqliteStore::new(&config.cache.path) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            warn!("Cache database unavailable ({}), using in-memory cache", e);
            Arc::new(MemoryStore::new())
        }
    };
    let cache = OfferCache::new(store, chrono::Duration::hours(config.cache.ttl_hours));
    let engine = MarketEngine::new(config.rules.clone(), config.quality.clone());
    let service = MarketService::new(source, cache, engine);

    let products: Vec<&ProductConfig> = config
        .products
        .iter()
        .filter(|p| args.product.is_empty() || args.product.contains(&p.product_id))
        .collect();
    if products.is_empty() {
        warn!("No products to evaluate.");
        return;
    }

    let mut force_refresh = args.force_refresh;
    loop {
        info!("Products to process: {}", products.len());

        // Process all products concurrently
        let tasks: Vec<_> = products
            .iter()
            .map(|p| process_product(&service, p, config.search.max_results, force_refresh))
            .collect();
        join_all(tasks).await;
        force_refresh = false;

        if !args.watch {
            break;
        }
        let interval = config.check_interval_seconds.unwrap_or(3600);
        info!("Waiting for timer ({}s)...", interval);
        sleep(Duration::from_secs(interval)).await;
    }
}

/// Evaluates one product and prints its market narrative.
async fn process_product(
    service: &MarketService,
    product: &ProductConfig,
    max_results: u32,
    force_refresh: bool,
) {
    info!("Processing product: {}", product.product_id);
    let request = SearchRequest {
        product_id: product.product_id.clone(),
        max_results,
        force_refresh,
    };

    match service.evaluate(&request, product.merchant_price).await {
        Ok(judgment) => {
            info!(
                "📊 {}: {} ({:?} %), uncertain: {}",
                judgment.product_id,
                judgment.position,
                judgment.diff_pct,
                judgment.quality.is_uncertain
            );
            let narrative = build_narrative(&judgment);
            println!("== {} ==\n{}\n", product.product_id, narrative.to_text());
        }
        Err(e) => {
            warn!("❌ {}: {}", product.product_id, e);
            println!("== {} ==\n{}\n", product.product_id, e.user_message());
        }
    }
}
