// Cache gate and per-product fetch coordination in front of the engine.
use crate::engine::MarketEngine;
use crate::model::{FetchError, MarketJudgment, MarketSnapshot, SearchRequest};
use crate::source::OfferSource;
use crate::storage::OfferCache;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

type SharedFetch = Shared<BoxFuture<'static, Result<MarketSnapshot, FetchError>>>;

struct InFlight {
    ticket: u64,
    fetch: SharedFetch,
}

struct Inner {
    source: Arc<dyn OfferSource>,
    cache: OfferCache,
    engine: MarketEngine,
    in_flight: Mutex<HashMap<String, InFlight>>,
    // newest ticket written to the cache, per product
    written: Mutex<HashMap<String, Arc<Mutex<u64>>>>,
    next_ticket: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl Inner {
    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, InFlight>> {
        lock(&self.in_flight)
    }

    /// Writes the snapshot unless a newer fetch already stored one.
    fn store(&self, product_id: &str, ticket: u64, snapshot: &MarketSnapshot) {
        let slot = lock(&self.written)
            .entry(product_id.to_string())
            .or_default()
            .clone();
        let mut last_written = lock(&slot);
        if *last_written > ticket {
            info!(
                "🗑️ Fetch #{} for {} lost to #{}; result not cached",
                ticket, product_id, *last_written
            );
            return;
        }
        match self.cache.set(product_id, snapshot) {
            Ok(()) => *last_written = ticket,
            Err(e) => warn!("❌ Cache write failed for {}: {}", product_id, e),
        }
    }
}

/// Serves market snapshots from the cache or a coordinated fetch.
///
/// Concurrent non-forced requests for one product share a single fetch. A forced
/// refresh supersedes any fetch in flight: only the newest fetch writes the cache.
#[derive(Clone)]
pub struct MarketService {
    inner: Arc<Inner>,
}

impl MarketService {
    pub fn new(source: Arc<dyn OfferSource>, cache: OfferCache, engine: MarketEngine) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                cache,
                engine,
                in_flight: Mutex::new(HashMap::new()),
                written: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(1),
            }),
        }
    }

    pub async fn snapshot(&self, req: &SearchRequest) -> Result<MarketSnapshot, FetchError> {
        if !req.force_refresh {
            if let Some(snapshot) = self.inner.cache.get(&req.product_id) {
                info!("💾 Using cached offers for {}", req.product_id);
                return Ok(snapshot);
            }
        }

        let fetch = {
            let mut in_flight = self.inner.in_flight();

            if !req.force_refresh {
                if let Some(running) = in_flight.get(&req.product_id) {
                    info!("🔗 Joining in-flight fetch for {}", req.product_id);
                    running.fetch.clone()
                } else {
                    Self::start_fetch(&self.inner, &mut in_flight, req)
                }
            } else {
                if in_flight.contains_key(&req.product_id) {
                    info!("⏭️ Forced refresh supersedes in-flight fetch for {}", req.product_id);
                }
                Self::start_fetch(&self.inner, &mut in_flight, req)
            }
        };

        fetch.await
    }

    /// Snapshot plus judgment for the merchant's price.
    pub async fn evaluate(
        &self,
        req: &SearchRequest,
        merchant_price: f64,
    ) -> Result<MarketJudgment, FetchError> {
        let snapshot = self.snapshot(req).await?;
        Ok(self.inner.engine.judge(&snapshot, merchant_price, Utc::now()))
    }

    fn start_fetch(
        inner: &Arc<Inner>,
        in_flight: &mut HashMap<String, InFlight>,
        req: &SearchRequest,
    ) -> SharedFetch {
        let ticket = inner.next_ticket.fetch_add(1, Ordering::SeqCst);
        let fetch = Self::run_fetch(inner.clone(), req.clone(), ticket)
            .boxed()
            .shared();
        in_flight.insert(
            req.product_id.clone(),
            InFlight {
                ticket,
                fetch: fetch.clone(),
            },
        );
        fetch
    }

    async fn run_fetch(
        inner: Arc<Inner>,
        req: SearchRequest,
        ticket: u64,
    ) -> Result<MarketSnapshot, FetchError> {
        let outcome = inner
            .source
            .search(&req)
            .await
            .map(|result| inner.engine.snapshot(&req.product_id, &result, Utc::now()));

        let is_latest = inner
            .in_flight()
            .get(&req.product_id)
            .is_some_and(|f| f.ticket == ticket);

        match &outcome {
            Ok(snapshot) if is_latest => inner.store(&req.product_id, ticket, snapshot),
            Ok(_) => info!(
                "🗑️ Fetch #{} for {} was superseded; result not cached",
                ticket, req.product_id
            ),
            Err(e) => warn!("❌ Fetch for {} failed: {}", req.product_id, e),
        }

        // the entry stays until the write lands so late joiners share this result
        let mut in_flight = inner.in_flight();
        if in_flight
            .get(&req.product_id)
            .is_some_and(|f| f.ticket == ticket)
        {
            in_flight.remove(&req.product_id);
        }
        drop(in_flight);

        outcome
    }
}
