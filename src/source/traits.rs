use crate::model::{FetchError, SearchRequest, SearchResult};

/// Search provider returning the raw offer batch for one product.
/// Implementations return a complete batch or a mapped error, never a partial batch.
#[async_trait::async_trait]
pub trait OfferSource: Send + Sync {
    async fn search(&self, req: &SearchRequest) -> Result<SearchResult, FetchError>;
}
