//! Knowledge lookup trait.

use async_trait::async_trait;
use crate::error::Result;
use crate::types::Lookup;

/// Client for the retrieval/rerank service.
#[async_trait]
pub trait KnowledgeClient: Send + Sync {
    /// Return the single best-matching chunk for `query` in `collection`.
    ///
    /// Rerank failures must not surface here; implementations degrade to
    /// default order and report it through [`Lookup::ranking`].
    async fn lookup(&self, query: &str, collection: &str) -> Result<Lookup>;
}
