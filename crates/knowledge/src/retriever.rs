//! NeMo Retriever client.
//!
//! Lookup pipeline: corpus candidates -> remote rerank -> best chunk.
//! The rerank call is best-effort. Any failure (missing key, transport,
//! timeout, non-2xx, bad body) degrades to default order instead of
//! surfacing to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use url::Url;

use deepfish_core::{
    config::RetrieverConfig,
    traits::KnowledgeClient,
    types::{Lookup, Ranking, RankingMode},
    Error, Result,
};

use crate::corpus::Corpus;

/// Ordered candidates produced by [`NemoRetrieverClient::rerank`].
#[derive(Debug, Clone, PartialEq)]
pub struct Reranked {
    pub mode: RankingMode,
    pub rankings: Vec<Ranking>,
}

impl Reranked {
    fn default_order(len: usize) -> Self {
        Self {
            mode: RankingMode::DefaultOrder,
            rankings: (0..len).map(|index| Ranking { index, logit: 0.0 }).collect(),
        }
    }

    /// Index of the top-ranked candidate.
    pub fn best(&self) -> Option<usize> {
        self.rankings.first().map(|r| r.index)
    }
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: Passage<'a>,
    passages: Vec<Passage<'a>>,
}

#[derive(Serialize)]
struct Passage<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct RerankResponse {
    #[serde(default)]
    rankings: Vec<Ranking>,
}

/// Knowledge client backed by the NVIDIA reranking API.
pub struct NemoRetrieverClient {
    client: Client,
    rerank_url: Url,
    api_key: Option<Secret<String>>,
    model: String,
    corpus: Corpus,
}

impl NemoRetrieverClient {
    /// Build the client. Fails only on an unusable base URL or HTTP client;
    /// a missing API key is logged and leaves reranking in default order.
    pub fn new(config: &RetrieverConfig, corpus: Corpus) -> Result<Self> {
        let rerank_url = Url::parse(&format!(
            "{}/retrieval/nvidia/reranking",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| Error::config(format!("Invalid retriever base URL '{}': {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.rerank_timeout_ms))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::error!("NVIDIA_API_KEY required for RAG; reranking will use default order");
        }

        Ok(Self {
            client,
            rerank_url,
            api_key: config.api_key.clone(),
            model: config.rerank_model.clone(),
            corpus,
        })
    }

    /// Endpoint the rerank call posts to.
    pub fn rerank_url(&self) -> &Url {
        &self.rerank_url
    }

    /// Rerank `documents` against `query`. Never fails.
    pub async fn rerank(&self, query: &str, documents: &[String]) -> Reranked {
        let reranked = match self.request_rankings(query, documents).await {
            Ok(rankings) => Reranked {
                mode: RankingMode::Ranked,
                rankings,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Rerank API failed, using default order");
                Reranked::default_order(documents.len())
            }
        };

        metrics::counter!("bridge_rerank_total", "mode" => reranked.mode.as_str()).increment(1);
        reranked
    }

    async fn request_rankings(&self, query: &str, documents: &[String]) -> Result<Vec<Ranking>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| Error::remote("no API key configured"))?;

        let payload = RerankRequest {
            model: &self.model,
            query: Passage { text: query },
            passages: documents.iter().map(|d| Passage { text: d }).collect(),
        };

        let response = self
            .client
            .post(self.rerank_url.clone())
            .bearer_auth(api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::remote(format!("Rerank request timed out: {}", e))
                } else {
                    Error::remote(format!("Rerank request failed: {}", e))
                }
            })?
            .error_for_status()
            .map_err(|e| Error::remote(e.to_string()))?;

        let body: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::remote(format!("Invalid rerank response: {}", e)))?;

        if let Some(bad) = body.rankings.iter().find(|r| r.index >= documents.len()) {
            return Err(Error::remote(format!(
                "Rerank index {} out of range for {} passages",
                bad.index,
                documents.len()
            )));
        }

        Ok(body.rankings)
    }
}

#[async_trait]
impl KnowledgeClient for NemoRetrieverClient {
    async fn lookup(&self, query: &str, collection: &str) -> Result<Lookup> {
        tracing::info!(collection = %collection, "Querying collection");

        let candidates = self.corpus.candidates(collection);
        if candidates.is_empty() {
            return Ok(Lookup::no_match(RankingMode::DefaultOrder));
        }

        let reranked = self.rerank(query, candidates).await;
        let chunk = reranked
            .best()
            .and_then(|i| candidates.get(i))
            .cloned()
            .unwrap_or_default();

        Ok(Lookup::new(chunk, reranked.mode))
    }
}
