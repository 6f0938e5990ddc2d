use serde::{Deserialize, Serialize};

/// One entry of a reranker's output: a candidate index and its score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub index: usize,
    #[serde(default)]
    pub logit: f64,
}

/// How the candidate order behind a lookup was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// The remote reranker ordered the candidates.
    Ranked,
    /// The reranker was unreachable or misbehaved; candidates kept their
    /// retrieval order.
    DefaultOrder,
}

impl RankingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ranked => "ranked",
            Self::DefaultOrder => "default_order",
        }
    }
}

/// Result of a knowledge lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lookup {
    /// Best matching chunk. Empty means no match.
    pub chunk: String,
    pub ranking: RankingMode,
}

impl Lookup {
    pub fn new(chunk: impl Into<String>, ranking: RankingMode) -> Self {
        Self {
            chunk: chunk.into(),
            ranking,
        }
    }

    /// A lookup that found nothing.
    pub fn no_match(ranking: RankingMode) -> Self {
        Self::new(String::new(), ranking)
    }

    pub fn is_match(&self) -> bool {
        !self.chunk.is_empty()
    }
}
