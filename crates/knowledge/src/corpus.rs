//! In-memory document corpus.
//!
//! Stands in for the vector database: each collection is a fixed list of
//! text chunks, returned whole as rerank candidates. Unknown collections
//! resolve to the default collection.

use std::collections::HashMap;

use deepfish_core::DEFAULT_COLLECTION;

/// Collections of candidate documents keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    collections: HashMap<String, Vec<String>>,
}

impl Corpus {
    /// Create an empty corpus.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in corpus seeded with the DeepFish reference documents.
    pub fn builtin() -> Self {
        Self::new().with_collection(
            DEFAULT_COLLECTION,
            vec![
                "DeepFish uses 'The Deep Way' philosophy.".to_string(),
                "Mei is the Project Manager agent.".to_string(),
                "NVIDIA provides the infrastructure layer.".to_string(),
            ],
        )
    }

    /// Add or replace a collection.
    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<String>) -> Self {
        self.collections.insert(name.into(), documents);
        self
    }

    /// Candidate documents for `collection`, falling back to the default
    /// collection. Empty when neither exists.
    pub fn candidates(&self, collection: &str) -> &[String] {
        self.collections
            .get(collection)
            .or_else(|| self.collections.get(DEFAULT_COLLECTION))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}
