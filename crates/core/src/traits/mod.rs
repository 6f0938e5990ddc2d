//! Collaborator traits.
//!
//! - `knowledge`: retrieval/rerank lookups (KnowledgeClient)
//! - `safety`: content moderation (SafetyClient)

mod knowledge;
mod safety;

pub use knowledge::*;
pub use safety::*;
