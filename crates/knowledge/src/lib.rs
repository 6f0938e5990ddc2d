#![deny(unused)]
//! Knowledge collaborator for the DeepFish bridge.
//!
//! Candidate documents come from an in-memory [`Corpus`]; ordering comes
//! from the NeMo Retriever reranking API, with a default-order fallback
//! whenever that call fails.

pub mod corpus;
pub mod retriever;

pub use corpus::Corpus;
pub use retriever::{NemoRetrieverClient, Reranked};
