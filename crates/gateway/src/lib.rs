#![deny(unused)]
//! HTTP bridge for the DeepFish agent front-end.
//!
//! Routes simple JSON requests to the knowledge and safety collaborators
//! and maps their results and faults onto JSON responses.

pub mod server;

pub use server::{preview, AppState, BridgeConfig, BridgeServer};
