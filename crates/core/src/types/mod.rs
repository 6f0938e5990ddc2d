//! Core type definitions for the bridge.
//!
//! `request` holds the inbound envelope; `knowledge` holds what the
//! knowledge collaborator hands back.

mod knowledge;
mod request;

pub use knowledge::*;
pub use request::*;
