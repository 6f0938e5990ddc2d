#![deny(unused)]
//! Core types, traits, and error definitions for the DeepFish bridge.
//!
//! This crate provides the building blocks shared by the gateway and the
//! collaborator crates: the request envelope, the collaborator traits, the
//! error taxonomy, and layered configuration.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
