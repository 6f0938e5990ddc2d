#![deny(unused)]
//! Governance for the DeepFish bridge.
//!
//! This crate provides:
//! - Input/output guardrails and the NemoGuard safety client
//! - Tracing subscriber setup
//! - Prometheus metrics

pub mod guardrails;
pub mod metrics;
pub mod safety;
pub mod tracing_layer;

pub use guardrails::{Guardrail, GuardrailResult, JailbreakPhraseDetector};
pub use metrics::{setup_metrics_exporter, track_request};
pub use safety::NemoGuardSafetyClient;
pub use tracing_layer::configure_tracing;
