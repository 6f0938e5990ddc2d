//! Mock implementations of the collaborator traits for testing.
//!
//! Used by the gateway's router tests and the workspace system tests.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::{
    traits::{KnowledgeClient, SafetyClient},
    types::{CheckMode, Lookup, RankingMode},
    Error, Result,
};

// =============================================================================
// Mock Knowledge Client
// =============================================================================

/// Knowledge client that returns a fixed lookup or a fixed fault.
pub struct MockKnowledgeClient {
    outcome: std::result::Result<Lookup, String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockKnowledgeClient {
    /// Always answer with `chunk`, ranked.
    pub fn chunk(chunk: &str) -> Self {
        Self::with_lookup(Lookup::new(chunk, RankingMode::Ranked))
    }

    pub fn with_lookup(lookup: Lookup) -> Self {
        Self {
            outcome: Ok(lookup),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fail with a remote fault carrying `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(query, collection)` pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeClient for MockKnowledgeClient {
    async fn lookup(&self, query: &str, collection: &str) -> Result<Lookup> {
        self.calls
            .lock()
            .unwrap()
            .push((query.to_string(), collection.to_string()));
        self.outcome.clone().map_err(Error::remote)
    }
}

// =============================================================================
// Mock Safety Client
// =============================================================================

/// Safety client that flags any text containing a marker substring.
pub struct MockSafetyClient {
    unsafe_marker: Option<String>,
    fault: Option<String>,
    calls: Mutex<Vec<CheckMode>>,
}

impl MockSafetyClient {
    /// Everything is safe.
    pub fn permissive() -> Self {
        Self {
            unsafe_marker: None,
            fault: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Text containing `marker` is unsafe in either direction.
    pub fn flagging(marker: &str) -> Self {
        Self {
            unsafe_marker: Some(marker.to_string()),
            ..Self::permissive()
        }
    }

    /// Every check fails with a remote fault.
    pub fn failing(message: &str) -> Self {
        Self {
            fault: Some(message.to_string()),
            ..Self::permissive()
        }
    }

    /// Modes checked so far, in order.
    pub fn calls(&self) -> Vec<CheckMode> {
        self.calls.lock().unwrap().clone()
    }

    fn verdict(&self, text: &str, mode: CheckMode) -> Result<bool> {
        self.calls.lock().unwrap().push(mode);
        if let Some(ref fault) = self.fault {
            return Err(Error::remote(fault.clone()));
        }
        Ok(match self.unsafe_marker {
            Some(ref marker) => !text.contains(marker.as_str()),
            None => true,
        })
    }
}

#[async_trait]
impl SafetyClient for MockSafetyClient {
    async fn check_input(&self, text: &str) -> Result<bool> {
        self.verdict(text, CheckMode::Input)
    }

    async fn check_output(&self, text: &str) -> Result<bool> {
        self.verdict(text, CheckMode::Output)
    }
}
