//! Content moderation trait.

use async_trait::async_trait;
use crate::error::Result;
use crate::types::CheckMode;

/// Client for input/output safety verdicts. `true` means safe.
#[async_trait]
pub trait SafetyClient: Send + Sync {
    /// Check user input (jailbreak, toxicity).
    async fn check_input(&self, text: &str) -> Result<bool>;

    /// Check model output before it reaches the user.
    async fn check_output(&self, text: &str) -> Result<bool>;

    /// Dispatch on `mode`.
    async fn check(&self, text: &str, mode: CheckMode) -> Result<bool> {
        match mode {
            CheckMode::Input => self.check_input(text).await,
            CheckMode::Output => self.check_output(text).await,
        }
    }
}
