//! NemoGuard safety client.
//!
//! Content moderation and jailbreak detection for the bridge's
//! `/safety/check` route. When disabled, every check answers safe without
//! looking at the text.

use async_trait::async_trait;

use deepfish_core::{config::SafetyConfig, traits::SafetyClient, Result};

use crate::guardrails::{Guardrail, JailbreakPhraseDetector};

/// Safety client backed by a guardrail chain.
pub struct NemoGuardSafetyClient {
    enabled: bool,
    guardrail: Box<dyn Guardrail>,
}

impl NemoGuardSafetyClient {
    /// Build the client from configuration.
    pub fn new(config: &SafetyConfig) -> Result<Self> {
        let detector = JailbreakPhraseDetector::new(config.blocked_phrases.as_slice())?;
        Ok(Self::with_guardrail(config.enabled, Box::new(detector)))
    }

    /// Build the client around an arbitrary guardrail.
    pub fn with_guardrail(enabled: bool, guardrail: Box<dyn Guardrail>) -> Self {
        if !enabled {
            tracing::warn!("Safety enforcement disabled; all checks will pass");
        }
        Self { enabled, guardrail }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[async_trait]
impl SafetyClient for NemoGuardSafetyClient {
    async fn check_input(&self, text: &str) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }

        let result = self.guardrail.check_input(text).await?;
        if !result.passed {
            tracing::warn!(reason = ?result.reason, "Jailbreak attempt detected");
        }
        Ok(result.passed)
    }

    async fn check_output(&self, text: &str) -> Result<bool> {
        if !self.enabled {
            return Ok(true);
        }

        let result = self.guardrail.check_output(text).await?;
        if !result.passed {
            tracing::warn!(reason = ?result.reason, "Unsafe output detected");
        }
        Ok(result.passed)
    }
}
