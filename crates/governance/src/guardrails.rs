//! Guardrails for Input/Output validation.
//!
//! Scans prompts before they reach the LLM and completions before they
//! reach the user. The shipped detector is a blocked-phrase matcher.

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use deepfish_core::{Error, Result};

/// Result of a guardrail check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailResult {
    /// Whether the check passed.
    pub passed: bool,
    /// Reason for failure (if any).
    pub reason: Option<String>,
}

impl GuardrailResult {
    /// Create a passing result.
    pub fn pass() -> Self {
        Self {
            passed: true,
            reason: None,
        }
    }

    /// Create a failing result.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            passed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Guardrail trait for input/output interceptors.
#[async_trait]
pub trait Guardrail: Send + Sync {
    /// Check input before it reaches the LLM.
    async fn check_input(&self, input: &str) -> Result<GuardrailResult>;

    /// Check output before it's returned to the user.
    async fn check_output(&self, output: &str) -> Result<GuardrailResult>;
}

/// Jailbreak detector matching blocked phrases as case-insensitive
/// substrings.
pub struct JailbreakPhraseDetector {
    patterns: Vec<(String, Regex)>,
}

impl JailbreakPhraseDetector {
    /// Build a detector for `phrases`. Empty phrases are skipped.
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let phrase: &str = phrase.as_ref();
            if phrase.is_empty() {
                continue;
            }
            let re = Regex::new(&format!("(?i){}", regex::escape(phrase)))
                .map_err(|e| Error::config(format!("Invalid blocked phrase '{}': {}", phrase, e)))?;
            patterns.push((phrase.to_string(), re));
        }
        Ok(Self { patterns })
    }

    /// First blocked phrase found in `text`.
    pub fn detect(&self, text: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(phrase, _)| phrase.as_str())
    }
}

#[async_trait]
impl Guardrail for JailbreakPhraseDetector {
    async fn check_input(&self, input: &str) -> Result<GuardrailResult> {
        match self.detect(input) {
            Some(phrase) => Ok(GuardrailResult::fail(format!(
                "Jailbreak phrase detected: '{}'",
                phrase
            ))),
            None => Ok(GuardrailResult::pass()),
        }
    }

    async fn check_output(&self, _output: &str) -> Result<GuardrailResult> {
        // Jailbreak phrases only matter on the way in
        Ok(GuardrailResult::pass())
    }
}
