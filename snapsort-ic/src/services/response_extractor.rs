//! Classifier response extraction
//!
//! The model answers in free text that is supposed to contain a JSON object.
//! Extraction runs two stages, each independently callable:
//!
//! 1. **Fenced**: the first ```` ```json ... ``` ```` block holding an object or
//!    array. A block that exists but does not parse fails the extraction; the
//!    raw stage is not attempted.
//! 2. **Raw**: when no fenced block exists, the whole (trimmed) text is parsed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```json\s*(\{.*?\}|\[.*?\])\s*```")
        .expect("fenced JSON pattern is valid")
});

/// Which extraction stage failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Fenced,
    Raw,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStage::Fenced => f.write_str("fenced block"),
            ExtractionStage::Raw => f.write_str("raw text"),
        }
    }
}

/// Classifier text that could not be parsed as JSON
#[derive(Debug, Clone, Error)]
#[error("malformed classifier response ({stage} parse failed: {reason}); response text: {text}")]
pub struct MalformedResponse {
    pub stage: ExtractionStage,
    pub reason: String,
    /// The offending text, kept for diagnostics
    pub text: String,
}

/// Body of the first ```` ```json ```` block, if any
pub fn find_fenced_json(text: &str) -> Option<&str> {
    FENCED_JSON
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str())
}

/// Fenced stage: `Ok(None)` when there is no fenced block
pub fn parse_fenced(text: &str) -> Result<Option<Value>, MalformedResponse> {
    let Some(body) = find_fenced_json(text) else {
        return Ok(None);
    };

    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| MalformedResponse {
            stage: ExtractionStage::Fenced,
            reason: e.to_string(),
            text: text.to_string(),
        })
}

/// Raw stage: the entire text must be JSON
pub fn parse_raw(text: &str) -> Result<Value, MalformedResponse> {
    serde_json::from_str(text).map_err(|e| MalformedResponse {
        stage: ExtractionStage::Raw,
        reason: e.to_string(),
        text: text.to_string(),
    })
}

/// Extract the structured record from classifier output
pub fn extract_json(text: &str) -> Result<Value, MalformedResponse> {
    let text = text.trim();
    match parse_fenced(text)? {
        Some(value) => Ok(value),
        None => parse_raw(text),
    }
}
