// File: ./src/source.rs
// Upstream candidate source: an optional AI-backed extractor that may hand
// over already-structured tasks. The core treats errors and empty answers
// the same way (no result, fall back to rules).
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One already-structured task candidate. The due date is a literal string
/// (ideally `YYYY-MM-DD`); it gets validated downstream, never trusted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCandidate {
    pub title: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: String,
}

#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn extract(&self, transcript: &str) -> Result<Vec<TaskCandidate>>;
}

/// Source that never yields candidates, forcing the rule-based path. The
/// default when no AI backend is configured.
pub struct NoSource;

#[async_trait]
impl CandidateSource for NoSource {
    async fn extract(&self, _transcript: &str) -> Result<Vec<TaskCandidate>> {
        Ok(Vec::new())
    }
}

/// Decodes a candidate array out of a model response that may wrap the JSON
/// in prose: everything between the first `[` and the last `]` is parsed.
/// For implementors of real sources; the core never calls this itself.
pub fn parse_candidate_payload(text: &str) -> Result<Vec<TaskCandidate>> {
    let start = text.find('[').context("no JSON array in response")?;
    let end = text.rfind(']').context("no JSON array in response")?;
    if end < start {
        bail!("malformed JSON array in response");
    }
    serde_json::from_str(&text[start..=end]).context("candidate payload did not decode")
}
