//! Review history record.
//!
//! Each completed review is appended to an append-only JSONL ledger under
//! the capcheck home directory. The caption itself is not stored, only a
//! digest, so the ledger stays small and carries no draft marketing copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::review::ReviewReport;

/// One line of history.jsonl.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// Digest of the reviewed caption, "sha256:<hex>".
    pub caption_sha256: String,
    pub reviewed_at: DateTime<Utc>,
    /// Model that produced the findings.
    pub model: String,
    pub report: ReviewReport,
}

impl ReviewRecord {
    pub fn new(caption: &str, model: impl Into<String>, report: ReviewReport) -> Self {
        Self {
            caption_sha256: caption_digest(caption),
            reviewed_at: Utc::now(),
            model: model.into(),
            report,
        }
    }
}

/// SHA256 of the caption bytes, hex with a "sha256:" prefix.
pub fn caption_digest(caption: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(caption.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
