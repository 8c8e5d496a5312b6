//! Caption compliance review orchestration.
//!
//! The reviewer builds the knowledge-grounded prompt, calls the chat
//! model, defensively parses the findings, and hands them to the
//! reconciliation engine. A model response that cannot be parsed fails the
//! whole call: the permissive fallback (treating an unavailable review as
//! a pass) is the caller's policy, not this layer's.

pub mod prompt;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::adapters::ChatModel;
use crate::domain::ReviewReport;
use crate::knowledge;
use crate::reconcile::{reconcile, RawFinding};

/// The model's raw review payload.
///
/// `passed` is the model's own verdict, independent of the findings list;
/// both are untrusted.
#[derive(Debug, Deserialize)]
struct ModelVerdict {
    #[serde(default)]
    passed: Option<bool>,
    /// Option so an explicit JSON null is tolerated like a missing field.
    #[serde(default)]
    issues: Option<Vec<RawFinding>>,
}

/// Compliance reviewer backed by a chat model.
pub struct Reviewer {
    model: Box<dyn ChatModel>,
    max_caption_bytes: usize,
}

impl Reviewer {
    pub fn new(model: Box<dyn ChatModel>, max_caption_bytes: usize) -> Self {
        Self {
            model,
            max_caption_bytes,
        }
    }

    /// Name of the underlying model, for logs and history records.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Review one caption against the process-wide knowledge store.
    pub async fn review(&self, caption: &str) -> Result<ReviewReport> {
        let items = knowledge::knowledge()?;
        self.review_with_knowledge(caption, items).await
    }

    /// Review against an explicit knowledge slice (used by tests and
    /// callers that manage their own store).
    pub async fn review_with_knowledge(
        &self,
        caption: &str,
        items: &[knowledge::KnowledgeItem],
    ) -> Result<ReviewReport> {
        if caption.trim().is_empty() {
            anyhow::bail!("Caption is empty");
        }
        if caption.len() > self.max_caption_bytes {
            anyhow::bail!(
                "Caption is too large: {} bytes (limit {})",
                caption.len(),
                self.max_caption_bytes
            );
        }

        let digest = knowledge::prompt_digest(items);
        let user_prompt = prompt::review_prompt(&digest, caption);

        debug!(knowledge_items = items.len(), "requesting compliance review");
        let raw = self
            .model
            .complete_json(prompt::REVIEW_SYSTEM, &user_prompt)
            .await?;

        let verdict: ModelVerdict = serde_json::from_str(&raw)
            .context("Model response was not valid review JSON")?;

        let findings = verdict.issues.unwrap_or_default();
        let result = reconcile(caption, &findings);
        info!(
            candidates = findings.len(),
            verified = result.total_issues,
            "reconciled review findings"
        );

        Ok(ReviewReport::from_reconciliation(result, verdict.passed))
    }
}
