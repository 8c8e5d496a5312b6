//! Reconciliation data types.
//!
//! `RawFinding` is the untrusted wire shape the model emits. Every field is
//! optional because the payload is adversarial input, not a typed domain
//! object: presence, type, and bounds are all re-checked before use.
//! `Candidate` is the normalizer's output and the unit that flows through
//! the pipeline; `ResolvedSpan` is a verified, exact-offset finding.

use serde::{Deserialize, Serialize};

/// Fallback reason attached when the model omits one.
pub const DEFAULT_REASON: &str = "薬機法に抵触する可能性があります";

/// One unverified finding from the model response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFinding {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub matched_text: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub position: Option<RawPosition>,
}

/// Claimed character offsets, both optional and possibly nonsense.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawPosition {
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

/// A normalized candidate: non-empty trimmed claimed text, original fields
/// carried through, input-order index retained for the synthetic id.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Position in the model's issue list, before any filtering.
    pub index: usize,
    pub name: String,
    /// The model's claimed text, verbatim.
    pub verbatim: String,
    /// Trimmed claimed text; never empty. All matching uses this.
    pub text: String,
    pub reason: String,
    pub claimed_start: Option<i64>,
    pub claimed_end: Option<i64>,
}

impl Candidate {
    /// Normalize one raw finding (pipeline stage 1).
    ///
    /// The claimed text is `matchedText`, falling back to `name` when
    /// absent or empty (the original treats empty string as absent).
    /// Returns `None` when the trimmed text is empty; the candidate is
    /// dropped without an error.
    pub fn normalize(index: usize, raw: &RawFinding) -> Option<Self> {
        let verbatim = raw
            .matched_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(raw.name.as_deref())
            .unwrap_or("")
            .to_string();

        let text = verbatim.trim().to_string();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            index,
            name: raw.name.clone().unwrap_or_default(),
            verbatim,
            text,
            reason: raw
                .reason
                .clone()
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_REASON.to_string()),
            claimed_start: raw.position.and_then(|p| p.start),
            claimed_end: raw.position.and_then(|p| p.end),
        })
    }
}

/// Outcome of the position validator (stage 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionCheck {
    /// The claimed offsets are in bounds and agree with the claimed text.
    Valid { start: usize, end: usize },
    /// Offsets absent, out of bounds, or pointing at different text.
    Invalid,
}

/// Outcome of the recovery chain (stage 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    Recovered {
        start: usize,
        end: usize,
        strategy: RecoveryStrategy,
    },
    /// No strategy produced offsets; the candidate is dropped.
    Unrecoverable,
}

/// Which fallback located the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    ExactSearch,
    FoldedSearch,
    PrefixSearch,
}

impl RecoveryStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryStrategy::ExactSearch => "exact_search",
            RecoveryStrategy::FoldedSearch => "folded_search",
            RecoveryStrategy::PrefixSearch => "prefix_search",
        }
    }
}

/// A verified, exact-offset finding ready for display.
///
/// Invariant: `start < end <= document.char_len()` and the document slice
/// equals `expression` under trim + casefold, or one normalized string
/// contains the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSpan {
    pub start: usize,
    pub end: usize,
    /// The model's claimed text, verbatim (not normalized).
    pub expression: String,
    pub name: String,
    pub reason: String,
    /// Synthetic identifier, `"ai-detected-<index>"` with the candidate's
    /// input-order index. Stable within one call, not globally unique.
    pub id: String,
}

impl ResolvedSpan {
    pub fn new(candidate: &Candidate, start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            expression: candidate.verbatim.clone(),
            name: candidate.name.clone(),
            reason: candidate.reason.clone(),
            id: format!("ai-detected-{}", candidate.index),
        }
    }
}

/// Final answer of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResult {
    /// Emptiness of `issues`. Callers holding an external verdict may
    /// override this in their own output; the engine never does.
    pub passed: bool,
    pub issues: Vec<ResolvedSpan>,
    pub total_issues: usize,
}
