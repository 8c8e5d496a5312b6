//! Span reconciliation engine.
//!
//! Takes a reference document (the caption) and a list of candidate
//! findings from the model, and reconciles the claims into verified,
//! mutually non-overlapping character spans. The model reasons over tokens
//! and routinely misreports character offsets, so claimed positions are
//! treated as hints: validated when plausible, re-derived from the claimed
//! text when not.
//!
//! # Pipeline
//!
//! Per candidate, stages run in order and each later stage only sees
//! survivors of the earlier ones:
//!
//! 1. normalize ([`Candidate::normalize`]) — trim, drop empty claims
//! 2. validate ([`validate::check_position`]) — claimed offsets vs document
//! 3. recover ([`recover::recover_position`]) — search chain on mismatch
//! 4. verify ([`verify::verify_span`]) — final slice/claim agreement
//! 5. resolve overlaps ([`overlap::resolve_overlaps`]) — the only stage
//!    that needs the complete verified set
//!
//! # Design Decisions
//!
//! - **Character offsets**: indexing is by char, consistent end to end.
//! - **Best effort**: malformed or unlocatable candidates are dropped
//!   silently; partial loss is never an error.
//! - **Pure**: no I/O, no shared mutable state; safe to call concurrently
//!   for independent documents.

pub mod document;
pub mod overlap;
pub mod recover;
pub mod types;
pub mod validate;
pub mod verify;

pub use document::Document;
pub use types::{
    Candidate, PositionCheck, RawFinding, RawPosition, ReconciliationResult, Recovery,
    RecoveryStrategy, ResolvedSpan,
};

/// Reconcile model findings against a reference document.
///
/// This is the engine's entry point. Candidates are processed
/// independently through normalization, validation, recovery, and
/// verification; the verified set then goes through overlap resolution as
/// one batch. `passed` reflects emptiness of the final issue list; callers
/// holding an external verdict apply their own override.
pub fn reconcile(document: &str, findings: &[RawFinding]) -> ReconciliationResult {
    let doc = Document::new(document);

    let verified: Vec<ResolvedSpan> = findings
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| Candidate::normalize(index, raw))
        .filter_map(|candidate| {
            let (start, end) = match validate::check_position(&doc, &candidate) {
                PositionCheck::Valid { start, end } => (start, end),
                PositionCheck::Invalid => match recover::recover_position(&doc, &candidate) {
                    Recovery::Recovered { start, end, .. } => (start, end),
                    Recovery::Unrecoverable => return None,
                },
            };
            verify::verify_span(&doc, &candidate, start, end)
        })
        .collect();

    let issues = overlap::resolve_overlaps(verified);

    ReconciliationResult {
        passed: issues.is_empty(),
        total_issues: issues.len(),
        issues,
    }
}
