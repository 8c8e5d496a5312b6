//! Span verification (pipeline stage 4).
//!
//! Final containment/equality check between resolved offsets and the
//! claimed text, with one last-chance rescan on mismatch. Offsets arriving
//! here came from validation or recovery and are already in bounds.

use tracing::debug;

use super::document::Document;
use super::types::{Candidate, ResolvedSpan};

/// Verify a candidate's resolved `(start, end)` against the document.
///
/// Both the slice and the claimed text are normalized (trim + lowercase)
/// and accepted when equal or when either contains the other. On mismatch,
/// a case-folded search of the full claimed text gets one chance to
/// recompute the offsets; otherwise the candidate is dropped.
pub fn verify_span(
    doc: &Document,
    candidate: &Candidate,
    start: usize,
    end: usize,
) -> Option<ResolvedSpan> {
    let actual = normalize(&doc.slice(start, end));
    let claimed = normalize(&candidate.text);

    if actual == claimed || actual.contains(&claimed) || claimed.contains(&actual) {
        return Some(ResolvedSpan::new(candidate, start, end));
    }

    // Last chance: the full claimed text may still sit elsewhere in the
    // document (e.g. a prefix hit landed on the wrong occurrence of a
    // repeated fragment while the real phrase exists verbatim).
    if let Some(found) = doc.find_folded(&candidate.text) {
        let found_end = found + candidate.text.chars().count();
        debug!(
            claimed = %candidate.text,
            start = found,
            end = found_end,
            "verification rescue via full-text search"
        );
        return Some(ResolvedSpan::new(candidate, found, found_end));
    }

    debug!(claimed = %candidate.text, start, end, "verification failed, dropping candidate");
    None
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::RawFinding;

    fn candidate(text: &str) -> Candidate {
        let raw = RawFinding {
            name: Some(text.to_string()),
            matched_text: Some(text.to_string()),
            reason: None,
            position: None,
        };
        Candidate::normalize(0, &raw).unwrap()
    }

    const DOC: &str = "朝はふんわり、夜はしっとり";

    #[test]
    fn test_exact_slice_verifies() {
        let doc = Document::new(DOC);
        let span = verify_span(&doc, &candidate("ふんわり"), 2, 6).unwrap();
        assert_eq!((span.start, span.end), (2, 6));
        assert_eq!(span.expression, "ふんわり");
    }

    #[test]
    fn test_partial_slice_verifies_by_containment() {
        let doc = Document::new(DOC);
        // Prefix recovery produced a 2-char window; the slice "ふん" is
        // contained in the claim.
        let span = verify_span(&doc, &candidate("ふんわり"), 2, 4).unwrap();
        assert_eq!((span.start, span.end), (2, 4));
    }

    #[test]
    fn test_case_differences_verify() {
        let doc = Document::new("Pure GLOW cream");
        let span = verify_span(&doc, &candidate("glow"), 5, 9).unwrap();
        assert_eq!((span.start, span.end), (5, 9));
    }

    #[test]
    fn test_rescue_moves_span_to_real_occurrence() {
        let doc = Document::new(DOC);
        // Offsets point at unrelated text, but the claim exists verbatim.
        let span = verify_span(&doc, &candidate("しっとり"), 0, 4).unwrap();
        assert_eq!((span.start, span.end), (9, 13));
    }

    #[test]
    fn test_unrelated_offsets_and_absent_text_drop() {
        let doc = Document::new(DOC);
        assert!(verify_span(&doc, &candidate("存在しない表現"), 0, 4).is_none());
    }

    #[test]
    fn test_expression_keeps_verbatim_text() {
        let doc = Document::new(DOC);
        let raw = RawFinding {
            name: Some("ふんわり".to_string()),
            matched_text: Some(" ふんわり ".to_string()),
            reason: None,
            position: None,
        };
        let c = Candidate::normalize(3, &raw).unwrap();
        let span = verify_span(&doc, &c, 2, 6).unwrap();
        assert_eq!(span.expression, " ふんわり ");
        assert_eq!(span.id, "ai-detected-3");
    }
}
