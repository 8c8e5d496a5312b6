//! Position validation (pipeline stage 2).
//!
//! Checks a candidate's claimed offsets against the document and against
//! its own claimed text. Claimed offsets come straight from the model and
//! are wrong often enough that this stage exists mostly to route candidates
//! into recovery.

use super::document::{contains_fold, Document};
use super::types::{Candidate, PositionCheck};

/// Validate the claimed `(start, end)` of a candidate.
///
/// Bounds: `0 <= start`, `end > start`, `end <= char_len`. A candidate with
/// absent or negative offsets is always `Invalid`. When bounds hold, the
/// document slice must agree with the trimmed claimed text under a
/// three-way normalized-equality test: exact match, actual-slice contains
/// claimed-text (case-insensitive), or claimed-text contains actual-slice
/// (case-insensitive).
pub fn check_position(doc: &Document, candidate: &Candidate) -> PositionCheck {
    let (Some(start), Some(end)) = (candidate.claimed_start, candidate.claimed_end) else {
        return PositionCheck::Invalid;
    };

    if start < 0 || end <= start || end as usize > doc.char_len() {
        return PositionCheck::Invalid;
    }
    let (start, end) = (start as usize, end as usize);

    let actual = doc.slice(start, end);
    let claimed = &candidate.text;

    if actual == *claimed || contains_fold(&actual, claimed) || contains_fold(claimed, &actual) {
        PositionCheck::Valid { start, end }
    } else {
        PositionCheck::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::types::{RawFinding, RawPosition};

    fn candidate(text: &str, start: Option<i64>, end: Option<i64>) -> Candidate {
        let raw = RawFinding {
            name: Some(text.to_string()),
            matched_text: Some(text.to_string()),
            reason: None,
            position: Some(RawPosition { start, end }),
        };
        Candidate::normalize(0, &raw).unwrap()
    }

    const DOC: &str = "朝はふんわり、夜はしっとり";

    #[test]
    fn test_exact_offsets_are_valid() {
        let doc = Document::new(DOC);
        let c = candidate("ふんわり", Some(2), Some(6));
        assert_eq!(
            check_position(&doc, &c),
            PositionCheck::Valid { start: 2, end: 6 }
        );
    }

    #[test]
    fn test_missing_position_is_invalid() {
        let doc = Document::new(DOC);
        let c = candidate("ふんわり", None, None);
        assert_eq!(check_position(&doc, &c), PositionCheck::Invalid);
    }

    #[test]
    fn test_negative_start_is_invalid() {
        let doc = Document::new(DOC);
        let c = candidate("ふんわり", Some(-1), Some(6));
        assert_eq!(check_position(&doc, &c), PositionCheck::Invalid);
    }

    #[test]
    fn test_zero_width_is_invalid() {
        let doc = Document::new(DOC);
        let c = candidate("ふんわり", Some(0), Some(0));
        assert_eq!(check_position(&doc, &c), PositionCheck::Invalid);
    }

    #[test]
    fn test_end_past_document_is_invalid() {
        let doc = Document::new(DOC);
        let c = candidate("しっとり", Some(9), Some(99));
        assert_eq!(check_position(&doc, &c), PositionCheck::Invalid);
    }

    #[test]
    fn test_offsets_pointing_at_other_text_are_invalid() {
        let doc = Document::new(DOC);
        // Bounds fine, but the slice there is "朝はふん".
        let c = candidate("しっとり", Some(0), Some(4));
        assert_eq!(check_position(&doc, &c), PositionCheck::Invalid);
    }

    #[test]
    fn test_slice_containing_claimed_text_is_valid() {
        let doc = Document::new(DOC);
        // Slice "はふんわり、" contains the claim.
        let c = candidate("ふんわり", Some(1), Some(7));
        assert_eq!(
            check_position(&doc, &c),
            PositionCheck::Valid { start: 1, end: 7 }
        );
    }

    #[test]
    fn test_claimed_text_containing_slice_is_valid() {
        let doc = Document::new(DOC);
        // Claim is longer than the slice it points at.
        let c = candidate("朝はふんわり", Some(0), Some(4));
        assert_eq!(
            check_position(&doc, &c),
            PositionCheck::Valid { start: 0, end: 4 }
        );
    }

    #[test]
    fn test_containment_is_case_insensitive() {
        let doc = Document::new("Our new GLOSSY serum");
        let c = candidate("glossy", Some(8), Some(14));
        assert_eq!(
            check_position(&doc, &c),
            PositionCheck::Valid { start: 8, end: 14 }
        );
    }
}
