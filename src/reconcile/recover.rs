//! Position recovery (pipeline stage 3).
//!
//! Runs only on candidates whose claimed offsets failed validation. The
//! model usually gets the phrase's leading characters right even when its
//! offsets are garbage, so the chain degrades from exact search to a
//! shrinking-prefix search. First success wins.
//!
//! The prefix strategy trades precision for recall: a short prefix can hit
//! the wrong occurrence in the document, and the first occurrence is taken
//! unconditionally. That behavior is intentional and pinned by tests here
//! rather than corrected.

use tracing::debug;

use super::document::{eq_fold, Document};
use super::types::{Candidate, Recovery, RecoveryStrategy};

/// Longest prefix length tried by the shrinking-prefix strategy.
const MAX_PREFIX: usize = 10;
/// Shortest prefix length tried.
const MIN_PREFIX: usize = 2;

/// Re-derive `(start, end)` from the claimed text.
///
/// Strategies, in order:
/// 1. exact (case-sensitive) substring search;
/// 2. case-folded substring search, verifying the slice before accepting
///    and rescanning forward when simple folding misreports the length;
/// 3. shrinking-prefix search from `min(10, len)` down to 2 characters.
pub fn recover_position(doc: &Document, candidate: &Candidate) -> Recovery {
    let text = &candidate.text;

    if let Some(start) = doc.find(text) {
        let end = start + text.chars().count();
        return recovered(candidate, start, end, RecoveryStrategy::ExactSearch);
    }

    if let Some((start, end)) = folded_search(doc, text) {
        return recovered(candidate, start, end, RecoveryStrategy::FoldedSearch);
    }

    if let Some((start, end)) = prefix_search(doc, text) {
        return recovered(candidate, start, end, RecoveryStrategy::PrefixSearch);
    }

    debug!(claimed = %text, "no recovery strategy matched, dropping candidate");
    Recovery::Unrecoverable
}

fn recovered(
    candidate: &Candidate,
    start: usize,
    end: usize,
    strategy: RecoveryStrategy,
) -> Recovery {
    debug!(
        claimed = %candidate.text,
        start,
        end,
        strategy = strategy.as_str(),
        "recovered position"
    );
    Recovery::Recovered {
        start,
        end,
        strategy,
    }
}

/// Case-insensitive search with slice verification.
///
/// The folded index search is length-preserving per char, but full
/// lowercasing of the slice can still disagree with the claim (ligatures
/// and other one-to-many folds). When direct length-based slicing fails the
/// equality check, scan forward from the hit one character at a time,
/// extending the end until the slice matches or the window (twice the
/// claimed-text length) is exhausted.
fn folded_search(doc: &Document, text: &str) -> Option<(usize, usize)> {
    let start = doc.find_folded(text)?;
    let len = text.chars().count();

    let direct_end = start + len;
    if direct_end <= doc.char_len() && eq_fold(&doc.slice(start, direct_end), text) {
        return Some((start, direct_end));
    }

    let limit = (start + 2 * len).min(doc.char_len());
    for end in start + 1..=limit {
        if eq_fold(&doc.slice(start, end), text) {
            return Some((start, end));
        }
    }

    None
}

/// Shrinking-prefix search: decreasing prefix lengths, first hit wins,
/// `end = start + prefix_len`.
fn prefix_search(doc: &Document, text: &str) -> Option<(usize, usize)> {
    let len = text.chars().count();
    let max = len.min(MAX_PREFIX);

    for prefix_len in (MIN_PREFIX..=max).rev() {
        let prefix: String = text.chars().take(prefix_len).collect();
        if let Some(start) = doc.find_folded(&prefix) {
            if doc.count_folded(&prefix) > 1 {
                debug!(
                    prefix = %prefix,
                    "prefix occurs more than once, taking the first hit"
                );
            }
            return Some((start, start + prefix_len));
        }
    }

    None
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

    fn recover(doc: &str, text: &str) -> Recovery {
        recover_position(&Document::new(doc), &candidate(text))
    }

    #[test]
    fn test_exact_search_wins_first() {
        let r = recover("朝はふんわり、夜はしっとり", "ふんわり");
        assert_eq!(
            r,
            Recovery::Recovered {
                start: 2,
                end: 6,
                strategy: RecoveryStrategy::ExactSearch
            }
        );
    }

    #[test]
    fn test_folded_search_handles_case_mismatch() {
        let r = recover("New GLOSSY finish", "glossy");
        assert_eq!(
            r,
            Recovery::Recovered {
                start: 4,
                end: 10,
                strategy: RecoveryStrategy::FoldedSearch
            }
        );
    }

    #[test]
    fn test_prefix_search_when_tail_is_wrong() {
        // The model misremembers the tail; the first 4 chars still match.
        let r = recover("シミがうすくなる印象の美容液", "シミがうすくなった");
        match r {
            Recovery::Recovered {
                start,
                end,
                strategy,
            } => {
                assert_eq!(strategy, RecoveryStrategy::PrefixSearch);
                assert_eq!(start, 0);
                // min(10, 9) = 9 down to 2; 8 chars "シミがうすくなる" hit? the
                // claim's 8-prefix is "シミがうすくなっ" which misses, the
                // 7-prefix "シミがうすくな" hits.
                assert_eq!(end, start + 7);
            }
            other => panic!("expected prefix recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_unmatchable_text_is_unrecoverable() {
        assert_eq!(
            recover("朝はふんわり、夜はしっとり", "存在しない表現"),
            Recovery::Unrecoverable
        );
    }

    #[test]
    fn test_single_char_claim_has_no_prefix_fallback() {
        // min(10, 1) = 1 < MIN_PREFIX, so the prefix loop never runs.
        assert_eq!(recover("abc", "x"), Recovery::Unrecoverable);
    }

    #[test]
    fn short_prefix_takes_first_occurrence() {
        // Known precision trade-off: "しっ" occurs at 2 and at 9; the claim
        // "しっかり" is absent, so the 2-char prefix resolves to the FIRST
        // occurrence even though either could be meant.
        let doc = "朝はしっとり、夜もしっとり";
        let r = recover(doc, "しっかり");
        match r {
            Recovery::Recovered {
                start,
                end,
                strategy,
            } => {
                assert_eq!(strategy, RecoveryStrategy::PrefixSearch);
                assert_eq!((start, end), (2, 4));
            }
            other => panic!("expected prefix recovery, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_lengths_shrink_from_ten() {
        // 12-char claim whose first 10 chars appear verbatim. Exact and
        // folded search miss (tail differs), prefix search caps at 10.
        let doc = "0123456789ab";
        let r = recover(doc, "0123456789XY");
        assert_eq!(
            r,
            Recovery::Recovered {
                start: 0,
                end: 10,
                strategy: RecoveryStrategy::PrefixSearch
            }
        );
    }
}
