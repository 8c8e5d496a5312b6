//! Overlap resolution (pipeline stage 5).
//!
//! The only stage that needs the complete verified set. Sorts the spans
//! into document order, then drops exact duplicates and spans nested
//! inside (or enclosing) an already-accepted span.

use super::types::ResolvedSpan;

/// Deduplicate and de-nest verified spans.
///
/// Sort ascending by `start`, ties broken by ascending `end`; walk the
/// sorted list keeping a span only when no already-accepted span shares its
/// exact `(start, end)` or contains it or is contained by it. Output stays
/// in ascending document order. Idempotent on its own output.
pub fn resolve_overlaps(mut spans: Vec<ResolvedSpan>) -> Vec<ResolvedSpan> {
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));

    let mut accepted: Vec<(usize, usize)> = Vec::new();
    let mut result = Vec::with_capacity(spans.len());

    for span in spans {
        let duplicate = accepted.iter().any(|&(s, e)| s == span.start && e == span.end);
        let nested = accepted.iter().any(|&(s, e)| {
            (span.start >= s && span.end <= e) || (s >= span.start && e <= span.end)
        });

        if duplicate || nested {
            continue;
        }

        accepted.push((span.start, span.end));
        result.push(span);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, name: &str) -> ResolvedSpan {
        ResolvedSpan {
            start,
            end,
            expression: name.to_string(),
            name: name.to_string(),
            reason: String::new(),
            id: format!("ai-detected-{}", start),
        }
    }

    #[test]
    fn test_sorts_by_start_then_end() {
        let out = resolve_overlaps(vec![span(9, 13, "b"), span(2, 6, "a")]);
        assert_eq!(out.len(), 2);
        assert_eq!((out[0].start, out[0].end), (2, 6));
        assert_eq!((out[1].start, out[1].end), (9, 13));
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        // Different names, same offsets: only the first survives.
        let out = resolve_overlaps(vec![span(2, 6, "ふんわり"), span(2, 6, "ふわっと")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "ふんわり");
    }

    #[test]
    fn test_nested_span_drops() {
        let out = resolve_overlaps(vec![span(2, 6, "ふんわり"), span(3, 6, "んわり")]);
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].start, out[0].end), (2, 6));
    }

    #[test]
    fn test_widest_span_at_same_region_wins() {
        // Sorted order: (1,7), (2,6), (3,5). The widest sorts first and
        // the narrower ones are nested inside it.
        let out = resolve_overlaps(vec![span(2, 6, "a"), span(3, 5, "b"), span(1, 7, "c")]);
        assert_eq!(out.len(), 1);
        assert_eq!((out[0].start, out[0].end), (1, 7));
    }

    #[test]
    fn test_partial_overlap_keeps_both() {
        // Overlapping but neither contains the other.
        let out = resolve_overlaps(vec![span(0, 4, "a"), span(2, 6, "b")]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let input = vec![
            span(9, 13, "d"),
            span(2, 6, "a"),
            span(3, 6, "b"),
            span(2, 6, "c"),
        ];
        let once = resolve_overlaps(input);
        let twice = resolve_overlaps(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(Vec::new()).is_empty());
    }
}
