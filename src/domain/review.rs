//! Review result wire types.
//!
//! These are the shapes consumers see, camelCase on the wire. Internally
//! the engine works with [`crate::reconcile::ResolvedSpan`]; conversion
//! happens at this boundary.

use serde::{Deserialize, Serialize};

use crate::reconcile::{ReconciliationResult, ResolvedSpan};

/// Character offsets of a detected issue within the caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanPosition {
    pub start: usize,
    pub end: usize,
}

/// One verified compliance issue, ready for highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedIssue {
    /// The model's claimed text, verbatim.
    pub expression: String,
    /// Knowledge-base expression name the model attributed the issue to.
    pub name: String,
    pub reason: String,
    pub position: SpanPosition,
    /// Trimmed claimed text.
    pub matched_text: String,
    /// Synthetic id, `"ai-detected-<index>"` in input order.
    pub knowledge_id: String,
}

impl From<ResolvedSpan> for DetectedIssue {
    fn from(span: ResolvedSpan) -> Self {
        let matched_text = span.expression.trim().to_string();
        Self {
            expression: span.expression,
            name: span.name,
            reason: span.reason,
            position: SpanPosition {
                start: span.start,
                end: span.end,
            },
            matched_text,
            knowledge_id: span.id,
        }
    }
}

/// The full review verdict returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewReport {
    pub passed: bool,
    pub issues: Vec<DetectedIssue>,
    pub total_issues: usize,
}

impl ReviewReport {
    /// Build a report from an engine result and an optional external
    /// verdict. The external verdict is authoritative when present; the
    /// engine's emptiness check is the fallback.
    pub fn from_reconciliation(result: ReconciliationResult, external_passed: Option<bool>) -> Self {
        let passed = external_passed.unwrap_or(result.passed);
        let issues: Vec<DetectedIssue> = result.issues.into_iter().map(Into::into).collect();
        Self {
            passed,
            total_issues: issues.len(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;
    use crate::reconcile::{RawFinding, RawPosition};

    fn finding(text: &str, start: i64, end: i64) -> RawFinding {
        RawFinding {
            name: Some(text.to_string()),
            matched_text: Some(text.to_string()),
            reason: Some("理由".to_string()),
            position: Some(RawPosition {
                start: Some(start),
                end: Some(end),
            }),
        }
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let result = reconcile("朝はふんわり", &[finding("ふんわり", 2, 6)]);
        let report = ReviewReport::from_reconciliation(result, None);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalIssues"], 1);
        let issue = &json["issues"][0];
        assert_eq!(issue["matchedText"], "ふんわり");
        assert_eq!(issue["knowledgeId"], "ai-detected-0");
        assert_eq!(issue["position"]["start"], 2);
        assert_eq!(issue["position"]["end"], 6);
    }

    #[test]
    fn test_external_verdict_overrides_engine() {
        let result = reconcile("朝はふんわり", &[finding("ふんわり", 2, 6)]);
        assert!(!result.passed);
        // The model insists the caption passes; its verdict wins.
        let report = ReviewReport::from_reconciliation(result, Some(true));
        assert!(report.passed);
        assert_eq!(report.total_issues, 1);
    }

    #[test]
    fn test_engine_verdict_used_when_external_absent() {
        let result = reconcile("問題のない本文", &[]);
        let report = ReviewReport::from_reconciliation(result, None);
        assert!(report.passed);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_matched_text_is_trimmed_expression() {
        let raw = RawFinding {
            name: Some("ふんわり".to_string()),
            matched_text: Some(" ふんわり ".to_string()),
            reason: None,
            position: Some(RawPosition {
                start: Some(2),
                end: Some(6),
            }),
        };
        let result = reconcile("朝はふんわり", &[raw]);
        let report = ReviewReport::from_reconciliation(result, None);
        assert_eq!(report.issues[0].expression, " ふんわり ");
        assert_eq!(report.issues[0].matched_text, "ふんわり");
    }
}
