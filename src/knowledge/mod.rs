//! Knowledge base of regulated expressions.
//!
//! Each item describes one expression that may violate the Pharmaceutical
//! and Medical Device Act (薬機法) in cosmetics advertising: the markdown
//! rule text, extracted NG examples, and conjugation search patterns. The
//! store is loaded from `knowledge.json` once per process and cached; all
//! later accesses return the same immutable slice.

use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config;

pub mod parser;

/// One regulated expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    pub id: String,
    /// The expression itself, e.g. 「明るい」.
    pub name: String,
    /// Full markdown rule document.
    pub content: String,
    #[serde(default)]
    pub ng_patterns: Vec<String>,
    #[serde(default)]
    pub search_patterns: Vec<String>,
}

/// Global cached knowledge (stores Result to handle load errors)
static KNOWLEDGE: OnceLock<std::result::Result<Vec<KnowledgeItem>, String>> = OnceLock::new();

/// Load `knowledge.json` from an explicit path.
pub fn load_from(path: &std::path::Path) -> Result<Vec<KnowledgeItem>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse knowledge file: {}", path.display()))
}

/// Get the process-wide knowledge store (loads once, then cached).
pub fn knowledge() -> Result<&'static [KnowledgeItem]> {
    let result = KNOWLEDGE.get_or_init(|| {
        let path = match config::knowledge_path() {
            Ok(p) => p,
            Err(e) => return Err(e.to_string()),
        };
        load_from(&path).map_err(|e| e.to_string())
    });

    match result {
        Ok(items) => Ok(items),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Look up a knowledge item by id or expression name.
pub fn find_by_expression<'a>(
    items: &'a [KnowledgeItem],
    expression: &str,
) -> Option<&'a KnowledgeItem> {
    items
        .iter()
        .find(|item| item.id == expression || item.name == expression)
}

/// Scan a text for items whose search patterns occur as substrings.
///
/// One hit per item even when several of its patterns match.
pub fn search_ng_patterns<'a>(items: &'a [KnowledgeItem], text: &str) -> Vec<&'a KnowledgeItem> {
    items
        .iter()
        .filter(|item| item.search_patterns.iter().any(|p| text.contains(p.as_str())))
        .collect()
}

/// Build the knowledge digest embedded in the review prompt.
///
/// Per item: the rule from the `## ルール（備考）` section, OK/NG example
/// lines from the two context sections, and the search-pattern list. Items
/// contribute only the parts they actually have.
pub fn prompt_digest(items: &[KnowledgeItem]) -> String {
    items
        .iter()
        .map(|item| {
            let mut summary = format!("【表現: {}】", item.name);

            let rule = rule_text(&item.content);
            if !rule.is_empty() {
                summary.push_str(&format!("\nルール: {}", rule));
            }

            if !item.search_patterns.is_empty() {
                summary.push_str(&format!("\n検索パターン: {}", item.search_patterns.join(", ")));
            }

            let review_ctx = context_examples(&item.content, "コンテキスト：感想・口コミ");
            if !review_ctx.is_empty() {
                summary.push_str(&format!("\n感想・口コミコンテキスト:\n  {}", review_ctx));
            }

            let product_ctx = context_examples(&item.content, "コンテキスト：商品説明");
            if !product_ctx.is_empty() {
                summary.push_str(&format!("\n商品説明コンテキスト:\n  {}", product_ctx));
            }

            summary
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Lines of the markdown section whose `##` heading starts with `heading`,
/// up to the next `##`.
fn section_lines<'a>(content: &'a str, heading: &str) -> Vec<&'a str> {
    let mut lines = Vec::new();
    let mut in_section = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("##") {
            in_section = rest.trim().starts_with(heading);
            continue;
        }
        if in_section && !trimmed.is_empty() {
            lines.push(trimmed);
        }
    }

    lines
}

/// The rule bullets of `## ルール（備考）`, joined with spaces.
fn rule_text(content: &str) -> String {
    section_lines(content, "ルール（備考）")
        .into_iter()
        .filter(|line| line.starts_with('-'))
        .map(|line| line.trim_start_matches('-').trim_start())
        .collect::<Vec<_>>()
        .join(" ")
}

/// OK/NG example lines of a context section, lightly reformatted for the
/// prompt (`- **OK表現**: ...` becomes `OK表現: ...`).
fn context_examples(content: &str, heading: &str) -> String {
    section_lines(content, heading)
        .into_iter()
        .filter(|line| line.starts_with("- **OK") || line.starts_with("- **NG"))
        .map(|line| {
            line.trim_start_matches("- **")
                .replacen("**:", ":", 1)
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n  ")
}
