//! SQL-dump import for the knowledge base.
//!
//! The knowledge rules are maintained in a hosted database and exported as
//! an INSERT dump. This parser walks the dump's `VALUES (...)` records with
//! a small quote/escape/paren state machine (record contents contain
//! parens, commas, and quotes of their own), then enriches each record with
//! NG examples mined from the markdown and conjugation search patterns
//! derived from the expression name.

use anyhow::{bail, Result};

use super::KnowledgeItem;

/// Parse an INSERT dump into knowledge items.
pub fn parse_sql_dump(sql: &str) -> Result<Vec<KnowledgeItem>> {
    let Some(values_start) = sql.find("VALUES") else {
        bail!("SQL dump has no VALUES clause");
    };
    let values = sql[values_start + "VALUES".len()..].trim();

    let mut items = Vec::new();
    for record in split_records(values) {
        if let Some((id, name, content)) = parse_record(&record) {
            let ng_patterns = extract_ng_patterns(&content, &name);
            let search_patterns = search_patterns_for(&name);
            items.push(KnowledgeItem {
                id,
                name,
                content,
                ng_patterns,
                search_patterns,
            });
        }
    }

    Ok(items)
}

/// Split the VALUES body into individual `(...)` record strings.
///
/// Tracks string state so parens inside quoted content don't terminate a
/// record, and backslash escapes don't terminate a string.
fn split_records(values: &str) -> Vec<String> {
    let chars: Vec<char> = values.chars().collect();
    let mut records = Vec::new();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;
    let mut record_start = 0usize;

    for (i, &c) in chars.iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match c {
            '\\' => escape_next = true,
            '\'' => in_string = !in_string,
            '(' if !in_string => {
                if depth == 0 {
                    record_start = i + 1;
                }
                depth += 1;
            }
            ')' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    records.push(chars[record_start..i].iter().collect());
                }
            }
            _ => {}
        }
    }

    records
}

/// Extract the quoted fields of one record; the first three are
/// `(id, name, content)`.
fn parse_record(record: &str) -> Option<(String, String, String)> {
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut escape_next = false;

    for c in record.chars() {
        if escape_next {
            // Keep the escaped char; the dump uses \' inside content.
            if c != '\'' {
                current.push('\\');
            }
            current.push(c);
            escape_next = false;
            continue;
        }
        match c {
            '\\' => escape_next = true,
            '\'' => {
                if in_string {
                    fields.push(std::mem::take(&mut current));
                    in_string = false;
                } else {
                    in_string = true;
                }
            }
            _ if in_string => current.push(c),
            _ => {}
        }
    }

    if fields.len() >= 3 {
        let mut it = fields.into_iter();
        Some((it.next()?, it.next()?, it.next()?))
    } else {
        None
    }
}

/// Mine NG expression examples from the markdown content.
///
/// Looks inside `## コンテキスト：...` sections for the `**NG表現の例:**`
/// marker and collects the plain example lines that follow (bullets and
/// emphasis lines are skipped), with surrounding quote marks stripped. The
/// expression name itself is appended when not already present.
fn extract_ng_patterns(content: &str, name: &str) -> Vec<String> {
    let mut patterns: Vec<String> = Vec::new();

    let mut in_context = false;
    let mut in_examples = false;
    for line in content.lines() {
        let trimmed = line.trim();

        if let Some(rest) = trimmed.strip_prefix("##") {
            in_context = rest.trim().starts_with("コンテキスト：");
            in_examples = false;
            continue;
        }
        if !in_context {
            continue;
        }
        if trimmed.contains("**NG表現の例:**") {
            in_examples = true;
            continue;
        }
        if !in_examples || trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('*') || trimmed.starts_with('-') {
            continue;
        }

        let cleaned = trimmed
            .trim_matches(|c| matches!(c, '「' | '」' | '『' | '』' | '"'))
            .trim();
        if !cleaned.is_empty() {
            patterns.push(cleaned.to_string());
        }
    }

    if !name.is_empty() && !patterns.iter().any(|p| p == name) {
        patterns.push(name.to_string());
    }

    patterns
}

/// Generate partial-match search patterns from the expression name.
///
/// Simple conjugation heuristics for Japanese adjectives and verbs:
/// 明るい expands to 明るく, 明るさ, 明るかった, 明るくない, and so on.
pub fn search_patterns_for(name: &str) -> Vec<String> {
    let mut patterns = vec![name.to_string()];
    let chars: Vec<char> = name.chars().collect();
    let stem = || chars[..chars.len() - 1].iter().collect::<String>();

    if let Some(&last) = chars.last() {
        match last {
            'い' => {
                patterns.push(format!("{}く", stem()));
                patterns.push(format!("{}さ", stem()));
                patterns.push(format!("{}かった", stem()));
                patterns.push(format!("{}くない", stem()));
            }
            'る' => {
                patterns.push(format!("{}った", stem()));
                patterns.push(format!("{}らない", stem()));
            }
            'た' => {
                patterns.push(format!("{}る", stem()));
            }
            _ => {}
        }
    }

    // Order-preserving dedup.
    let mut seen = std::collections::HashSet::new();
    patterns.retain(|p| seen.insert(p.clone()));
    patterns
}
