//! Hashtag keyword list and AI-backed selection.
//!
//! Keywords live in a small CSV maintained by the marketing team: column 0
//! is the keyword, column 1 marks fixed keywords with 固定. Fixed keywords
//! always lead the posted list (capped at 4); the rest form the candidate
//! pool the model selects from (capped at 17), validated against the pool
//! so the model cannot invent tags.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::adapters::ChatModel;
use crate::domain::HashtagSet;

/// Fixed keywords included in every post.
pub const FIXED_LIMIT: usize = 4;
/// AI-selected keywords per caption.
pub const SELECTED_LIMIT: usize = 17;

/// One row of the keyword CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashtagKeyword {
    pub keyword: String,
    pub fixed: bool,
}

/// Load the keyword CSV. The header row is skipped; blank lines and rows
/// with an empty keyword column are ignored.
pub fn load_keywords(path: &Path) -> Result<Vec<HashtagKeyword>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read hashtag CSV: {}", path.display()))?;
    Ok(parse_keywords(&content))
}

fn parse_keywords(content: &str) -> Vec<HashtagKeyword> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .skip(1) // header
        .filter_map(|line| {
            let mut cols = line.split(',');
            let keyword = cols.next()?.trim();
            if keyword.is_empty() {
                return None;
            }
            let fixed = cols.next().map(str::trim) == Some("固定");
            Some(HashtagKeyword {
                keyword: keyword.to_string(),
                fixed,
            })
        })
        .collect()
}

/// Fixed keywords, at most [`FIXED_LIMIT`].
pub fn fixed_hashtags(keywords: &[HashtagKeyword]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| k.fixed)
        .take(FIXED_LIMIT)
        .map(|k| k.keyword.clone())
        .collect()
}

/// Non-fixed keywords forming the selection pool.
pub fn candidate_keywords(keywords: &[HashtagKeyword]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| !k.fixed)
        .map(|k| k.keyword.clone())
        .collect()
}

/// Expected shape of the model's selection response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionResponse {
    /// Option so an explicit JSON null is tolerated like a missing field.
    #[serde(default)]
    selected_hashtags: Option<Vec<String>>,
}

const SELECT_SYSTEM: &str = "あなたはInstagramのハッシュタグ選定の専門家です。\
提供されたキャプションを分析し、キーワードリストから最も関連性の高い17個の\
ハッシュタグを選択してJSON形式で返してください。";

fn selection_prompt(caption: &str, candidates: &[String]) -> String {
    let keyword_list = candidates
        .iter()
        .enumerate()
        .map(|(i, k)| format!("{}. {}", i + 1, k))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "あなたはInstagramのハッシュタグ選定の専門家です。\n\
以下のキャプション本文を分析して、提供されたキーワードリストから、キャプションの内容に最も関連性の高い17個のハッシュタグを選択してください。\n\
\n\
## キャプション本文\n\
\n\
{caption}\n\
\n\
## 選択可能なキーワードリスト\n\
\n\
{keyword_list}\n\
\n\
## 選択条件\n\
\n\
1. キャプションの内容に最も関連性の高い17個を選択してください\n\
2. 重複は避けてください\n\
3. キャプションの内容と関連性が低いものは避けてください\n\
4. キーワードリストに記載されているもののみを選択してください（新規作成は禁止）\n\
5. 選択したキーワードは、そのままの形式で返してください（#は付けない）\n\
\n\
## 出力形式\n\
\n\
以下のJSON形式で回答してください：\n\
\n\
```json\n\
{{\n\
  \"selectedHashtags\": [\"キーワード1\", \"キーワード2\", \"キーワード3\", ...]\n\
}}\n\
```\n\
\n\
必ず17個のキーワードを選択してください。17個未満の場合は、関連性が高い順に17個になるまで選択してください。"
    )
}

/// Keep only selections present in the candidate pool, trimmed and capped.
fn validate_selection(selected: Vec<String>, candidates: &[String]) -> Vec<String> {
    selected
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| candidates.iter().any(|c| c == tag))
        .take(SELECTED_LIMIT)
        .collect()
}

/// AI-backed hashtag selector.
pub struct HashtagSelector {
    model: Box<dyn ChatModel>,
}

impl HashtagSelector {
    pub fn new(model: Box<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Select hashtags for a caption from the keyword CSV at `path`.
    pub async fn select(&self, caption: &str, path: &Path) -> Result<HashtagSet> {
        let keywords = load_keywords(path)?;
        let fixed = fixed_hashtags(&keywords);
        let candidates = candidate_keywords(&keywords);

        if candidates.is_empty() {
            debug!("no candidate keywords, returning fixed hashtags only");
            return Ok(HashtagSet::fixed_only(fixed));
        }

        let prompt = selection_prompt(caption, &candidates);
        let raw = self.model.complete_json(SELECT_SYSTEM, &prompt).await?;

        let response: SelectionResponse = serde_json::from_str(&raw)
            .context("Hashtag selection response was not the expected JSON shape")?;

        let selected =
            validate_selection(response.selected_hashtags.unwrap_or_default(), &candidates);
        Ok(HashtagSet::new(fixed, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "キーワード,種別\n\
スキンケア,固定\n\
コスメ,固定\n\
美容,固定\n\
メイク,固定\n\
ベースメイク,固定\n\
保湿,\n\
乾燥対策,\n\
\n\
ツヤ肌,\n";

    #[test]
    fn test_parse_skips_header_and_blanks() {
        let keywords = parse_keywords(CSV);
        assert_eq!(keywords.len(), 8);
        assert_eq!(keywords[0].keyword, "スキンケア");
        assert!(keywords[0].fixed);
        assert!(!keywords[5].fixed);
    }

    #[test]
    fn test_fixed_capped_at_four() {
        let keywords = parse_keywords(CSV);
        let fixed = fixed_hashtags(&keywords);
        assert_eq!(fixed.len(), FIXED_LIMIT);
        assert_eq!(fixed, vec!["スキンケア", "コスメ", "美容", "メイク"]);
    }

    #[test]
    fn test_candidates_exclude_fixed() {
        let keywords = parse_keywords(CSV);
        let candidates = candidate_keywords(&keywords);
        assert_eq!(candidates, vec!["保湿", "乾燥対策", "ツヤ肌"]);
    }

    #[test]
    fn test_validate_selection_rejects_invented_tags() {
        let candidates = vec!["保湿".to_string(), "乾燥対策".to_string()];
        let selected = validate_selection(
            vec![
                " 保湿 ".to_string(),
                "存在しないタグ".to_string(),
                "乾燥対策".to_string(),
            ],
            &candidates,
        );
        assert_eq!(selected, vec!["保湿", "乾燥対策"]);
    }

    #[test]
    fn test_validate_selection_caps_at_limit() {
        let candidates: Vec<String> = (0..30).map(|i| format!("tag{}", i)).collect();
        let selected = validate_selection(candidates.clone(), &candidates);
        assert_eq!(selected.len(), SELECTED_LIMIT);
    }

    #[test]
    fn test_selection_prompt_numbers_keywords() {
        let prompt = selection_prompt("本文", &["保湿".to_string(), "ツヤ肌".to_string()]);
        assert!(prompt.contains("1. 保湿"));
        assert!(prompt.contains("2. ツヤ肌"));
        assert!(prompt.contains("selectedHashtags"));
    }
}
