//! Knowledge Base Integration Tests
//!
//! Covers the SQL-dump import path end to end: parse a dump, write
//! knowledge.json, load it back, and build the prompt digest.

use capcheck::knowledge::{self, parser};
use std::io::Write;
use tempfile::TempDir;

const DUMP: &str = "INSERT INTO \"public\".\"knowledge\" (\"id\", \"name\", \"content\") VALUES\n\
('3f6b2a10-88cd-4f6e-9a31-0c2f1d4e5a67', '明るい', '# 表現：明るい\n\n\
## ルール（備考）\n\
- メーキャップ効果による物理的な明るさはOK\n\
- 肌自体が変化したかのような表現はNG\n\n\
## コンテキスト：感想・口コミ\n\
- **OK表現**: 明るい印象になった気がします\n\
- **NG表現**: 肌が明るくなりました\n\
**NG表現の例:**\n\
「肌が明るくなった」\n\
使うほどに明るい素肌へ\n\n\
## コンテキスト：商品説明\n\
- **NG表現**: 肌を明るくする美容液\n\
'),\n\
('b8a91c22-5d44-4e0f-8c77-9e1f2a3b4c5d', 'ハリが出る', '# 表現：ハリが出る\n\n\
## ルール（備考）\n\
- ハリ感（メーキャップ効果）はOK\n\
');";

#[test]
fn test_dump_to_store_round_trip() {
    let temp = TempDir::new().unwrap();
    let json_path = temp.path().join("knowledge.json");

    // Parse the dump and persist it the way `knowledge parse` does.
    let items = parser::parse_sql_dump(DUMP).unwrap();
    assert_eq!(items.len(), 2);

    let mut file = std::fs::File::create(&json_path).unwrap();
    write!(file, "{}", serde_json::to_string_pretty(&items).unwrap()).unwrap();

    // Load it back through the store loader.
    let loaded = knowledge::load_from(&json_path).unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].name, "明るい");
    assert_eq!(loaded[1].name, "ハリが出る");

    // Conjugation patterns survive the round trip.
    assert!(loaded[0]
        .search_patterns
        .contains(&"明るく".to_string()));
    assert!(loaded[1]
        .search_patterns
        .contains(&"ハリが出った".to_string()));
}

#[test]
fn test_ng_examples_extracted_from_dump() {
    let items = parser::parse_sql_dump(DUMP).unwrap();
    let patterns = &items[0].ng_patterns;

    assert!(patterns.contains(&"肌が明るくなった".to_string()));
    assert!(patterns.contains(&"使うほどに明るい素肌へ".to_string()));
    // The bullet lines under the marker are emphasis/bullets, not examples.
    assert!(!patterns.iter().any(|p| p.contains("OK表現")));
}

#[test]
fn test_prompt_digest_from_parsed_items() {
    let items = parser::parse_sql_dump(DUMP).unwrap();
    let digest = knowledge::prompt_digest(&items);

    assert!(digest.contains("【表現: 明るい】"));
    assert!(digest.contains("【表現: ハリが出る】"));
    assert!(digest.contains("ルール: メーキャップ効果による物理的な明るさはOK"));
    assert!(digest.contains("検索パターン: 明るい, 明るく"));
    assert!(digest.contains("NG表現: 肌を明るくする美容液"));
}

#[test]
fn test_search_ng_patterns_against_caption() {
    let items = parser::parse_sql_dump(DUMP).unwrap();

    let hits = knowledge::search_ng_patterns(&items, "肌が明るくなった気がする毎日");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "明るい");

    let hits = knowledge::search_ng_patterns(&items, "問題のないキャプション");
    assert!(hits.is_empty());
}

#[test]
fn test_missing_knowledge_file_errors() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.json");
    assert!(knowledge::load_from(&missing).is_err());
}
