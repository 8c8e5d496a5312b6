//! Hashtag selection wire types.

use serde::{Deserialize, Serialize};

/// Result of hashtag selection for one caption.
///
/// `hashtags` is the combined list actually used for posting: the fixed
/// keywords first, then the AI-selected ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagSet {
    pub hashtags: Vec<String>,
    pub fixed_hashtags: Vec<String>,
    pub selected_hashtags: Vec<String>,
}

impl HashtagSet {
    pub fn new(fixed: Vec<String>, selected: Vec<String>) -> Self {
        let mut hashtags = fixed.clone();
        hashtags.extend(selected.iter().cloned());
        Self {
            hashtags,
            fixed_hashtags: fixed,
            selected_hashtags: selected,
        }
    }

    /// Fixed keywords only, when no candidate keywords exist.
    pub fn fixed_only(fixed: Vec<String>) -> Self {
        Self::new(fixed, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_order_is_fixed_then_selected() {
        let set = HashtagSet::new(
            vec!["スキンケア".to_string()],
            vec!["保湿".to_string(), "乾燥対策".to_string()],
        );
        assert_eq!(set.hashtags, vec!["スキンケア", "保湿", "乾燥対策"]);
    }

    #[test]
    fn test_wire_shape() {
        let set = HashtagSet::fixed_only(vec!["スキンケア".to_string()]);
        let json = serde_json::to_value(&set).unwrap();
        assert!(json["fixedHashtags"].is_array());
        assert_eq!(json["selectedHashtags"].as_array().unwrap().len(), 0);
    }
}
