//! Character-indexed view of the reference document.
//!
//! All offsets in the reconciliation engine are character offsets, not byte
//! offsets. The captions under review are Japanese, and the model reports
//! positions as character indices, so the document keeps an explicit char
//! vector alongside a per-char case-folded shadow used for case-insensitive
//! search.

/// The immutable text being checked, indexed by character offset.
///
/// Construction is O(n); every search is a simple sliding-window scan over
/// the char vectors. Captions are short (a few hundred characters), so no
/// fancier index is warranted.
#[derive(Debug, Clone)]
pub struct Document {
    chars: Vec<char>,
    folded: Vec<char>,
}

impl Document {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let folded = chars.iter().map(|c| fold_char(*c)).collect();
        Self { chars, folded }
    }

    /// Number of characters in the document.
    pub fn char_len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Slice the document at `[start, end)` character offsets.
    ///
    /// Callers must have bounds-checked `start <= end <= char_len()`.
    pub fn slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }

    /// Find the first exact (case-sensitive) occurrence of `needle`,
    /// returning its character offset.
    pub fn find(&self, needle: &str) -> Option<usize> {
        let needle: Vec<char> = needle.chars().collect();
        find_window(&self.chars, &needle)
    }

    /// Find the first case-insensitive occurrence of `needle`, returning
    /// its character offset.
    ///
    /// Uses a per-char simple fold on both sides, so the offset maps
    /// directly back into the original document. Full case folding (which
    /// can change string length, e.g. ligatures) is left to the verifying
    /// comparison the caller performs on the slice.
    pub fn find_folded(&self, needle: &str) -> Option<usize> {
        let needle: Vec<char> = needle.chars().map(fold_char).collect();
        find_window(&self.folded, &needle)
    }

    /// Count case-insensitive occurrences of `needle`.
    pub fn count_folded(&self, needle: &str) -> usize {
        let needle: Vec<char> = needle.chars().map(fold_char).collect();
        if needle.is_empty() || needle.len() > self.folded.len() {
            return 0;
        }
        (0..=self.folded.len() - needle.len())
            .filter(|&i| self.folded[i..i + needle.len()] == needle[..])
            .count()
    }
}

/// Simple sliding-window search over char slices.
fn find_window(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    (0..=haystack.len() - needle.len()).find(|&i| haystack[i..i + needle.len()] == needle[..])
}

/// Single-char fold: first char of the Unicode lowercase mapping.
///
/// Length-preserving so folded offsets equal original offsets.
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Case-insensitive equality using full Unicode lowercasing.
pub fn eq_fold(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Case-insensitive containment: does `haystack` contain `needle`?
pub fn contains_fold(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let doc = Document::new("朝はふんわり");
        assert_eq!(doc.char_len(), 6);
    }

    #[test]
    fn test_slice_by_char_offset() {
        let doc = Document::new("朝はふんわり、夜はしっとり");
        assert_eq!(doc.slice(2, 6), "ふんわり");
    }

    #[test]
    fn test_find_exact() {
        let doc = Document::new("朝はふんわり、夜はしっとり");
        assert_eq!(doc.find("ふんわり"), Some(2));
        assert_eq!(doc.find("存在しない"), None);
    }

    #[test]
    fn test_find_folded_ignores_case() {
        let doc = Document::new("Glossy Lip Serum");
        assert_eq!(doc.find("glossy"), None);
        assert_eq!(doc.find_folded("glossy"), Some(0));
        assert_eq!(doc.find_folded("LIP"), Some(7));
    }

    #[test]
    fn test_find_empty_needle_is_none() {
        let doc = Document::new("abc");
        assert_eq!(doc.find(""), None);
        assert_eq!(doc.find_folded(""), None);
    }

    #[test]
    fn test_needle_longer_than_document() {
        let doc = Document::new("短い");
        assert_eq!(doc.find("短いテキストより長い"), None);
    }

    #[test]
    fn test_count_folded() {
        let doc = Document::new("しっとり、またしっとり");
        assert_eq!(doc.count_folded("しっとり"), 2);
        assert_eq!(doc.count_folded("し"), 2);
    }

    #[test]
    fn test_eq_and_contains_fold() {
        assert!(eq_fold("Tone-Up", "tone-up"));
        assert!(contains_fold("ツヤ肌ファンデ", "ツヤ"));
        assert!(!contains_fold("ツヤ", "ツヤ肌"));
    }
}
