/// Hiragana, Katakana (including `ー`), CJK Unified Ideographs and `々`
pub fn is_japanese_character(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // Hiragana
        | '\u{30A0}'..='\u{30FF}' // Katakana
        | '\u{4E00}'..='\u{9FFF}' // CJK Unified Ideographs
        | 'ー'
        | '々'
    )
}

/// True for the empty string
pub fn is_all_japanese(text: &str) -> bool {
    text.chars().all(is_japanese_character)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_set() {
        for c in ['あ', 'ん', 'ゝ', 'ア', 'ヶ', 'ー', '々', '腹', '一', '龥'] {
            assert!(is_japanese_character(c), "{c}");
        }
        for c in ['a', '1', ' ', '。', '、', '！', 'ｱ', '〜', '㐀', '한'] {
            assert!(!is_japanese_character(c), "{c}");
        }
    }

    #[test]
    fn test_is_all_japanese() {
        assert!(is_all_japanese("お腹がすいた"));
        assert!(is_all_japanese("コーヒー"));
        assert!(is_all_japanese("人々"));
        assert!(is_all_japanese(""));
        assert!(!is_all_japanese("お腹が すいた"));
        assert!(!is_all_japanese("お腹。"));
        assert!(!is_all_japanese("Tシャツ"));
    }
}
