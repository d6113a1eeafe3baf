use unicode_normalization::UnicodeNormalization;

pub trait Preprocessor: Send + Sync {
    // Default: NFKC, so halfwidth katakana and fullwidth latin fold into
    // the forms the script checks and dictionaries expect
    fn process(&self, line: &str) -> String {
        line.nfkc().collect()
    }
}

/// NFKC-normalizes received lines
pub struct NfkcPreprocessor;
impl Preprocessor for NfkcPreprocessor {}

/// Leaves lines exactly as received
pub struct RawPreprocessor;
impl Preprocessor for RawPreprocessor {
    fn process(&self, line: &str) -> String {
        line.to_string()
    }
}

pub fn preprocessor(normalize: bool) -> Box<dyn Preprocessor> {
    if normalize {
        Box::new(NfkcPreprocessor)
    } else {
        Box::new(RawPreprocessor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfkc_folds_halfwidth_katakana() {
        assert_eq!(NfkcPreprocessor.process("ｶﾀｶﾅ"), "カタカナ");
        assert_eq!(NfkcPreprocessor.process("ＡＢＣ１"), "ABC1");
    }

    #[test]
    fn test_raw_is_identity() {
        assert_eq!(preprocessor(false).process("ｶﾀｶﾅ"), "ｶﾀｶﾅ");
    }
}
