/// Checked in this order; the first suffix match wins, not the longest
pub const PARTICLES: &[&str] = &[
    "は", "が", "を", "に", "へ", "と", "で", "から", "まで", "も", "の",
    "だ", "である", "です", "ます", "だった", "でした", "じゃない", "ではない",
    "って", "という", "といった", "として", "により", "によって", "について",
    "に対して", "に関して", "において", "にて", "より", "や", "とか", "など",
    "なんか", "なんて", "か", "かい", "かな", "かも", "だろう", "でしょう",
    "よね", "よな", "ね", "な", "わ", "よ", "ぞ", "ぜ", "さ", "だけ", "しか",
    "くらい", "ぐらい", "ほど", "ばかり", "っぽい", "らしい", "みたい", "ような",
];

/// Remove one trailing particle.
///
/// Single pass: only the first matching particle in list order is removed,
/// and never when it would leave nothing.
pub fn strip_trailing_particle(text: &str) -> &str {
    for particle in PARTICLES {
        if let Some(rest) = text.strip_suffix(particle)
            && !rest.is_empty()
        {
            return rest;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_single_particle() {
        assert_eq!(strip_trailing_particle("食べます"), "食べ");
        assert_eq!(strip_trailing_particle("食べ"), "食べ");
        assert_eq!(strip_trailing_particle("お腹が"), "お腹");
        assert_eq!(strip_trailing_particle("日本について"), "日本");
    }

    #[test]
    fn test_first_match_in_list_order_wins() {
        // "で" is listed before "まで"
        assert_eq!(strip_trailing_particle("東京まで"), "東京ま");
        // "な" is listed before "ような"
        assert_eq!(strip_trailing_particle("雪のような"), "雪のよう");
        // "よね" is listed before "ね"
        assert_eq!(strip_trailing_particle("いいよね"), "いい");
        assert_eq!(strip_trailing_particle("雨でしょう"), "雨");
    }

    #[test]
    fn test_never_empties() {
        assert_eq!(strip_trailing_particle("が"), "が");
        assert_eq!(strip_trailing_particle("です"), "です");
        assert_eq!(strip_trailing_particle(""), "");
    }

    #[test]
    fn test_whole_particle_skipped_for_next_match() {
        // "から" itself would be emptied; no other listed suffix matches
        assert_eq!(strip_trailing_particle("から"), "から");
        // "まで" would empty, but "で" matches first and leaves "ま"
        assert_eq!(strip_trailing_particle("まで"), "ま");
    }

    #[test]
    fn test_not_idempotent() {
        let once = strip_trailing_particle("本だけは");
        assert_eq!(once, "本だけ");
        assert_eq!(strip_trailing_particle(once), "本");
    }
}
