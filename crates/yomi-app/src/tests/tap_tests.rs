use crate::io::parse_tap;

#[test]
fn test_parse_tap() {
    assert_eq!(parse_tap("0 3"), Some((0, 3)));
    assert_eq!(parse_tap("  12   0 "), Some((12, 0)));
}

#[test]
fn test_parse_tap_rejects_malformed_input() {
    assert_eq!(parse_tap("3"), None);
    assert_eq!(parse_tap("a 1"), None);
    assert_eq!(parse_tap("1 -2"), None);
    assert_eq!(parse_tap("1 2 3"), None);
}
