use super::*;

#[test]
fn octet_string_is_eq_returns_zero_for_equal() {
    assert_eq!(octet_string_is_eq(b"abc", b"abc"), 0);
}

#[test]
fn octet_string_is_eq_returns_nonzero_for_different() {
    assert_ne!(octet_string_is_eq(b"abc", b"abd"), 0);
    assert_ne!(octet_string_is_eq(b"abc", b"ab"), 0);
}
