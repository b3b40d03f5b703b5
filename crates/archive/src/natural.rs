//! Natural (human-perceived) ordering of names.
//!
//! Runs of ASCII digits compare by numeric value instead of character by
//! character, so `page9.jpg` sorts before `page10.jpg`. Everything else
//! compares by code point: no case folding, no locale rules.

use std::cmp::Ordering;

/// Compare two names in natural order.
///
/// Both strings are scanned in lockstep. When both sides are at an ASCII digit,
/// the maximal digit run is taken from each and compared by magnitude (leading
/// zeros stripped). Runs of equal value but different zero-padding compare as
/// equal and the scan continues after them. Any other pair of characters
/// compares by code point. A string that runs out first orders first.
///
/// Because zero-padding is ignored, distinct strings can compare as
/// [`Ordering::Equal`] (`"007"` and `"7"`). The relation is still a total
/// preorder, which is all [`slice::sort_by`] needs.
///
/// ```
/// use coview_archive::natural::compare;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare("page9.jpg", "page10.jpg"), Ordering::Less);
/// assert_eq!(compare("page09.jpg", "page9.jpg"), Ordering::Equal);
/// assert_eq!(compare("a2b", "a10b"), Ordering::Less);
/// ```
pub fn compare(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        let (ca, cb) = match (a.chars().next(), b.chars().next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) => (ca, cb),
        };
        if ca.is_ascii_digit() && cb.is_ascii_digit() {
            let (run_a, rest_a) = split_digit_run(a);
            let (run_b, rest_b) = split_digit_run(b);
            match compare_magnitude(run_a, run_b) {
                Ordering::Equal => {},
                unequal => return unequal,
            }
            (a, b) = (rest_a, rest_b);
            continue;
        }
        match ca.cmp(&cb) {
            Ordering::Equal => {},
            unequal => return unequal,
        }
        (a, b) = (&a[ca.len_utf8()..], &b[cb.len_utf8()..]);
    }
}

/// Sort a slice of names in place, in natural order.
///
/// Stable: names that compare equal (differing only in zero-padding) keep their
/// relative order.
pub fn sort<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare(a.as_ref(), b.as_ref()));
}

/// Split off the leading run of ASCII digits. Digits are single-byte, so the
/// byte position is always a char boundary.
fn split_digit_run(s: &str) -> (&str, &str) {
    let end = s.bytes().position(|b| !b.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Compare two digit runs by value without parsing (runs can be longer than
/// any integer type).
fn compare_magnitude(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
