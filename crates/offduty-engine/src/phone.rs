//! Phone number normalization and loose equivalence.
//!
//! Whitelist entries are typically stored in E.164 (`+15551234567`) while the
//! number delivered with an incoming call may be national (`5551234567`),
//! formatted (`(555) 123-4567`) or carry a trunk prefix (`0501234567`).
//! [`equivalent`] matches such pairs by their shared trailing digits.

/// Minimum number of trailing digits two numbers must share to match loosely.
/// Shorter numbers (service codes, extensions) must match exactly.
pub const MIN_MATCH: usize = 7;

/// Longest leftover prefix accepted as a country code.
const MAX_COUNTRY_CODE_LEN: usize = 3;

/// Reduce a raw number to its dialable form.
///
/// Keeps ASCII digits, keeps a `+` only when it precedes every digit, and
/// converts keypad letters (`1-800-FLOWERS`) to their digits. Everything else
/// (spaces, dashes, parentheses, dots) is dropped.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '+' && out.is_empty() {
            out.push(c);
        } else if let Some(d) = keypad_digit(c) {
            out.push(d);
        }
    }
    out
}

/// Loose equivalence between two phone numbers.
///
/// Both sides are normalized and compared on digits only. They are equivalent
/// when the digits are identical, or when they share at least [`MIN_MATCH`]
/// trailing digits and the remaining prefixes look like a country code on one
/// side against nothing or a single `0` trunk prefix on the other.
///
/// An empty number is never equivalent to anything.
pub fn equivalent(a: &str, b: &str) -> bool {
    let da = digits(a);
    let db = digits(b);

    if da.is_empty() || db.is_empty() {
        return false;
    }
    if da == db {
        return true;
    }

    let matched = da
        .bytes()
        .rev()
        .zip(db.bytes().rev())
        .take_while(|(x, y)| x == y)
        .count();
    if matched < MIN_MATCH {
        return false;
    }

    let rest_a = &da[..da.len() - matched];
    let rest_b = &db[..db.len() - matched];
    prefixes_compatible(rest_a, rest_b) || prefixes_compatible(rest_b, rest_a)
}

fn prefixes_compatible(country: &str, other: &str) -> bool {
    country.len() <= MAX_COUNTRY_CODE_LEN && (other.is_empty() || other == "0")
}

fn digits(raw: &str) -> String {
    normalize(raw).chars().filter(|c| c.is_ascii_digit()).collect()
}

fn keypad_digit(c: char) -> Option<char> {
    let d = match c.to_ascii_lowercase() {
        'a' | 'b' | 'c' => '2',
        'd' | 'e' | 'f' => '3',
        'g' | 'h' | 'i' => '4',
        'j' | 'k' | 'l' => '5',
        'm' | 'n' | 'o' => '6',
        'p' | 'q' | 'r' | 's' => '7',
        't' | 'u' | 'v' => '8',
        'w' | 'x' | 'y' | 'z' => '9',
        _ => return None,
    };
    Some(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_formatting() {
        assert_eq!(normalize("+1 (555) 123-4567"), "+15551234567");
        assert_eq!(normalize("555.123.4567"), "5551234567");
    }

    #[test]
    fn normalize_keeps_only_leading_plus() {
        assert_eq!(normalize("  +972 50"), "+97250");
        assert_eq!(normalize("555+1"), "5551");
    }

    #[test]
    fn normalize_converts_keypad_letters() {
        assert_eq!(normalize("1-800-FLOWERS"), "18003569377");
    }

    #[test]
    fn country_code_tolerated() {
        assert!(equivalent("+15551234567", "5551234567"));
        assert!(equivalent("5551234567", "+15551234567"));
    }

    #[test]
    fn trunk_prefix_tolerated() {
        assert!(equivalent("+972501234567", "0501234567"));
    }

    #[test]
    fn different_country_codes_do_not_match() {
        assert!(!equivalent("+15551234567", "+445551234567"));
    }

    #[test]
    fn different_subscriber_numbers_do_not_match() {
        assert!(!equivalent("+15551234567", "+15551234568"));
    }

    #[test]
    fn short_numbers_need_exact_match() {
        assert!(equivalent("911", "911"));
        assert!(!equivalent("1911", "911"));
    }

    #[test]
    fn empty_never_matches() {
        assert!(!equivalent("", ""));
        assert!(!equivalent("anonymous-", ""));
        assert!(!equivalent("", "+15551234567"));
    }
}
