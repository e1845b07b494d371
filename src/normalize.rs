//! Keystroke-level reformatting of card fields.
//!
//! These run on every edit and never fail: malformed input just
//! normalizes to fewer (or zero) groups.

/// Maximum CVC length accepted by the input.
pub const CVC_MAX_LEN: usize = 3;

const PAN_GROUP: usize = 4;

/// Format a raw card number for display: keep only the digits and group
/// them in runs of 4 separated by single spaces.
///
/// Idempotent: `format_pan(&format_pan(s)) == format_pan(s)`.
pub fn format_pan(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + raw.len() / PAN_GROUP);
    for (idx, digit) in raw.chars().filter(char::is_ascii_digit).enumerate() {
        if idx > 0 && idx % PAN_GROUP == 0 {
            out.push(' ');
        }
        out.push(digit);
    }
    out
}

/// Remove all whitespace from a card number, as sent to the processor.
pub fn strip_pan(pan: &str) -> String {
    pan.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Truncate the CVC to its maximum input length.
pub fn normalize_cvc(raw: &str) -> String {
    raw.chars().take(CVC_MAX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(len: usize) -> String {
        (0..len).map(|i| char::from(b'0' + (i % 10) as u8)).collect()
    }

    #[test]
    fn groups_digits_by_four() {
        assert_eq!(format_pan("4111111111111111"), "4111 1111 1111 1111");
        assert_eq!(format_pan("41111"), "4111 1");
        assert_eq!(format_pan("4111"), "4111");
        assert_eq!(format_pan("1234567890123456789"), "1234 5678 9012 3456 789");
    }

    #[test]
    fn no_trailing_separator() {
        assert_eq!(format_pan("12345678"), "1234 5678");
    }

    #[test]
    fn strips_non_digits() {
        assert_eq!(format_pan("4111-1111 abcd 11"), "4111 1111 11");
        assert_eq!(format_pan("abc"), "");
        assert_eq!(format_pan(""), "");
    }

    #[test]
    fn regroups_after_deletion_in_the_middle() {
        // "4111 1111" with the 5th digit deleted
        assert_eq!(format_pan("4111 111"), "4111 111");
        assert_eq!(format_pan("411 1111"), "4111 111");
    }

    #[test]
    fn digits_survive_normalization_for_every_length() {
        for len in 0..=19 {
            let input = digits(len);
            let formatted = format_pan(&input);
            assert_eq!(strip_pan(&formatted), input, "length {len}");
            assert_eq!(format_pan(&formatted), formatted, "length {len}");
        }
    }

    #[test]
    fn idempotent_on_mixed_input() {
        for raw in ["4 1 1 1 2", "12ab34 56--78 9", "   ", "0000 0000 0000 0000 000"] {
            let once = format_pan(raw);
            assert_eq!(format_pan(&once), once, "input {raw:?}");
        }
    }

    #[test]
    fn strip_removes_all_whitespace() {
        assert_eq!(strip_pan("4111 1111\t1111 1111"), "4111111111111111");
    }

    #[test]
    fn cvc_is_truncated() {
        assert_eq!(normalize_cvc("1234"), "123");
        assert_eq!(normalize_cvc("12"), "12");
        assert_eq!(normalize_cvc(""), "");
    }
}
