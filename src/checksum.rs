//! Weighted check character (ISO 7064 MOD 11-2) and the 18-character format.

use regex::Regex;
use std::sync::LazyLock;

/// Weight applied to each of the first 17 digits.
pub const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];

/// Check character indexed by `sum % 11`.
pub const CHECK_CHARS: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

/// 17 ASCII digits followed by a digit or `x`/`X`.
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{17}[0-9xX]$").expect("id pattern regex"));

/// Compute the check character for the first 17 characters of `body`.
///
/// Returns None if `body` is shorter than 17 characters or any of them is
/// not an ASCII digit.
pub fn check_char(body: &str) -> Option<char> {
    let bytes = body.as_bytes();
    if bytes.len() < 17 {
        return None;
    }
    let mut sum = 0;
    for (b, w) in bytes[..17].iter().zip(WEIGHTS) {
        if !b.is_ascii_digit() {
            return None;
        }
        sum += (b - b'0') as u32 * w;
    }
    Some(CHECK_CHARS[(sum % 11) as usize])
}

/// Format and check-character validation, no reference table involved.
pub fn check_id_card(id: &str) -> bool {
    if !ID_PATTERN.is_match(id) {
        return false;
    }
    let supplied = id.as_bytes()[17].to_ascii_uppercase() as char;
    check_char(id) == Some(supplied)
}

/// Insert the `19` century prefix after the 6-digit area code of a 15-digit
/// number and append the computed check character.
pub fn expand_short(id: &str) -> Option<String> {
    if id.len() != 15 || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut long = String::with_capacity(18);
    long.push_str(&id[..6]);
    long.push_str("19");
    long.push_str(&id[6..]);
    long.push(check_char(&long)?);
    Some(long)
}
