//! Integer literal spellings.
//!
//! The parser hands integer constants over as raw token text. Array sizes
//! and `case` labels need the value, so the spelling is classified here as
//! decimal, octal or hexadecimal (with optional `u`/`l` suffixes).

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DECIMAL: Regex = Regex::new(r"^(0|[1-9][0-9]*)[uUlL]*$").unwrap();
    static ref OCTAL: Regex = Regex::new(r"^0([0-7]+)[uUlL]*$").unwrap();
    static ref HEXADECIMAL: Regex = Regex::new(r"^0[xX]([0-9a-fA-F]+)[uUlL]*$").unwrap();
}

/// Radix an integer literal is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    Octal,
    Hexadecimal,
}

/// Classifies an integer literal spelling; `None` if it is not one.
pub fn classify_integer(text: &str) -> Option<Radix> {
    if HEXADECIMAL.is_match(text) {
        Some(Radix::Hexadecimal)
    } else if OCTAL.is_match(text) {
        Some(Radix::Octal)
    } else if DECIMAL.is_match(text) {
        Some(Radix::Decimal)
    } else {
        None
    }
}

/// Value of an integer literal spelling. Overflowing literals yield `None`.
pub fn parse_integer(text: &str) -> Option<u64> {
    let (digits, radix) = match classify_integer(text)? {
        Radix::Hexadecimal => (HEXADECIMAL.captures(text)?.get(1)?.as_str(), 16),
        Radix::Octal => (OCTAL.captures(text)?.get(1)?.as_str(), 8),
        Radix::Decimal => (DECIMAL.captures(text)?.get(1)?.as_str(), 10),
    };

    u64::from_str_radix(digits, radix).ok()
}
