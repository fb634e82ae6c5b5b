// src/extractors/numeric.rs

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 1조 expressed in 억 (the unit the portal publishes money in).
const EOK_PER_JO: i64 = 10_000;
/// 1경 expressed in 억.
const EOK_PER_GYEONG: i64 = 100_000_000;

/// A scraped number, kept in the representation the page published it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Numeric {
    Integer(i64),
    Decimal(#[serde(with = "rust_decimal::serde::float")] Decimal),
}

impl Numeric {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Integer(v) => Some(*v),
            Numeric::Decimal(_) => None,
        }
    }

    pub fn to_decimal(&self) -> Decimal {
        match self {
            Numeric::Integer(v) => Decimal::from(*v),
            Numeric::Decimal(d) => *d,
        }
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Integer(v) => write!(f, "{}", v),
            Numeric::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// Coerces a cleaned token: integer first, then decimal, otherwise `None`.
///
/// Thousands separators must already be removed (see [`strip_thousands`]).
/// Integers are bounded by `i64`; a wider digit-only token comes back as a
/// `Decimal` holding the same exact value.
pub fn coerce(token: &str) -> Option<Numeric> {
    let token = token.trim();
    if !token.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }

    if let Ok(v) = token.parse::<i64>() {
        return Some(Numeric::Integer(v));
    }

    Decimal::from_str(token).ok().map(Numeric::Decimal)
}

/// Removes thousands separators: "2,437,714" -> "2437714".
pub fn strip_thousands(text: &str) -> String {
    text.replace(',', "")
}

/// Strips separators and coerces in one go, the way table cells are read.
pub fn coerce_localized(text: &str) -> Option<Numeric> {
    coerce(&strip_thousands(text))
}

/// Parses the market-cap text into a whole number of 억원.
///
/// The page writes large caps with Korean magnitude words, e.g.
/// "412조8,394" (412 * 10,000 + 8,394 억) or "1경2조".
pub fn parse_market_cap(text: &str) -> Option<Numeric> {
    let cleaned = strip_thousands(text);
    let cleaned: String = cleaned.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    let mut total: i64 = 0;
    let mut rest = cleaned.as_str();

    for (marker, scale) in [('경', EOK_PER_GYEONG), ('조', EOK_PER_JO)] {
        if let Some((head, tail)) = rest.split_once(marker) {
            let head = head.parse::<i64>().ok()?;
            total = total.checked_add(head.checked_mul(scale)?)?;
            rest = tail;
        }
    }

    // Trailing unit text ("억원") is not part of the number.
    let rest = rest.trim_end_matches("억원").trim_end_matches('억');
    if !rest.is_empty() {
        total = total.checked_add(rest.parse::<i64>().ok()?)?;
    } else if total == 0 {
        return None;
    }

    Some(Numeric::Integer(total))
}
