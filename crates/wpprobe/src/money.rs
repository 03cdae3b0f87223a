//! Digit-only parsing of rendered amounts and quantities.
//!
//! `MoneyAmount::from_text("$120.00")` is `12000`: every non-digit character,
//! the decimal separator included, is dropped. That keeps amounts comparable
//! only while the storefront renders exactly two decimals, so
//! [`MoneyAmount::from_text`] logs a warning for any other shape.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Amount as the concatenation of every digit in its rendered text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoneyAmount(pub u64);

impl MoneyAmount {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Parse rendered text; no digits parses to zero, overflow saturates
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        if let Some(digits) = fraction_digits(text) {
            if digits != 2 {
                tracing::warn!(
                    text,
                    fraction_digits = digits,
                    "amount does not carry two decimals; digit-only parsing changes its scale"
                );
            }
        }
        Self(digits_of(text))
    }

    /// Raw value
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// `self * quantity`, saturating
    #[must_use]
    pub const fn times(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }
}

impl Add for MoneyAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for MoneyAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for MoneyAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for MoneyAmount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Concatenate every ASCII digit of `text` into a number
#[must_use]
pub fn digits_of(text: &str) -> u64 {
    text.bytes()
        .filter(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}

/// Number of digits after the last `.`, `None` when there is no `.` followed
/// by a digit
#[must_use]
pub fn fraction_digits(text: &str) -> Option<usize> {
    let (_, tail) = text.rsplit_once('.')?;
    let count = tail.chars().take_while(char::is_ascii_digit).count();
    (count > 0).then_some(count)
}

/// Leading integer of trimmed text, `default` when empty or unparsable.
///
/// `"2"` → 2, `"12 items"` → 12, `""` → `default`, `"abc"` → `default`.
#[must_use]
pub fn parse_leading_int(text: &str, default: u64) -> u64 {
    let trimmed = text.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = unsigned.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return default;
    }
    digits_of(&digits)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod money_tests {
        use super::*;

        #[test]
        fn test_strips_currency_and_separator() {
            assert_eq!(MoneyAmount::from_text("$120.00").value(), 12000);
            assert_eq!(MoneyAmount::from_text("$240.00").value(), 24000);
            assert_eq!(MoneyAmount::from_text("৳ 1,250.50").value(), 125050);
        }

        #[test]
        fn test_empty_is_zero() {
            assert_eq!(MoneyAmount::from_text(""), MoneyAmount::ZERO);
            assert_eq!(MoneyAmount::from_text("Free!"), MoneyAmount::ZERO);
        }

        #[test]
        fn test_overflow_saturates() {
            let huge = "9".repeat(40);
            assert_eq!(MoneyAmount::from_text(&huge).value(), u64::MAX);
            assert_eq!(MoneyAmount(u64::MAX).times(2).value(), u64::MAX);
        }

        #[test]
        fn test_sum() {
            let total: MoneyAmount = [12000, 24000, 500].into_iter().map(MoneyAmount).sum();
            assert_eq!(total.value(), 36500);
        }
    }

    mod fraction_tests {
        use super::*;

        #[test]
        fn test_fraction_digits() {
            assert_eq!(fraction_digits("$1.50"), Some(2));
            assert_eq!(fraction_digits("$1.5"), Some(1));
            assert_eq!(fraction_digits("$10"), None);
            assert_eq!(fraction_digits("Mr. Smith"), None);
        }
    }

    mod leading_int_tests {
        use super::*;

        #[test]
        fn test_leading_int() {
            assert_eq!(parse_leading_int("2", 1), 2);
            assert_eq!(parse_leading_int("  12 items", 0), 12);
            assert_eq!(parse_leading_int("", 1), 1);
            assert_eq!(parse_leading_int("abc", 0), 0);
            assert_eq!(parse_leading_int("+3", 0), 3);
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_two_decimal_prices_scale_by_hundred(whole in 0u64..1_000_000, cents in 0u64..100) {
                let text = format!("${whole}.{cents:02}");
                prop_assert_eq!(MoneyAmount::from_text(&text).value(), whole * 100 + cents);
            }

            #[test]
            fn prop_non_digits_are_ignored(value in 0u64..1_000_000_000, noise in "[^0-9]{0,5}") {
                let text = format!("{noise}{value}{noise}");
                prop_assert_eq!(digits_of(&text), value);
            }

            #[test]
            fn prop_leading_int_matches_display(value in 0u64..1_000_000) {
                prop_assert_eq!(parse_leading_int(&value.to_string(), 7), value);
            }
        }
    }
}
