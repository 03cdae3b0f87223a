//! Assertions for page verification.
//!
//! Pure checks return an [`AssertionResult`]; `into_result` turns a failed
//! one into [`ProbeError::AssertionFailed`] so it propagates with `?`.

use crate::locator::{BoundingBox, Locator};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use std::fmt::Debug;

/// Result of an assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    /// Whether the assertion passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Expected value, rendered
    pub expected: String,
    /// Observed value, rendered
    pub actual: String,
}

impl AssertionResult {
    /// Create a passing assertion result
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            message: String::new(),
            expected: String::new(),
            actual: String::new(),
        }
    }

    /// Create a failing assertion result
    #[must_use]
    pub fn fail(message: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// `Ok(())` when passed, `AssertionFailed` otherwise
    pub fn into_result(self) -> ProbeResult<()> {
        if self.passed {
            Ok(())
        } else {
            Err(ProbeError::AssertionFailed {
                message: self.message,
                expected: self.expected,
                actual: self.actual,
            })
        }
    }
}

/// Assertion helpers
#[derive(Debug, Clone, Copy)]
pub struct Assertion;

impl Assertion {
    /// Assert two values are equal
    #[must_use]
    pub fn equals<T: PartialEq + Debug>(what: &str, expected: &T, actual: &T) -> AssertionResult {
        if expected == actual {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(what, format!("{expected:?}"), format!("{actual:?}"))
        }
    }

    /// Assert a string contains a substring
    #[must_use]
    pub fn contains(what: &str, haystack: &str, needle: &str) -> AssertionResult {
        if haystack.contains(needle) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(what, format!("text containing {needle:?}"), haystack)
        }
    }

    /// Assert a condition is true
    #[must_use]
    pub fn is_true(condition: bool, message: &str) -> AssertionResult {
        if condition {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(message, "true", "false")
        }
    }

    /// Assert `upper` starts strictly above `lower`
    #[must_use]
    pub fn above(what: &str, upper: &BoundingBox, lower: &BoundingBox) -> AssertionResult {
        if upper.is_above(lower) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(
                what,
                format!("top < {}", lower.top()),
                format!("top = {}", upper.top()),
            )
        }
    }

    /// Assert `lower` starts strictly below `upper`
    #[must_use]
    pub fn below(what: &str, lower: &BoundingBox, upper: &BoundingBox) -> AssertionResult {
        if lower.is_below(upper) {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(
                what,
                format!("top > {}", upper.top()),
                format!("top = {}", lower.top()),
            )
        }
    }

    /// Assert a collection has expected length
    #[must_use]
    pub fn has_length<T>(what: &str, collection: &[T], expected: usize) -> AssertionResult {
        if collection.len() == expected {
            AssertionResult::pass()
        } else {
            AssertionResult::fail(what, expected.to_string(), collection.len().to_string())
        }
    }
}

/// Fail unless `upper` is rendered above `lower`
pub async fn assert_above(session: &Session, upper: &Locator, lower: &Locator) -> ProbeResult<()> {
    let a = session.bounding_box(upper).await?;
    let b = session.bounding_box(lower).await?;
    Assertion::above(&format!("{upper} above {lower}"), &a, &b).into_result()
}

/// Fail unless `lower` is rendered below `upper`
pub async fn assert_below(session: &Session, lower: &Locator, upper: &Locator) -> ProbeResult<()> {
    let a = session.bounding_box(lower).await?;
    let b = session.bounding_box(upper).await?;
    Assertion::below(&format!("{lower} below {upper}"), &a, &b).into_result()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod assertion_tests {
        use super::*;

        #[test]
        fn test_equals() {
            assert!(Assertion::equals("n", &5, &5).passed);
            let failed = Assertion::equals("n", &5, &6);
            assert!(!failed.passed);
            assert_eq!(failed.expected, "5");
            assert_eq!(failed.actual, "6");
        }

        #[test]
        fn test_contains_into_result() {
            assert!(Assertion::contains("cta", "Get started with your first table", "first table")
                .into_result()
                .is_ok());
            let err = Assertion::contains("cta", "Welcome", "first table")
                .into_result()
                .unwrap_err();
            assert_eq!(err.kind(), "assertion");
        }

        #[test]
        fn test_has_length() {
            assert!(Assertion::has_length("rows", &[1, 2, 3], 3).passed);
            assert!(!Assertion::has_length("rows", &[1], 3).passed);
        }
    }

    mod geometry_tests {
        use super::*;
        use crate::driver::{MockDriver, MockElement};
        use crate::session::SessionConfig;

        #[test]
        fn test_title_above_table_and_swapped() {
            let title = BoundingBox::new(0.0, 100.0, 300.0, 40.0);
            let table = BoundingBox::new(0.0, 300.0, 800.0, 500.0);
            assert!(Assertion::above("title", &title, &table).passed);
            assert!(!Assertion::above("title", &table, &title).passed);
            assert!(Assertion::below("table", &table, &title).passed);
        }

        #[tokio::test]
        async fn test_assert_above_on_page() {
            let mock = MockDriver::new();
            let title = Locator::new(".swptls-table-title");
            let table = Locator::new("#create_tables_wrapper");
            mock.set_one(&title, MockElement::text("Students").with_box(BoundingBox::new(0.0, 100.0, 300.0, 40.0)));
            mock.set_one(&table, MockElement::default().with_box(BoundingBox::new(0.0, 300.0, 800.0, 500.0)));
            let session = Session::new(mock, SessionConfig::default());
            assert_above(&session, &title, &table).await.unwrap();
            assert_below(&session, &table, &title).await.unwrap();
            assert!(assert_above(&session, &table, &title).await.is_err());
        }
    }
}
