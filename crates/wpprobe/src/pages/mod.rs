//! Page objects, one per screen.
//!
//! Every page object holds a clone of the suite's [`Session`](crate::Session)
//! and builds its locators on demand, so nothing on a page is cached between
//! two operations.

pub mod flextable;
pub mod woocommerce;

use crate::locator::{AriaRole, Locator, Selector};
use std::time::Duration;

/// Budget for elements that appear after a server round trip
pub(crate) const SLOW_ELEMENT: Duration = Duration::from_secs(15);

/// Sandbox hosts show an interstitial with a "Continue" button
pub(crate) fn sandbox_continue_button() -> Locator {
    Locator::from_selector(Selector::role(AriaRole::Button, "Continue"))
}

/// How long to look for the sandbox interstitial before assuming there is none
pub(crate) const SANDBOX_PROBE: Duration = Duration::from_secs(5);

/// `base` and `path` joined by exactly one slash
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("https://shop.test/", "my-account/"), "https://shop.test/my-account/");
        assert_eq!(join_url("https://shop.test", "/my-account/"), "https://shop.test/my-account/");
    }
}
