//! Page Object Model Support
//!
//! Each screen of the system under test is one page object: a thin wrapper
//! holding a [`Session`] clone and exposing named action and verification
//! operations. Page objects never combine an action with its verification;
//! the scenario decides the order.
//!
//! ## Toyota Way Application:
//! - **Poka-Yoke**: typed locators per screen, no free-form selectors in scenarios
//! - **Muda**: page logic lives in one place, scenarios only sequence it
//! - **Genchi Genbutsu**: page objects reflect actual page structure

use crate::result::ProbeResult;
use crate::session::Session;
use async_trait::async_trait;

/// Trait for page objects representing a page or component in the UI.
///
/// # Example
///
/// ```ignore
/// struct OrdersPage {
///     session: Session,
/// }
///
/// #[async_trait]
/// impl PageObject for OrdersPage {
///     fn session(&self) -> &Session {
///         &self.session
///     }
///
///     fn url_pattern(&self) -> &str {
///         "edit.php?post_type=shop_order"
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Shared session this page drives
    fn session(&self) -> &Session;

    /// URL fragment identifying this page
    fn url_pattern(&self) -> &str;

    /// Get the page name for logging/debugging
    fn page_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Whether the browser is currently on this page
    async fn is_current(&self) -> ProbeResult<bool> {
        let url = self.session().current_url().await?;
        Ok(url.contains(self.url_pattern()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::session::SessionConfig;

    struct OrdersPage {
        session: Session,
    }

    #[async_trait]
    impl PageObject for OrdersPage {
        fn session(&self) -> &Session {
            &self.session
        }

        fn url_pattern(&self) -> &str {
            "edit.php?post_type=shop_order"
        }
    }

    #[tokio::test]
    async fn test_is_current_matches_fragment() {
        let mock = MockDriver::new();
        let page = OrdersPage {
            session: Session::new(mock.clone(), SessionConfig::default()),
        };
        assert!(!page.is_current().await.unwrap());
        mock.with_page(|p| p.url = "https://shop.test/wp-admin/edit.php?post_type=shop_order".to_string());
        assert!(page.is_current().await.unwrap());
    }

    #[test]
    fn test_page_name_is_type_name() {
        let page = OrdersPage {
            session: Session::new(MockDriver::new(), SessionConfig::default()),
        };
        assert_eq!(page.page_name(), "OrdersPage");
    }
}
