//! WooCommerce admin: login, orders list and the edit-order screen.

use crate::locator::{Locator, Selector};
use crate::money::{digits_of, MoneyAmount};
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::reconcile::{PricedListLocators, QuantitySource};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{ElementState, LoadState};

const ORDER_TOTAL: &str = "//td[text()=\"Order Total:\"]/following-sibling::td[@class=\"total\"]//bdi";

/// `wp-admin/` as the shop manager
#[derive(Debug, Clone)]
pub struct WooComAdminPage {
    session: Session,
    admin_url: String,
}

impl PageObject for WooComAdminPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "wp-admin"
    }
}

impl WooComAdminPage {
    /// Create the page object for the admin at `admin_url`
    #[must_use]
    pub fn new(session: &Session, admin_url: &str) -> Self {
        Self {
            session: session.clone(),
            admin_url: admin_url.to_string(),
        }
    }

    pub(crate) fn item_names() -> Locator {
        Locator::new(".wc-order-item-name")
    }

    pub(crate) fn visible_quantities() -> Locator {
        Locator::new("td.quantity").visible_only()
    }

    pub(crate) fn status_select() -> Locator {
        Locator::new("#order_status")
    }

    pub(crate) fn save_notice() -> Locator {
        Locator::new("div[id='message'] p").with_timeout(SLOW_ELEMENT)
    }

    pub(crate) fn account_menu() -> Locator {
        Locator::new("#wp-admin-bar-my-account")
    }

    pub(crate) fn logout_link() -> Locator {
        Locator::new("#wp-admin-bar-logout a")
    }

    /// Locators of the edit-order line items
    #[must_use]
    pub fn order_locators() -> PricedListLocators {
        PricedListLocators {
            boundary: "admin order".to_string(),
            unit_price: Some(Locator::new("#order_line_items td.item_cost .view")),
            quantity: Locator::new("#order_line_items td.quantity .view"),
            quantity_source: QuantitySource::Text,
            subtotal: Locator::new("#order_line_items td.line_cost .view"),
            shipping: Some(Locator::new("#order_shipping_line_items td.line_cost .view").first()),
            total: Locator::from_selector(Selector::xpath(ORDER_TOTAL)),
        }
    }

    /// Open the admin login screen
    pub async fn open_admin(&self) -> ProbeResult<()> {
        self.session
            .goto_until(&self.admin_url, LoadState::DomContentLoaded)
            .await
    }

    /// Submit the admin login form
    pub async fn login_admin(&self, username: &str, password: &str) -> ProbeResult<()> {
        self.session.fill(&Locator::new("#user_login"), username).await?;
        self.session.fill(&Locator::new("#user_pass"), password).await?;
        self.session.click(&Locator::new("#wp-submit")).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// Whether the dashboard heading is shown
    pub async fn is_dashboard_visible(&self) -> ProbeResult<bool> {
        let heading = self
            .session
            .text_content(&Locator::new("div[class='wrap'] h1").with_timeout(SLOW_ELEMENT))
            .await?;
        Ok(heading.contains("Dashboard"))
    }

    /// Open WooCommerce → Orders
    pub async fn open_orders_list(&self) -> ProbeResult<()> {
        let menu = Locator::new(
            "a[class='wp-has-submenu wp-not-current-submenu menu-top toplevel_page_woocommerce menu-top-first'] div[class='wp-menu-name']",
        );
        if self.session.is_visible(&menu).await? {
            self.session.hover(&menu).await?;
        }
        self.session
            .click(&Locator::new("a[href='edit.php?post_type=shop_order']").first())
            .await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// The list heading contains "Orders"
    pub async fn verify_orders_list_loaded(&self) -> ProbeResult<()> {
        self.session
            .expect_contains_text(&Locator::new("h1.wp-heading-inline"), "Orders")
            .await
    }

    /// Open the row titled `#<number> <customer>`
    pub async fn open_order_row(&self, number: u64, customer: &str) -> ProbeResult<()> {
        self.session.scroll_to_bottom().await?;
        let row = Locator::from_selector(Selector::css_with_text("strong", format!("#{number} {customer}")))
            .first()
            .with_timeout(SLOW_ELEMENT);
        self.session.click(&row).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// The edit-order heading is shown
    pub async fn verify_order_details_page_open(&self) -> ProbeResult<()> {
        self.session
            .expect_contains_text(
                &Locator::new(".wp-heading-inline").with_timeout(SLOW_ELEMENT),
                "Edit order",
            )
            .await
    }

    /// The order data heading names `Order #<number>`
    pub async fn verify_order_title_contains(&self, number: u64) -> ProbeResult<()> {
        let source = Locator::new("div[id='woocommerce-order-source-data'] h2[class='hndle ui-sortable-handle']");
        if self.session.count(&source).await? > 0 {
            self.session.scroll_into_view(&source).await?;
        }
        self.session
            .expect_contains_text(
                &Locator::new(".woocommerce-order-data__heading"),
                &format!("Order #{number}"),
            )
            .await
    }

    /// The customer picker shows `expected`
    pub async fn verify_customer_name(&self, expected: &str) -> ProbeResult<()> {
        self.session
            .expect_contains_text(
                &Locator::from_selector(Selector::xpath("//span[@id='select2-customer_user-container']")),
                expected,
            )
            .await
    }

    /// Number of line items
    pub async fn order_items_count(&self) -> ProbeResult<usize> {
        let notes = Locator::from_selector(Selector::css_with_text("h2", "Order notes")).first();
        if self.session.count(&notes).await? > 0 {
            self.session.scroll_into_view(&notes).await?;
        }
        self.session
            .wait_for(&Self::item_names().first(), ElementState::Attached)
            .await?;
        self.session.count(&Self::item_names()).await
    }

    /// Sum of the visible quantity cells, one per line item
    pub async fn total_quantity(&self) -> ProbeResult<u64> {
        let items = self.session.count(&Self::item_names()).await?;
        let mut sum = 0;
        for index in 0..items {
            let text = self
                .session
                .text_content(&Self::visible_quantities().nth(index))
                .await?;
            sum += digits_of(&text);
        }
        Ok(sum)
    }

    /// Order total on the edit-order screen
    pub async fn order_total_price(&self) -> ProbeResult<MoneyAmount> {
        let total = Self::order_locators().total;
        self.session.scroll_into_view(&total).await?;
        Ok(MoneyAmount::from_text(&self.session.text_content(&total).await?))
    }

    /// Set the status to Completed, save, and return the label of the
    /// selected option
    pub async fn change_status_to_completed_and_save(&self) -> ProbeResult<String> {
        let select = Self::status_select();
        self.session.scroll_into_view(&select).await?;
        self.session.select_option(&select, "wc-completed").await?;
        self.session.expect_value(&select, "wc-completed").await?;
        let label = self.session.selected_option_text(&select).await?.trim().to_string();
        self.session.click(&Locator::new("button[name=\"save\"]")).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await?;
        self.session
            .wait_for(&Self::save_notice(), ElementState::Visible)
            .await?;
        tracing::info!(status = %label, "order status saved");
        Ok(label)
    }

    /// Log out through the admin bar
    pub async fn logout_admin(&self) -> ProbeResult<()> {
        self.session.hover(&Self::account_menu()).await?;
        self.session
            .wait_for(&Self::logout_link(), ElementState::Visible)
            .await?;
        self.session.click(&Self::logout_link()).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// The login screen reports the logout
    pub async fn verify_logged_out(&self) -> ProbeResult<()> {
        self.session
            .expect_contains_text(
                &Locator::new("div[id='login-message'] p").with_timeout(SLOW_ELEMENT),
                "You are now logged out.",
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
    use crate::reconcile::reconcile_priced_list;
    use crate::session::SessionConfig;
    use std::time::Duration;

    fn fast() -> SessionConfig {
        SessionConfig {
            element_timeout: Duration::from_millis(200),
            navigation_timeout: Duration::from_millis(1_000),
            poll_interval: Duration::from_millis(10),
            network_idle: Duration::from_millis(100),
        }
    }

    fn edit_order() -> MockDriver {
        let mock = MockDriver::new();
        let l = WooComAdminPage::order_locators();
        mock.set(
            &WooComAdminPage::item_names(),
            vec![MockElement::text("Album"), MockElement::text("Beanie"), MockElement::text("Belt")],
        );
        mock.set(
            &Locator::new("td.quantity"),
            vec![
                MockElement::text("× 1"),
                MockElement::text("hidden editor").hidden(),
                MockElement::text("× 1"),
                MockElement::text("× 2"),
            ],
        );
        mock.set(
            l.unit_price.as_ref().unwrap(),
            vec![MockElement::text("$15.00"), MockElement::text("$18.00"), MockElement::text("$55.00")],
        );
        mock.set(
            &l.quantity,
            vec![MockElement::text("× 1"), MockElement::text("× 1"), MockElement::text("× 2")],
        );
        mock.set(
            &l.subtotal,
            vec![MockElement::text("$15.00"), MockElement::text("$18.00"), MockElement::text("$110.00")],
        );
        mock.set_one(&Locator::new("#order_shipping_line_items td.line_cost .view"), MockElement::text("$5.00"));
        mock.set_one(&l.total, MockElement::text("$148.00"));
        mock
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_skip_hidden_quantity_cells() {
        let session = Session::new(edit_order(), fast());
        let admin = WooComAdminPage::new(&session, "https://shop.test/wp-admin");
        assert_eq!(admin.order_items_count().await.unwrap(), 3);
        assert_eq!(admin.total_quantity().await.unwrap(), 4);
        assert_eq!(admin.order_total_price().await.unwrap(), MoneyAmount(14800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admin_view_reconciles() {
        let session = Session::new(edit_order(), fast());
        let report = reconcile_priced_list(&session, &WooComAdminPage::order_locators(), 3)
            .await
            .unwrap();
        assert_eq!(report.shipping, MoneyAmount(500));
        assert_eq!(report.total, MoneyAmount(14800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_change_returns_label() {
        let mock = MockDriver::new();
        mock.set_one(
            &WooComAdminPage::status_select(),
            MockElement::select(&[
                ("wc-processing", "Processing"),
                ("wc-completed", "Completed"),
            ]),
        );
        mock.set_one(&Locator::new("button[name=\"save\"]"), MockElement::text("Update"));
        let notice = WooComAdminPage::save_notice().key();
        mock.on_click(&Locator::new("button[name=\"save\"]"), move |page| {
            page.set(notice.clone(), vec![MockElement::text("Order updated.")]);
        });
        let session = Session::new(mock, fast());
        let admin = WooComAdminPage::new(&session, "https://shop.test/wp-admin");
        assert_eq!(admin.change_status_to_completed_and_save().await.unwrap(), "Completed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_row_selector() {
        let mock = MockDriver::new();
        let row = Locator::from_selector(Selector::css_with_text("strong", "#812 Tanvir Tester1"));
        mock.set_one(&row, MockElement::text("#812 Tanvir Tester1"));
        let session = Session::new(mock.clone(), fast());
        WooComAdminPage::new(&session, "https://shop.test/wp-admin")
            .open_order_row(812, "Tanvir Tester1")
            .await
            .unwrap();
        assert!(mock.was_called("scroll:bottom"));
        assert_eq!(mock.calls("click:strong"), 1);
    }
}
