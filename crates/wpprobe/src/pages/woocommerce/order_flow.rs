//! Cart, checkout and order-received screens.

use crate::context::OrderRecord;
use crate::locator::{Locator, Selector};
use crate::money::MoneyAmount;
use crate::normalize::{ensure_field_value, ensure_section_visibility, ensure_select_value, FieldChange, ToggleOutcome};
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::reconcile::{reconcile_priced_list, PricedListLocators, QuantitySource, ReconciliationReport};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::wait::{ElementState, LoadState};
use serde::{Deserialize, Serialize};

/// Billing form values the checkout is normalized to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingDetails {
    /// `#billing_first_name`
    pub first_name: String,
    /// `#billing_last_name`
    pub last_name: String,
    /// `#billing_address_1`
    pub address: String,
    /// `#billing_city`
    pub city: String,
    /// `#billing_state` option value
    pub state: String,
    /// `#billing_postcode`
    pub postcode: String,
    /// `#billing_phone`
    pub phone: String,
    /// `#billing_email`
    pub email: String,
}

impl Default for BillingDetails {
    fn default() -> Self {
        Self {
            first_name: "Tanvir".to_string(),
            last_name: "Tester1".to_string(),
            address: "123 Testing Avenue".to_string(),
            city: "Testing City".to_string(),
            state: "BD-13".to_string(),
            postcode: "1234".to_string(),
            phone: "+8801234567890".to_string(),
            email: "Tanvir@tester1.com".to_string(),
        }
    }
}

impl BillingDetails {
    /// Text fields paired with their input ids, in form order
    fn text_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("#billing_first_name", self.first_name.as_str()),
            ("#billing_last_name", self.last_name.as_str()),
            ("#billing_address_1", self.address.as_str()),
            ("#billing_city", self.city.as_str()),
            ("#billing_postcode", self.postcode.as_str()),
            ("#billing_phone", self.phone.as_str()),
            ("#billing_email", self.email.as_str()),
        ]
    }
}

/// Per-field result of [`OrderFlowPage::fill_billing_details_if_needed`]
pub type BillingChanges = Vec<(String, FieldChange)>;

/// `cart/`, `checkout/` and `checkout/order-received/`
#[derive(Debug, Clone)]
pub struct OrderFlowPage {
    session: Session,
}

impl PageObject for OrderFlowPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "checkout"
    }
}

impl OrderFlowPage {
    /// Create the page object
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    pub(crate) fn cart_table() -> Locator {
        Locator::new("table.shop_table.cart").with_timeout(SLOW_ELEMENT)
    }

    pub(crate) fn shipping_toggle() -> Locator {
        Locator::from_selector(Selector::css_with_text("span", "Ship to a different address?")).first()
    }

    pub(crate) fn shipping_section() -> Locator {
        Locator::new(".shipping_address")
    }

    pub(crate) fn order_number() -> Locator {
        Locator::new(".order-number").first()
    }

    pub(crate) fn order_status_label() -> Locator {
        Locator::new(".font-weight-bold.order-status.text-primary.text-uppercase")
    }

    fn thank_you() -> Locator {
        Locator::new("p.woocommerce-notice.woocommerce-notice--success.woocommerce-thankyou-order-received")
            .with_timeout(SLOW_ELEMENT)
    }

    /// Locators of the cart table
    #[must_use]
    pub fn cart_locators() -> PricedListLocators {
        PricedListLocators {
            boundary: "cart".to_string(),
            unit_price: Some(Locator::new("td.product-price")),
            quantity: Locator::new("input.input-text.qty.text"),
            quantity_source: QuantitySource::InputValue,
            subtotal: Locator::new("td.product-subtotal[data-title=\"Subtotal\"] .woocommerce-Price-amount.amount bdi"),
            shipping: Some(Locator::new("#shipping_method .woocommerce-Price-amount.amount").first()),
            total: Locator::new("tr.order-total td .woocommerce-Price-amount.amount bdi"),
        }
    }

    // =========================================================================
    // CART
    // =========================================================================

    /// Follow the "View cart" button to the cart page
    pub async fn go_to_cart_via_view_cart_button(&self) -> ProbeResult<()> {
        self.session
            .click(&Locator::new("a[class='button wc-forward']").first())
            .await?;
        self.session
            .wait_for(&Self::cart_table(), ElementState::Visible)
            .await
            .map(|_| ())
    }

    /// Whether the cart table is shown
    pub async fn is_cart_table_visible(&self) -> ProbeResult<bool> {
        self.session.is_visible(&Self::cart_table()).await
    }

    /// Reconcile `rows` cart rows, shipping and grand total
    pub async fn verify_cart_totals(&self, rows: usize) -> ProbeResult<ReconciliationReport> {
        reconcile_priced_list(&self.session, &Self::cart_locators(), rows).await
    }

    /// Shipping amount on the cart page
    pub async fn shipping_price(&self) -> ProbeResult<MoneyAmount> {
        let locator = Self::cart_locators()
            .shipping
            .ok_or_else(|| ProbeError::precondition("cart has no shipping locator"))?;
        Ok(MoneyAmount::from_text(&self.session.inner_text(&locator).await?))
    }

    /// Grand total on the cart page
    pub async fn displayed_total(&self) -> ProbeResult<MoneyAmount> {
        Ok(MoneyAmount::from_text(
            &self.session.inner_text(&Self::cart_locators().total).await?,
        ))
    }

    /// Leave the cart for the checkout form
    pub async fn proceed_to_checkout(&self) -> ProbeResult<()> {
        self.session
            .click(&Locator::from_selector(Selector::css_with_text("a", "PROCEED TO CHECKOUT")).first())
            .await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    // =========================================================================
    // CHECKOUT
    // =========================================================================

    /// The billing section heading is shown
    pub async fn verify_billing_section_visible(&self) -> ProbeResult<()> {
        self.session
            .expect_visible(
                &Locator::from_selector(Selector::css_with_text("h3", "Billing details"))
                    .first()
                    .with_timeout(SLOW_ELEMENT),
            )
            .await
    }

    /// Bring every billing field to `details`, writing only what differs
    pub async fn fill_billing_details_if_needed(&self, details: &BillingDetails) -> ProbeResult<BillingChanges> {
        let mut changes = Vec::with_capacity(8);
        for (id, target) in details.text_fields() {
            let change = ensure_field_value(&self.session, &Locator::new(id), target).await?;
            changes.push((id.to_string(), change));
        }
        let state = "#billing_state";
        let change = ensure_select_value(&self.session, &Locator::new(state), &details.state).await?;
        changes.push((state.to_string(), change));
        let written = changes.iter().filter(|(_, c)| c.was_written()).count();
        tracing::info!(written, total = changes.len(), "billing details normalized");
        Ok(changes)
    }

    /// Make sure "Ship to a different address?" is off
    pub async fn ensure_shipping_address_hidden(&self) -> ProbeResult<ToggleOutcome> {
        self.session
            .scroll_into_view(&Locator::new("#shipping_company"))
            .await?;
        ensure_section_visibility(
            &self.session,
            &Self::shipping_toggle(),
            &Self::shipping_section(),
            false,
        )
        .await
    }

    /// Tick the terms checkbox
    pub async fn accept_terms(&self) -> ProbeResult<()> {
        let terms = Locator::new("#tos");
        self.session.scroll_into_view(&terms).await?;
        self.session.click(&terms).await
    }

    /// Type the order notes
    pub async fn fill_order_notes(&self, text: &str) -> ProbeResult<()> {
        let notes = Locator::new("#order_comments");
        self.session.fill(&notes, text).await?;
        self.session.expect_value(&notes, text).await
    }

    /// Cash on delivery is offered
    pub async fn verify_cash_on_delivery_visible(&self) -> ProbeResult<()> {
        self.session
            .expect_visible(&Locator::from_selector(Selector::css_with_text("label", "Cash on delivery")).first())
            .await
    }

    /// Submit the checkout and wait for the order-received page
    pub async fn place_order(&self) -> ProbeResult<()> {
        self.session
            .click_and_wait_for_url(&Locator::new("#place_order"), "order-received")
            .await
    }

    // =========================================================================
    // ORDER RECEIVED
    // =========================================================================

    /// The thank-you notice is shown
    pub async fn verify_order_received(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::thank_you()).await
    }

    /// Status label and order number of the received order
    pub async fn order_status_and_number(&self) -> ProbeResult<OrderRecord> {
        let status = self
            .session
            .text_content(&Self::order_status_label())
            .await?
            .trim()
            .to_string();
        let number_text = self.session.text_content(&Self::order_number()).await?;
        let number = number_text
            .trim()
            .trim_start_matches('#')
            .parse::<u64>()
            .map_err(|_| ProbeError::assertion("order number is numeric", "digits", number_text.trim()))?;
        tracing::info!(number, status = %status, "order received");
        Ok(OrderRecord { number, status })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};
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

    mod cart_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_cart_totals_reconcile() {
            let mock = MockDriver::new();
            let l = OrderFlowPage::cart_locators();
            mock.set(
                l.unit_price.as_ref().unwrap(),
                vec![MockElement::text("$120.00"), MockElement::text("$45.00")],
            );
            mock.set(&l.quantity, vec![MockElement::input("2"), MockElement::input("1")]);
            mock.set(
                &l.subtotal,
                vec![MockElement::text("$240.00"), MockElement::text("$45.00")],
            );
            mock.set(
                &Locator::new("#shipping_method .woocommerce-Price-amount.amount"),
                vec![MockElement::text("$15.00"), MockElement::text("$30.00")],
            );
            mock.set_one(&l.total, MockElement::text("$300.00"));
            let session = Session::new(mock, fast());
            let flow = OrderFlowPage::new(&session);
            let report = flow.verify_cart_totals(2).await.unwrap();
            assert_eq!(report.total, MoneyAmount(30000));
            assert_eq!(flow.shipping_price().await.unwrap(), MoneyAmount(1500));
            assert_eq!(flow.displayed_total().await.unwrap(), report.total);
        }
    }

    mod checkout_tests {
        use super::*;

        fn checkout_form() -> MockDriver {
            let mock = MockDriver::new();
            let details = BillingDetails::default();
            for (id, _) in details.text_fields() {
                mock.set_one(&Locator::new(id), MockElement::input(""));
            }
            mock.set_one(&Locator::new("#billing_first_name"), MockElement::input(" Tanvir "));
            mock.set_one(
                &Locator::new("#billing_state"),
                MockElement::select(&[("BD-05", "Bagerhat"), ("BD-13", "Dhaka")]),
            );
            mock
        }

        #[tokio::test(start_paused = true)]
        async fn test_billing_normalized_once() {
            let mock = checkout_form();
            let session = Session::new(mock.clone(), fast());
            let flow = OrderFlowPage::new(&session);

            let first = flow.fill_billing_details_if_needed(&BillingDetails::default()).await.unwrap();
            assert_eq!(first.len(), 8);
            assert!(!first[0].1.was_written());
            assert_eq!(first.iter().filter(|(_, c)| c.was_written()).count(), 7);

            let second = flow.fill_billing_details_if_needed(&BillingDetails::default()).await.unwrap();
            assert!(second.iter().all(|(_, c)| !c.was_written()));
            assert_eq!(mock.calls("fill:"), 6);
            assert_eq!(mock.calls("select:"), 1);
            assert_eq!(mock.value_of(&Locator::new("#billing_state")).as_deref(), Some("BD-13"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_shipping_section_already_hidden() {
            let mock = MockDriver::new();
            mock.set_one(&Locator::new("#shipping_company"), MockElement::input(""));
            mock.set_one(&OrderFlowPage::shipping_toggle(), MockElement::text("Ship to a different address?"));
            mock.set_one(&OrderFlowPage::shipping_section(), MockElement::default().hidden());
            let session = Session::new(mock.clone(), fast());
            let outcome = OrderFlowPage::new(&session).ensure_shipping_address_hidden().await.unwrap();
            assert_eq!(outcome, ToggleOutcome::AlreadyInState);
            assert!(!mock.was_called("click:"));
        }
    }

    mod received_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_place_order_reads_record() {
            let mock = MockDriver::new();
            mock.set_one(&Locator::new("#place_order"), MockElement::text("Place order"));
            mock.on_click(&Locator::new("#place_order"), |page| {
                page.url = "https://shop.test/checkout/order-received/812/".to_string();
                page.set(OrderFlowPage::order_number().key(), vec![MockElement::text(" 812 ")]);
                page.set(
                    OrderFlowPage::order_status_label().key(),
                    vec![MockElement::text("Processing")],
                );
                page.set(OrderFlowPage::thank_you().key(), vec![MockElement::text("Thank you.")]);
            });
            let session = Session::new(mock, fast());
            let flow = OrderFlowPage::new(&session);
            flow.place_order().await.unwrap();
            flow.verify_order_received().await.unwrap();
            let record = flow.order_status_and_number().await.unwrap();
            assert_eq!(record, OrderRecord { number: 812, status: "Processing".to_string() });
        }

        #[tokio::test(start_paused = true)]
        async fn test_non_numeric_order_number_fails() {
            let mock = MockDriver::new();
            mock.set_one(&OrderFlowPage::order_number(), MockElement::text("pending"));
            mock.set_one(&OrderFlowPage::order_status_label(), MockElement::text("Processing"));
            let session = Session::new(mock, fast());
            let err = OrderFlowPage::new(&session).order_status_and_number().await.unwrap_err();
            assert_eq!(err.kind(), "assertion");
        }
    }
}
