//! Customer-facing account, mini cart, product page and order views.

use crate::locator::{AriaRole, Locator, Selector};
use crate::money::{digits_of, parse_leading_int, MoneyAmount};
use crate::page_object::PageObject;
use crate::pages::SLOW_ELEMENT;
use crate::reconcile::{PricedListLocators, QuantitySource};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{ElementState, LoadState};

const ORDER_ROWS: &str = "table.shop_table.order_details tbody tr";

/// `my-account/` and the storefront widgets a logged-in customer uses
#[derive(Debug, Clone)]
pub struct CustomerPage {
    session: Session,
}

impl PageObject for CustomerPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        "my-account"
    }
}

impl CustomerPage {
    /// Create the page object
    #[must_use]
    pub fn new(session: &Session) -> Self {
        Self {
            session: session.clone(),
        }
    }

    pub(crate) fn account_name() -> Locator {
        Locator::new(".account-text-user").first().with_timeout(SLOW_ELEMENT)
    }

    pub(crate) fn mini_cart_items() -> Locator {
        Locator::new(".mini_cart_item")
    }

    pub(crate) fn mini_cart_close() -> Locator {
        Locator::new("div[class='minicart-overlay'] svg")
    }

    fn account_title() -> Locator {
        Locator::new("h3.account-sub-title.d-none.d-md-block.mb-3.mt-2").with_timeout(SLOW_ELEMENT)
    }

    pub(crate) fn order_status_label() -> Locator {
        Locator::new(".font-weight-bold.order-status.text-primary.text-uppercase")
    }

    pub(crate) fn pdp_quantity() -> Locator {
        Locator::new("[name=\"quantity\"]")
    }

    /// Locators of the customer order-detail table. It has no unit price
    /// column; quantities render as `× 2`.
    #[must_use]
    pub fn order_locators() -> PricedListLocators {
        PricedListLocators {
            boundary: "customer order".to_string(),
            unit_price: None,
            quantity: Locator::new(ORDER_ROWS).locator(Selector::css(".product-quantity")),
            quantity_source: QuantitySource::Text,
            subtotal: Locator::new(ORDER_ROWS).locator(Selector::css("td.product-total")),
            shipping: Some(Locator::from_selector(Selector::xpath(
                "//table[contains(@class,'order_details')]//tfoot//th[contains(normalize-space(),'Shipping')]/following-sibling::td",
            ))),
            total: Locator::new("span.woocommerce-Price-amount.amount").last(),
        }
    }

    /// Submit the my-account login form
    pub async fn login_customer(&self, username: &str, password: &str) -> ProbeResult<()> {
        self.session.fill(&Locator::new("#username"), username).await?;
        self.session.fill(&Locator::new("#password"), password).await?;
        self.session.click(&Locator::new("button[name=\"login\"]")).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// The account header is rendered, whatever name it shows
    pub async fn verify_account_visible(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::account_name()).await
    }

    /// The account header shows exactly `expected`
    pub async fn verify_account_name(&self, expected: &str) -> ProbeResult<()> {
        self.session.expect_text(&Self::account_name(), expected).await
    }

    /// Open the mini cart drawer
    pub async fn open_mini_cart(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new("#mini-cart")).await?;
        self.session
            .wait_for(&Self::mini_cart_close(), ElementState::Visible)
            .await
            .map(|_| ())
    }

    /// Close the mini cart drawer if it is open
    pub async fn close_mini_cart(&self) -> ProbeResult<bool> {
        let close = Self::mini_cart_close();
        if !self.session.is_visible(&close).await? {
            return Ok(false);
        }
        self.session.click(&close).await?;
        self.session.wait_for(&close, ElementState::Hidden).await?;
        Ok(true)
    }

    /// Rows in the mini cart
    pub async fn mini_cart_items_count(&self) -> ProbeResult<usize> {
        self.session.count(&Self::mini_cart_items()).await
    }

    /// Product name of mini cart row `index`
    pub async fn mini_cart_item_name(&self, index: usize) -> ProbeResult<String> {
        self.session
            .text_content(&Locator::new(".mini_cart_item .product-details a").nth(index))
            .await
    }

    /// Title on the product detail page
    pub async fn pdp_title_text(&self) -> ProbeResult<String> {
        self.session
            .text_content(&Locator::new("h2.product_title.entry-title"))
            .await
    }

    /// Click `+` on the product page and return the new quantity
    pub async fn increase_quantity_on_pdp(&self) -> ProbeResult<u64> {
        let input = Self::pdp_quantity();
        let before = parse_leading_int(&self.session.input_value(&input).await?, 1);
        self.session.click(&Locator::new(".plus")).await?;
        self.session
            .wait_for_condition("product quantity to increase", || {
                let input = input.clone();
                async move { Ok(parse_leading_int(&self.session.input_value(&input).await?, 1) > before) }
            })
            .await?;
        let after = parse_leading_int(&self.session.input_value(&input).await?, 1);
        tracing::info!(before, after, "product quantity increased");
        Ok(after)
    }

    /// Add to cart from the product page
    pub async fn add_to_cart_on_pdp(&self) -> ProbeResult<()> {
        self.session.click(&Locator::new("[name=\"add-to-cart\"]")).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// Unit count shown on the cart badge, 1 when unreadable
    pub async fn final_quantity_count(&self) -> ProbeResult<u64> {
        let text = self.session.text_content(&Locator::new(".cart-items").first()).await?;
        Ok(parse_leading_int(&text, 1))
    }

    /// Log out via the account navigation
    pub async fn logout_customer(&self) -> ProbeResult<()> {
        self.session
            .click(&Locator::from_selector(Selector::css_with_text("a", "Log out")).first())
            .await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// The login form heading is shown again
    pub async fn verify_logged_out(&self) -> ProbeResult<()> {
        self.session
            .expect_visible(
                &Locator::from_selector(Selector::css_with_text("h3", "Login"))
                    .first()
                    .with_timeout(SLOW_ELEMENT),
            )
            .await
    }

    // =========================================================================
    // ORDERS
    // =========================================================================

    /// Open the orders tab of the account
    pub async fn open_orders(&self) -> ProbeResult<()> {
        let link = Locator::from_selector(Selector::role(AriaRole::Heading, "Orders"));
        self.session.expect_visible(&link).await?;
        self.session.click(&link).await?;
        self.session
            .wait_for_load_state(LoadState::NetworkIdle)
            .await
            .map(|_| ())
    }

    /// The account sub-title contains `expected`
    pub async fn verify_account_title_contains(&self, expected: &str) -> ProbeResult<()> {
        self.session
            .expect_contains_text(&Self::account_title(), expected)
            .await
    }

    /// Open order `number` from the orders list
    pub async fn open_order(&self, number: u64) -> ProbeResult<()> {
        let row = Locator::from_selector(Selector::css_with_text("th", format!("#{number}"))).first();
        self.session.expect_visible(&row).await?;
        self.session.click(&row).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }

    /// Trimmed status label of the open order
    pub async fn order_status(&self) -> ProbeResult<String> {
        let text = self.session.text_content(&Self::order_status_label()).await?;
        Ok(text.trim().to_string())
    }

    /// Rows of the order-detail table
    pub async fn order_items_count(&self) -> ProbeResult<usize> {
        self.session
            .wait_for(&Locator::new(ORDER_ROWS).first(), ElementState::Attached)
            .await?;
        self.session.count(&Locator::new(ORDER_ROWS)).await
    }

    /// Sum of the quantities of the first `rows` rows
    pub async fn order_quantity_sum(&self, rows: usize) -> ProbeResult<u64> {
        let column = Self::order_locators().quantity;
        let mut sum = 0;
        for index in 0..rows {
            sum += digits_of(&self.session.text_content(&column.clone().nth(index)).await?);
        }
        Ok(sum)
    }

    /// Last amount rendered on the order-detail page
    pub async fn order_total(&self) -> ProbeResult<MoneyAmount> {
        let text = self.session.text_content(&Self::order_locators().total).await?;
        Ok(MoneyAmount::from_text(&text))
    }
}
