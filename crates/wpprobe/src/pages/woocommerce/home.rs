//! Storefront home: product list, quick view and product pages.

use crate::locator::Locator;
use crate::money::parse_leading_int;
use crate::page_object::PageObject;
use crate::pages::{join_url, sandbox_continue_button, SANDBOX_PROBE, SLOW_ELEMENT};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::wait::{ElementState, LoadState};

/// Storefront root
#[derive(Debug, Clone)]
pub struct HomePage {
    session: Session,
    base_url: String,
}

impl PageObject for HomePage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn url_pattern(&self) -> &str {
        &self.base_url
    }
}

impl HomePage {
    /// Create the page object for the shop at `base_url`
    #[must_use]
    pub fn new(session: &Session, base_url: &str) -> Self {
        Self {
            session: session.clone(),
            base_url: base_url.to_string(),
        }
    }

    pub(crate) fn product_title(index: usize) -> Locator {
        Locator::new("h3.woocommerce-loop-product__title").nth(index)
    }

    pub(crate) fn list_add_to_cart(index: usize) -> Locator {
        Locator::new("a.viewcart-style-3").nth(index)
    }

    pub(crate) fn quick_view(index: usize) -> Locator {
        Locator::new(".quickview").nth(index)
    }

    pub(crate) fn quantity_input() -> Locator {
        Locator::new("[name=\"quantity\"]").with_timeout(SLOW_ELEMENT)
    }

    fn quick_view_add_to_cart() -> Locator {
        Locator::new("button.single_add_to_cart_button.button.alt")
    }

    fn quick_view_close() -> Locator {
        Locator::new("a.fancybox-item.fancybox-close")
    }

    /// "View cart" link shown once an item is in the cart
    pub(crate) fn view_cart_link() -> Locator {
        Locator::new("a[title='View cart']").first().with_timeout(SLOW_ELEMENT)
    }

    /// Open the storefront root
    pub async fn open_base(&self) -> ProbeResult<()> {
        self.session
            .goto_until(&self.base_url, LoadState::DomContentLoaded)
            .await
    }

    /// Click through the sandbox interstitial if it shows up
    pub async fn continue_if_sandbox_present(&self) -> ProbeResult<bool> {
        let button = sandbox_continue_button();
        if !self.session.is_visible_within(&button, SANDBOX_PROBE).await? {
            return Ok(false);
        }
        self.session.click(&button).await?;
        self.session.wait_for_load_state(LoadState::NetworkIdle).await?;
        Ok(true)
    }

    /// Click the scroll-to-top control if the theme shows one
    pub async fn ensure_scroll_top_control(&self) -> ProbeResult<bool> {
        let control = Locator::new("#topcontrol");
        if !self.session.is_visible_within(&control, SANDBOX_PROBE).await? {
            return Ok(false);
        }
        self.session.click(&control).await?;
        self.session
            .wait_for(&Self::product_title(0), ElementState::Stable)
            .await?;
        Ok(true)
    }

    /// Open `my-account/`
    pub async fn go_to_my_account(&self) -> ProbeResult<()> {
        self.session
            .goto_until(&join_url(&self.base_url, "my-account/"), LoadState::DomContentLoaded)
            .await
    }

    /// Title of the product card at `index`
    pub async fn product_title_at(&self, index: usize) -> ProbeResult<String> {
        let title = Self::product_title(index);
        self.session.scroll_into_view(&title).await?;
        self.session.text_content(&title).await
    }

    /// Hover the product card at `index`
    pub async fn hover_product_title_at(&self, index: usize) -> ProbeResult<()> {
        self.session.hover(&Self::product_title(index)).await
    }

    /// Click the list add-to-cart button at `index`; returns the quantity it
    /// adds (`data-quantity`, 1 when absent or zero)
    pub async fn add_to_cart_from_list_at(&self, index: usize) -> ProbeResult<u64> {
        let button = Self::list_add_to_cart(index);
        let attr = self.session.get_attribute(&button, "data-quantity").await?;
        let quantity = match parse_leading_int(attr.as_deref().unwrap_or_default(), 1) {
            0 => 1,
            n => n,
        };
        self.session.click(&button).await?;
        self.session
            .wait_for(&Self::view_cart_link(), ElementState::Attached)
            .await?;
        tracing::info!(index, quantity, "added to cart from product list");
        Ok(quantity)
    }

    /// Open the quick view of the product at `index`
    pub async fn open_quick_view_at(&self, index: usize) -> ProbeResult<()> {
        self.session.click(&Self::quick_view(index)).await?;
        self.session
            .wait_for(&Self::quantity_input(), ElementState::Visible)
            .await
            .map(|_| ())
    }

    /// Quantity in the quick view, 1 when empty
    pub async fn quick_view_quantity(&self) -> ProbeResult<u64> {
        let value = self.session.input_value(&Self::quantity_input()).await?;
        Ok(parse_leading_int(&value, 1))
    }

    /// Add to cart from inside the quick view
    pub async fn click_quick_view_add_to_cart(&self) -> ProbeResult<()> {
        self.session.click(&Self::quick_view_add_to_cart()).await
    }

    /// The "View cart" link is shown
    pub async fn verify_view_cart_visible(&self) -> ProbeResult<()> {
        self.session.expect_visible(&Self::view_cart_link()).await
    }

    /// Close the quick view if it is open
    pub async fn close_quick_view(&self) -> ProbeResult<bool> {
        let close = Self::quick_view_close();
        if !self.session.is_visible(&close).await? {
            return Ok(false);
        }
        self.session.click(&close).await?;
        self.session.wait_for(&close, ElementState::Hidden).await?;
        Ok(true)
    }

    /// Open the product page of the card at `index`
    pub async fn open_product_page_at(&self, index: usize) -> ProbeResult<()> {
        self.session.click(&Self::product_title(index)).await?;
        self.session
            .wait_for_load_state(LoadState::DomContentLoaded)
            .await
            .map(|_| ())
    }
}
