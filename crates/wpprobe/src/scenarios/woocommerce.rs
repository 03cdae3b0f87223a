//! WooCommerce store suite.
//!
//! A customer fills a cart with three products, checks out and sees the
//! order; an admin finds the same order, checks it and completes it; the
//! customer then sees the new status. Prices are reconciled on the cart, on
//! the customer's order page and on the admin order page, and the three
//! totals must agree.

use super::WooCommerceRun;
use crate::assertion::Assertion;
use crate::context::OrderRecord;
use crate::pages::woocommerce::{CustomerPage, HomePage, OrderFlowPage, WooComAdminPage};
use crate::reconcile::{reconcile_priced_list, verify_consistent_totals};
use crate::result::ProbeResult;
use crate::session::Session;
use crate::suite::{SerialSuite, StepFuture};

const PLACED_STATUS: &str = "Processing";
const COMPLETED_STATUS: &str = "Completed";

/// The eight WooCommerce steps
#[must_use]
pub fn suite() -> SerialSuite<WooCommerceRun> {
    SerialSuite::new("WooCommerce store")
        .step("Customer login", customer_login)
        .step("Add products to cart", add_products)
        .step("Cart price reconciliation", cart_reconciliation)
        .step("Checkout and place order", checkout)
        .step("Customer order verification", customer_order)
        .step("Admin login and order lookup", admin_lookup)
        .step("Admin order verification and completion", admin_complete)
        .step("Customer sees completed order", customer_sees_completed)
}

fn home(session: &Session, run: &WooCommerceRun) -> ProbeResult<HomePage> {
    Ok(HomePage::new(session, run.config.require_base_url()?))
}

/// Mini cart lists `expected` at row `index`
async fn verify_mini_cart_row(customer: &CustomerPage, index: usize, expected: &str) -> ProbeResult<()> {
    customer.open_mini_cart().await?;
    let name = customer.mini_cart_item_name(index).await?;
    Assertion::contains("mini cart item matches the product", &name, expected.trim()).into_result()?;
    tracing::info!(product = index + 1, name = %name.trim(), "product in mini cart");
    Ok(())
}

/// Order `order.number` is listed and shows `status`
async fn open_customer_order(customer: &CustomerPage, order: &OrderRecord, status: &str) -> ProbeResult<()> {
    customer.open_orders().await?;
    customer.verify_account_title_contains("Orders").await?;
    customer.open_order(order.number).await?;
    customer
        .verify_account_title_contains(&format!("Order #{}", order.number))
        .await?;
    let shown = customer.order_status().await?;
    Assertion::equals("order status", &status, &shown.as_str()).into_result()
}

fn customer_login<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let (username, password) = run.config.require_customer_credentials()?;
        let name = run.config.require_customer_name()?;
        let home = home(session, run)?;

        home.open_base().await?;
        home.continue_if_sandbox_present().await?;
        home.ensure_scroll_top_control().await?;
        home.go_to_my_account().await?;

        let customer = CustomerPage::new(session);
        customer.login_customer(username, password).await?;
        customer.verify_account_name(name).await?;
        tracing::info!(customer = name, "customer logged in");
        Ok(())
    })
}

fn add_products<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let home = home(session, run)?;
        let customer = CustomerPage::new(session);
        let cart = &mut run.state.cart;
        home.open_base().await?;

        // from the product list
        let first = home.product_title_at(0).await?;
        home.hover_product_title_at(0).await?;
        cart.record(home.add_to_cart_from_list_at(0).await?);
        verify_mini_cart_row(&customer, 0, &first).await?;
        customer.close_mini_cart().await?;

        // through the quick view
        let second = home.product_title_at(1).await?;
        home.hover_product_title_at(1).await?;
        home.open_quick_view_at(1).await?;
        cart.record(home.quick_view_quantity().await?);
        home.click_quick_view_add_to_cart().await?;
        home.verify_view_cart_visible().await?;
        home.close_quick_view().await?;
        verify_mini_cart_row(&customer, 1, &second).await?;
        customer.close_mini_cart().await?;

        // from the product page, two units
        let third = home.product_title_at(2).await?;
        home.open_product_page_at(2).await?;
        let pdp_title = customer.pdp_title_text().await?;
        Assertion::contains("product page title", &pdp_title, third.trim()).into_result()?;
        cart.record(customer.increase_quantity_on_pdp().await?);
        customer.add_to_cart_on_pdp().await?;
        verify_mini_cart_row(&customer, 2, &third).await?;

        let items = customer.mini_cart_items_count().await?;
        Assertion::equals("mini cart items", &cart.rows(), &items).into_result()?;
        let quantity = customer.final_quantity_count().await?;
        Assertion::equals("mini cart quantity", &cart.quantity_added, &quantity).into_result()?;
        tracing::info!(products = items, quantity, "cart contents verified");
        Ok(())
    })
}

fn cart_reconciliation<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let order_flow = OrderFlowPage::new(session);
        order_flow.go_to_cart_via_view_cart_button().await?;
        let shown = order_flow.is_cart_table_visible().await?;
        Assertion::is_true(shown, "cart table visible").into_result()?;

        let report = order_flow.verify_cart_totals(run.state.cart.rows()).await?;
        tracing::info!(
            subtotal = report.subtotal.value(),
            shipping = report.shipping.value(),
            total = report.total.value(),
            "cart reconciled"
        );
        run.state.total_price = Some(report.total);

        order_flow.proceed_to_checkout().await
    })
}

fn checkout<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let order_flow = OrderFlowPage::new(session);
        order_flow.verify_billing_section_visible().await?;
        order_flow
            .fill_billing_details_if_needed(&run.config.billing)
            .await?;
        let shipping = order_flow.ensure_shipping_address_hidden().await?;
        tracing::info!(?shipping, "ship-to-different-address normalized");
        order_flow.accept_terms().await?;
        order_flow.fill_order_notes(&run.config.order_notes).await?;
        order_flow.verify_cash_on_delivery_visible().await?;

        order_flow.place_order().await?;
        order_flow.verify_order_received().await?;
        let order = order_flow.order_status_and_number().await?;
        Assertion::equals("status of the new order", &PLACED_STATUS, &order.status.as_str()).into_result()?;
        run.state.order = Some(order);
        Ok(())
    })
}

fn customer_order<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let order = run.state.require_order()?;
        let cart_total = run.state.require_total()?;
        let tally = run.state.cart;
        let home = home(session, run)?;

        home.go_to_my_account().await?;
        let customer = CustomerPage::new(session);
        customer.verify_account_visible().await?;
        open_customer_order(&customer, order, &order.status).await?;

        let rows = customer.order_items_count().await?;
        Assertion::equals("order rows", &tally.rows(), &rows).into_result()?;
        let quantity = customer.order_quantity_sum(rows).await?;
        Assertion::equals("order quantity", &tally.quantity_added, &quantity).into_result()?;

        let report = reconcile_priced_list(session, &CustomerPage::order_locators(), rows).await?;
        verify_consistent_totals(&[("cart", cart_total), ("customer order", report.total)])?;
        tracing::info!(order = order.number, total = report.total.value(), "customer order verified");

        customer.logout_customer().await?;
        customer.verify_logged_out().await
    })
}

fn admin_lookup<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let (username, password) = run.config.require_admin_credentials()?;
        let admin_url = run.config.require_admin_url()?;
        let customer_name = run.config.require_customer_name()?;
        let number = run.state.require_order()?.number;

        let admin = WooComAdminPage::new(session, admin_url);
        admin.open_admin().await?;
        admin.login_admin(username, password).await?;
        let dashboard = admin.is_dashboard_visible().await?;
        Assertion::is_true(dashboard, "admin dashboard visible").into_result()?;

        admin.open_orders_list().await?;
        admin.verify_orders_list_loaded().await?;
        admin.open_order_row(number, customer_name).await?;
        tracing::info!(order = number, customer = customer_name, "order opened in admin");
        Ok(())
    })
}

fn admin_complete<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let admin_url = run.config.require_admin_url()?;
        let customer_name = run.config.require_customer_name()?;
        let cart_total = run.state.require_total()?;
        let tally = run.state.cart;
        let number = run.state.require_order()?.number;

        let admin = WooComAdminPage::new(session, admin_url);
        admin.verify_order_details_page_open().await?;
        admin.verify_order_title_contains(number).await?;
        admin.verify_customer_name(customer_name).await?;

        let rows = admin.order_items_count().await?;
        Assertion::equals("admin order rows", &tally.rows(), &rows).into_result()?;
        let quantity = admin.total_quantity().await?;
        Assertion::equals("admin order quantity", &tally.quantity_added, &quantity).into_result()?;

        let report = reconcile_priced_list(session, &WooComAdminPage::order_locators(), rows).await?;
        verify_consistent_totals(&[("cart", cart_total), ("admin order", report.total)])?;

        let status = admin.change_status_to_completed_and_save().await?;
        Assertion::equals("admin order status", &COMPLETED_STATUS, &status.as_str()).into_result()?;
        run.state.require_order_mut()?.status = status;

        admin.logout_admin().await?;
        admin.verify_logged_out().await
    })
}

fn customer_sees_completed<'a>(session: &'a Session, run: &'a mut WooCommerceRun) -> StepFuture<'a> {
    Box::pin(async move {
        let (username, password) = run.config.require_customer_credentials()?;
        let name = run.config.require_customer_name()?;
        let order = run.state.require_order()?;
        let home = home(session, run)?;

        home.go_to_my_account().await?;
        let customer = CustomerPage::new(session);
        customer.login_customer(username, password).await?;
        customer.verify_account_name(name).await?;
        open_customer_order(&customer, order, COMPLETED_STATUS).await?;
        customer.logout_customer().await?;
        customer.verify_logged_out().await?;

        tracing::info!(
            customer = name,
            order = order.number,
            products = run.state.cart.products_added,
            quantity = run.state.cart.quantity_added,
            total = run.state.total_price.map(|t| t.value()),
            status = %order.status,
            "order verified for customer and admin"
        );
        Ok(())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::WooCommerceConfig;
    use crate::driver::{MockDriver, MockElement};
    use crate::locator::{AriaRole, Locator, Selector};
    use crate::money::MoneyAmount;
    use crate::session::SessionConfig;
    use std::time::Duration;

    fn fast() -> SessionConfig {
        SessionConfig {
            element_timeout: Duration::from_millis(200),
            navigation_timeout: Duration::from_millis(1000),
            poll_interval: Duration::from_millis(10),
            network_idle: Duration::from_millis(100),
        }
    }

    fn configured() -> WooCommerceConfig {
        WooCommerceConfig {
            base_url: Some("https://shop.test/".to_string()),
            admin_url: Some("https://shop.test/wp-admin/".to_string()),
            admin_username: Some("admin".to_string()),
            admin_password: Some("secret".to_string()),
            customer_name: Some("Tanvir Tester1".to_string()),
            customer_username: Some("tanvir".to_string()),
            customer_password: Some("secret".to_string()),
            ..WooCommerceConfig::default()
        }
    }

    mod precondition_tests {
        use super::*;

        #[tokio::test]
        async fn test_customer_order_needs_placed_order() {
            let mock = MockDriver::new();
            let session = Session::new(mock.clone(), fast());
            let mut run = WooCommerceRun::new(configured());
            run.state.total_price = Some(MoneyAmount(30000));
            let err = customer_order(&session, &mut run).await.unwrap_err();
            assert_eq!(err.kind(), "precondition");
            assert!(!mock.was_called("goto:"));
        }

        #[tokio::test]
        async fn test_admin_lookup_needs_admin_credentials() {
            let mock = MockDriver::new();
            let session = Session::new(mock.clone(), fast());
            let mut run = WooCommerceRun::new(WooCommerceConfig {
                admin_password: None,
                ..configured()
            });
            let err = admin_lookup(&session, &mut run).await.unwrap_err();
            assert!(err.to_string().contains("WOOCOMMERCE_ADMIN_PASSWORD"));
            assert!(!mock.was_called("goto:"));
        }
    }

    mod step_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_cart_step_stores_verified_total() {
            let mock = MockDriver::new();
            let l = OrderFlowPage::cart_locators();
            let view_cart = Locator::new("a[class='button wc-forward']");
            let cart_table = OrderFlowPage::cart_table();
            let checkout = Locator::from_selector(Selector::css_with_text("a", "PROCEED TO CHECKOUT"));
            mock.set_one(&view_cart, MockElement::default());
            mock.set_one(&checkout, MockElement::text("PROCEED TO CHECKOUT"));
            let table_key = cart_table.key();
            mock.on_click(&view_cart, move |page| {
                page.set(table_key.clone(), vec![MockElement::default()]);
            });
            mock.set(
                l.unit_price.as_ref().unwrap(),
                vec![MockElement::text("$120.00"), MockElement::text("$45.00")],
            );
            mock.set(&l.quantity, vec![MockElement::input("2"), MockElement::input("1")]);
            mock.set(
                &l.subtotal,
                vec![MockElement::text("$240.00"), MockElement::text("$45.00")],
            );
            mock.set(l.shipping.as_ref().unwrap(), vec![MockElement::text("$15.00")]);
            mock.set_one(&l.total, MockElement::text("$300.00"));

            let session = Session::new(mock.clone(), fast());
            let mut run = WooCommerceRun::new(configured());
            run.state.cart.record(2);
            run.state.cart.record(1);
            cart_reconciliation(&session, &mut run).await.unwrap();
            assert_eq!(run.state.total_price, Some(MoneyAmount(30000)));
            assert!(mock.was_called("click:"));
        }

        /// Storefront with three products; the mini cart ends up listing
        /// `cart_rows` rows and a badge of four units
        fn storefront(cart_rows: usize) -> MockDriver {
            let mock = MockDriver::new();
            let titles = vec![
                MockElement::text("Album"),
                MockElement::text("Beanie"),
                MockElement::text("Belt"),
            ];
            mock.set(&Locator::new("h3.woocommerce-loop-product__title"), titles.clone());
            mock.set(
                &Locator::new("a.viewcart-style-3"),
                vec![MockElement::text("Add to cart").with_attr("data-quantity", "1")],
            );
            let view_cart = HomePage::view_cart_link().key();
            mock.on_click(&Locator::new("a.viewcart-style-3"), move |page| {
                page.set(view_cart.clone(), vec![MockElement::text("View cart")]);
            });

            // quick view
            mock.set(
                &Locator::new(".quickview"),
                vec![MockElement::default(), MockElement::default()],
            );
            mock.set_one(&CustomerPage::pdp_quantity(), MockElement::input("1"));
            mock.set_one(
                &Locator::new("button.single_add_to_cart_button.button.alt"),
                MockElement::text("Add to cart"),
            );
            let close = Locator::new("a.fancybox-item.fancybox-close");
            let close_key = close.key();
            mock.on_click(&Locator::new(".quickview"), move |page| {
                page.set(close_key.clone(), vec![MockElement::default()]);
            });
            let close_key = close.key();
            mock.on_click(&close, move |page| page.remove(&close_key));

            // product page
            mock.set_one(&Locator::new("h2.product_title.entry-title"), MockElement::text("Belt"));
            mock.set_one(&Locator::new(".plus"), MockElement::text("+"));
            let quantity = CustomerPage::pdp_quantity().key();
            mock.on_click(&Locator::new(".plus"), move |page| {
                if let Some(el) = page.element_mut(&quantity, 0) {
                    el.value = "2".to_string();
                }
            });
            mock.set_one(&Locator::new("[name=\"add-to-cart\"]"), MockElement::text("Add to cart"));

            // mini cart
            mock.set_one(&Locator::new("#mini-cart"), MockElement::default());
            mock.set(&Locator::new(".mini_cart_item .product-details a"), titles);
            mock.set(&CustomerPage::mini_cart_items(), vec![MockElement::default(); cart_rows]);
            mock.set_one(&Locator::new(".cart-items"), MockElement::text("4"));
            let drawer = CustomerPage::mini_cart_close().key();
            mock.on_click(&Locator::new("#mini-cart"), move |page| {
                page.set(drawer.clone(), vec![MockElement::default()]);
            });
            let drawer = CustomerPage::mini_cart_close().key();
            mock.on_click(&CustomerPage::mini_cart_close(), move |page| page.remove(&drawer));
            mock
        }

        #[tokio::test(start_paused = true)]
        async fn test_add_products_tallies_rows_and_units() {
            let mock = storefront(3);
            let session = Session::new(mock.clone(), fast());
            let mut run = WooCommerceRun::new(configured());
            add_products(&session, &mut run).await.unwrap();
            assert_eq!(run.state.cart.products_added, 3);
            assert_eq!(run.state.cart.quantity_added, 4);
            assert_eq!(mock.calls("click:#mini-cart"), 3);
            assert!(mock.was_called("click:.plus"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_add_products_rejects_short_mini_cart() {
            let session = Session::new(storefront(2), fast());
            let mut run = WooCommerceRun::new(configured());
            let err = add_products(&session, &mut run).await.unwrap_err();
            assert_eq!(err.kind(), "assertion");
            assert!(err.to_string().contains("mini cart items"));
        }

        /// Customer order #812 with three rows, four units and $148.00
        fn customer_order_view() -> MockDriver {
            let mock = MockDriver::new();
            let orders = Locator::from_selector(Selector::role(AriaRole::Heading, "Orders"));
            mock.set_one(&CustomerPage::account_name(), MockElement::text("Tanvir Tester1"));
            mock.set_one(&orders, MockElement::text("Orders"));
            mock.set_one(
                &Locator::new("h3.account-sub-title.d-none.d-md-block.mb-3.mt-2"),
                MockElement::text("Orders: Order #812"),
            );
            mock.set_one(
                &Locator::from_selector(Selector::css_with_text("th", "#812")),
                MockElement::text("#812"),
            );
            mock.set_one(&CustomerPage::order_status_label(), MockElement::text("Processing"));

            let l = CustomerPage::order_locators();
            mock.set(
                &Locator::new("table.shop_table.order_details tbody tr"),
                vec![MockElement::default(); 3],
            );
            mock.set(
                &l.quantity,
                vec![MockElement::text("× 1"), MockElement::text("× 1"), MockElement::text("× 2")],
            );
            mock.set(
                &l.subtotal,
                vec![
                    MockElement::text("$15.00"),
                    MockElement::text("$18.00"),
                    MockElement::text("$110.00"),
                ],
            );
            mock.set_one(l.shipping.as_ref().unwrap(), MockElement::text("$5.00 via Flat rate"));
            mock.set_one(&l.total, MockElement::text("$148.00"));

            let logout = Locator::from_selector(Selector::css_with_text("a", "Log out"));
            mock.set_one(&logout, MockElement::text("Log out"));
            let login = Locator::from_selector(Selector::css_with_text("h3", "Login")).key();
            mock.on_click(&logout, move |page| {
                page.set(login.clone(), vec![MockElement::text("Login")]);
            });
            mock
        }

        fn placed_run(total: MoneyAmount) -> WooCommerceRun {
            let mut run = WooCommerceRun::new(configured());
            run.state.cart.record(1);
            run.state.cart.record(1);
            run.state.cart.record(2);
            run.state.total_price = Some(total);
            run.state.order = Some(OrderRecord {
                number: 812,
                status: PLACED_STATUS.to_string(),
            });
            run
        }

        #[tokio::test(start_paused = true)]
        async fn test_customer_order_matches_cart_total() {
            let mock = customer_order_view();
            let session = Session::new(mock.clone(), fast());
            let mut run = placed_run(MoneyAmount(14800));
            customer_order(&session, &mut run).await.unwrap();
            assert!(mock.was_called("goto:https://shop.test/my-account/"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_customer_order_total_differs_from_cart() {
            let mock = customer_order_view();
            let session = Session::new(mock.clone(), fast());
            let mut run = placed_run(MoneyAmount(15000));
            let err = customer_order(&session, &mut run).await.unwrap_err();
            assert_eq!(err.kind(), "assertion");
            assert!(err.to_string().contains("customer order"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_admin_order_total_differs_from_cart() {
            let mock = MockDriver::new();
            mock.set_one(&Locator::new(".wp-heading-inline"), MockElement::text("Edit order"));
            mock.set_one(
                &Locator::new(".woocommerce-order-data__heading"),
                MockElement::text("Order #812 details"),
            );
            mock.set_one(
                &Locator::from_selector(Selector::xpath("//span[@id='select2-customer_user-container']")),
                MockElement::text("Tanvir Tester1 (#7 - tanvir@shop.test)"),
            );
            let l = WooComAdminPage::order_locators();
            mock.set(
                &Locator::new(".wc-order-item-name"),
                vec![MockElement::text("Album"), MockElement::text("Beanie"), MockElement::text("Belt")],
            );
            mock.set(
                &Locator::new("td.quantity"),
                vec![MockElement::text("× 1"), MockElement::text("× 1"), MockElement::text("× 2")],
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
            mock.set_one(l.shipping.as_ref().unwrap(), MockElement::text("$5.00"));
            mock.set_one(&l.total, MockElement::text("$148.00"));

            let session = Session::new(mock.clone(), fast());
            let mut run = placed_run(MoneyAmount(15000));
            let err = admin_complete(&session, &mut run).await.unwrap_err();
            assert_eq!(err.kind(), "assertion");
            assert!(err.to_string().contains("admin order"));
            assert!(!mock.was_called("select:"));
            assert_eq!(run.state.order.unwrap().status, PLACED_STATUS);
        }
    }
}
