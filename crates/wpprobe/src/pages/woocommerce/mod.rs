//! WooCommerce storefront, checkout and admin screens.

mod admin;
mod customer;
mod home;
mod order_flow;

pub use admin::WooComAdminPage;
pub use customer::CustomerPage;
pub use home::HomePage;
pub use order_flow::{BillingChanges, BillingDetails, OrderFlowPage};
