//! State threaded from one scenario step to the next.
//!
//! A serial suite owns one context value and lends it to each step by
//! `&mut`, so every value an earlier step produced is an explicit field a
//! later step reads.

use crate::money::MoneyAmount;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};

/// Products and units put into the cart so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTally {
    /// Distinct products added
    pub products_added: u64,
    /// Sum of the added quantities
    pub quantity_added: u64,
}

impl CartTally {
    /// Count one more product added with `quantity` units
    pub fn record(&mut self, quantity: u64) {
        self.products_added += 1;
        self.quantity_added += quantity;
        tracing::info!(
            products = self.products_added,
            quantity = self.quantity_added,
            "cart tally updated"
        );
    }

    /// Number of rows a priced list of this cart has
    #[must_use]
    pub fn rows(&self) -> usize {
        usize::try_from(self.products_added).unwrap_or(usize::MAX)
    }
}

/// Order placed during the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Order number shown on the order-received page
    pub number: u64,
    /// Latest observed status, e.g. `Processing`
    pub status: String,
}

/// Everything one suite run accumulates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioContext {
    /// Cart counters
    pub cart: CartTally,
    /// Grand total verified on the cart page
    pub total_price: Option<MoneyAmount>,
    /// Placed order
    pub order: Option<OrderRecord>,
    /// Table id extracted from the builder
    pub shortcode: Option<String>,
}

impl ScenarioContext {
    /// The placed order, or a precondition error naming the missing step
    pub fn require_order(&self) -> ProbeResult<&OrderRecord> {
        self.order
            .as_ref()
            .ok_or_else(|| ProbeError::precondition("no order has been placed in this run"))
    }

    /// Mutable access to the placed order
    pub fn require_order_mut(&mut self) -> ProbeResult<&mut OrderRecord> {
        self.order
            .as_mut()
            .ok_or_else(|| ProbeError::precondition("no order has been placed in this run"))
    }

    /// The verified cart total
    pub fn require_total(&self) -> ProbeResult<MoneyAmount> {
        self.total_price
            .ok_or_else(|| ProbeError::precondition("cart total has not been verified in this run"))
    }

    /// The extracted table id
    pub fn require_shortcode(&self) -> ProbeResult<&str> {
        self.shortcode
            .as_deref()
            .ok_or_else(|| ProbeError::precondition("no table shortcode has been extracted in this run"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_accumulates() {
        let mut tally = CartTally::default();
        tally.record(1);
        tally.record(1);
        tally.record(2);
        assert_eq!(tally, CartTally { products_added: 3, quantity_added: 4 });
        assert_eq!(tally.rows(), 3);
    }

    #[test]
    fn test_missing_state_is_precondition() {
        let mut ctx = ScenarioContext::default();
        assert_eq!(ctx.require_order().unwrap_err().kind(), "precondition");
        assert_eq!(ctx.require_total().unwrap_err().kind(), "precondition");
        assert_eq!(ctx.require_shortcode().unwrap_err().kind(), "precondition");

        ctx.order = Some(OrderRecord { number: 812, status: "Processing".to_string() });
        ctx.require_order_mut().unwrap().status = "Completed".to_string();
        assert_eq!(ctx.require_order().unwrap().status, "Completed");
    }

    #[test]
    fn test_context_serializes() {
        let ctx = ScenarioContext {
            total_price: Some(MoneyAmount(30000)),
            shortcode: Some("7".to_string()),
            ..ScenarioContext::default()
        };
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["total_price"], 30000);
        assert_eq!(json["shortcode"], "7");
    }
}
