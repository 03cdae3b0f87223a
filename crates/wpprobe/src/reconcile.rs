//! Price reconciliation.
//!
//! For each row, `unit price * quantity` must equal the displayed subtotal;
//! the sum of subtotals plus shipping must equal the displayed grand total.
//! The same arithmetic runs against the cart, the customer order page and
//! the admin order page; [`verify_consistent_totals`] then checks the three
//! views agree.

use crate::locator::Locator;
use crate::money::{digits_of, parse_leading_int, MoneyAmount};
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use tracing::Instrument;

/// One extracted row of a priced list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Rendered unit price, `None` on views without a price column
    pub unit_price: Option<MoneyAmount>,
    /// Quantity
    pub quantity: u64,
    /// Rendered row subtotal
    pub displayed_subtotal: MoneyAmount,
}

impl LineItem {
    /// Row with a unit price column
    #[must_use]
    pub const fn priced(unit_price: u64, quantity: u64, displayed_subtotal: u64) -> Self {
        Self {
            unit_price: Some(MoneyAmount(unit_price)),
            quantity,
            displayed_subtotal: MoneyAmount(displayed_subtotal),
        }
    }

    /// `unit_price * quantity`, or the displayed subtotal when there is no
    /// unit price to check against
    #[must_use]
    pub fn calculated_subtotal(&self) -> MoneyAmount {
        self.unit_price
            .map_or(self.displayed_subtotal, |price| price.times(self.quantity))
    }
}

/// Verify every row and return the sum of the subtotals.
///
/// The first mismatching row aborts with its zero-based index.
pub fn reconcile_line_items(items: &[LineItem]) -> ProbeResult<MoneyAmount> {
    let mut running = MoneyAmount::ZERO;
    for (index, item) in items.iter().enumerate() {
        let calculated = item.calculated_subtotal();
        if calculated != item.displayed_subtotal {
            return Err(ProbeError::Reconciliation {
                row: Some(index),
                calculated: calculated.value(),
                displayed: item.displayed_subtotal.value(),
            });
        }
        tracing::info!(
            product = index + 1,
            unit_price = item.unit_price.map(MoneyAmount::value),
            quantity = item.quantity,
            subtotal = calculated.value(),
            "line item verified"
        );
        running = running + calculated;
    }
    Ok(running)
}

/// `subtotal + shipping` must equal the displayed total; returns the total
pub fn verify_grand_total(
    subtotal: MoneyAmount,
    shipping: MoneyAmount,
    displayed_total: MoneyAmount,
) -> ProbeResult<MoneyAmount> {
    let calculated = subtotal + shipping;
    if calculated != displayed_total {
        return Err(ProbeError::Reconciliation {
            row: None,
            calculated: calculated.value(),
            displayed: displayed_total.value(),
        });
    }
    tracing::info!(
        subtotal = subtotal.value(),
        shipping = shipping.value(),
        total = calculated.value(),
        "grand total verified"
    );
    Ok(calculated)
}

/// Every labelled total must be equal to the first one
pub fn verify_consistent_totals(totals: &[(&str, MoneyAmount)]) -> ProbeResult<MoneyAmount> {
    let Some(&(first_label, first)) = totals.first() else {
        return Err(ProbeError::precondition("no totals to compare"));
    };
    for &(label, amount) in &totals[1..] {
        if amount != first {
            return Err(ProbeError::assertion(
                format!("total on {label} matches {first_label}"),
                first,
                amount,
            ));
        }
    }
    Ok(first)
}

/// How a row's quantity is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantitySource {
    /// Editable `<input>`; leading integer of its value, 1 when empty
    InputValue,
    /// Static text such as `× 2`; every digit of the text
    Text,
}

/// Where the parts of a priced list live on one view.
///
/// Row locators select the whole column; row `i` is their `nth(i)`.
#[derive(Debug, Clone)]
pub struct PricedListLocators {
    /// View name used in logs and errors
    pub boundary: String,
    /// Unit price column, if the view renders one
    pub unit_price: Option<Locator>,
    /// Quantity column
    pub quantity: Locator,
    /// How to read the quantity column
    pub quantity_source: QuantitySource,
    /// Row subtotal column
    pub subtotal: Locator,
    /// Shipping amount, if charged
    pub shipping: Option<Locator>,
    /// Displayed grand total
    pub total: Locator,
}

/// Outcome of reconciling one view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// View name
    pub boundary: String,
    /// Verified rows
    pub rows: Vec<LineItem>,
    /// Sum of the row subtotals
    pub subtotal: MoneyAmount,
    /// Shipping amount
    pub shipping: MoneyAmount,
    /// Verified grand total
    pub total: MoneyAmount,
}

/// Extract `count` rows from the page and reconcile them.
pub async fn reconcile_priced_list(
    session: &Session,
    locators: &PricedListLocators,
    count: usize,
) -> ProbeResult<ReconciliationReport> {
    let span = tracing::info_span!("reconcile", boundary = %locators.boundary, rows = count);
    extract_and_reconcile(session, locators, count)
        .instrument(span)
        .await
}

async fn extract_and_reconcile(
    session: &Session,
    locators: &PricedListLocators,
    count: usize,
) -> ProbeResult<ReconciliationReport> {
    let mut rows = Vec::with_capacity(count);
    for index in 0..count {
        let unit_price = match &locators.unit_price {
            Some(column) => Some(MoneyAmount::from_text(
                &session.inner_text(&column.clone().nth(index)).await?,
            )),
            None => None,
        };
        let quantity_cell = locators.quantity.clone().nth(index);
        let quantity = match locators.quantity_source {
            QuantitySource::InputValue => parse_leading_int(&session.input_value(&quantity_cell).await?, 1),
            QuantitySource::Text => digits_of(&session.text_content(&quantity_cell).await?),
        };
        let displayed_subtotal =
            MoneyAmount::from_text(&session.inner_text(&locators.subtotal.clone().nth(index)).await?);
        rows.push(LineItem {
            unit_price,
            quantity,
            displayed_subtotal,
        });
    }
    let subtotal = reconcile_line_items(&rows)?;

    let shipping = match &locators.shipping {
        Some(locator) => MoneyAmount::from_text(&session.inner_text(locator).await?),
        None => MoneyAmount::ZERO,
    };
    let displayed_total = MoneyAmount::from_text(&session.text_content(&locators.total).await?);
    let total = verify_grand_total(subtotal, shipping, displayed_total)?;

    Ok(ReconciliationReport {
        boundary: locators.boundary.clone(),
        rows,
        subtotal,
        shipping,
        total,
    })
}
