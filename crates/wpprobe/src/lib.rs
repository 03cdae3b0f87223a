//! wpprobe: page-object browser suites for WordPress sites
//!
//! Two serial end-to-end suites drive a real browser through a WordPress
//! admin and storefront: the FlexTable plugin flow (Google Sheet to
//! embedded table) and a WooCommerce purchase round trip with price
//! reconciliation across cart, customer and admin views.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    WPPROBE Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ Session /  │            │
//! │   │ Suite      │───►│ Objects    │───►│ PageDriver │            │
//! │   │ (serial)   │    │            │    │ (chromium) │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! │         │                 │                                      │
//! │         ▼                 ▼                                      │
//! │   ScenarioContext   reconcile / normalize                        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

mod assertion;
mod context;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate, clippy::doc_markdown)]
pub mod driver;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate, clippy::doc_markdown)]
mod locator;
mod money;
mod normalize;
mod page_object;
mod reconcile;
mod result;
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
mod session;
mod suite;
mod wait;

/// Suite configuration: defaults, YAML file, environment
pub mod config;

/// One page object per screen of the system under test
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;

/// The FlexTable and WooCommerce suites
pub mod scenarios;

pub use assertion::{assert_above, assert_below, Assertion, AssertionResult};
pub use config::{BrowserSettings, FlexTableConfig, SuiteConfig, Timeouts, WooCommerceConfig};
pub use context::{CartTally, OrderRecord, ScenarioContext};
pub use driver::{BrowserConfig, MockDriver, MockElement, MockPage, PageDriver};
#[cfg(feature = "browser")]
pub use driver::CdpDriver;
pub use locator::{AriaRole, BoundingBox, Locator, Position, Selector};
pub use money::{digits_of, fraction_digits, parse_leading_int, MoneyAmount};
pub use normalize::{
    ensure_field_value, ensure_section_visibility, ensure_select_value, FieldChange, ToggleOutcome,
};
pub use page_object::PageObject;
pub use reconcile::{
    reconcile_line_items, reconcile_priced_list, verify_consistent_totals, verify_grand_total,
    LineItem, PricedListLocators, QuantitySource, ReconciliationReport,
};
pub use result::{ProbeError, ProbeResult};
pub use scenarios::{ScenarioRun, SuiteKind};
pub use session::{Session, SessionConfig};
pub use suite::{SerialSuite, StepFn, StepFuture, StepOutcome, StepResult, SuiteReport};
pub use wait::{
    wait_until, DocumentState, ElementState, IdleTracker, LoadState, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_WAIT_TIMEOUT_MS, NETWORK_IDLE_THRESHOLD_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::assertion::*;
    pub use super::context::*;
    pub use super::locator::*;
    pub use super::money::*;
    pub use super::normalize::*;
    pub use super::page_object::*;
    pub use super::reconcile::*;
    pub use super::result::*;
    pub use super::session::*;
    pub use super::suite::*;
    pub use super::wait::*;
    pub use super::{BrowserConfig, MockDriver, PageDriver, SuiteConfig, SuiteKind};
}
