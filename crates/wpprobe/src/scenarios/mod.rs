//! End-to-end scenario suites.
//!
//! Each suite is a [`SerialSuite`](crate::SerialSuite) over a
//! [`ScenarioRun`]: the section of
//! the configuration it needs plus the [`ScenarioContext`] its steps fill
//! in as they go.
//!
//! ## Toyota Way Application:
//! - **Jidoka**: the first failing step stops the line, later steps are skipped
//! - **Poka-Yoke**: missing settings fail before the browser is touched

pub mod flextable;
pub mod woocommerce;

use crate::config::{FlexTableConfig, SuiteConfig, WooCommerceConfig};
use crate::context::ScenarioContext;
use crate::result::{ProbeError, ProbeResult};
use crate::session::Session;
use crate::suite::SuiteReport;
use std::fmt;
use std::str::FromStr;

/// Configuration and accumulated state of one suite run
#[derive(Debug, Clone, Default)]
pub struct ScenarioRun<C> {
    /// Settings the steps read
    pub config: C,
    /// Values earlier steps produced
    pub state: ScenarioContext,
}

impl<C> ScenarioRun<C> {
    /// Fresh run with empty state
    pub fn new(config: C) -> Self {
        Self {
            config,
            state: ScenarioContext::default(),
        }
    }
}

/// The suites this crate ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuiteKind {
    /// FlexTable plugin: table from a Google Sheet, embedding, display options
    FlexTable,
    /// WooCommerce store: cart, checkout and order status round trip
    WooCommerce,
}

impl SuiteKind {
    /// Every suite, in listing order
    pub const ALL: [Self; 2] = [Self::FlexTable, Self::WooCommerce];

    /// Name used on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FlexTable => "flextable",
            Self::WooCommerce => "woocommerce",
        }
    }

    /// Step names in run order
    #[must_use]
    pub fn step_names(self) -> Vec<String> {
        match self {
            Self::FlexTable => flextable::suite().step_names().into_iter().map(str::to_string).collect(),
            Self::WooCommerce => woocommerce::suite().step_names().into_iter().map(str::to_string).collect(),
        }
    }

    /// Settings this suite needs that `config` lacks
    #[must_use]
    pub fn missing_settings(self, config: &SuiteConfig) -> Vec<&'static str> {
        match self {
            Self::FlexTable => config.flextable.missing(),
            Self::WooCommerce => config.woocommerce.missing(),
        }
    }

    /// Run the suite against `session`
    pub async fn run(self, session: &Session, config: &SuiteConfig) -> SuiteReport {
        match self {
            Self::FlexTable => {
                let mut run = ScenarioRun::new(config.flextable.clone());
                flextable::suite().run(session, &mut run).await
            }
            Self::WooCommerce => {
                let mut run = ScenarioRun::new(config.woocommerce.clone());
                woocommerce::suite().run(session, &mut run).await
            }
        }
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SuiteKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> ProbeResult<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ProbeError::config(format!("unknown suite '{s}', expected one of: flextable, woocommerce"))
            })
    }
}

/// State of a FlexTable run
pub type FlexTableRun = ScenarioRun<FlexTableConfig>;

/// State of a WooCommerce run
pub type WooCommerceRun = ScenarioRun<WooCommerceConfig>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::session::SessionConfig;

    mod kind_tests {
        use super::*;

        #[test]
        fn test_parse_names() {
            assert_eq!("flextable".parse::<SuiteKind>().unwrap(), SuiteKind::FlexTable);
            assert_eq!(" WooCommerce ".parse::<SuiteKind>().unwrap(), SuiteKind::WooCommerce);
            assert_eq!("shop".parse::<SuiteKind>().unwrap_err().kind(), "config");
        }

        #[test]
        fn test_step_counts() {
            assert_eq!(SuiteKind::FlexTable.step_names().len(), 9);
            assert_eq!(SuiteKind::WooCommerce.step_names().len(), 8);
        }

        #[test]
        fn test_missing_settings_per_suite() {
            let mut config = SuiteConfig::default();
            config.woocommerce.base_url = Some("https://shop.test/".to_string());
            let missing = SuiteKind::WooCommerce.missing_settings(&config);
            assert_eq!(missing.len(), 6);
            assert!(!missing.contains(&"WOOCOMMERCE_BASE_URL"));
        }
    }

    mod run_tests {
        use super::*;

        #[tokio::test]
        async fn test_unconfigured_suite_fails_before_browsing() {
            for kind in SuiteKind::ALL {
                let mock = MockDriver::new();
                let session = Session::new(mock.clone(), SessionConfig::default());
                let report = kind.run(&session, &SuiteConfig::default()).await;
                assert_eq!(report.failed_count(), 1);
                assert_eq!(report.skipped_count(), report.total() - 1);
                assert!(report.results[0].outcome.is_failed());
                assert!(!mock.was_called("goto:"), "{kind} navigated without settings");
            }
        }
    }
}
