//! Shared browser session.
//!
//! One [`Session`] is constructed per suite run and handed to every page
//! object. Clones share the same underlying [`PageDriver`]; operations are
//! awaited one after another, so the lock is never contended in practice.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: every action waits for its element and fails loudly on timeout
//! - **Poka-Yoke**: scoped acquisition guarantees the browser is released

use crate::driver::PageDriver;
use crate::locator::{BoundingBox, Locator};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{
    wait_until, ElementState, IdleTracker, LoadState, WaitOptions, WaitResult,
    DEFAULT_ELEMENT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS, NETWORK_IDLE_THRESHOLD_MS,
};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use uuid::Uuid;

/// Timing budget of a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long an action waits for its element
    pub element_timeout: Duration,
    /// Budget for load-state and URL waits
    pub navigation_timeout: Duration,
    /// Delay between two polls
    pub poll_interval: Duration,
    /// Quiescence window for network idle
    pub network_idle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            element_timeout: Duration::from_millis(DEFAULT_ELEMENT_TIMEOUT_MS),
            navigation_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            network_idle: Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS),
        }
    }
}

/// Cheap-clone handle to the single browser page of a suite run
#[derive(Clone)]
pub struct Session {
    id: Uuid,
    driver: Arc<Mutex<Box<dyn PageDriver>>>,
    config: Arc<SessionConfig>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a driver
    #[must_use]
    pub fn new(driver: impl PageDriver + 'static, config: SessionConfig) -> Self {
        Self::from_boxed(Box::new(driver), config)
    }

    /// Wrap an already boxed driver
    #[must_use]
    pub fn from_boxed(driver: Box<dyn PageDriver>, config: SessionConfig) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "session opened");
        Self {
            id,
            driver: Arc::new(Mutex::new(driver)),
            config: Arc::new(config),
        }
    }

    /// Run `f` with a fresh session and close it afterwards, whether `f`
    /// succeeded or not. The error of `f` wins over a close error.
    pub async fn scoped<F, Fut, T>(
        driver: Box<dyn PageDriver>,
        config: SessionConfig,
        f: F,
    ) -> ProbeResult<T>
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = ProbeResult<T>>,
    {
        let session = Self::from_boxed(driver, config);
        let result = f(session.clone()).await;
        let closed = session.close().await;
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "failed to close session after error");
                }
                Err(e)
            }
        }
    }

    /// Session identifier used in logs and reports
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Timing budget
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Close the underlying page
    pub async fn close(&self) -> ProbeResult<()> {
        tracing::debug!(session = %self.id, "session closing");
        self.driver().await.close().await
    }

    async fn driver(&self) -> MutexGuard<'_, Box<dyn PageDriver>> {
        self.driver.lock().await
    }

    fn element_timeout(&self, locator: &Locator) -> Duration {
        locator.timeout().unwrap_or(self.config.element_timeout)
    }

    fn element_wait(&self, locator: &Locator) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.element_timeout(locator).as_millis() as u64)
            .with_poll_interval(self.config.poll_interval.as_millis() as u64)
    }

    fn navigation_wait(&self) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(self.config.navigation_timeout.as_millis() as u64)
            .with_poll_interval(self.config.poll_interval.as_millis() as u64)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Open `url` and wait for the `load` state
    pub async fn goto(&self, url: &str) -> ProbeResult<()> {
        self.goto_until(url, LoadState::Load).await
    }

    /// Open `url` and wait for the given load state
    pub async fn goto_until(&self, url: &str, state: LoadState) -> ProbeResult<()> {
        tracing::info!(url, wait_until = %state, "navigate");
        self.driver().await.goto(url).await?;
        self.wait_for_load_state(state).await.map(|_| ())
    }

    /// Current page URL
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver().await.current_url().await
    }

    /// Block until the page reaches `state`
    pub async fn wait_for_load_state(&self, state: LoadState) -> ProbeResult<WaitResult> {
        let tracker = std::sync::Mutex::new(IdleTracker::new(self.config.network_idle));
        let tracker = &tracker;
        let result = wait_until(&self.navigation_wait(), &format!("load state {state}"), || async move {
            let driver = self.driver().await;
            let ready = driver.ready_state().await?.satisfies(state);
            if state != LoadState::NetworkIdle {
                return Ok(ready);
            }
            let in_flight = driver.in_flight_requests().await?;
            drop(driver);
            let idle = tracker
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .observe(in_flight, Instant::now());
            Ok(ready && idle)
        })
        .await?;
        tracing::debug!(state = %state, elapsed_ms = result.elapsed.as_millis() as u64, "load state reached");
        Ok(result)
    }

    /// Block until the current URL contains `fragment`
    pub async fn wait_for_url(&self, fragment: &str) -> ProbeResult<WaitResult> {
        wait_until(&self.navigation_wait(), &format!("URL containing {fragment:?}"), || async move {
            Ok(self.current_url().await?.contains(fragment))
        })
        .await
    }

    /// Click and then wait for the URL to contain `fragment`
    pub async fn click_and_wait_for_url(&self, locator: &Locator, fragment: &str) -> ProbeResult<()> {
        self.click(locator).await?;
        self.wait_for_url(fragment).await?;
        self.wait_for_load_state(LoadState::DomContentLoaded).await.map(|_| ())
    }

    /// Poll an arbitrary condition within the navigation budget
    pub async fn wait_for_condition<F, Fut>(&self, description: &str, check: F) -> ProbeResult<WaitResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<bool>>,
    {
        wait_until(&self.navigation_wait(), description, check).await
    }

    // =========================================================================
    // ELEMENT STATE WAITS
    // =========================================================================

    /// Wait for the element to reach `state` within its element timeout
    pub async fn wait_for(&self, locator: &Locator, state: ElementState) -> ProbeResult<WaitResult> {
        let options = self.element_wait(locator);
        let description = format!("{locator} to be {state}");
        let previous = std::sync::Mutex::new(None::<BoundingBox>);
        let previous = &previous;
        let outcome = wait_until(&options, &description, || async move {
            let driver = self.driver().await;
            match state {
                ElementState::Attached => {
                    Ok(driver.count(locator).await? >= 1)
                }
                ElementState::Visible => driver.is_visible(locator).await,
                ElementState::Hidden => Ok(!driver.is_visible(locator).await?),
                ElementState::Stable => {
                    if driver.count(locator).await? == 0 {
                        return Ok(false);
                    }
                    let current = driver.bounding_box(locator).await?;
                    drop(driver);
                    let mut last = previous
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner);
                    let stable = current.is_some() && *last == current;
                    *last = current;
                    Ok(stable)
                }
            }
        })
        .await;
        match outcome {
            Err(ProbeError::NavigationTimeout { timeout_ms, .. })
                if state != ElementState::Hidden && self.is_missing(locator).await? =>
            {
                Err(ProbeError::ElementNotFound {
                    locator: locator.to_string(),
                    timeout_ms,
                })
            }
            other => other,
        }
    }

    /// No element resolves for the locator's position right now
    async fn is_missing(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self.driver().await.count(locator).await? == 0)
    }

    async fn attached(&self, locator: &Locator) -> ProbeResult<()> {
        self.wait_for(locator, ElementState::Attached).await.map(|_| ())
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Click the element
    pub async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        self.attached(locator).await?;
        tracing::debug!(locator = %locator, "click");
        self.driver().await.click(locator).await
    }

    /// Hover the element
    pub async fn hover(&self, locator: &Locator) -> ProbeResult<()> {
        self.attached(locator).await?;
        tracing::debug!(locator = %locator, "hover");
        self.driver().await.hover(locator).await
    }

    /// Replace the value of an input
    pub async fn fill(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.attached(locator).await?;
        tracing::debug!(locator = %locator, value, "fill");
        self.driver().await.fill(locator, value).await
    }

    /// Select an option by value
    pub async fn select_option(&self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.attached(locator).await?;
        tracing::debug!(locator = %locator, value, "select option");
        self.driver().await.select_option(locator, value).await
    }

    /// Scroll the element into view
    pub async fn scroll_into_view(&self, locator: &Locator) -> ProbeResult<()> {
        self.attached(locator).await?;
        self.driver().await.scroll_into_view(locator).await
    }

    /// Scroll to the bottom of the page
    pub async fn scroll_to_bottom(&self) -> ProbeResult<()> {
        self.driver().await.scroll_to_bottom().await
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Number of current matches; does not wait
    pub async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        self.driver().await.count(locator).await
    }

    /// Visibility right now; does not wait
    pub async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        self.driver().await.is_visible(locator).await
    }

    /// Visibility, giving the element up to `timeout` to appear
    pub async fn is_visible_within(&self, locator: &Locator, timeout: Duration) -> ProbeResult<bool> {
        match self
            .wait_for(&locator.clone().with_timeout(timeout), ElementState::Visible)
            .await
        {
            Ok(_) => Ok(true),
            Err(ProbeError::NavigationTimeout { .. } | ProbeError::ElementNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// `textContent`, empty when null
    pub async fn text_content(&self, locator: &Locator) -> ProbeResult<String> {
        self.attached(locator).await?;
        Ok(self
            .driver()
            .await
            .text_content(locator)
            .await?
            .unwrap_or_default())
    }

    /// Rendered text
    pub async fn inner_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.attached(locator).await?;
        self.driver().await.inner_text(locator).await
    }

    /// Form value
    pub async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        self.attached(locator).await?;
        self.driver().await.input_value(locator).await
    }

    /// Attribute value
    pub async fn get_attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        self.attached(locator).await?;
        self.driver().await.get_attribute(locator, name).await
    }

    /// Bounding box; fails when the element is not rendered
    pub async fn bounding_box(&self, locator: &Locator) -> ProbeResult<BoundingBox> {
        self.wait_for(locator, ElementState::Visible).await?;
        self.driver()
            .await
            .bounding_box(locator)
            .await?
            .ok_or_else(|| ProbeError::assertion(format!("{locator} has a bounding box"), "rendered", "none"))
    }

    /// Computed CSS value
    pub async fn computed_style(&self, locator: &Locator, property: &str) -> ProbeResult<String> {
        self.attached(locator).await?;
        self.driver().await.computed_style(locator, property).await
    }

    /// Text of the checked option of a select
    pub async fn selected_option_text(&self, locator: &Locator) -> ProbeResult<String> {
        self.attached(locator).await?;
        self.driver().await.selected_option_text(locator).await
    }

    // =========================================================================
    // EXPECTATIONS (retrying)
    // =========================================================================

    async fn expect_with<F, Fut, P>(
        &self,
        locator: &Locator,
        message: String,
        expected: &str,
        mut observe: F,
        matches: P,
    ) -> ProbeResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ProbeResult<String>>,
        P: Fn(&str) -> bool,
    {
        let timeout = self.element_timeout(locator);
        let start = Instant::now();
        loop {
            let (actual, absent) = match observe().await {
                Ok(value) => (value, false),
                Err(ProbeError::ElementNotFound { .. }) => ("<no element>".to_string(), true),
                Err(e) => return Err(e),
            };
            if matches(&actual) {
                return Ok(());
            }
            if start.elapsed() >= timeout {
                if absent || self.is_missing(locator).await? {
                    tracing::debug!(locator = %locator, expected, "expectation found no element");
                    return Err(ProbeError::ElementNotFound {
                        locator: locator.to_string(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                tracing::debug!(locator = %locator, expected, actual = %actual, "expectation failed");
                return Err(ProbeError::assertion(message, expected, actual));
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Element becomes visible
    pub async fn expect_visible(&self, locator: &Locator) -> ProbeResult<()> {
        self.expect_with(
            locator,
            format!("{locator} visibility"),
            "visible",
            || async move { self.visibility_label(locator).await },
            |actual| actual == "visible",
        )
        .await
    }

    /// Element becomes hidden or detached
    pub async fn expect_hidden(&self, locator: &Locator) -> ProbeResult<()> {
        self.expect_with(
            locator,
            format!("{locator} visibility"),
            "hidden",
            || async move { self.visibility_label(locator).await },
            |actual| actual == "hidden",
        )
        .await
    }

    async fn visibility_label(&self, locator: &Locator) -> ProbeResult<String> {
        let visible = self.driver().await.is_visible(locator).await?;
        Ok(if visible { "visible" } else { "hidden" }.to_string())
    }

    /// Trimmed text equals `expected`
    pub async fn expect_text(&self, locator: &Locator, expected: &str) -> ProbeResult<()> {
        self.expect_with(
            locator,
            format!("{locator} text"),
            expected,
            || async move { Ok(self.driver().await.inner_text(locator).await?.trim().to_string()) },
            |actual| actual == expected.trim(),
        )
        .await
    }

    /// Text contains `expected`
    pub async fn expect_contains_text(&self, locator: &Locator, expected: &str) -> ProbeResult<()> {
        self.expect_with(
            locator,
            format!("{locator} text"),
            expected,
            || async move {
                Ok(self
                    .driver()
                    .await
                    .text_content(locator)
                    .await?
                    .unwrap_or_default())
            },
            |actual| actual.contains(expected),
        )
        .await
    }

    /// Form value equals `expected`
    pub async fn expect_value(&self, locator: &Locator, expected: &str) -> ProbeResult<()> {
        self.expect_with(
            locator,
            format!("{locator} value"),
            expected,
            || async move { self.driver().await.input_value(locator).await },
            |actual| actual == expected,
        )
        .await
    }

    /// Exactly `expected` matches
    pub async fn expect_count(&self, locator: &Locator, expected: usize) -> ProbeResult<()> {
        let wanted = expected.to_string();
        self.expect_with(
            locator,
            format!("{locator} count"),
            &wanted,
            || async move { Ok(self.driver().await.count(locator).await?.to_string()) },
            |actual| actual == wanted,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{MockDriver, MockElement};

    fn fast() -> SessionConfig {
        SessionConfig {
            element_timeout: Duration::from_millis(200),
            navigation_timeout: Duration::from_millis(2_000),
            poll_interval: Duration::from_millis(10),
            network_idle: Duration::from_millis(500),
        }
    }

    mod action_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_click_missing_element_is_not_found() {
            let session = Session::new(MockDriver::new(), fast());
            let err = session.click(&Locator::new("#place_order")).await.unwrap_err();
            match err {
                ProbeError::ElementNotFound { locator, timeout_ms } => {
                    assert_eq!(locator, "#place_order");
                    assert_eq!(timeout_ms, 200);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_locator_timeout_overrides_session() {
            let session = Session::new(MockDriver::new(), fast());
            let locator = Locator::new("#activate").with_timeout(Duration::from_millis(15_000));
            let err = session.click(&locator).await.unwrap_err();
            assert!(matches!(err, ProbeError::ElementNotFound { timeout_ms: 15_000, .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_fill_reaches_driver() {
            let mock = MockDriver::new();
            let field = Locator::new("#billing_city");
            mock.set_one(&field, MockElement::input(""));
            let session = Session::new(mock.clone(), fast());
            session.fill(&field, "Testing City").await.unwrap();
            assert_eq!(mock.value_of(&field).as_deref(), Some("Testing City"));
            assert!(mock.was_called("fill:#billing_city"));
        }
    }

    mod wait_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_network_idle_needs_quiet_window() {
            let mock = MockDriver::new();
            mock.with_page(|page| page.in_flight = 1);
            let session = Session::new(mock.clone(), fast());
            let background = mock.clone();
            let waiter = tokio::spawn(async move {
                session.wait_for_load_state(LoadState::NetworkIdle).await
            });
            tokio::time::sleep(Duration::from_millis(300)).await;
            background.with_page(|page| page.in_flight = 0);
            let result = waiter.await.unwrap().unwrap();
            assert!(result.elapsed >= Duration::from_millis(800));
        }

        #[tokio::test(start_paused = true)]
        async fn test_url_wait_times_out() {
            let mock = MockDriver::new();
            mock.with_page(|page| page.url = "https://wp.test/wp-login.php".to_string());
            let session = Session::new(mock, fast());
            let err = session.wait_for_url("/wp-admin/").await.unwrap_err();
            assert_eq!(err.kind(), "navigation-timeout");
        }

        #[tokio::test(start_paused = true)]
        async fn test_click_and_wait_for_url() {
            let mock = MockDriver::new();
            let login = Locator::new("#wp-submit");
            mock.set_one(&login, MockElement::default());
            mock.on_click(&login, |page| {
                page.url = "https://wp.test/wp-admin/".to_string();
            });
            let session = Session::new(mock, fast());
            session.click_and_wait_for_url(&login, "/wp-admin/").await.unwrap();
            assert!(session.current_url().await.unwrap().ends_with("/wp-admin/"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_stable_needs_two_equal_boxes() {
            let mock = MockDriver::new();
            let table = Locator::new("#create_tables_wrapper");
            mock.set_one(
                &table,
                MockElement::default().with_box(BoundingBox::new(0.0, 300.0, 800.0, 400.0)),
            );
            let session = Session::new(mock, fast());
            let result = session.wait_for(&table, ElementState::Stable).await.unwrap();
            assert_eq!(result.polls, 2);
        }

        #[tokio::test(start_paused = true)]
        async fn test_is_visible_within_false_on_timeout() {
            let session = Session::new(MockDriver::new(), fast());
            let visible = session
                .is_visible_within(&Locator::new("button.continue"), Duration::from_millis(100))
                .await
                .unwrap();
            assert!(!visible);
        }
    }

    mod expectation_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_expect_text_reports_both_sides() {
            let mock = MockDriver::new();
            let status = Locator::new("mark.order-status");
            mock.set_one(&status, MockElement::text("Processing"));
            let session = Session::new(mock, fast());
            let err = session.expect_text(&status, "Completed").await.unwrap_err();
            match err {
                ProbeError::AssertionFailed {
                    expected, actual, ..
                } => {
                    assert_eq!(expected, "Completed");
                    assert_eq!(actual, "Processing");
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_absent_element_is_not_found() {
            let session = Session::new(MockDriver::new(), fast());
            let name = Locator::new(".account-text-user");
            let kinds = [
                session.expect_text(&name, "Tanvir Tester1").await.unwrap_err().kind(),
                session.expect_visible(&name).await.unwrap_err().kind(),
                session.expect_contains_text(&name, "Tanvir").await.unwrap_err().kind(),
                session.bounding_box(&name).await.unwrap_err().kind(),
                session.wait_for(&name, ElementState::Visible).await.unwrap_err().kind(),
                session.wait_for(&name, ElementState::Stable).await.unwrap_err().kind(),
            ];
            assert!(kinds.iter().all(|k| *k == "element-not-found"), "{kinds:?}");
        }

        #[tokio::test(start_paused = true)]
        async fn test_hidden_element_stays_an_assertion() {
            let mock = MockDriver::new();
            let notice = Locator::new("div#message p");
            mock.set_one(&notice, MockElement::text("Order updated.").hidden());
            let session = Session::new(mock, fast());
            assert_eq!(session.expect_visible(&notice).await.unwrap_err().kind(), "assertion");
            assert_eq!(
                session.wait_for(&notice, ElementState::Visible).await.unwrap_err().kind(),
                "navigation-timeout"
            );
        }

        #[tokio::test(start_paused = true)]
        async fn test_expect_hidden_accepts_missing_element() {
            let session = Session::new(MockDriver::new(), fast());
            session.expect_hidden(&Locator::new(".popup")).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_expect_count() {
            let mock = MockDriver::new();
            let items = Locator::new(".mini_cart_item");
            mock.set(&items, vec![MockElement::default(); 3]);
            let session = Session::new(mock, fast());
            session.expect_count(&items, 3).await.unwrap();
            assert!(session.expect_count(&items, 2).await.is_err());
        }
    }

    mod scoped_tests {
        use super::*;

        #[tokio::test]
        async fn test_closes_on_success_and_failure() {
            let mock = MockDriver::new();
            let value = Session::scoped(Box::new(mock.clone()), fast(), |_s| async { Ok(7) })
                .await
                .unwrap();
            assert_eq!(value, 7);
            assert!(mock.is_closed());

            let mock = MockDriver::new();
            let err = Session::scoped(Box::new(mock.clone()), fast(), |_s| async {
                Err::<(), _>(ProbeError::precondition("WORDPRESS_USERNAME"))
            })
            .await
            .unwrap_err();
            assert_eq!(err.kind(), "precondition");
            assert!(mock.is_closed());
        }
    }
}
