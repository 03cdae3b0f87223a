//! Scripted in-memory driver for unit tests.
//!
//! Elements are registered under a locator [`key`](Locator::key); the
//! terminal position and visibility filter of a query are applied to that
//! list. Click and navigation reactions mutate the scripted page so tests
//! can model pages that re-render after an interaction.

use super::PageDriver;
use crate::locator::{BoundingBox, Locator, Position};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::DocumentState;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A scripted element
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    /// Text content
    pub text: String,
    /// Form value
    pub value: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// Computed style overrides
    pub styles: HashMap<String, String>,
    /// `(value, label)` pairs for selects
    pub options: Vec<(String, String)>,
    /// Geometry
    pub bounding_box: Option<BoundingBox>,
    /// Rendered or not
    pub visible: bool,
}

impl Default for MockElement {
    fn default() -> Self {
        Self {
            text: String::new(),
            value: String::new(),
            attributes: HashMap::new(),
            styles: HashMap::new(),
            options: Vec::new(),
            bounding_box: None,
            visible: true,
        }
    }
}

impl MockElement {
    /// Visible element with the given text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Visible form control with the given value
    #[must_use]
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Select with `(value, label)` options, the first one selected
    #[must_use]
    pub fn select(options: &[(&str, &str)]) -> Self {
        Self {
            value: options.first().map(|(v, _)| (*v).to_string()).unwrap_or_default(),
            options: options
                .iter()
                .map(|(v, l)| ((*v).to_string(), (*l).to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a computed style value
    #[must_use]
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.styles.insert(property.into(), value.into());
        self
    }

    /// Set the bounding box
    #[must_use]
    pub const fn with_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    /// Mark as not rendered
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    fn style(&self, property: &str) -> String {
        match self.styles.get(property) {
            Some(value) => value.clone(),
            None if property == "display" => {
                if self.visible { "block" } else { "none" }.to_string()
            }
            None => String::new(),
        }
    }
}

/// Scripted page contents
#[derive(Debug, Default)]
pub struct MockPage {
    /// Current URL
    pub url: String,
    /// Elements by locator key
    pub elements: HashMap<String, Vec<MockElement>>,
    /// Document readiness
    pub ready_state: Option<DocumentState>,
    /// Requests in flight
    pub in_flight: usize,
}

impl MockPage {
    /// Replace the elements under a key
    pub fn set(&mut self, key: impl Into<String>, elements: Vec<MockElement>) {
        let _ = self.elements.insert(key.into(), elements);
    }

    /// Remove every element under a key
    pub fn remove(&mut self, key: &str) {
        let _ = self.elements.remove(key);
    }

    /// Mutable access to one element
    pub fn element_mut(&mut self, key: &str, index: usize) -> Option<&mut MockElement> {
        self.elements.get_mut(key).and_then(|list| list.get_mut(index))
    }

    fn targets(&self, locator: &Locator) -> Vec<&MockElement> {
        let candidates: Vec<&MockElement> = self
            .elements
            .get(&locator.key())
            .map(|list| {
                list.iter()
                    .filter(|el| !locator.is_visible_only() || el.visible)
                    .collect()
            })
            .unwrap_or_default();
        match locator.position() {
            Some(Position::Nth(index)) => candidates.get(index).copied().into_iter().collect(),
            Some(Position::Last) => candidates.last().copied().into_iter().collect(),
            None => candidates,
        }
    }

    fn target(&self, locator: &Locator) -> ProbeResult<&MockElement> {
        self.targets(locator)
            .first()
            .copied()
            .ok_or_else(|| not_found(locator))
    }

    fn target_mut(&mut self, locator: &Locator) -> ProbeResult<&mut MockElement> {
        let visible_only = locator.is_visible_only();
        let list = self
            .elements
            .get_mut(&locator.key())
            .ok_or_else(|| not_found(locator))?;
        let mut candidates: Vec<&mut MockElement> = list
            .iter_mut()
            .filter(|el| !visible_only || el.visible)
            .collect();
        let index = match locator.position() {
            Some(Position::Nth(index)) => index,
            Some(Position::Last) => candidates.len().saturating_sub(1),
            None => 0,
        };
        if index < candidates.len() {
            Ok(candidates.swap_remove(index))
        } else {
            Err(not_found(locator))
        }
    }
}

fn not_found(locator: &Locator) -> ProbeError {
    ProbeError::ElementNotFound {
        locator: locator.to_string(),
        timeout_ms: 0,
    }
}

type Reaction = Arc<dyn Fn(&mut MockPage) + Send + Sync>;

#[derive(Default)]
struct MockState {
    page: MockPage,
    click_reactions: HashMap<String, Vec<Reaction>>,
    goto_reactions: HashMap<String, Vec<Reaction>>,
    history: Vec<String>,
    closed: bool,
}

/// Mock driver for unit testing.
///
/// Clones share the same scripted page, so a test can keep one handle for
/// inspection while the session owns another.
#[derive(Clone, Default)]
pub struct MockDriver {
    state: Arc<Mutex<MockState>>,
}

impl fmt::Debug for MockDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("MockDriver")
            .field("url", &state.page.url)
            .field("elements", &state.page.elements.len())
            .field("calls", &state.history.len())
            .finish_non_exhaustive()
    }
}

impl MockDriver {
    /// Create new mock driver
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register elements under the key of `locator`
    pub fn set(&self, locator: &Locator, elements: Vec<MockElement>) {
        self.lock().page.set(locator.key(), elements);
    }

    /// Register a single element under the key of `locator`
    pub fn set_one(&self, locator: &Locator, element: MockElement) {
        self.set(locator, vec![element]);
    }

    /// Run a closure against the scripted page
    pub fn with_page<R>(&self, f: impl FnOnce(&mut MockPage) -> R) -> R {
        f(&mut self.lock().page)
    }

    /// Mutate the page whenever `locator` is clicked
    pub fn on_click(&self, locator: &Locator, reaction: impl Fn(&mut MockPage) + Send + Sync + 'static) {
        self.lock()
            .click_reactions
            .entry(locator.key())
            .or_default()
            .push(Arc::new(reaction));
    }

    /// Mutate the page whenever `url` is opened
    pub fn on_goto(&self, url: impl Into<String>, reaction: impl Fn(&mut MockPage) + Send + Sync + 'static) {
        self.lock()
            .goto_reactions
            .entry(url.into())
            .or_default()
            .push(Arc::new(reaction));
    }

    /// Current value of an element (for assertions in tests)
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        self.lock().page.target(locator).ok().map(|el| el.value.clone())
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Number of recorded calls starting with `prefix`
    #[must_use]
    pub fn calls(&self, prefix: &str) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Check if method was called
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.calls(prefix) > 0
    }

    /// Whether `close` ran
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn record(&self, call: String) {
        self.lock().history.push(call);
    }

    fn react(&self, reactions: Option<Vec<Reaction>>) {
        if let Some(reactions) = reactions {
            let mut state = self.lock();
            for reaction in reactions {
                reaction(&mut state.page);
            }
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn goto(&mut self, url: &str) -> ProbeResult<()> {
        self.record(format!("goto:{url}"));
        let reactions = {
            let mut state = self.lock();
            state.page.url = url.to_string();
            state.goto_reactions.get(url).cloned()
        };
        self.react(reactions);
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        Ok(self.lock().page.url.clone())
    }

    async fn ready_state(&self) -> ProbeResult<DocumentState> {
        Ok(self.lock().page.ready_state.unwrap_or(DocumentState::Complete))
    }

    async fn in_flight_requests(&self) -> ProbeResult<usize> {
        Ok(self.lock().page.in_flight)
    }

    async fn count(&self, locator: &Locator) -> ProbeResult<usize> {
        Ok(self.lock().page.targets(locator).len())
    }

    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool> {
        Ok(self
            .lock()
            .page
            .targets(locator)
            .first()
            .is_some_and(|el| el.visible))
    }

    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>> {
        Ok(Some(self.lock().page.target(locator)?.text.clone()))
    }

    async fn inner_text(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.lock().page.target(locator)?.text.trim().to_string())
    }

    async fn input_value(&self, locator: &Locator) -> ProbeResult<String> {
        Ok(self.lock().page.target(locator)?.value.clone())
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>> {
        Ok(self
            .lock()
            .page
            .target(locator)?
            .attributes
            .get(name)
            .cloned())
    }

    async fn bounding_box(&self, locator: &Locator) -> ProbeResult<Option<BoundingBox>> {
        let state = self.lock();
        let el = state.page.target(locator)?;
        Ok(if el.visible { el.bounding_box } else { None })
    }

    async fn computed_style(&self, locator: &Locator, property: &str) -> ProbeResult<String> {
        Ok(self.lock().page.target(locator)?.style(property))
    }

    async fn selected_option_text(&self, locator: &Locator) -> ProbeResult<String> {
        let state = self.lock();
        let el = state.page.target(locator)?;
        Ok(el
            .options
            .iter()
            .find(|(value, _)| *value == el.value)
            .map(|(_, label)| label.clone())
            .unwrap_or_default())
    }

    async fn click(&mut self, locator: &Locator) -> ProbeResult<()> {
        self.record(format!("click:{locator}"));
        let reactions = {
            let state = self.lock();
            let _ = state.page.target(locator)?;
            state.click_reactions.get(&locator.key()).cloned()
        };
        self.react(reactions);
        Ok(())
    }

    async fn hover(&mut self, locator: &Locator) -> ProbeResult<()> {
        self.record(format!("hover:{locator}"));
        let _ = self.lock().page.target(locator)?;
        Ok(())
    }

    async fn fill(&mut self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.record(format!("fill:{locator}={value}"));
        self.lock().page.target_mut(locator)?.value = value.to_string();
        Ok(())
    }

    async fn select_option(&mut self, locator: &Locator, value: &str) -> ProbeResult<()> {
        self.record(format!("select:{locator}={value}"));
        let mut state = self.lock();
        let el = state.page.target_mut(locator)?;
        if !el.options.is_empty() && !el.options.iter().any(|(v, _)| v == value) {
            return Err(ProbeError::driver(format!(
                "option {value:?} not found in {locator}"
            )));
        }
        el.value = value.to_string();
        Ok(())
    }

    async fn scroll_into_view(&mut self, locator: &Locator) -> ProbeResult<()> {
        self.record(format!("scroll:{locator}"));
        let _ = self.lock().page.target(locator)?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> ProbeResult<()> {
        self.record("scroll:bottom".to_string());
        Ok(())
    }

    async fn close(&mut self) -> ProbeResult<()> {
        self.record("close".to_string());
        self.lock().closed = true;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_position_applies_to_registered_list() {
        let mut driver = MockDriver::new();
        let rows = Locator::new("td.product-price");
        driver.set(
            &rows,
            vec![MockElement::text("$10.00"), MockElement::text("$20.00")],
        );
        assert_eq!(driver.count(&rows).await.unwrap(), 2);
        assert_eq!(
            driver.inner_text(&rows.clone().nth(1)).await.unwrap(),
            "$20.00"
        );
        assert_eq!(
            driver.inner_text(&rows.clone().last()).await.unwrap(),
            "$20.00"
        );
        assert!(driver.click(&rows.nth(2)).await.is_err());
    }

    #[tokio::test]
    async fn test_visible_filter() {
        let driver = MockDriver::new();
        let buttons = Locator::new("button.copy-shortcode");
        driver.set(
            &buttons,
            vec![
                MockElement::text("[gswpts_table id=1]").hidden(),
                MockElement::text("[gswpts_table id=7]"),
            ],
        );
        let text = driver
            .text_content(&buttons.visible_only().first())
            .await
            .unwrap();
        assert_eq!(text.as_deref(), Some("[gswpts_table id=7]"));
    }

    #[tokio::test]
    async fn test_click_reaction_mutates_page() {
        let mut driver = MockDriver::new();
        let toggle = Locator::new("#toggle");
        let section = Locator::new(".section");
        driver.set_one(&toggle, MockElement::default());
        driver.set_one(&section, MockElement::default());
        let key = section.key();
        driver.on_click(&toggle, move |page| {
            if let Some(el) = page.element_mut(&key, 0) {
                el.visible = !el.visible;
            }
        });
        assert_eq!(driver.computed_style(&section, "display").await.unwrap(), "block");
        driver.click(&toggle).await.unwrap();
        assert_eq!(driver.computed_style(&section, "display").await.unwrap(), "none");
        assert_eq!(driver.calls("click:"), 1);
    }

    #[tokio::test]
    async fn test_select_rejects_unknown_option() {
        let mut driver = MockDriver::new();
        let select = Locator::new("#billing_state");
        driver.set_one(&select, MockElement::select(&[("BD-05", "Bagerhat"), ("BD-13", "Dhaka")]));
        assert!(driver.select_option(&select, "BD-99").await.is_err());
        driver.select_option(&select, "BD-13").await.unwrap();
        assert_eq!(driver.selected_option_text(&select).await.unwrap(), "Dhaka");
    }

    #[tokio::test]
    async fn test_goto_reaction_and_close() {
        let mut driver = MockDriver::new();
        let heading = Locator::new("h1");
        let key = heading.key();
        driver.on_goto("https://shop.test/", move |page| {
            page.set(key.clone(), vec![MockElement::text("Shop")]);
        });
        driver.goto("https://shop.test/").await.unwrap();
        assert_eq!(driver.current_url().await.unwrap(), "https://shop.test/");
        assert_eq!(driver.count(&heading).await.unwrap(), 1);
        driver.close().await.unwrap();
        assert!(driver.is_closed());
    }
}
