//! PageDriver - Abstract Browser Automation Trait
//!
//! The page objects never talk to a browser directly. They go through a
//! [`Session`](crate::Session), which wraps one `PageDriver`.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                                   │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────────┐   │
//! │  │  CdpDriver          │        │  MockDriver             │   │
//! │  │  (feature browser)  │        │  (unit tests)           │   │
//! │  │  chromiumoxide CDP  │        │  scripted in-memory DOM │   │
//! │  └─────────────────────┘        └─────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every query is a fresh snapshot of the page. Element-level calls on a
//! locator that currently matches nothing fail with
//! [`ProbeError::ElementNotFound`](crate::ProbeError::ElementNotFound) and a
//! zero wait budget; waiting is the session's job.

use crate::locator::{BoundingBox, Locator};
use crate::result::ProbeResult;
use crate::wait::DocumentState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "browser")]
mod cdp;
mod mock;

#[cfg(feature = "browser")]
pub use cdp::CdpDriver;
pub use mock::{MockDriver, MockElement, MockPage};

/// Browser launch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Abstract driver trait for browser automation.
///
/// # Implementations
///
/// - `CdpDriver` - Chromium over CDP, behind the `browser` feature
/// - `MockDriver` - For unit testing
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to URL
    async fn goto(&mut self, url: &str) -> ProbeResult<()>;

    /// Get current URL
    async fn current_url(&self) -> ProbeResult<String>;

    /// Current `document.readyState`
    async fn ready_state(&self) -> ProbeResult<DocumentState>;

    /// Number of network requests currently in flight
    async fn in_flight_requests(&self) -> ProbeResult<usize>;

    /// Number of elements the locator matches right now
    async fn count(&self, locator: &Locator) -> ProbeResult<usize>;

    /// Whether the targeted element exists and is rendered
    async fn is_visible(&self, locator: &Locator) -> ProbeResult<bool>;

    /// Raw `textContent` of the targeted element
    async fn text_content(&self, locator: &Locator) -> ProbeResult<Option<String>>;

    /// Rendered `innerText` of the targeted element
    async fn inner_text(&self, locator: &Locator) -> ProbeResult<String>;

    /// Current value of an input, textarea or select
    async fn input_value(&self, locator: &Locator) -> ProbeResult<String>;

    /// Attribute value, `None` when absent
    async fn get_attribute(&self, locator: &Locator, name: &str) -> ProbeResult<Option<String>>;

    /// Bounding box, `None` when not rendered
    async fn bounding_box(&self, locator: &Locator) -> ProbeResult<Option<BoundingBox>>;

    /// Computed CSS property value
    async fn computed_style(&self, locator: &Locator, property: &str) -> ProbeResult<String>;

    /// Text of the checked `<option>` of a select
    async fn selected_option_text(&self, locator: &Locator) -> ProbeResult<String>;

    /// Click element
    async fn click(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Move the pointer over the element
    async fn hover(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Replace the value of an input
    async fn fill(&mut self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Select an option of a `<select>` by value
    async fn select_option(&mut self, locator: &Locator, value: &str) -> ProbeResult<()>;

    /// Scroll the element into the viewport if needed
    async fn scroll_into_view(&mut self, locator: &Locator) -> ProbeResult<()>;

    /// Scroll the window to the bottom of the document
    async fn scroll_to_bottom(&mut self) -> ProbeResult<()>;

    /// Close the page and release the browser
    async fn close(&mut self) -> ProbeResult<()>;
}
