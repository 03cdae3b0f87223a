//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an opaque description of zero-or-more elements. It holds
//! no element identity: every use re-resolves it against the live page, so
//! the DOM may change freely between two queries.
//!
//! # Design Philosophy
//!
//! - **Re-resolved per use**: nothing is cached between operations
//! - **Fluent API**: `Locator::css("tbody tr").nth(1).locator(Selector::css("td"))`
//! - **Typed roles**: ARIA roles are an enum, not free text

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Element geometry as reported by the browser, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Vertical offset of the top edge
    #[must_use]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// `true` when this box starts strictly above `other`
    #[must_use]
    pub fn is_above(&self, other: &Self) -> bool {
        self.y < other.y
    }

    /// `true` when this box starts strictly below `other`
    #[must_use]
    pub fn is_below(&self, other: &Self) -> bool {
        self.y > other.y
    }
}

/// ARIA roles used by role selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AriaRole {
    /// `button`, `input[type=submit]`, ...
    Button,
    /// Text inputs and textareas
    Textbox,
    /// Anchors with an `href`
    Link,
    /// `h1`..`h6`
    Heading,
    /// Checkboxes
    Checkbox,
    /// Native selects
    Combobox,
}

impl AriaRole {
    /// Role name as written in ARIA
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Textbox => "textbox",
            Self::Link => "link",
            Self::Heading => "heading",
            Self::Checkbox => "checkbox",
            Self::Combobox => "combobox",
        }
    }

    /// CSS selector list matching elements with this implicit or explicit role
    #[must_use]
    pub const fn css_candidates(&self) -> &'static str {
        match self {
            Self::Button => {
                "button, input[type=button], input[type=submit], input[type=reset], [role=button]"
            }
            Self::Textbox => {
                "input:not([type]), input[type=text], input[type=email], input[type=password], \
                 input[type=search], input[type=tel], input[type=url], textarea, [role=textbox]"
            }
            Self::Link => "a[href], [role=link]",
            Self::Heading => "h1, h2, h3, h4, h5, h6, [role=heading]",
            Self::Checkbox => "input[type=checkbox], [role=checkbox]",
            Self::Combobox => "select, [role=combobox]",
        }
    }
}

impl fmt::Display for AriaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Deepest elements whose text contains (or, when exact, equals) the text
    Text {
        /// Text to match
        text: String,
        /// Trimmed full-text equality instead of containment
        exact: bool,
    },
    /// ARIA role plus accessible name
    Role {
        /// Role to match
        role: AriaRole,
        /// Accessible name
        name: String,
        /// Exact name equality instead of case-insensitive containment
        exact: bool,
    },
    /// Form control by label or `aria-label`
    Label(String),
    /// CSS selector filtered by text content
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath selector
    #[must_use]
    pub fn xpath(path: impl Into<String>) -> Self {
        Self::XPath(path.into())
    }

    /// Create a partial text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: false,
        }
    }

    /// Create an exact text selector
    #[must_use]
    pub fn text_is(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            exact: true,
        }
    }

    /// Create a role selector with name containment
    #[must_use]
    pub fn role(role: AriaRole, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: name.into(),
            exact: false,
        }
    }

    /// Create a role selector with exact name
    #[must_use]
    pub fn role_exact(role: AriaRole, name: impl Into<String>) -> Self {
        Self::Role {
            role,
            name: name.into(),
            exact: true,
        }
    }

    /// Create a label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Create a CSS selector filtered by text
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// JavaScript arrow body mapping a root node `r` to an array of matches
    fn to_js_scoped(&self) -> String {
        match self {
            Self::Css(css) => format!("Array.from(r.querySelectorAll({}))", js_str(css)),
            Self::XPath(path) => format!(
                "(() => {{ const s = document.evaluate({}, r, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: s.snapshotLength }}, (_, i) => s.snapshotItem(i)); }})()",
                js_str(path)
            ),
            Self::Text { text, exact } => {
                let matcher = if *exact {
                    format!("(el) => (el.textContent || '').trim() === {}", js_str(text))
                } else {
                    format!("(el) => (el.textContent || '').includes({})", js_str(text))
                };
                format!(
                    "(() => {{ const m = {matcher}; \
                     return Array.from(r.querySelectorAll('*:not(script):not(style)')) \
                     .filter(el => m(el) && !Array.from(el.children).some(c => m(c))); }})()"
                )
            }
            Self::Role { role, name, exact } => {
                let compare = if *exact {
                    format!("n === {}", js_str(name))
                } else {
                    format!("n.toLowerCase().includes({})", js_str(&name.to_lowercase()))
                };
                format!(
                    "Array.from(r.querySelectorAll({})).filter(el => {{ \
                     const n = (el.getAttribute('aria-label') \
                     || (el.labels && el.labels.length ? el.labels[0].textContent : '') \
                     || el.getAttribute('placeholder') \
                     || (el.tagName === 'INPUT' ? el.value : el.textContent) || '').trim(); \
                     return {compare}; }})",
                    js_str(role.css_candidates())
                )
            }
            Self::Label(text) => format!(
                "Array.from(r.querySelectorAll('input, textarea, select, button, [aria-label], [contenteditable]')) \
                 .filter(el => (el.getAttribute('aria-label') || '').includes({t}) \
                 || (el.labels && Array.from(el.labels).some(l => l.textContent.trim().includes({t}))))",
                t = js_str(text)
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(r.querySelectorAll({})).filter(el => (el.textContent || '').includes({}))",
                js_str(css),
                js_str(text)
            ),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => f.write_str(css),
            Self::XPath(path) => write!(f, "xpath={path}"),
            Self::Text { text, exact: false } => write!(f, ":text({text:?})"),
            Self::Text { text, exact: true } => write!(f, ":text-is({text:?})"),
            Self::Role {
                role,
                name,
                exact: false,
            } => write!(f, "role={role}[name={name:?}]"),
            Self::Role {
                role,
                name,
                exact: true,
            } => write!(f, "role={role}[name={name:?}s]"),
            Self::Label(text) => write!(f, "label={text:?}"),
            Self::CssWithText { css, text } => write!(f, "{css}:has-text({text:?})"),
        }
    }
}

/// Which of the matched elements a locator targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Zero-based index into the matches
    Nth(usize),
    /// Last match
    Last,
}

/// A locator for finding elements.
///
/// Without an explicit [`Position`], queries and actions target the first
/// match while [`count`](crate::Session::count) sees all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Locator {
    selector: Selector,
    parent: Option<Box<Locator>>,
    position: Option<Position>,
    visible_only: bool,
    timeout: Option<Duration>,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            parent: None,
            position: None,
            visible_only: false,
            timeout: None,
        }
    }

    /// Scope a child selector under this locator
    #[must_use]
    pub fn locator(&self, child: Selector) -> Self {
        Self {
            selector: child,
            parent: Some(Box::new(self.clone())),
            position: None,
            visible_only: false,
            timeout: self.timeout,
        }
    }

    /// Target the first match
    #[must_use]
    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Target the match at `index`
    #[must_use]
    pub fn nth(mut self, index: usize) -> Self {
        self.position = Some(Position::Nth(index));
        self
    }

    /// Target the last match
    #[must_use]
    pub fn last(mut self) -> Self {
        self.position = Some(Position::Last);
        self
    }

    /// Only consider rendered, non-hidden elements
    #[must_use]
    pub fn visible_only(mut self) -> Self {
        self.visible_only = true;
        self
    }

    /// Override the element timeout for this locator
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the parent scope, if any
    #[must_use]
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// Get the targeted position
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        self.position
    }

    /// Whether the visibility filter is on
    #[must_use]
    pub const fn is_visible_only(&self) -> bool {
        self.visible_only
    }

    /// Per-locator timeout override
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Minimum number of matches needed for the position to resolve
    #[must_use]
    pub const fn required_matches(&self) -> usize {
        match self.position {
            Some(Position::Nth(index)) => index + 1,
            Some(Position::Last) | None => 1,
        }
    }

    /// Description without the terminal position and visibility filter.
    ///
    /// Two locators with the same key select from the same match list.
    #[must_use]
    pub fn key(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{parent} >> {}", self.selector),
            None => self.selector.to_string(),
        }
    }

    /// JavaScript expression evaluating to the array of targeted elements
    #[must_use]
    pub fn to_js(&self) -> String {
        let roots = self
            .parent
            .as_ref()
            .map_or_else(|| "[document]".to_string(), |parent| parent.to_js());
        let mut expr = format!(
            "(() => {{ const roots = {roots}; return roots.flatMap(r => {}); }})()",
            self.selector.to_js_scoped()
        );
        if self.visible_only {
            expr.push_str(
                ".filter(el => { const b = el.getBoundingClientRect(); \
                 const s = window.getComputedStyle(el); \
                 return b.width > 0 && b.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; })",
            );
        }
        match self.position {
            Some(Position::Nth(index)) => expr.push_str(&format!(".slice({index}, {})", index + 1)),
            Some(Position::Last) => expr.push_str(".slice(-1)"),
            None => {}
        }
        expr
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())?;
        if self.visible_only {
            f.write_str(" >> visible=true")?;
        }
        match self.position {
            Some(Position::Nth(index)) => write!(f, " >> nth={index}"),
            Some(Position::Last) => f.write_str(" >> nth=-1"),
            None => Ok(()),
        }
    }
}

/// Quote a string as a JavaScript string literal
pub(crate) fn js_str(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_display_forms() {
            assert_eq!(Selector::css("#table-name").to_string(), "#table-name");
            assert_eq!(
                Selector::text("FlexTable").to_string(),
                ":text(\"FlexTable\")"
            );
            assert_eq!(
                Selector::text_is("All Tables").to_string(),
                ":text-is(\"All Tables\")"
            );
            assert_eq!(
                Selector::role(AriaRole::Button, "Save changes").to_string(),
                "role=button[name=\"Save changes\"]"
            );
            assert_eq!(
                Selector::css_with_text("span", "Next").to_string(),
                "span:has-text(\"Next\")"
            );
        }

        #[test]
        fn test_js_literal_escaping() {
            let js = Selector::text("say \"hi\"").to_js_scoped();
            assert!(js.contains(r#""say \"hi\"""#));
        }

        #[test]
        fn test_role_js_uses_candidates() {
            let js = Selector::role(AriaRole::Heading, "Orders").to_js_scoped();
            assert!(js.contains("h1, h2"));
            assert!(js.contains("\"orders\""));
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_key_ignores_terminal_position() {
            let a = Locator::new("td.product-price").nth(2);
            let b = Locator::new("td.product-price");
            assert_eq!(a.key(), b.key());
            assert_eq!(a.to_string(), "td.product-price >> nth=2");
        }

        #[test]
        fn test_scoped_key_keeps_parent_position() {
            let row = Locator::new("table.shop_table.order_details tbody tr").nth(1);
            let qty = row.locator(Selector::css(".product-quantity"));
            assert_eq!(
                qty.key(),
                "table.shop_table.order_details tbody tr >> nth=1 >> .product-quantity"
            );
        }

        #[test]
        fn test_required_matches() {
            assert_eq!(Locator::new("a").required_matches(), 1);
            assert_eq!(Locator::new("a").nth(3).required_matches(), 4);
            assert_eq!(Locator::new("a").last().required_matches(), 1);
        }

        #[test]
        fn test_to_js_applies_filters() {
            let js = Locator::new("button.copy-shortcode")
                .visible_only()
                .first()
                .to_js();
            assert!(js.contains("getBoundingClientRect"));
            assert!(js.ends_with(".slice(0, 1)"));
        }

        #[test]
        fn test_child_inherits_timeout() {
            let parent = Locator::new("div").with_timeout(Duration::from_secs(15));
            let child = parent.locator(Selector::css("span"));
            assert_eq!(child.timeout(), Some(Duration::from_secs(15)));
        }
    }

    mod bounding_box_tests {
        use super::*;

        #[test]
        fn test_above_and_below_are_strict() {
            let title = BoundingBox::new(0.0, 100.0, 200.0, 30.0);
            let table = BoundingBox::new(0.0, 300.0, 800.0, 400.0);
            assert!(title.is_above(&table));
            assert!(!table.is_above(&title));
            assert!(table.is_below(&title));
            assert!(!title.is_above(&title));
        }
    }
}
