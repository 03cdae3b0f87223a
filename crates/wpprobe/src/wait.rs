//! Wait Mechanisms
//!
//! Condition waits used instead of fixed-duration pauses. Every wait polls a
//! condition with a bounded timeout and fails with
//! [`ProbeError::NavigationTimeout`] naming what it waited for.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: Automatic detection of ready state
//! - **Poka-Yoke**: Type-safe wait conditions prevent invalid waits

use crate::result::{ProbeError, ProbeResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default budget for an element to appear (5 seconds)
pub const DEFAULT_ELEMENT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
        }
    }

    /// Get default timeout for this load state
    #[must_use]
    pub const fn default_timeout_ms(&self) -> u64 {
        match self {
            Self::Load | Self::DomContentLoaded => 30_000,
            Self::NetworkIdle => 60_000,
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

/// `document.readyState` as reported by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    /// Still parsing
    Loading,
    /// DOM parsed, subresources loading
    Interactive,
    /// Fully loaded
    Complete,
}

impl DocumentState {
    /// Parse the `document.readyState` string
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "complete" => Self::Complete,
            "interactive" => Self::Interactive,
            _ => Self::Loading,
        }
    }

    /// Whether the document has reached the given load state.
    ///
    /// Network idle additionally needs request quiescence, see [`IdleTracker`].
    #[must_use]
    pub const fn satisfies(&self, state: LoadState) -> bool {
        match state {
            LoadState::DomContentLoaded => matches!(self, Self::Interactive | Self::Complete),
            LoadState::Load | LoadState::NetworkIdle => matches!(self, Self::Complete),
        }
    }
}

/// Element states a [`Session`](crate::Session) can wait for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementState {
    /// At least one match in the DOM
    Attached,
    /// Present and rendered
    Visible,
    /// Absent or not rendered
    Hidden,
    /// Bounding box unchanged across two consecutive polls
    Stable,
}

impl std::fmt::Display for ElementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Attached => "attached",
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::Stable => "stable",
        };
        f.write_str(name)
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of condition checks performed
    pub polls: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

/// Poll `check` until it yields `true` or the timeout elapses.
///
/// The condition is always evaluated at least once, so a zero timeout still
/// succeeds when the condition already holds. Errors from `check` abort the
/// wait immediately.
pub async fn wait_until<F, Fut>(
    options: &WaitOptions,
    description: &str,
    mut check: F,
) -> ProbeResult<WaitResult>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeResult<bool>>,
{
    let start = Instant::now();
    let mut polls = 0u32;
    loop {
        polls += 1;
        if check().await? {
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                polls,
                waited_for: description.to_string(),
            });
        }
        if start.elapsed() >= options.timeout() {
            tracing::debug!(condition = description, polls, "wait timed out");
            return Err(ProbeError::NavigationTimeout {
                condition: description.to_string(),
                timeout_ms: options.timeout_ms,
            });
        }
        tokio::time::sleep(options.poll_interval()).await;
    }
}

// =============================================================================
// NETWORK IDLE TRACKING
// =============================================================================

/// Tracks how long the page has had no in-flight requests
#[derive(Debug, Clone)]
pub struct IdleTracker {
    threshold: Duration,
    quiet_since: Option<Instant>,
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new(Duration::from_millis(NETWORK_IDLE_THRESHOLD_MS))
    }
}

impl IdleTracker {
    /// Create a tracker with a custom quiescence window
    #[must_use]
    pub const fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            quiet_since: None,
        }
    }

    /// Record an observation; returns `true` once the page has been quiet
    /// for the whole window
    pub fn observe(&mut self, in_flight: usize, now: Instant) -> bool {
        if in_flight > 0 {
            self.quiet_since = None;
            return false;
        }
        let since = *self.quiet_since.get_or_insert(now);
        now.duration_since(since) >= self.threshold
    }
}
