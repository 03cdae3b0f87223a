//! Serial suite runner.
//!
//! Steps run strictly in order against one shared [`Session`] and one
//! context value. The first failing step stops the line: every later step
//! is reported as skipped, because it depends on state the failed step was
//! supposed to build.
//!
//! ## Toyota Way Application
//!
//! - **Jidoka**: stop on the first failure instead of piling up noise
//! - **Andon**: the report names the failing step and its error kind

use crate::result::ProbeResult;
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

/// Future returned by a step
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = ProbeResult<()>> + Send + 'a>>;

/// A step body: borrows the session and the context for its duration
pub type StepFn<C> = Box<dyn for<'a> Fn(&'a Session, &'a mut C) -> StepFuture<'a> + Send + Sync>;

struct Step<C> {
    name: String,
    run: StepFn<C>,
}

/// Ordered, named steps sharing a context of type `C`
pub struct SerialSuite<C> {
    name: String,
    steps: Vec<Step<C>>,
}

impl<C> fmt::Debug for SerialSuite<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialSuite")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}

impl<C> SerialSuite<C> {
    /// Create an empty suite
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: for<'a> Fn(&'a Session, &'a mut C) -> StepFuture<'a> + Send + Sync + 'static,
    {
        self.steps.push(Step {
            name: name.into(),
            run: Box::new(run),
        });
        self
    }

    /// Suite name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Step names in run order
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the suite has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order
    pub async fn run(&self, session: &Session, ctx: &mut C) -> SuiteReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(self.steps.len());
        let mut halted = false;

        tracing::info!(suite = %self.name, steps = self.steps.len(), session = %session.id(), "suite started");
        for (index, step) in self.steps.iter().enumerate() {
            if halted {
                tracing::warn!(step = %step.name, "skipped after earlier failure");
                results.push(StepResult::skipped(&step.name));
                continue;
            }
            let span = tracing::info_span!("step", suite = %self.name, index = index + 1, step = %step.name);
            let step_start = Instant::now();
            let outcome = (step.run)(session, ctx).instrument(span).await;
            let duration = step_start.elapsed();
            match outcome {
                Ok(()) => {
                    tracing::info!(step = %step.name, elapsed_ms = duration.as_millis() as u64, "step passed");
                    results.push(StepResult::passed(&step.name, duration));
                }
                Err(e) => {
                    tracing::error!(step = %step.name, kind = e.kind(), error = %e, "step failed");
                    results.push(StepResult::failed(&step.name, duration, e.kind(), e.to_string()));
                    halted = true;
                }
            }
        }

        let report = SuiteReport {
            suite_name: self.name.clone(),
            session_id: session.id(),
            started_at,
            duration: start.elapsed(),
            results,
        };
        tracing::info!(
            suite = %self.name,
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "suite finished"
        );
        report
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Step returned `Ok`
    Passed,
    /// Step returned an error
    Failed {
        /// Error kind label
        kind: String,
        /// Rendered error
        message: String,
    },
    /// Not run because an earlier step failed
    Skipped,
}

impl StepOutcome {
    /// Check if outcome is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Check if outcome is failing
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Result of one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Step name
    pub name: String,
    /// Outcome
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Wall time spent in the step
    pub duration: Duration,
}

impl StepResult {
    /// Create a passing step result
    #[must_use]
    pub fn passed(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            outcome: StepOutcome::Passed,
            duration,
        }
    }

    /// Create a failing step result
    #[must_use]
    pub fn failed(
        name: impl Into<String>,
        duration: Duration,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            outcome: StepOutcome::Failed {
                kind: kind.into(),
                message: message.into(),
            },
            duration,
        }
    }

    /// Create a skipped step result
    #[must_use]
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome: StepOutcome::Skipped,
            duration: Duration::ZERO,
        }
    }
}

/// Results of one suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite_name: String,
    /// Session the steps ran in
    pub session_id: Uuid,
    /// Wall-clock start
    pub started_at: DateTime<Utc>,
    /// Total duration
    pub duration: Duration,
    /// Step results in run order
    pub results: Vec<StepResult>,
}

impl SuiteReport {
    /// Check if all steps passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_passed())
    }

    /// Count passed steps
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    /// Count failed steps
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    /// Count skipped steps
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == StepOutcome::Skipped)
            .count()
    }

    /// Get total step count
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Get failed steps
    #[must_use]
    pub fn failures(&self) -> Vec<&StepResult> {
        self.results.iter().filter(|r| r.outcome.is_failed()).collect()
    }

    /// Pretty JSON rendering
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
