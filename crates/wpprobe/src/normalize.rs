//! Conditional-state normalization for pre-filled forms.
//!
//! Each operation reads the current state first and writes only when it
//! differs from the target, then confirms the write took effect. Calling
//! one twice with the same target performs at most one write.

use crate::locator::Locator;
use crate::result::ProbeResult;
use crate::session::Session;
use serde::{Deserialize, Serialize};

/// What [`ensure_field_value`] or [`ensure_select_value`] did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldChange {
    /// Field already held the target value
    Unchanged,
    /// Field was overwritten
    Written {
        /// Value before the write
        previous: String,
    },
}

impl FieldChange {
    /// Whether a write happened
    #[must_use]
    pub const fn was_written(&self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// What [`ensure_section_visibility`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToggleOutcome {
    /// Section was already in the wanted state; nothing clicked
    AlreadyInState,
    /// Toggle was clicked and the section reached the wanted state
    Toggled,
}

/// Make a text field hold `target`, comparing trimmed values
pub async fn ensure_field_value(session: &Session, locator: &Locator, target: &str) -> ProbeResult<FieldChange> {
    let current = session.input_value(locator).await?;
    if current.trim() == target.trim() {
        tracing::info!(field = %locator, value = target, "field already set");
        return Ok(FieldChange::Unchanged);
    }
    tracing::info!(field = %locator, from = %current, to = target, "filling field");
    session.fill(locator, target).await?;
    session.expect_value(locator, target).await?;
    Ok(FieldChange::Written { previous: current })
}

/// Make a select hold the option with value `value`
pub async fn ensure_select_value(session: &Session, locator: &Locator, value: &str) -> ProbeResult<FieldChange> {
    let current = session.input_value(locator).await?;
    if current == value {
        tracing::info!(field = %locator, value, "option already selected");
        return Ok(FieldChange::Unchanged);
    }
    tracing::info!(field = %locator, from = %current, to = value, "selecting option");
    session.select_option(locator, value).await?;
    session.expect_value(locator, value).await?;
    Ok(FieldChange::Written { previous: current })
}

async fn section_shown(session: &Session, section: &Locator) -> ProbeResult<bool> {
    Ok(session.computed_style(section, "display").await?.trim() != "none")
}

/// Click `toggle` only if `section`'s computed display does not already
/// match `want_visible`, then wait until it does.
///
/// The section's visibility stands in for the checked state of a checkbox
/// that the theme replaces with a styled control.
pub async fn ensure_section_visibility(
    session: &Session,
    toggle: &Locator,
    section: &Locator,
    want_visible: bool,
) -> ProbeResult<ToggleOutcome> {
    if section_shown(session, section).await? == want_visible {
        tracing::info!(section = %section, want_visible, "section already in state");
        return Ok(ToggleOutcome::AlreadyInState);
    }
    tracing::info!(section = %section, want_visible, "toggling section");
    session.click(toggle).await?;
    let wanted = if want_visible { "shown" } else { "display: none" };
    session
        .wait_for_condition(&format!("{section} to be {wanted}"), || async move {
            Ok(section_shown(session, section).await? == want_visible)
        })
        .await?;
    Ok(ToggleOutcome::Toggled)
}
