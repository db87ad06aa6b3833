//! The side-effect orchestrator: create the follow-up activity, close it,
//! and best-effort annotate the record.
//!
//! Everything here is fail-soft. Whatever goes wrong is logged and folded
//! into a [`TrackOutcome`]; the outbound message that triggered us has
//! already been persisted and must not be disturbed.

use crate::activity::{ActivityBackend, NewActivity};
use crate::eligibility::SkipReason;
use crate::error::Result;
use crate::message::{Messaging, OutboundMessage, TargetRecord};
use crate::types::{Actor, ReentryGuard};
use chrono::Utc;
use serde::Serialize;

// ---------------------------------------------------------------------------
// TrackOutcome
// ---------------------------------------------------------------------------

/// What the tracking side effect did for one intercepted message. Failures
/// are values, never propagated errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TrackOutcome {
    Tracked { activity_id: String },
    Skipped { reason: SkipReason },
    Failed { cause: String },
}

impl TrackOutcome {
    pub fn is_tracked(&self) -> bool {
        matches!(self, TrackOutcome::Tracked { .. })
    }
}

// ---------------------------------------------------------------------------
// Summary line
// ---------------------------------------------------------------------------

/// Join up to the first three recipients with `", "`, appending `", ..."`
/// when more were addressed.
pub fn summary_line(recipients: &[String]) -> String {
    let head = recipients
        .iter()
        .take(3)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if recipients.len() > 3 {
        format!("{head}, ...")
    } else {
        head
    }
}

// ---------------------------------------------------------------------------
// track
// ---------------------------------------------------------------------------

/// Record a completed follow-up activity for an eligible message.
///
/// Call only after the eligibility predicate passed and `recipients` is
/// non-empty. `guard` must be held for the duration and is threaded through
/// the internal note so the interception point cannot re-trigger.
pub fn track(
    message: &OutboundMessage,
    actor: &Actor,
    record: &TargetRecord,
    recipients: &[String],
    activities: &mut dyn ActivityBackend,
    messaging: &mut dyn Messaging,
    guard: ReentryGuard,
) -> TrackOutcome {
    debug_assert!(guard.is_held());
    debug_assert!(!recipients.is_empty());

    match create_completed_activity(message, actor, record, recipients, activities, messaging, guard)
    {
        Ok(activity_id) => {
            tracing::debug!(
                activity = %activity_id,
                record = %record.reference(),
                "auto-completed follow-up activity"
            );
            TrackOutcome::Tracked { activity_id }
        }
        Err(e) => {
            tracing::error!(
                error = %e,
                record = %record.reference(),
                "failed to create follow-up activity"
            );
            TrackOutcome::Failed {
                cause: e.to_string(),
            }
        }
    }
}

fn create_completed_activity(
    message: &OutboundMessage,
    actor: &Actor,
    record: &TargetRecord,
    recipients: &[String],
    activities: &mut dyn ActivityBackend,
    messaging: &mut dyn Messaging,
    guard: ReentryGuard,
) -> Result<String> {
    let activity = activities.create(NewActivity {
        summary: format!("Email sent to {}", summary_line(recipients)),
        note: message.body.clone(),
        assignee: actor.user.clone(),
        record: record.reference(),
        due: Utc::now().date_naive(),
    })?;
    activities.mark_done(&activity.id)?;

    // Best-effort annotation; the activity stays done even if this fails.
    let note = format!("Email activity auto-completed for {}!", actor.login);
    if let Err(e) = messaging.post_internal_note(record, note, guard) {
        tracing::warn!(error = %e, record = %record.reference(), "could not post auto-complete note");
    }

    Ok(activity.id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
