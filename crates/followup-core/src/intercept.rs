//! The interception point around the host's "record outbound message"
//! operation.
//!
//! The original operation always runs first and its result is returned
//! unchanged; the decision chain (predicate → resolver → orchestrator) runs
//! after, purely as a side effect, and can neither block nor fail the call.
//! One uniform binding serves every record kind whose capability lookup says
//! it participates.

use crate::activity::ActivityBackend;
use crate::config::ConfigSource;
use crate::eligibility::{evaluate, AccessControl, EligibilityContext, SkipReason};
use crate::enrollment::EnrollmentSource;
use crate::error::Result;
use crate::message::{MessageDraft, Messaging, OutboundMessage, TargetRecord};
use crate::recipients::resolve_external_recipients;
use crate::tracker::{track, TrackOutcome};
use crate::types::{Actor, ReentryGuard};

// ---------------------------------------------------------------------------
// ChatterHook
// ---------------------------------------------------------------------------

/// Bundles the collaborators the decision chain consumes. One hook instance
/// per request is enough; nothing is cached across calls.
pub struct ChatterHook<'a> {
    pub config: &'a dyn ConfigSource,
    pub enrollments: &'a dyn EnrollmentSource,
    pub access: &'a dyn AccessControl,
    pub activities: &'a mut dyn ActivityBackend,
    pub messaging: &'a mut dyn Messaging,
}

impl ChatterHook<'_> {
    /// Wrap the host's message-creation operation. The message is created
    /// first and returned unchanged whatever the tracking side effect does.
    pub fn post_message(
        &mut self,
        actor: &Actor,
        record: &TargetRecord,
        draft: MessageDraft,
    ) -> Result<OutboundMessage> {
        let message = self.messaging.create_message(actor, record, draft)?;
        let outcome = self.message_posted(&message, actor, record, ReentryGuard::new());
        tracing::debug!(?outcome, record = %record.reference(), "chatter hook finished");
        Ok(message)
    }

    /// The post-creation hook: decide, resolve recipients, and track.
    /// Never fails; every internal error surfaces only as a [`TrackOutcome`].
    pub fn message_posted(
        &mut self,
        message: &OutboundMessage,
        actor: &Actor,
        record: &TargetRecord,
        guard: ReentryGuard,
    ) -> TrackOutcome {
        let ctx = EligibilityContext {
            message,
            actor,
            record,
            config: self.config,
            enrollments: self.enrollments,
            access: self.access,
            guard,
        };
        if let Some(reason) = evaluate(&ctx) {
            tracing::debug!(%reason, record = %record.reference(), "skipping follow-up tracking");
            return TrackOutcome::Skipped { reason };
        }

        let recipients = resolve_external_recipients(message, record);
        if recipients.is_empty() {
            tracing::debug!(record = %record.reference(), "no external recipients to track");
            return TrackOutcome::Skipped {
                reason: SkipReason::NoExternalRecipients,
            };
        }

        track(
            message,
            actor,
            record,
            &recipients,
            &mut *self.activities,
            &mut *self.messaging,
            ReentryGuard::held(),
        )
    }
}
