//! The decision predicate: should this outbound message be auto-tracked?
//!
//! Gates run in a fixed order and short-circuit on the first failure. Every
//! error inside a gate is absorbed as a negative answer — nothing here may
//! propagate into the message-creation path.

use crate::config::{self, ConfigSource};
use crate::enrollment::{is_user_enrolled, EnrollmentSource};
use crate::error::Result;
use crate::message::{OutboundMessage, TargetRecord};
use crate::types::{Actor, MessageKind, ReentryGuard};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// AccessControl
// ---------------------------------------------------------------------------

/// The host's access-control subsystem. `Err` answers are treated the same
/// as `Ok(false)` by the predicate (fail-closed).
pub trait AccessControl {
    fn can_write_record(&self, actor: &Actor, record: &TargetRecord) -> Result<bool>;
    fn can_create_activity(&self, actor: &Actor) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// SkipReason
// ---------------------------------------------------------------------------

/// Why a message was not tracked. Ordered to match gate evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ReentrantCall,
    UnsupportedRecordKind,
    NotCustomerFacing,
    FeatureDisabled,
    NotEnrolled,
    NotOutgoingExternal,
    PermissionDenied,
    NoExternalRecipients,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SkipReason::ReentrantCall => "reentrant_call",
            SkipReason::UnsupportedRecordKind => "unsupported_record_kind",
            SkipReason::NotCustomerFacing => "not_customer_facing",
            SkipReason::FeatureDisabled => "feature_disabled",
            SkipReason::NotEnrolled => "not_enrolled",
            SkipReason::NotOutgoingExternal => "not_outgoing_external",
            SkipReason::PermissionDenied => "permission_denied",
            SkipReason::NoExternalRecipients => "no_external_recipients",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// EligibilityContext
// ---------------------------------------------------------------------------

pub struct EligibilityContext<'a> {
    pub message: &'a OutboundMessage,
    pub actor: &'a Actor,
    pub record: &'a TargetRecord,
    pub config: &'a dyn ConfigSource,
    pub enrollments: &'a dyn EnrollmentSource,
    pub access: &'a dyn AccessControl,
    pub guard: ReentryGuard,
}

// ---------------------------------------------------------------------------
// Predicate
// ---------------------------------------------------------------------------

/// Run all gates; `None` means the message is eligible for tracking.
pub fn evaluate(ctx: &EligibilityContext) -> Option<SkipReason> {
    if ctx.guard.is_held() {
        return Some(SkipReason::ReentrantCall);
    }
    if !ctx.record.kind.supports_tracking() {
        return Some(SkipReason::UnsupportedRecordKind);
    }
    if !ctx.record.customer_facing {
        return Some(SkipReason::NotCustomerFacing);
    }
    if !config::feature_enabled(ctx.config) {
        return Some(SkipReason::FeatureDisabled);
    }
    if !is_user_enrolled(ctx.enrollments, &ctx.actor.roles) {
        return Some(SkipReason::NotEnrolled);
    }
    if !is_outgoing_external(ctx.message, ctx.actor) {
        return Some(SkipReason::NotOutgoingExternal);
    }
    if !has_required_permissions(ctx) {
        return Some(SkipReason::PermissionDenied);
    }
    None
}

pub fn should_track(ctx: &EligibilityContext) -> bool {
    evaluate(ctx).is_none()
}

/// Canonical "outgoing & external" classification: authored by the acting
/// user, and either a true email or a chatter comment with at least one
/// addressee. Inbound and system messages never qualify.
fn is_outgoing_external(message: &OutboundMessage, actor: &Actor) -> bool {
    if message.author.as_ref() != Some(&actor.user) {
        return false;
    }
    match message.kind {
        MessageKind::Email => true,
        MessageKind::Comment => !message.addressees.is_empty(),
        MessageKind::Notification => false,
    }
}

/// Write permission on the record plus create permission on the activity
/// entity. Any refusal or check failure reads as no permission.
fn has_required_permissions(ctx: &EligibilityContext) -> bool {
    match ctx.access.can_write_record(ctx.actor, ctx.record) {
        Ok(true) => {}
        Ok(false) => return false,
        Err(e) => {
            tracing::warn!(
                error = %e,
                login = %ctx.actor.login,
                record = %ctx.record.reference(),
                "record permission check failed"
            );
            return false;
        }
    }
    match ctx.access.can_create_activity(ctx.actor) {
        Ok(allowed) => allowed,
        Err(e) => {
            tracing::warn!(error = %e, login = %ctx.actor.login, "activity permission check failed");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
