use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ---------------------------------------------------------------------------
// RoleId / UserId
// ---------------------------------------------------------------------------

/// Identifier of a role/group in the host's access-control subsystem,
/// e.g. `sales/manager` or `support.agent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an internal user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

/// The user on whose behalf the outbound message was recorded.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user: UserId,
    pub login: String,
    pub roles: HashSet<RoleId>,
}

impl Actor {
    pub fn new(user: UserId, login: impl Into<String>) -> Self {
        Self {
            user,
            login: login.into(),
            roles: HashSet::new(),
        }
    }

    pub fn with_role(mut self, role: RoleId) -> Self {
        self.roles.insert(role);
        self
    }
}

// ---------------------------------------------------------------------------
// RecordKind
// ---------------------------------------------------------------------------

/// Closed enumeration of business-record kinds the host exposes to chatter.
///
/// Whether a kind participates in auto-tracking is a capability of the
/// variant, not a data-driven string list; adding a kind is a
/// compile-time-visible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    SupportTicket,
    SaleOrder,
    Lead,
    CustomerInvoice,
    Project,
    InternalTask,
}

impl RecordKind {
    pub fn all() -> &'static [RecordKind] {
        &[
            RecordKind::SupportTicket,
            RecordKind::SaleOrder,
            RecordKind::Lead,
            RecordKind::CustomerInvoice,
            RecordKind::Project,
            RecordKind::InternalTask,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::SupportTicket => "support_ticket",
            RecordKind::SaleOrder => "sale_order",
            RecordKind::Lead => "lead",
            RecordKind::CustomerInvoice => "customer_invoice",
            RecordKind::Project => "project",
            RecordKind::InternalTask => "internal_task",
        }
    }

    /// True for the record kinds that take part in follow-up auto-tracking.
    pub fn supports_tracking(self) -> bool {
        matches!(
            self,
            RecordKind::SupportTicket
                | RecordKind::SaleOrder
                | RecordKind::Lead
                | RecordKind::CustomerInvoice
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = crate::error::FollowupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "support_ticket" => Ok(RecordKind::SupportTicket),
            "sale_order" => Ok(RecordKind::SaleOrder),
            "lead" => Ok(RecordKind::Lead),
            "customer_invoice" => Ok(RecordKind::CustomerInvoice),
            "project" => Ok(RecordKind::Project),
            "internal_task" => Ok(RecordKind::InternalTask),
            _ => Err(crate::error::FollowupError::InvalidRecordKind(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// MessageKind
// ---------------------------------------------------------------------------

/// How the message entered the record's chatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Chatter "Send Message" comment.
    Comment,
    /// A true email message.
    Email,
    /// System-generated notification (internal notes, lifecycle messages).
    Notification,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Comment => "comment",
            MessageKind::Email => "email",
            MessageKind::Notification => "notification",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageKind {
    type Err = crate::error::FollowupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment" => Ok(MessageKind::Comment),
            "email" => Ok(MessageKind::Email),
            "notification" => Ok(MessageKind::Notification),
            _ => Err(crate::error::FollowupError::InvalidMessageKind(
                s.to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// ActivityState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityState {
    Open,
    Done,
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityState::Open => f.write_str("open"),
            ActivityState::Done => f.write_str("done"),
        }
    }
}

// ---------------------------------------------------------------------------
// ReentryGuard
// ---------------------------------------------------------------------------

/// Call-scoped token preventing the tracking side effect from re-triggering
/// itself through its own internal note.
///
/// The interception point starts with an open guard; the orchestrator holds
/// it for the duration of the side effect and threads it through any message
/// it posts. A held guard short-circuits the eligibility predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReentryGuard {
    held: bool,
}

impl ReentryGuard {
    pub fn new() -> Self {
        Self { held: false }
    }

    pub fn held() -> Self {
        Self { held: true }
    }

    pub fn is_held(self) -> bool {
        self.held
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
