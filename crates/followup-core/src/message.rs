use crate::error::Result;
use crate::types::{Actor, MessageKind, RecordKind, ReentryGuard, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Addressee
// ---------------------------------------------------------------------------

/// A party the message is addressed to, as the messaging subsystem knows it.
/// `user` is the linked internal account, if any; addressees without one are
/// considered external.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressee {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
}

impl Addressee {
    pub fn external(name: impl Into<String>, email: Option<&str>) -> Self {
        Self {
            name: name.into(),
            email: email.map(str::to_string),
            user: None,
        }
    }

    pub fn internal(name: impl Into<String>, email: Option<&str>, user: UserId) -> Self {
        Self {
            name: name.into(),
            email: email.map(str::to_string),
            user: Some(user),
        }
    }

    pub fn is_external(&self) -> bool {
        self.user.is_none()
    }

    /// Printable identifier for summaries: email when present, display name
    /// otherwise.
    pub fn printable(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.name)
    }
}

// ---------------------------------------------------------------------------
// OutboundMessage
// ---------------------------------------------------------------------------

/// A message recorded on a business record's chatter. Produced by the host's
/// messaging subsystem; read-only to this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Internal account that authored the message; `None` for inbound or
    /// system-generated messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserId>,
    pub addressees: Vec<Addressee>,
    pub body: String,
    /// Raw sender address string, when the message went over the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_address: Option<String>,
}

/// Payload for `Messaging::create_message`. The subsystem fills in authorship
/// and delivery details and returns the recorded `OutboundMessage`.
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub kind: MessageKind,
    pub subtype: Option<String>,
    pub addressees: Vec<Addressee>,
    pub body: String,
}

impl MessageDraft {
    pub fn comment(body: impl Into<String>, addressees: Vec<Addressee>) -> Self {
        Self {
            kind: MessageKind::Comment,
            subtype: None,
            addressees,
            body: body.into(),
        }
    }

    pub fn email(body: impl Into<String>, addressees: Vec<Addressee>) -> Self {
        Self {
            kind: MessageKind::Email,
            subtype: None,
            addressees,
            body: body.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordRef / TargetRecord
// ---------------------------------------------------------------------------

/// Stable reference to a business record, e.g. `sale_order:42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub id: u64,
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// The business record the message was posted on, with the relations the
/// decision logic needs.
#[derive(Debug, Clone)]
pub struct TargetRecord {
    pub kind: RecordKind,
    pub id: u64,
    /// The record's designated customer relation, if any.
    pub customer: Option<Addressee>,
    /// False for documents that never face a customer (vendor bills, internal
    /// credit notes); such records are never tracked.
    pub customer_facing: bool,
}

impl TargetRecord {
    pub fn new(kind: RecordKind, id: u64) -> Self {
        Self {
            kind,
            id,
            customer: None,
            customer_facing: true,
        }
    }

    pub fn with_customer(mut self, customer: Addressee) -> Self {
        self.customer = Some(customer);
        self
    }

    pub fn reference(&self) -> RecordRef {
        RecordRef {
            kind: self.kind,
            id: self.id,
        }
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// The host's messaging/threading subsystem. This crate wraps `create_message`
/// at the interception point and never reimplements delivery.
pub trait Messaging {
    /// Record (and deliver) a message on the record's chatter, authored by
    /// `actor`. Returns the message as persisted.
    fn create_message(
        &mut self,
        actor: &Actor,
        record: &TargetRecord,
        draft: MessageDraft,
    ) -> Result<OutboundMessage>;

    /// Post an internal note on the record, authored by the host's designated
    /// system identity. Implementations that route this through the chatter
    /// path must carry `guard` so the interception point sees it held.
    fn post_internal_note(
        &mut self,
        record: &TargetRecord,
        body: String,
        guard: ReentryGuard,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
