use crate::error::Result;
use crate::message::RecordRef;
use crate::types::{ActivityState, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// NewActivity / TrackingActivity
// ---------------------------------------------------------------------------

/// Values for a follow-up activity about to be created.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub summary: String,
    pub note: String,
    pub assignee: UserId,
    pub record: RecordRef,
    pub due: NaiveDate,
}

/// A follow-up activity owned by its target record. Created `Open`, and for
/// this flow always transitioned to `Done` in the same call chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingActivity {
    pub id: String,
    pub summary: String,
    pub note: String,
    pub assignee: UserId,
    pub record: RecordRef,
    pub due: NaiveDate,
    pub state: ActivityState,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub done_at: Option<DateTime<Utc>>,
}

impl TrackingActivity {
    /// Move to the terminal `Done` state, stamping the completion time.
    /// Idempotent: completing a done activity keeps the original stamp.
    pub fn complete(&mut self) {
        if self.state == ActivityState::Done {
            return;
        }
        self.state = ActivityState::Done;
        self.done_at = Some(Utc::now());
    }
}

// ---------------------------------------------------------------------------
// ActivityBackend
// ---------------------------------------------------------------------------

/// The host's activity subsystem. The orchestrator only ever creates an
/// activity and immediately marks it done.
pub trait ActivityBackend {
    /// Create an activity in the `Open` state and return it as persisted.
    fn create(&mut self, values: NewActivity) -> Result<TrackingActivity>;

    /// Transition an existing activity to `Done`.
    fn mark_done(&mut self, id: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
