//! End-to-end flow through the interception point, with the real YAML-backed
//! config/enrollment stores and in-memory fakes for the host collaborators.

use chrono::Utc;
use followup_core::activity::{ActivityBackend, NewActivity, TrackingActivity};
use followup_core::config::{ConfigStore, ENABLED_KEY};
use followup_core::eligibility::{AccessControl, SkipReason};
use followup_core::enrollment::EnrollmentStore;
use followup_core::error::Result;
use followup_core::intercept::ChatterHook;
use followup_core::message::{
    Addressee, MessageDraft, Messaging, OutboundMessage, TargetRecord,
};
use followup_core::settings::{apply_settings, TrackingSettings};
use followup_core::tracker::TrackOutcome;
use followup_core::types::{
    ActivityState, Actor, MessageKind, RecordKind, ReentryGuard, RoleId, UserId,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct AllowAll;

impl AccessControl for AllowAll {
    fn can_write_record(&self, _actor: &Actor, _record: &TargetRecord) -> Result<bool> {
        Ok(true)
    }

    fn can_create_activity(&self, _actor: &Actor) -> Result<bool> {
        Ok(true)
    }
}

#[derive(Default)]
struct InMemoryActivities {
    next: u32,
    rows: Vec<TrackingActivity>,
}

impl ActivityBackend for InMemoryActivities {
    fn create(&mut self, values: NewActivity) -> Result<TrackingActivity> {
        self.next += 1;
        let activity = TrackingActivity {
            id: format!("A{}", self.next),
            summary: values.summary,
            note: values.note,
            assignee: values.assignee,
            record: values.record,
            due: values.due,
            state: ActivityState::Open,
            created_at: Utc::now(),
            done_at: None,
        };
        self.rows.push(activity.clone());
        Ok(activity)
    }

    fn mark_done(&mut self, id: &str) -> Result<()> {
        let activity = self
            .rows
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| followup_core::FollowupError::ActivityNotFound(id.to_string()))?;
        activity.complete();
        Ok(())
    }
}

struct BrokenActivities;

impl ActivityBackend for BrokenActivities {
    fn create(&mut self, _values: NewActivity) -> Result<TrackingActivity> {
        Err(std::io::Error::other("activity backend offline").into())
    }

    fn mark_done(&mut self, _id: &str) -> Result<()> {
        Err(std::io::Error::other("activity backend offline").into())
    }
}

#[derive(Default)]
struct FakeMessaging {
    notes: Vec<(String, ReentryGuard)>,
    fail_notes: bool,
}

impl Messaging for FakeMessaging {
    fn create_message(
        &mut self,
        actor: &Actor,
        _record: &TargetRecord,
        draft: MessageDraft,
    ) -> Result<OutboundMessage> {
        Ok(OutboundMessage {
            kind: draft.kind,
            subtype: draft.subtype,
            author: Some(actor.user.clone()),
            addressees: draft.addressees,
            body: draft.body,
            sender_address: None,
        })
    }

    fn post_internal_note(
        &mut self,
        _record: &TargetRecord,
        body: String,
        guard: ReentryGuard,
    ) -> Result<()> {
        if self.fail_notes {
            return Err(std::io::Error::other("note rejected").into());
        }
        self.notes.push((body, guard));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn enrolled_stores(dir: &TempDir) -> (ConfigStore, EnrollmentStore) {
    let config = ConfigStore::new(dir.path());
    let enrollments = EnrollmentStore::new(dir.path());
    apply_settings(
        &config,
        &enrollments,
        &TrackingSettings {
            enabled: true,
            enrolled_roles: vec![RoleId::new("sales/member")],
        },
    )
    .unwrap();
    (config, enrollments)
}

fn sales_actor() -> Actor {
    Actor::new(UserId::new("u1"), "pat").with_role(RoleId::new("sales/member"))
}

fn external_draft() -> MessageDraft {
    MessageDraft::comment(
        "Thanks for your order!",
        vec![Addressee::external("Ada Crowe", Some("ada@x.com"))],
    )
}

// ---------------------------------------------------------------------------
// End-to-end properties
// ---------------------------------------------------------------------------

#[test]
fn eligible_message_creates_one_completed_activity() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SaleOrder, 42);

    let message = {
        let mut hook = ChatterHook {
            config: &config,
            enrollments: &enrollments,
            access: &AllowAll,
            activities: &mut activities,
            messaging: &mut messaging,
        };
        hook.post_message(&actor, &record, external_draft()).unwrap()
    };

    // The original message comes back unchanged
    assert_eq!(message.kind, MessageKind::Comment);
    assert_eq!(message.body, "Thanks for your order!");
    assert_eq!(message.addressees.len(), 1);

    // Exactly one activity, observed done
    assert_eq!(activities.rows.len(), 1);
    let activity = &activities.rows[0];
    assert_eq!(activity.state, ActivityState::Done);
    assert!(activity.done_at.is_some());
    assert_eq!(activity.summary, "Email sent to ada@x.com");
    assert_eq!(activity.note, "Thanks for your order!");
    assert_eq!(activity.assignee, UserId::new("u1"));
    assert_eq!(activity.record.to_string(), "sale_order:42");

    // The auto-complete note went out under a held guard
    assert_eq!(messaging.notes.len(), 1);
    assert_eq!(messaging.notes[0].0, "Email activity auto-completed for pat!");
    assert!(messaging.notes[0].1.is_held());
}

#[test]
fn disabled_flag_creates_nothing_but_message_still_posts() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    config.set(ENABLED_KEY, "false").unwrap();
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SaleOrder, 42);

    let message = {
        let mut hook = ChatterHook {
            config: &config,
            enrollments: &enrollments,
            access: &AllowAll,
            activities: &mut activities,
            messaging: &mut messaging,
        };
        hook.post_message(&actor, &record, external_draft()).unwrap()
    };

    assert_eq!(message.body, "Thanks for your order!");
    assert!(activities.rows.is_empty());
    assert!(messaging.notes.is_empty());
}

#[test]
fn held_guard_skips_tracking() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SaleOrder, 42);

    let mut hook = ChatterHook {
        config: &config,
        enrollments: &enrollments,
        access: &AllowAll,
        activities: &mut activities,
        messaging: &mut messaging,
    };
    let message = OutboundMessage {
        kind: MessageKind::Comment,
        subtype: None,
        author: Some(UserId::new("u1")),
        addressees: vec![Addressee::external("Ada", Some("ada@x.com"))],
        body: "hi".to_string(),
        sender_address: None,
    };
    let outcome = hook.message_posted(&message, &actor, &record, ReentryGuard::held());
    assert_eq!(
        outcome,
        TrackOutcome::Skipped {
            reason: SkipReason::ReentrantCall
        }
    );
    drop(hook);
    assert!(activities.rows.is_empty());
}

#[test]
fn each_message_gets_its_own_activity() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SupportTicket, 7);

    {
        let mut hook = ChatterHook {
            config: &config,
            enrollments: &enrollments,
            access: &AllowAll,
            activities: &mut activities,
            messaging: &mut messaging,
        };
        hook.post_message(&actor, &record, external_draft()).unwrap();
        hook.post_message(
            &actor,
            &record,
            MessageDraft::email(
                "Follow-up details attached.",
                vec![Addressee::external("Ada Crowe", Some("ada@x.com"))],
            ),
        )
        .unwrap();
    }

    assert_eq!(activities.rows.len(), 2);
    assert_ne!(activities.rows[0].id, activities.rows[1].id);
    assert!(activities
        .rows
        .iter()
        .all(|a| a.state == ActivityState::Done));
    assert_eq!(activities.rows[1].note, "Follow-up details attached.");
}

#[test]
fn note_failure_still_yields_tracked_and_done() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging {
        fail_notes: true,
        ..Default::default()
    };
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::Lead, 3);

    let message = OutboundMessage {
        kind: MessageKind::Email,
        subtype: None,
        author: Some(UserId::new("u1")),
        addressees: vec![Addressee::external("Ada", Some("ada@x.com"))],
        body: "quote attached".to_string(),
        sender_address: Some("pat@corp.test".to_string()),
    };
    let outcome = {
        let mut hook = ChatterHook {
            config: &config,
            enrollments: &enrollments,
            access: &AllowAll,
            activities: &mut activities,
            messaging: &mut messaging,
        };
        hook.message_posted(&message, &actor, &record, ReentryGuard::new())
    };

    assert!(outcome.is_tracked());
    assert_eq!(activities.rows.len(), 1);
    assert_eq!(activities.rows[0].state, ActivityState::Done);
}

#[test]
fn broken_activity_backend_never_fails_the_message() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = BrokenActivities;
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SaleOrder, 42);

    let mut hook = ChatterHook {
        config: &config,
        enrollments: &enrollments,
        access: &AllowAll,
        activities: &mut activities,
        messaging: &mut messaging,
    };
    // The wrapped operation still succeeds and returns the message
    let message = hook.post_message(&actor, &record, external_draft()).unwrap();
    assert_eq!(message.body, "Thanks for your order!");

    // And the hook reports the suppressed failure as a value
    let outcome = hook.message_posted(&message, &actor, &record, ReentryGuard::new());
    assert!(matches!(outcome, TrackOutcome::Failed { .. }));
}

#[test]
fn config_is_read_at_decision_time() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SaleOrder, 42);

    {
        let mut hook = ChatterHook {
            config: &config,
            enrollments: &enrollments,
            access: &AllowAll,
            activities: &mut activities,
            messaging: &mut messaging,
        };
        hook.post_message(&actor, &record, external_draft()).unwrap();
        // Administrator flips the flag between two requests
        config.set(ENABLED_KEY, "false").unwrap();
        hook.post_message(&actor, &record, external_draft()).unwrap();
    }

    assert_eq!(activities.rows.len(), 1);
}

#[test]
fn inbound_message_is_never_tracked() {
    let dir = TempDir::new().unwrap();
    let (config, enrollments) = enrolled_stores(&dir);
    let mut activities = InMemoryActivities::default();
    let mut messaging = FakeMessaging::default();
    let actor = sales_actor();
    let record = TargetRecord::new(RecordKind::SupportTicket, 9);

    let inbound = OutboundMessage {
        kind: MessageKind::Email,
        subtype: None,
        author: None,
        addressees: vec![Addressee::internal(
            "Pat",
            Some("pat@corp.test"),
            UserId::new("u1"),
        )],
        body: "customer reply".to_string(),
        sender_address: Some("ada@x.com".to_string()),
    };
    let outcome = {
        let mut hook = ChatterHook {
            config: &config,
            enrollments: &enrollments,
            access: &AllowAll,
            activities: &mut activities,
            messaging: &mut messaging,
        };
        hook.message_posted(&inbound, &actor, &record, ReentryGuard::new())
    };

    assert_eq!(
        outcome,
        TrackOutcome::Skipped {
            reason: SkipReason::NotOutgoingExternal
        }
    );
    assert!(activities.rows.is_empty());
}
