//! Policy layer that auto-logs a completed follow-up activity whenever an
//! enrolled user sends an outbound chatter/email message on a participating
//! business record.
//!
//! The host application supplies messaging, access control, and the activity
//! subsystem through traits; this crate owns the decision predicate, the
//! recipient resolver, the fail-soft side-effect orchestrator, and the
//! minimal config/enrollment stores behind the settings surface.

pub mod activity;
pub mod config;
pub mod eligibility;
pub mod enrollment;
pub mod error;
pub mod intercept;
pub mod io;
pub mod message;
pub mod paths;
pub mod recipients;
pub mod settings;
pub mod tracker;
pub mod types;

pub use error::{FollowupError, Result};
