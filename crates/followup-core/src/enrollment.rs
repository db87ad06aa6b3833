//! Group eligibility store — which roles are enrolled for auto-tracking.
//!
//! Layout:
//!   .followup/enrollments.yaml — list of all enrollments (active + inactive)
//!
//! At most one enrollment per role. Unselecting a role deactivates its row;
//! rows are never deleted.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::types::RoleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// GroupEnrollment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupEnrollment {
    pub role: RoleId,
    pub active: bool,
    pub enrolled_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// EnrollmentSource
// ---------------------------------------------------------------------------

/// Read side of the enrollment store, as consumed by the eligibility
/// predicate. Must reflect the latest committed rows on every call.
pub trait EnrollmentSource {
    fn active_roles(&self) -> Result<Vec<RoleId>>;
}

// ---------------------------------------------------------------------------
// EnrollmentStore
// ---------------------------------------------------------------------------

pub struct EnrollmentStore {
    root: PathBuf,
}

impl EnrollmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_all(&self) -> Result<Vec<GroupEnrollment>> {
        let path = paths::enrollments_path(&self.root);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    fn save_all(&self, rows: &[GroupEnrollment]) -> Result<()> {
        let data = serde_yaml::to_string(rows)?;
        io::atomic_write(&paths::enrollments_path(&self.root), data.as_bytes())
    }

    /// All rows, active and inactive.
    pub fn enrollments(&self) -> Result<Vec<GroupEnrollment>> {
        self.load_all()
    }

    /// Enroll a role. Reactivates the existing row when present — at most
    /// one row per role ever exists.
    pub fn enroll(&self, role: &RoleId) -> Result<()> {
        paths::validate_role_id(role.as_str())?;
        let mut rows = self.load_all()?;
        if let Some(row) = rows.iter_mut().find(|r| &r.role == role) {
            row.active = true;
        } else {
            rows.push(GroupEnrollment {
                role: role.clone(),
                active: true,
                enrolled_at: Utc::now(),
            });
        }
        self.save_all(&rows)
    }

    /// Deactivate a role's enrollment. No-op when the role was never enrolled.
    pub fn deactivate(&self, role: &RoleId) -> Result<()> {
        let mut rows = self.load_all()?;
        let Some(row) = rows.iter_mut().find(|r| &r.role == role) else {
            return Ok(());
        };
        row.active = false;
        self.save_all(&rows)
    }
}

impl EnrollmentSource for EnrollmentStore {
    fn active_roles(&self) -> Result<Vec<RoleId>> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|r| r.active)
            .map(|r| r.role)
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Membership check
// ---------------------------------------------------------------------------

/// True iff any active enrollment matches one of the actor's roles.
/// Zero active rows means nobody is enrolled. A store that errors reads as
/// not enrolled (fail-closed).
pub fn is_user_enrolled(source: &dyn EnrollmentSource, user_roles: &HashSet<RoleId>) -> bool {
    let active = match source.active_roles() {
        Ok(roles) => roles,
        Err(e) => {
            tracing::warn!(error = %e, "cannot read group enrollments, treating user as not enrolled");
            return false;
        }
    };
    active.iter().any(|role| user_roles.contains(role))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
