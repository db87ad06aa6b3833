//! The data side of the settings surface: the enable toggle plus the group
//! picker, applied to the config and enrollment stores in one pass.

use crate::config::{ConfigSource, ConfigStore, ENABLED_DEFAULT, ENABLED_KEY};
use crate::enrollment::EnrollmentStore;
use crate::error::{FollowupError, Result};
use crate::types::RoleId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TrackingSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingSettings {
    pub enabled: bool,
    /// Roles selected in the group picker. Everything else is deactivated.
    pub enrolled_roles: Vec<RoleId>,
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

/// Validate and persist the settings.
///
/// Enabling the feature with an empty group selection is the one
/// configuration error surfaced to the administrator; it is rejected here,
/// at save time, never at message time.
pub fn apply_settings(
    config: &ConfigStore,
    enrollments: &EnrollmentStore,
    settings: &TrackingSettings,
) -> Result<()> {
    if settings.enabled && settings.enrolled_roles.is_empty() {
        return Err(FollowupError::ConfigurationInvalid(
            "auto-tracking is enabled but no groups are enrolled".to_string(),
        ));
    }

    config.set(ENABLED_KEY, if settings.enabled { "true" } else { "false" })?;

    for row in enrollments.enrollments()? {
        if !settings.enrolled_roles.contains(&row.role) {
            enrollments.deactivate(&row.role)?;
        }
    }
    for role in &settings.enrolled_roles {
        enrollments.enroll(role)?;
    }
    Ok(())
}

/// Read the settings back for display.
pub fn current_settings(
    config: &ConfigStore,
    enrollments: &EnrollmentStore,
) -> Result<TrackingSettings> {
    let enabled = config.get(ENABLED_KEY, ENABLED_DEFAULT)? == "true";
    let enrolled_roles = enrollments
        .enrollments()?
        .into_iter()
        .filter(|row| row.active)
        .map(|row| row.role)
        .collect();
    Ok(TrackingSettings {
        enabled,
        enrolled_roles,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
