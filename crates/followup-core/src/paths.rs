use crate::error::{FollowupError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Store locations
// ---------------------------------------------------------------------------

pub const FOLLOWUP_DIR: &str = ".followup";
pub const CONFIG_FILE: &str = ".followup/config.yaml";
pub const ENROLLMENTS_FILE: &str = ".followup/enrollments.yaml";

pub fn followup_dir(root: &Path) -> PathBuf {
    root.join(FOLLOWUP_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn enrollments_path(root: &Path) -> PathBuf {
    root.join(ENROLLMENTS_FILE)
}

// ---------------------------------------------------------------------------
// Role identifier validation
// ---------------------------------------------------------------------------

static ROLE_RE: OnceLock<Regex> = OnceLock::new();

fn role_re() -> &'static Regex {
    ROLE_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9._/\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Validate a role identifier as it arrives from the settings surface.
/// Lowercase alphanumeric, with `-`, `.`, `_` or `/` separators inside.
pub fn validate_role_id(role: &str) -> Result<()> {
    if role.is_empty() || role.len() > 128 || !role_re().is_match(role) {
        return Err(FollowupError::InvalidRoleId(role.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
