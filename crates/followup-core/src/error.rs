use thiserror::Error;

#[derive(Debug, Error)]
pub enum FollowupError {
    #[error("access denied: {login} lacks {capability}")]
    AccessDenied { login: String, capability: String },

    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),

    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    #[error("invalid role identifier '{0}': must be lowercase alphanumeric with hyphens, dots, or slashes")]
    InvalidRoleId(String),

    #[error("unknown record kind: {0}")]
    InvalidRecordKind(String),

    #[error("unknown message kind: {0}")]
    InvalidMessageKind(String),

    #[error("message rejected: {0}")]
    MessageRejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FollowupError>;
