use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required credential: {0}")]
    MissingCredential(String),

    #[error("workspace not found for task: {0}")]
    WorkspaceNotFound(String),

    #[error("invalid filename '{0}': must be a bare name without separators or parent references")]
    InvalidFileName(String),

    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("invalid configuration value for {key}: {value}")]
    InvalidConfigValue { key: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
