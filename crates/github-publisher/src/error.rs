use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("repository provisioning failed: {0}")]
    Provisioning(String),

    #[error("host API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed host response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
