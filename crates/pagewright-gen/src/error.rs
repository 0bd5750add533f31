use thiserror::Error;

/// How a single provider attempt can fail. Every variant is absorbed by the
/// coordinator's fallback chain; none of them escapes `generate`.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not configured")]
    Unconfigured,

    #[error("unexpected status {status}")]
    Api { status: u16 },

    #[error("response contained no usable file mapping")]
    EmptyResponse,

    #[error(transparent)]
    Network(#[from] reqwest::Error),
}
