use crate::error::ProviderError;
use crate::prompt::PromptContext;
use async_trait::async_trait;
use pagewright_core::FileSet;

/// One capability: produce a `FileSet` from a prompt context or fail cleanly.
///
/// Providers are tried in priority order by the coordinator; adding a
/// provider means implementing this trait and appending it to the chain,
/// never touching the coordinator's control flow.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable name for log lines.
    fn name(&self) -> &str;

    /// Attempt one generation. An `Err` means "try the next provider";
    /// an `Ok` must be a non-empty mapping.
    async fn generate(&self, prompt: &PromptContext) -> Result<FileSet, ProviderError>;
}
