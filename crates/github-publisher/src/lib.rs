//! GitHub publishing for pagewright: provision a repository for a task,
//! apply the file set as one atomic commit, and enable static hosting.

pub mod client;
pub mod error;
pub mod publisher;

pub use client::GithubClient;
pub use error::PublishError;
pub use publisher::{Publisher, PAGES_UNAVAILABLE};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, PublishError>;
