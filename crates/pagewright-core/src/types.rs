//! Wire and domain types exchanged between the routing surface, the
//! pipeline, and the evaluator callback.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Inbound request
// ---------------------------------------------------------------------------

/// Attachment reference as it arrives on the wire: a name plus either an
/// inline `data:` URI or an external locator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub name: String,
    pub url: String,
}

/// A build or revision request, after authentication but before any work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub secret: String,
    /// Task identifier; doubles as the workspace key and repository name basis.
    pub task: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Free text or a structured spec; structured briefs are canonicalized
    /// to pretty-printed JSON so downstream prompting always sees text.
    #[serde(deserialize_with = "string_or_json")]
    pub brief: String,
    #[serde(default)]
    pub checks: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
    /// 1 = initial build, >1 = revision of an existing workspace.
    #[serde(default = "default_round")]
    pub round: u32,
    pub nonce: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Pipeline results
// ---------------------------------------------------------------------------

/// Where a pipeline run landed: repository, commit, and hosting location.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub repo_name: String,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

/// What the workspace write produced for this run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildOutput {
    pub saved_files: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// The value handed back to the routing layer after a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub project: String,
    pub build_output: BuildOutput,
    pub deployment: DeploymentResult,
}

// ---------------------------------------------------------------------------
// Evaluator callback payload
// ---------------------------------------------------------------------------

/// Completion payload posted to the caller-supplied callback URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub task: String,
    pub round: u32,
    pub nonce: String,
    pub repo_url: String,
    pub commit_sha: String,
    pub pages_url: String,
}

impl Submission {
    /// Assemble the callback payload from the request and the deployment it produced.
    pub fn from_deployment(request: &BuildRequest, deployment: &DeploymentResult) -> Self {
        Self {
            email: request.email.clone(),
            task: request.task.clone(),
            round: request.round,
            nonce: request.nonce.clone(),
            repo_url: deployment.repo_url.clone(),
            commit_sha: deployment.commit_sha.clone(),
            pages_url: deployment.pages_url.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn default_round() -> u32 {
    1
}

fn string_or_json<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => serde_json::to_string_pretty(&other).unwrap_or_default(),
    })
}

/// Derive a repository name from a task identifier: trimmed, whitespace
/// collapsed to hyphens, restricted to characters the host accepts.
pub fn repo_slug(task: &str) -> String {
    let mut slug = String::with_capacity(task.len());
    let mut last_was_dash = false;
    for ch in task.trim().chars() {
        let mapped = if ch.is_whitespace() { '-' } else { ch };
        if mapped == '-' {
            if last_was_dash {
                continue;
            }
            last_was_dash = true;
            slug.push('-');
        } else if mapped.is_ascii_alphanumeric() || mapped == '.' || mapped == '_' {
            last_was_dash = false;
            slug.push(mapped);
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "task".to_string()
    } else {
        slug
    }
}
