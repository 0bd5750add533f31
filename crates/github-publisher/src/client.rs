//! Thin typed wrapper over the repository host's REST primitives.
//!
//! Seven operations the publisher composes — fetch-repo, create-repo,
//! create-blob, create-tree, create-commit, update-ref, enable-pages — plus
//! the branch-head read and the contents-API seed write needed to commit
//! into an empty repository.

use crate::error::PublishError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pagewright_core::Config;
use serde::Deserialize;
use tracing::debug;

const ACCEPT_JSON: &str = "application/vnd.github+json";
const USER_AGENT: &str = "pagewright";

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub html_url: String,
}

#[derive(Debug, Deserialize)]
struct ShaObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    object: ShaObject,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    tree: ShaObject,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    commit: ShaObject,
}

/// Head of a branch: the commit it points at and that commit's tree.
#[derive(Debug, Clone)]
pub struct BranchHead {
    pub commit_sha: String,
    pub tree_sha: String,
}

/// A file staged for the new tree: path plus blob sha.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub path: String,
    pub blob_sha: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    owner: String,
    token: String,
}

impl GithubClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.github_api_base.trim_end_matches('/').to_string(),
            owner: config.github_owner.clone(),
            token: config.github_token.clone(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_base, path))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
    }

    /// Fetch a repository; `None` when the read path does not see it yet.
    pub async fn get_repo(&self, repo: &str) -> Result<Option<RepoInfo>, PublishError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/repos/{}/{repo}", self.owner))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response).await?;
        Ok(Some(parse(response).await?))
    }

    /// Create a repository under the authenticated user.
    pub async fn create_repo(&self, repo: &str) -> Result<RepoInfo, PublishError> {
        let body = serde_json::json!({
            "name": repo,
            "private": false,
            "auto_init": false,
        });
        let response = self
            .request(reqwest::Method::POST, "/user/repos")
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        debug!(repo, "repository created");
        parse(response).await
    }

    /// Resolve the branch head, or `None` when the branch does not exist yet
    /// (empty repository).
    pub async fn branch_head(
        &self,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchHead>, PublishError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/repos/{}/{repo}/git/ref/heads/{branch}", self.owner),
            )
            .send()
            .await?;
        // An empty repository answers 404 (no ref) or 409 (git database empty).
        if matches!(response.status().as_u16(), 404 | 409) {
            return Ok(None);
        }
        let response = check(response).await?;
        let r: RefResponse = parse(response).await?;
        let head = self.get_commit(repo, &r.object.sha).await?;
        Ok(Some(head))
    }

    /// Read a commit object, returning its sha and tree sha.
    pub async fn get_commit(&self, repo: &str, sha: &str) -> Result<BranchHead, PublishError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/repos/{}/{repo}/git/commits/{sha}", self.owner),
            )
            .send()
            .await?;
        let response = check(response).await?;
        let c: CommitResponse = parse(response).await?;
        Ok(BranchHead {
            commit_sha: c.sha,
            tree_sha: c.tree.sha,
        })
    }

    /// Write a single file through the contents API to establish the branch
    /// in an empty repository. Returns the commit sha it created.
    pub async fn create_seed_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
    ) -> Result<String, PublishError> {
        let body = serde_json::json!({
            "message": message,
            "content": BASE64.encode(b""),
            "branch": branch,
        });
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/repos/{}/{repo}/contents/{path}", self.owner),
            )
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        let c: ContentsResponse = parse(response).await?;
        Ok(c.commit.sha)
    }

    /// Store one file's content as a blob; returns the blob sha.
    pub async fn create_blob(&self, repo: &str, content: &str) -> Result<String, PublishError> {
        let body = serde_json::json!({
            "content": BASE64.encode(content.as_bytes()),
            "encoding": "base64",
        });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/repos/{}/{repo}/git/blobs", self.owner),
            )
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        let s: ShaObject = parse(response).await?;
        Ok(s.sha)
    }

    /// Build one tree referencing the prior tree plus all new blobs.
    pub async fn create_tree(
        &self,
        repo: &str,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, PublishError> {
        let tree: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "path": e.path,
                    "mode": "100644",
                    "type": "blob",
                    "sha": e.blob_sha,
                })
            })
            .collect();
        let body = serde_json::json!({ "base_tree": base_tree, "tree": tree });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/repos/{}/{repo}/git/trees", self.owner),
            )
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        let s: ShaObject = parse(response).await?;
        Ok(s.sha)
    }

    /// Create a commit pointing at `tree` with `parent` as its parent.
    pub async fn create_commit(
        &self,
        repo: &str,
        message: &str,
        tree: &str,
        parent: &str,
    ) -> Result<String, PublishError> {
        let body = serde_json::json!({
            "message": message,
            "tree": tree,
            "parents": [parent],
        });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/repos/{}/{repo}/git/commits", self.owner),
            )
            .json(&body)
            .send()
            .await?;
        let response = check(response).await?;
        let s: ShaObject = parse(response).await?;
        Ok(s.sha)
    }

    /// Fast-forward the branch reference to `sha` — the single operation that
    /// makes the new file set visible.
    pub async fn update_ref(
        &self,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<(), PublishError> {
        let body = serde_json::json!({ "sha": sha, "force": false });
        let response = self
            .request(
                reqwest::Method::PATCH,
                &format!("/repos/{}/{repo}/git/refs/heads/{branch}", self.owner),
            )
            .json(&body)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Request static hosting for the branch. "Already enabled" (409) is
    /// success; any other non-success status is an error the caller may
    /// treat as best-effort.
    pub async fn enable_pages(&self, repo: &str, branch: &str) -> Result<(), PublishError> {
        let body = serde_json::json!({ "source": { "branch": branch, "path": "/" } });
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/repos/{}/{repo}/pages", self.owner),
            )
            .json(&body)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::CONFLICT {
            debug!(repo, "pages already enabled");
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn check(response: reqwest::Response) -> Result<reqwest::Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PublishError::Api {
        status: status.as_u16(),
        body,
    })
}

async fn parse<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PublishError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|err| PublishError::MalformedResponse(err.to_string()))
}
