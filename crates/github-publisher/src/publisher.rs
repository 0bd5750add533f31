//! The publisher: idempotent provisioning with a propagation-delay window,
//! one atomic multi-file commit, and best-effort Pages enablement.

use crate::client::{BranchHead, GithubClient, RepoInfo, TreeEntry};
use crate::error::PublishError;
use pagewright_core::types::{repo_slug, DeploymentResult};
use pagewright_core::{Config, FileSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Sentinel publication URL when hosting could not be enabled. The commit is
/// the operation of record; hosting only degrades the result.
pub const PAGES_UNAVAILABLE: &str = "unavailable";

const LICENSE_FILE: &str = "LICENSE";
const SEED_FILE: &str = ".gitkeep";

const MIT_LICENSE: &str = "\
MIT License

Copyright (c) 2026 pagewright

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
";

pub struct Publisher {
    client: GithubClient,
    branch: String,
    provision_retries: u32,
    provision_delay: Duration,
}

impl Publisher {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: GithubClient::from_config(config),
            branch: config.repo_branch.clone(),
            provision_retries: config.provision_retries,
            provision_delay: config.provision_delay,
        }
    }

    /// Publish a task's file set: provision the repository, apply the files
    /// as one atomic commit, enable hosting.
    ///
    /// Provisioning or commit failure is fatal to the run; hosting failure
    /// degrades `pages_url` to [`PAGES_UNAVAILABLE`] without aborting.
    pub async fn publish(
        &self,
        task_id: &str,
        files: &FileSet,
    ) -> Result<DeploymentResult, PublishError> {
        let repo = repo_slug(task_id);
        info!(task = task_id, repo = %repo, files = files.len(), "publishing");

        let info = self.provision(&repo).await?;
        let commit_sha = self.commit_file_set(&repo, files).await?;
        let pages_url = self.enable_pages_best_effort(&repo).await;

        Ok(DeploymentResult {
            repo_name: repo,
            repo_url: info.html_url,
            commit_sha,
            pages_url,
        })
    }

    // -----------------------------------------------------------------------
    // Provisioning
    // -----------------------------------------------------------------------

    /// Fetch or create the repository. A just-created repository may not be
    /// visible through the read path yet, so after creation the fetch is
    /// retried a bounded number of times with a fixed delay.
    async fn provision(&self, repo: &str) -> Result<RepoInfo, PublishError> {
        if let Some(info) = self.client.get_repo(repo).await? {
            debug!(repo, "repository already exists");
            return Ok(info);
        }

        self.client.create_repo(repo).await?;
        for attempt in 1..=self.provision_retries {
            tokio::time::sleep(self.provision_delay).await;
            if let Some(info) = self.client.get_repo(repo).await? {
                return Ok(info);
            }
            debug!(repo, attempt, "repository not visible yet");
        }
        Err(PublishError::Provisioning(format!(
            "repository '{repo}' not visible after {} retries",
            self.provision_retries
        )))
    }

    // -----------------------------------------------------------------------
    // Atomic commit
    // -----------------------------------------------------------------------

    /// Apply the whole file set as a single commit: blobs, one tree over the
    /// prior tree, one commit, one ref fast-forward. The branch state changes
    /// atomically; a failure at any step leaves the previous head in place.
    async fn commit_file_set(&self, repo: &str, files: &FileSet) -> Result<String, PublishError> {
        let head = self.head_or_seed(repo).await?;

        let mut entries = Vec::with_capacity(files.len() + 1);
        for (name, content) in files.iter() {
            let blob_sha = self.client.create_blob(repo, content).await?;
            entries.push(TreeEntry {
                path: name.to_string(),
                blob_sha,
            });
        }
        if !files.contains(LICENSE_FILE) {
            let blob_sha = self.client.create_blob(repo, MIT_LICENSE).await?;
            entries.push(TreeEntry {
                path: LICENSE_FILE.to_string(),
                blob_sha,
            });
        }

        let tree_sha = self
            .client
            .create_tree(repo, &head.tree_sha, &entries)
            .await?;
        if tree_sha == head.tree_sha {
            info!(repo, commit = %head.commit_sha, "content unchanged, keeping head commit");
            return Ok(head.commit_sha);
        }

        let message = format!("Publish {} files", entries.len());
        let commit_sha = self
            .client
            .create_commit(repo, &message, &tree_sha, &head.commit_sha)
            .await?;
        self.client
            .update_ref(repo, &self.branch, &commit_sha)
            .await?;
        info!(repo, commit = %commit_sha, "commit applied");
        Ok(commit_sha)
    }

    /// Resolve the branch head; in an empty repository, first write a seed
    /// file through the contents API to establish the branch.
    async fn head_or_seed(&self, repo: &str) -> Result<BranchHead, PublishError> {
        if let Some(head) = self.client.branch_head(repo, &self.branch).await? {
            return Ok(head);
        }
        debug!(repo, "empty repository, seeding branch");
        let seed_commit = self
            .client
            .create_seed_file(repo, &self.branch, SEED_FILE, "seed branch")
            .await?;
        self.client.get_commit(repo, &seed_commit).await
    }

    // -----------------------------------------------------------------------
    // Hosting
    // -----------------------------------------------------------------------

    async fn enable_pages_best_effort(&self, repo: &str) -> String {
        match self.client.enable_pages(repo, &self.branch).await {
            Ok(()) => format!("https://{}.github.io/{repo}/", self.client.owner()),
            Err(err) => {
                warn!(repo, %err, "hosting unavailable, continuing without pages");
                PAGES_UNAVAILABLE.to_string()
            }
        }
    }
}
