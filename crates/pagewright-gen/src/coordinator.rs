//! Drives the provider chain and enforces the output contract: a non-empty,
//! README-complete file set whose names cannot escape the workspace.

use crate::chat::ChatProvider;
use crate::gemini::GeminiProvider;
use crate::prompt::{Mode, PromptContext};
use crate::provider::Provider;
use crate::scaffold::{scaffold_files, ScaffoldProvider};
use pagewright_core::types::AttachmentRef;
use pagewright_core::workspace::validate_filename;
use pagewright_core::{attachment, fileset, Config, FileSet};
use std::path::PathBuf;
use tracing::{info, warn};

/// Inputs for one generation run.
#[derive(Debug)]
pub struct GenerateRequest<'a> {
    pub task: &'a str,
    pub brief: &'a str,
    pub checks: &'a [String],
    pub attachments: &'a [AttachmentRef],
    pub round: u32,
    pub mode: Mode,
    /// Current workspace contents; required in revise mode.
    pub existing_files: Option<&'a FileSet>,
}

pub struct Generator {
    providers: Vec<Box<dyn Provider>>,
    attachment_dir: PathBuf,
}

impl Generator {
    /// Build the standard chain: primary, secondary, deterministic scaffold.
    pub fn from_config(config: &Config) -> Self {
        Self {
            providers: vec![
                Box::new(ChatProvider::from_config(config)),
                Box::new(GeminiProvider::from_config(config)),
                Box::new(ScaffoldProvider),
            ],
            attachment_dir: config.attachment_dir.clone(),
        }
    }

    /// Assemble a generator from an explicit chain. Test seam.
    pub fn with_providers(providers: Vec<Box<dyn Provider>>, attachment_dir: PathBuf) -> Self {
        Self {
            providers,
            attachment_dir,
        }
    }

    /// Produce a file set for the request.
    ///
    /// Never fails for upstream-reachability reasons: provider errors select
    /// the next link in the chain, and the scaffold link is infallible. The
    /// result always contains `README.md`.
    pub async fn generate(&self, request: &GenerateRequest<'_>) -> FileSet {
        let stored = attachment::materialize(request.attachments, &self.attachment_dir);
        let summary = attachment::summarize(&stored);

        let prompt = PromptContext {
            task: request.task.to_string(),
            brief: request.brief.to_string(),
            checks: request.checks.to_vec(),
            attachment_summary: summary.clone(),
            mode: request.mode,
            existing_files: request.existing_files.cloned(),
        };

        let mut files = None;
        for provider in &self.providers {
            match provider.generate(&prompt).await {
                Ok(result) => {
                    let result = sanitize(result);
                    if result.is_empty() {
                        warn!(provider = provider.name(), "provider returned no usable files");
                        continue;
                    }
                    info!(
                        provider = provider.name(),
                        count = result.len(),
                        "generation succeeded"
                    );
                    files = Some(result);
                    break;
                }
                Err(err) => {
                    warn!(provider = provider.name(), %err, "provider failed, falling back");
                }
            }
        }

        let mut files = files.unwrap_or_else(|| scaffold_files(request.task));
        fileset::ensure_readme(
            &mut files,
            request.brief,
            request.checks,
            &summary,
            request.round,
        );
        files
    }
}

/// Drop generated filenames that could escape the task directory.
fn sanitize(mut files: FileSet) -> FileSet {
    files.retain(|name| match validate_filename(name) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "dropping generated file");
            false
        }
    });
    files
}
