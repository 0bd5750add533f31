//! Prompt assembly: fixed template sections combined with the task inputs.

use pagewright_core::FileSet;

/// Whether this run builds from scratch or reworks an existing file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Revise,
}

const SYSTEM_PROMPT: &str = "\
You are a static-site generator. Respond with a single JSON object mapping \
relative filenames to complete UTF-8 file contents, and nothing else. \
Always include an index.html. Do not use subdirectories in filenames.";

const CREATE_INTRO: &str = "\
Build a complete static website for the task below. Return every file the \
site needs.";

const REVISE_INTRO: &str = "\
Revise the existing static website below according to the new brief. Return \
the full updated contents of every file that should exist after the \
revision, including unchanged files.";

/// Everything a provider needs to phrase one generation request.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub task: String,
    pub brief: String,
    pub checks: Vec<String>,
    pub attachment_summary: String,
    pub mode: Mode,
    pub existing_files: Option<FileSet>,
}

impl PromptContext {
    pub fn system_prompt(&self) -> &'static str {
        SYSTEM_PROMPT
    }

    /// Render the combined user prompt: intro, task, brief, checks,
    /// attachment previews, and (in revise mode) the current files.
    pub fn user_prompt(&self) -> String {
        let mut out = String::new();
        out.push_str(match self.mode {
            Mode::Create => CREATE_INTRO,
            Mode::Revise => REVISE_INTRO,
        });
        out.push_str("\n\n## Task\n");
        out.push_str(&self.task);
        out.push_str("\n\n## Brief\n");
        out.push_str(&self.brief);
        if !self.checks.is_empty() {
            out.push_str("\n\n## Checks the result must satisfy\n");
            for check in &self.checks {
                out.push_str(&format!("- {check}\n"));
            }
        }
        if !self.attachment_summary.is_empty() {
            out.push_str("\n\n## Attachments\n");
            out.push_str(&self.attachment_summary);
            out.push('\n');
        }
        if let Some(files) = &self.existing_files {
            out.push_str("\n\n## Current files\n");
            for (name, content) in files.iter() {
                out.push_str(&format!("### {name}\n```\n{content}\n```\n"));
            }
        }
        out
    }
}
