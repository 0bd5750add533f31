//! Pipeline orchestrator: owns the lifetime of a single run and sequences
//! generation → workspace write → publish → notification.
//!
//! Two flows share the skeleton: a full build (round 1) generates from
//! scratch; a revision (round > 1) reads the existing workspace first and
//! generates in revise mode. Notification is best-effort and never changes
//! the returned report.

use crate::error::AppError;
use crate::state::AppState;
use pagewright_core::types::{BuildOutput, BuildRequest, PipelineReport, Submission};
use pagewright_core::FileSet;
use pagewright_gen::{GenerateRequest, Mode};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Execute one pipeline run for the request, serialized per task id.
pub async fn run(state: &AppState, request: &BuildRequest) -> Result<PipelineReport, AppError> {
    let lock = state.task_lock(&request.task).await;
    let _guard = lock.lock().await;

    let run_id = Uuid::new_v4();
    info!(task = %request.task, round = request.round, %run_id, "pipeline run started");

    let files = if request.round <= 1 {
        generate_initial(state, request).await
    } else {
        generate_revision(state, request).await?
    };

    let record = state.workspace.write(&request.task, &files)?;
    let deployment = state.publisher.publish(&request.task, &files).await?;

    let report = PipelineReport {
        project: request.task.clone(),
        build_output: BuildOutput {
            saved_files: record.saved_files,
            output_dir: record.dir,
        },
        deployment,
    };

    if let Some(url) = &request.evaluation_url {
        let submission = Submission::from_deployment(request, &report.deployment);
        if !state.notifier.notify(url, &submission).await {
            warn!(task = %request.task, "evaluator was not notified; result unchanged");
        }
    } else {
        debug!(task = %request.task, "no evaluation_url supplied, skipping notification");
    }

    info!(task = %request.task, %run_id, commit = %report.deployment.commit_sha, "pipeline run finished");
    Ok(report)
}

/// Round 1: build from scratch.
async fn generate_initial(state: &AppState, request: &BuildRequest) -> FileSet {
    state
        .generator
        .generate(&GenerateRequest {
            task: &request.task,
            brief: &request.brief,
            checks: &request.checks,
            attachments: &request.attachments,
            round: request.round,
            mode: Mode::Create,
            existing_files: None,
        })
        .await
}

/// Round > 1: read the existing workspace (error if the task is unknown),
/// re-copy previously decoded attachments, then generate in revise mode.
async fn generate_revision(
    state: &AppState,
    request: &BuildRequest,
) -> Result<FileSet, AppError> {
    let existing = state.workspace.read(&request.task)?;

    let names: Vec<String> = request.attachments.iter().map(|a| a.name.clone()).collect();
    if !names.is_empty() {
        state
            .workspace
            .copy_attachments(&request.task, &names, &state.config.attachment_dir)?;
    }

    Ok(state
        .generator
        .generate(&GenerateRequest {
            task: &request.task,
            brief: &request.brief,
            checks: &request.checks,
            attachments: &request.attachments,
            round: request.round,
            mode: Mode::Revise,
            existing_files: Some(&existing),
        })
        .await)
}
