use crate::error::AppError;
use crate::state::AppState;
use crate::{auth, pipeline};
use axum::extract::State;
use axum::Json;
use pagewright_core::types::{BuildRequest, Submission};
use tracing::info;

/// `POST /build` — run the full pipeline for a task and answer with the
/// same payload the evaluator callback receives.
pub async fn build(
    State(state): State<AppState>,
    Json(request): Json<BuildRequest>,
) -> Result<Json<Submission>, AppError> {
    auth::verify_secret(&state.config, &request.secret)?;
    info!(task = %request.task, round = request.round, "build request accepted");

    let report = pipeline::run(&state, &request).await?;
    Ok(Json(Submission::from_deployment(
        &request,
        &report.deployment,
    )))
}
