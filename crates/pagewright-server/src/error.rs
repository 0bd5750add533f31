use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use github_publisher::PublishError;
use pagewright_core::CoreError;

// ---------------------------------------------------------------------------
// Internal sentinels for statuses the domain enums don't carry
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 403 through
/// the `anyhow::Error` chain without touching the domain enums.
#[derive(Debug)]
struct ForbiddenError(String);

impl std::fmt::Display for ForbiddenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ForbiddenError {}

/// Private sentinel for an explicit HTTP 500 with a stable message
/// (server-side misconfiguration).
#[derive(Debug)]
struct MisconfiguredError(String);

impl std::fmt::Display for MisconfiguredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for MisconfiguredError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 403 Forbidden error.
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self(ForbiddenError(msg.into()).into())
    }

    /// Construct a 500 error for a server-side misconfiguration.
    pub fn misconfigured(msg: impl Into<String>) -> Self {
        Self(MisconfiguredError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(f) = self.0.downcast_ref::<ForbiddenError>() {
            let body = serde_json::json!({ "error": f.0.clone() });
            return (StatusCode::FORBIDDEN, axum::Json(body)).into_response();
        }
        if let Some(m) = self.0.downcast_ref::<MisconfiguredError>() {
            let body = serde_json::json!({ "error": m.0.clone() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<CoreError>() {
            match e {
                CoreError::WorkspaceNotFound(_) | CoreError::AttachmentNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CoreError::InvalidFileName(_) | CoreError::InvalidConfigValue { .. } => {
                    StatusCode::BAD_REQUEST
                }
                CoreError::MissingCredential(_) | CoreError::Io(_) | CoreError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else if self.0.downcast_ref::<PublishError>().is_some() {
            // Provisioning exhausted, commit construction failed, or the host
            // was unreachable — the pipeline's primary contract is unmet.
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_not_found_maps_to_404() {
        let err = AppError(CoreError::WorkspaceNotFound("ghost".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_filename_maps_to_400() {
        let err = AppError(CoreError::InvalidFileName("../evil".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_credential_maps_to_500() {
        let err = AppError(CoreError::MissingCredential("GITHUB_TOKEN".into()).into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn provisioning_failure_maps_to_502() {
        let err = AppError(PublishError::Provisioning("not visible".into()).into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn forbidden_constructor_maps_to_403() {
        let err = AppError::forbidden("invalid or missing secret token");
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn misconfigured_constructor_maps_to_500() {
        let err = AppError::misconfigured("shared secret not configured");
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unknown_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn response_body_contains_error_field() {
        let err = AppError(CoreError::WorkspaceNotFound("demo".into()).into());
        let response = err.into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
