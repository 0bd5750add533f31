use crate::error::AppError;
use pagewright_core::Config;
use tracing::{debug, warn};

/// Compare the request secret against the configured shared secret.
///
/// An unset secret is a server misconfiguration (500), never an open door;
/// a mismatch is a 403.
pub fn verify_secret(config: &Config, provided: &str) -> Result<(), AppError> {
    let Some(expected) = config.shared_secret.as_deref() else {
        warn!("AGENT_SECRET not set; all verifications will fail");
        return Err(AppError::misconfigured(
            "server misconfiguration: shared secret not set",
        ));
    };
    if provided != expected {
        warn!("invalid secret provided in request");
        return Err(AppError::forbidden("invalid or missing secret token"));
    }
    debug!("secret verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn config(secret: Option<&str>) -> Config {
        let mut config = Config::new("tok", "octocat");
        config.shared_secret = secret.map(String::from);
        config
    }

    #[test]
    fn matching_secret_passes() {
        assert!(verify_secret(&config(Some("s3cret")), "s3cret").is_ok());
    }

    #[test]
    fn mismatched_secret_is_forbidden() {
        let err = verify_secret(&config(Some("s3cret")), "wrong").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn unset_secret_is_a_server_error() {
        let err = verify_secret(&config(None), "anything").unwrap_err();
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
