//! Completion callback with bounded exponential backoff.
//!
//! The pipeline's artifact exists whether or not the callback is reachable,
//! so delivery failure is logged and absorbed — `notify` never errors.

use pagewright_core::types::Submission;
use pagewright_core::Config;
use std::time::Duration;
use tracing::{error, info, warn};

/// Per-attempt transport timeout. The callback should answer quickly; slow
/// endpoints are retried, not waited on.
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Notifier {
    client: reqwest::Client,
    max_attempts: u32,
    base_delay: Duration,
}

impl Notifier {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            max_attempts: config.notify_max_attempts,
            base_delay: config.notify_base_delay,
        }
    }

    /// Post the payload to the callback. Only an explicit 200 counts as
    /// delivered. Returns whether any attempt succeeded.
    pub async fn notify(&self, url: &str, payload: &Submission) -> bool {
        for (index, delay) in schedule(self.base_delay, self.max_attempts)
            .into_iter()
            .enumerate()
        {
            let attempt = index as u32 + 1;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match self
                .client
                .post(url)
                .json(payload)
                .timeout(ATTEMPT_TIMEOUT)
                .send()
                .await
            {
                Ok(response) if response.status() == reqwest::StatusCode::OK => {
                    info!(url, attempt, "evaluator notified");
                    return true;
                }
                Ok(response) => {
                    warn!(url, attempt, status = %response.status(), "evaluator rejected notification");
                }
                Err(err) => {
                    warn!(url, attempt, %err, "evaluator unreachable");
                }
            }
        }
        error!(url, attempts = self.max_attempts, "failed to notify evaluator");
        false
    }
}

/// Delay before each attempt: none for the first, then the base delay
/// doubling every attempt.
fn schedule(base: Duration, attempts: u32) -> Vec<Duration> {
    let mut out = Vec::with_capacity(attempts as usize);
    let mut delay = base;
    for n in 0..attempts {
        if n == 0 {
            out.push(Duration::ZERO);
        } else {
            out.push(delay);
            delay *= 2;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notifier(base: &str, attempts: u32) -> (Notifier, String) {
        let mut config = Config::new("tok", "octocat");
        config.notify_max_attempts = attempts;
        config.notify_base_delay = Duration::from_millis(1);
        (Notifier::from_config(&config), format!("{base}/callback"))
    }

    fn payload() -> Submission {
        Submission {
            email: None,
            task: "demo".into(),
            round: 1,
            nonce: "n1".into(),
            repo_url: "https://github.com/octocat/demo".into(),
            commit_sha: "c2".into(),
            pages_url: "https://octocat.github.io/demo/".into(),
        }
    }

    #[test]
    fn schedule_doubles_from_base() {
        let delays = schedule(Duration::from_millis(100), 5);
        assert_eq!(
            delays,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
    }

    #[tokio::test]
    async fn delivered_on_200() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/callback")
            .match_header("content-type", "application/json")
            .with_status(200)
            .expect(1)
            .create_async()
            .await;
        let (notifier, url) = notifier(&server.url(), 3);
        assert!(notifier.notify(&url, &payload()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn always_failing_callback_gets_exactly_max_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/callback")
            .with_status(500)
            .expect(4)
            .create_async()
            .await;
        let (notifier, url) = notifier(&server.url(), 4);
        assert!(!notifier.notify(&url, &payload()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_200_success_codes_are_not_accepted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/callback")
            .with_status(202)
            .expect(2)
            .create_async()
            .await;
        let (notifier, url) = notifier(&server.url(), 2);
        assert!(!notifier.notify(&url, &payload()).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_absorbed() {
        // Nothing listens on this port; every attempt is a transport error.
        let (notifier, _) = notifier("http://127.0.0.1:9", 2);
        assert!(!notifier.notify("http://127.0.0.1:9/callback", &payload()).await);
    }
}
