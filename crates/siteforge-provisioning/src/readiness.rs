//! Deployment readiness polling.

use reqwest::Client as HttpClient;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Polls a deployed site until it answers, or until the deadline passes.
pub struct ReadinessProbe {
    http: HttpClient,
    poll_interval: Duration,
    timeout: Duration,
}

impl ReadinessProbe {
    #[must_use]
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            http: HttpClient::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            poll_interval,
            timeout,
        }
    }

    /// Wait for `url` to answer with a 2xx or 3xx status.
    ///
    /// Returns `false` if the deadline passes first.
    pub async fn wait_ready(&self, url: &str) -> bool {
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.http.get(url).send().await {
                Ok(response)
                    if response.status().is_success() || response.status().is_redirection() =>
                {
                    debug!(url, status = %response.status(), "deployment ready");
                    return true;
                }
                Ok(response) => {
                    debug!(url, status = %response.status(), "deployment not ready yet");
                }
                Err(err) => {
                    debug!(url, error = %err, "deployment not reachable yet");
                }
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(self.poll_interval).await;
        }
    }
}
