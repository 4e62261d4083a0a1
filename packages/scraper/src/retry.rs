//! HTTP retry helpers for transient errors.
//!
//! Every page request goes through [`send_text`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so transient failures
//! (timeouts, connection resets, server errors, rate limiting) are retried
//! with exponential backoff.
//!
//! ```ignore
//! let (url, html) = retry::send_text(|| client.get(&url), &RetryPolicy::default()).await?;
//! ```

use std::time::Duration;

use reqwest::Url;

use crate::ScrapeError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// How often and how patiently to retry a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff before retry number `attempt` (1-based): `base`, `2 * base`,
    /// `4 * base`, ...
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor)
    }
}

/// Sends an HTTP request and returns the final URL and the body as text.
///
/// The `build_request` closure is called on each attempt since builders are
/// consumed by `.send()`. Connection errors, timeouts, HTTP 429 and HTTP 5xx
/// are retried according to `policy`; any other 4xx is permanent.
///
/// # Errors
///
/// Returns [`ScrapeError`] if the request still fails after all retries, the
/// server returns a non-retryable status, or the body cannot be read.
#[allow(clippy::future_not_send)]
pub async fn send_text<F>(build_request: F, policy: &RetryPolicy) -> Result<(Url, String), ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, policy).await?;
    let url = response.url().clone();
    let status = response.status();

    match response.text().await {
        Ok(text) => {
            log::trace!(
                "{url} -> {status}, {} bytes: {}",
                text.len(),
                preview(&text),
            );
            Ok((url, text))
        }
        Err(e) => {
            log::error!("Body read failed for {url} (status {status}): {e}");
            Err(ScrapeError::Http(e))
        }
    }
}

/// Core retry loop.
///
/// Returns the successful [`reqwest::Response`] (status 2xx or 3xx).
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    build_request: &F,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, ScrapeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let max_retries = policy.max_retries;
    let mut last_error: Option<ScrapeError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(ScrapeError::Http(e));
                    continue;
                }
                return Err(ScrapeError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let url = response.url().to_string();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} from {url}");
                        last_error = Some(ScrapeError::Status {
                            url,
                            status: status.as_u16(),
                        });
                        continue;
                    }
                    log::error!("HTTP {status} from {url} after {max_retries} retries");
                    return Err(ScrapeError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }

                // 4xx other than 429 will not get better by asking again
                if status.is_client_error() {
                    return Err(ScrapeError::Status {
                        url,
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ScrapeError::Parse("request failed after all retries".to_string())))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    #[test]
    fn backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(BODY_PREVIEW_LEN);
        let p = preview(&text);
        assert!(p.len() <= BODY_PREVIEW_LEN);
        assert!(p.chars().all(|c| c == 'é'));
    }

    #[tokio::test]
    async fn retries_server_errors_then_gives_up() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(3)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/flaky", server.url());
        let result = send_text(|| client.get(&url), &fast_policy(2)).await;

        assert!(matches!(
            result,
            Err(ScrapeError::Status { status: 503, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/missing", server.url());
        let result = send_text(|| client.get(&url), &fast_policy(3)).await;

        assert!(matches!(
            result,
            Err(ScrapeError::Status { status: 404, .. })
        ));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ok")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/ok", server.url());
        let (final_url, body) = send_text(|| client.get(&url), &RetryPolicy::none())
            .await
            .unwrap();

        assert_eq!(final_url.as_str(), url);
        assert_eq!(body, "hello");
    }
}
