use std::future::Future;
use std::time::Duration;

use reqwest::{Client as ReqwestClient, StatusCode};
use tracing::{debug, warn};

use crate::context::{RequestContext, RequestKind};
use crate::errors::{PaheError, Result};

const ERROR_BODY_LIMIT: usize = 512;

/// anything that can hand back the body of a url.
///
/// the aggregator only talks to this seam, so it runs the same against the
/// network and against canned pages.
pub trait PageSource {
    fn fetch(&self, url: &str, kind: RequestKind) -> impl Future<Output = Result<String>> + Send;
}

/// bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// total tries per url, at least one.
    pub attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// delay before the try following failed try number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// statuses worth another try: timeouts, rate limiting and server errors.
pub fn should_retry_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// transport failures worth another try: timeouts, refused connects and
/// connections dropped mid-exchange.
fn should_retry_transport(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

pub(crate) fn detect_ddos_guard(body: &str) -> bool {
    body.contains("DDoS-Guard")
        || body.contains("/.well-known/ddos-guard/js-challenge")
        || body.contains("Checking your browser before accessing")
}

/// maps a non-success response into the matching error.
pub(crate) fn status_error(
    context: String,
    status: StatusCode,
    body: String,
    cookie_hint: bool,
) -> PaheError {
    if status == StatusCode::FORBIDDEN && detect_ddos_guard(&body) {
        let hint = if cookie_hint {
            "DDoS-Guard challenge detected even with provided cookie header. Refresh cookies from a real browser session."
        } else {
            "DDoS-Guard challenge detected. Solve the challenge in a real browser and pass its cookies with --cookies."
        };
        return PaheError::DdosGuard {
            context,
            hint: hint.to_string(),
        };
    }

    let body = if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}...", &body[..cut])
    } else {
        body
    };

    PaheError::HttpStatus {
        context,
        status,
        body,
    }
}

/// [`PageSource`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: ReqwestClient,
    context: RequestContext,
    retry: RetryPolicy,
}

impl HttpSource {
    pub fn new(context: RequestContext, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(PaheError::BuildClient)?;

        Ok(Self {
            client,
            context,
            retry,
        })
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, url: &str, kind: RequestKind) -> Result<String> {
        let attempts = self.retry.attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!(%url, attempt, ?kind, "sending request");
            let sent = self
                .client
                .get(url)
                .headers(self.context.headers(url, kind))
                .send()
                .await;

            let retry_reason = match sent {
                Err(source) => {
                    if !should_retry_transport(&source) || attempt >= attempts {
                        return Err(PaheError::Request {
                            context: format!("fetching {url} (attempt {attempt}/{attempts})"),
                            source,
                        });
                    }
                    source.to_string()
                }
                Ok(resp) if resp.status().is_success() => {
                    return resp.text().await.map_err(|source| PaheError::ResponseBody {
                        context: format!("reading {url}"),
                        source,
                    });
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| "<failed to read error body>".to_string());

                    if !should_retry_status(status) || attempt >= attempts {
                        return Err(status_error(
                            url.to_string(),
                            status,
                            body,
                            self.context.has_cookie(),
                        ));
                    }
                    status.to_string()
                }
            };

            let delay = self.retry.delay_after(attempt);
            warn!(%url, attempt, reason = %retry_reason, ?delay, "request failed; retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
