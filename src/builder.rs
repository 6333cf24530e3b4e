use std::time::Duration;

use pahelink_core::{DEFAULT_MIRROR_DOMAIN, ListingParser};

use crate::client::PaheClient;
use crate::context::{DEFAULT_USER_AGENT, RequestContext};
use crate::errors::Result;
use crate::http::{HttpSource, RetryPolicy};

pub const DEFAULT_BASE_DOMAIN: &str = "animepahe.si";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PaheBuilder {
    base_domain: String,
    mirror_domain: String,
    cookies: Option<String>,
    user_agent: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for PaheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaheBuilder {
    /// creates a new builder with no cookie header configured.
    pub fn new() -> Self {
        Self {
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            mirror_domain: DEFAULT_MIRROR_DOMAIN.to_string(),
            cookies: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// sets a raw cookie header string used for ddos-guard clearance.
    pub fn cookies_str(mut self, cookies: &str) -> Self {
        self.cookies = Some(cookies.to_string());
        self
    }

    /// sets the base domain for the client.
    pub fn base_domain(mut self, domain: &str) -> Self {
        self.base_domain = domain.trim().trim_end_matches('/').to_string();
        self
    }

    /// host whose links count as download mirrors on play pages.
    pub fn mirror_domain(mut self, domain: &str) -> Self {
        self.mirror_domain = domain.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// total tries per request, including the first one.
    pub fn retries(mut self, attempts: u32) -> Self {
        self.retry = self.retry.attempts(attempts);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// builds a [`PaheClient`] using the configured options.
    pub fn build(&self) -> Result<PaheClient> {
        let context = RequestContext::with_user_agent(
            &self.base_domain,
            self.cookies.as_deref(),
            &self.user_agent,
        )?;
        let source = HttpSource::new(context, self.timeout, self.retry)?;
        let parser = ListingParser::new(&self.mirror_domain)?;

        Ok(PaheClient::with_source(
            self.base_domain.clone(),
            source,
            parser,
        ))
    }
}
