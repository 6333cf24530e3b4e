use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
    USER_AGENT,
};

use crate::errors::{PaheError, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36";

const API_ACCEPT: &str = "application/json, text/javascript, */*; q=0.0";
const PAGE_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// what a request expects back, which decides the `accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// release api json.
    Api,
    /// landing or play page html.
    Page,
}

/// headers shared by every request of a run.
///
/// built once and only read afterwards, so a single value can be shared by
/// concurrent fetches.
#[derive(Debug, Clone)]
pub struct RequestContext {
    base: HeaderMap,
    has_cookie: bool,
}

impl RequestContext {
    pub fn new(base_domain: &str, cookie: Option<&str>) -> Result<Self> {
        Self::with_user_agent(base_domain, cookie, DEFAULT_USER_AGENT)
    }

    pub fn with_user_agent(
        base_domain: &str,
        cookie: Option<&str>,
        user_agent: &str,
    ) -> Result<Self> {
        let mut base = HeaderMap::new();
        base.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        insert(&mut base, USER_AGENT, "user-agent", user_agent)?;
        insert(&mut base, ORIGIN, "origin", &format!("https://{base_domain}/"))?;

        let cookie = cookie.map(str::trim).filter(|c| !c.is_empty());
        if let Some(cookie) = cookie {
            insert(&mut base, COOKIE, "cookie", cookie)?;
        }

        Ok(Self {
            base,
            has_cookie: cookie.is_some(),
        })
    }

    pub fn has_cookie(&self) -> bool {
        self.has_cookie
    }

    /// full header set for fetching `url`; the referer is the url itself.
    pub fn headers(&self, url: &str, kind: RequestKind) -> HeaderMap {
        let mut headers = self.base.clone();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(match kind {
                RequestKind::Api => API_ACCEPT,
                RequestKind::Page => PAGE_ACCEPT,
            }),
        );

        if let Ok(v) = HeaderValue::from_str(url) {
            headers.insert(REFERER, v);
        }

        headers
    }
}

fn insert(headers: &mut HeaderMap, key: HeaderName, name: &'static str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|_| PaheError::InvalidHeader { name })?;
    headers.insert(key, value);
    Ok(())
}
