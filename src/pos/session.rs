use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};

use super::PosError;

const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// A cookie-carrying HTTP client for one checkout.
///
/// Every order gets its own jar, so sessions are never shared between
/// requests. Cookies set on redirect hops of the priming request are kept.
pub struct PosSession {
    http: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
}

impl PosSession {
    pub fn new(origin: Url, timeout: Duration) -> Result<Self, PosError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self { http, jar, origin })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The percent-decoded `XSRF-TOKEN` cookie, sent back as `X-XSRF-TOKEN`.
    pub fn xsrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        xsrf_from_cookie_header(header.to_str().ok()?)
    }
}

fn xsrf_from_cookie_header(header: &str) -> Option<String> {
    let raw = header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == XSRF_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))?;

    let decoded = urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    Some(decoded)
}
