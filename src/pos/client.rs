use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, ORIGIN, REFERER};
use serde_json::Value;

use super::session::PosSession;
use super::{OrderReply, PosClient, PosError};

/// Laravel's "page expired" status, sent when the session or XSRF token is stale.
const SESSION_EXPIRED: u16 = 419;

pub struct HttpPosClient {
    http: reqwest::Client,
    base_url: String,
    /// `{base_url}/`, the page that hands out the checkout session cookies.
    origin: Url,
    timeout: Duration,
}

impl HttpPosClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PosError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let origin = Url::parse(&format!("{base_url}/"))
            .map_err(|e| PosError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            origin,
            timeout,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/company/{}", self.base_url, path)
    }

    async fn get_json(&self, url: String) -> Result<Value, PosError> {
        let resp = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            tracing::warn!("POS GET {} returned {}", url, status.as_u16());
            return Err(PosError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Primes a fresh cookie jar from the POS home page, following redirects.
    async fn open_session(&self) -> Result<PosSession, PosError> {
        let session = PosSession::new(self.origin.clone(), self.timeout)?;
        session.http().get(self.origin.clone()).send().await?;
        if session.xsrf_token().is_none() {
            tracing::warn!("POS handshake returned no XSRF-TOKEN cookie");
        }
        Ok(session)
    }

    async fn post_order(
        &self,
        session: &PosSession,
        company_code: &str,
        order: &Value,
    ) -> Result<OrderReply, PosError> {
        let req = session
            .http()
            .post(format!("{}/branch/order/confirm_order", self.base_url))
            .header(ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .header("X-XSRF-TOKEN", session.xsrf_token().unwrap_or_default())
            .header("company-code", company_code)
            .header(REFERER, format!("{}/", self.base_url))
            .header(ORIGIN, self.base_url.as_str())
            .json(order);

        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(OrderReply { status, body })
    }
}

#[async_trait]
impl PosClient for HttpPosClient {
    async fn fetch_menu(&self, company_code: &str) -> Result<Value, PosError> {
        self.get_json(self.url(&["api", "menus", company_code])).await
    }

    async fn fetch_branches(&self, company_code: &str) -> Result<Value, PosError> {
        self.get_json(self.url(&["all-branch-list", company_code]))
            .await
    }

    async fn fetch_categories(
        &self,
        company_code: &str,
        branch_id: &str,
    ) -> Result<Value, PosError> {
        self.get_json(self.url(&["menu-category", company_code, branch_id]))
            .await
    }

    async fn fetch_category_items(
        &self,
        company_code: &str,
        branch_id: &str,
        category_id: &str,
    ) -> Result<Value, PosError> {
        self.get_json(self.url(&["menu", company_code, branch_id, category_id]))
            .await
    }

    async fn place_order(
        &self,
        company_code: &str,
        order: &Value,
    ) -> Result<OrderReply, PosError> {
        let session = self.open_session().await?;
        let reply = self.post_order(&session, company_code, order).await?;

        if reply.status != SESSION_EXPIRED {
            return Ok(reply);
        }

        tracing::info!("POS session expired during checkout, retrying handshake once");
        let session = self.open_session().await?;
        self.post_order(&session, company_code, order).await
    }
}
