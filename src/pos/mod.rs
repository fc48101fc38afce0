//! Client for the external POS API.
//!
//! Every call is parameterized by the tenant's company code, which callers
//! read fresh from settings. The HTTP implementation lives in [`client`];
//! tests substitute their own [`PosClient`].

mod client;
mod session;

pub use client::HttpPosClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PosError {
    #[error("pos request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("pos responded with status {status}")]
    Status { status: u16, body: String },
    #[error("pos response is not valid json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid pos base url {0}")]
    InvalidBaseUrl(String),
}

/// Upstream answer to an order confirmation, forwarded to the client as is.
#[derive(Debug, Clone)]
pub struct OrderReply {
    pub status: u16,
    pub body: Value,
}

impl OrderReply {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait PosClient: Send + Sync {
    /// Full menu list for the company, used by the cache sync.
    async fn fetch_menu(&self, company_code: &str) -> Result<Value, PosError>;

    async fn fetch_branches(&self, company_code: &str) -> Result<Value, PosError>;

    async fn fetch_categories(&self, company_code: &str, branch_id: &str)
    -> Result<Value, PosError>;

    async fn fetch_category_items(
        &self,
        company_code: &str,
        branch_id: &str,
        category_id: &str,
    ) -> Result<Value, PosError>;

    /// Posts an order through a fresh XSRF-protected session. Non-2xx
    /// upstream answers are returned as an [`OrderReply`], not an error.
    async fn place_order(&self, company_code: &str, order: &Value)
    -> Result<OrderReply, PosError>;
}
