//! Menu cache synchronization against the POS.
//!
//! A sync fetches the company's full menu, carries locally uploaded images
//! over by serial code, and replaces the company's cached rows in a single
//! transaction. Readers always get committed state: the freshly synced table
//! on success, the previous one on any failure.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::pos::{PosClient, PosError};
use crate::store::Store;
use crate::types::{ImageSnapshot, MenuCacheRow, lenient};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("company code is not configured")]
    NotConfigured,
    #[error(transparent)]
    Pos(#[from] PosError),
    #[error("invalid menu item from pos: {0}")]
    InvalidItem(String),
    #[error(transparent)]
    Store(#[from] Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced { company_id: i64, rows: usize },
    /// The POS returned nothing usable; the cache was left untouched.
    Skipped,
}

/// A menu item as the POS sends it. Field types vary between POS versions,
/// so everything is read leniently and validated in [`PosMenuItem::into_row`].
#[derive(Debug, Clone, Deserialize)]
pub struct PosMenuItem {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub m_menu_sl: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub m_menu_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub m_category_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub company_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub branch_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_json_text")]
    pub ingredients: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub m_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub m_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub m_status: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub m_image: Option<String>,
}

impl PosMenuItem {
    /// Converts to a cache row. Items without a company id inherit
    /// `default_company_id`.
    pub fn into_row(self, default_company_id: i64) -> std::result::Result<MenuCacheRow, SyncError> {
        let serial = self
            .m_menu_sl
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SyncError::InvalidItem("missing m_menu_sl".to_string()))?;
        let id = self
            .id
            .ok_or_else(|| SyncError::InvalidItem(format!("{serial}: missing id")))?;
        let name = self
            .m_menu_name
            .ok_or_else(|| SyncError::InvalidItem(format!("{serial}: missing m_menu_name")))?;

        Ok(MenuCacheRow {
            id,
            m_menu_sl: serial,
            m_menu_name: name,
            m_category_id: self.m_category_id,
            company_id: self.company_id.unwrap_or(default_company_id),
            branch_id: self.branch_id,
            ingredients: self.ingredients,
            m_cost: self.m_cost.unwrap_or_default(),
            m_price: self.m_price.unwrap_or_default(),
            m_status: self.m_status.unwrap_or(1),
            m_image: self.m_image.filter(|s| !s.is_empty()),
        })
    }
}

/// Pulls the item list out of a POS menu response: either a bare array or
/// an envelope with a `data` array. Anything else yields `None`.
pub fn menu_list(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}

/// Builds replacement rows, keeping the local image for every serial found
/// in `snapshot`. The POS image is used only when there is no local one.
pub fn merge_images(rows: &[MenuCacheRow], snapshot: &ImageSnapshot) -> Vec<MenuCacheRow> {
    rows.iter()
        .map(|row| {
            let mut merged = row.clone();
            if let Some(local) = snapshot.get(&row.m_menu_sl) {
                merged.m_image = Some(local.clone());
            }
            merged
        })
        .collect()
}

/// Overlays locally uploaded images onto raw POS items by `m_menu_sl`.
pub fn attach_local_images(items: Vec<Value>, images: &ImageSnapshot) -> Vec<Value> {
    items
        .into_iter()
        .map(|mut item| {
            let local = item
                .get("m_menu_sl")
                .and_then(|sl| match sl {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .and_then(|sl| images.get(&sl).cloned());

            if let (Some(image), Value::Object(fields)) = (local, &mut item) {
                fields.insert("m_image".to_string(), Value::String(image));
            }
            item
        })
        .collect()
}

/// Serial codes of raw POS items, skipping items without one.
pub fn serials(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item.get("m_menu_sl")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

pub struct MenuSync {
    store: Arc<dyn Store>,
    pos: Arc<dyn PosClient>,
    lock: Mutex<()>,
}

impl MenuSync {
    pub fn new(store: Arc<dyn Store>, pos: Arc<dyn PosClient>) -> Self {
        Self {
            store,
            pos,
            lock: Mutex::new(()),
        }
    }

    /// Runs one sync. Concurrent calls are serialized.
    pub async fn sync(&self) -> std::result::Result<SyncOutcome, SyncError> {
        let company_code = self
            .store
            .get_company_code()?
            .ok_or(SyncError::NotConfigured)?;

        let body = self.pos.fetch_menu(&company_code).await?;
        let items = match menu_list(body) {
            Some(items) if !items.is_empty() => items,
            _ => return Ok(SyncOutcome::Skipped),
        };

        let items = items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<PosMenuItem>(item)
                    .map_err(|e| SyncError::InvalidItem(e.to_string()))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let company_id = items
            .first()
            .and_then(|item| item.company_id)
            .ok_or_else(|| SyncError::InvalidItem("first item has no company_id".to_string()))?;

        let rows = items
            .into_iter()
            .map(|item| item.into_row(company_id))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let _guard = self.lock.lock().await;
        let inserted = self
            .store
            .replace_menu_cache(company_id, &|snapshot| merge_images(&rows, snapshot))?;

        Ok(SyncOutcome::Synced {
            company_id,
            rows: inserted,
        })
    }

    /// Syncs, then returns the cached table. Sync failures are logged and the
    /// previous cache is served instead.
    pub async fn sync_or_fallback(&self) -> Result<Vec<MenuCacheRow>> {
        match self.sync().await {
            Ok(SyncOutcome::Synced { company_id, rows }) => {
                tracing::info!("Synced {} menu items for company {}", rows, company_id);
            }
            Ok(SyncOutcome::Skipped) => {
                tracing::info!("POS returned no menu items, keeping cached menu");
            }
            Err(e) => {
                tracing::warn!("Menu sync failed, serving cached menu: {}", e);
            }
        }

        self.store.list_menu_cache()
    }
}
