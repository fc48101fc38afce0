use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Serial code → locally uploaded image path.
pub type ImageSnapshot = HashMap<String, String>;

/// One POS menu item mirrored into the local `menu` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuCacheRow {
    /// Item id as assigned by the POS.
    pub id: i64,
    pub m_menu_sl: String,
    pub m_menu_name: String,
    pub m_category_id: Option<i64>,
    pub company_id: i64,
    /// Dash-separated branch ids, e.g. `"1-2"`.
    pub branch_id: Option<String>,
    /// JSON-encoded ingredient list.
    pub ingredients: Option<String>,
    pub m_cost: f64,
    pub m_price: f64,
    pub m_status: i64,
    pub m_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub code: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    /// Code of the owning category.
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MenuItemInput {
    pub category_code: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub guest_number: i64,
    pub event_name: Option<String>,
    pub notes: Option<String>,
    pub date: String,
    pub time: String,
    /// Comma-joined table numbers, e.g. `"1, 5"`.
    pub table_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReservationInput {
    pub name: String,
    pub phone: String,
    pub guest_number: i64,
    pub event_name: Option<String>,
    pub notes: Option<String>,
    pub date: String,
    pub time: String,
    pub table_number: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum Role {
    Customer,
    Admin,
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => 1,
            Role::Admin => 2,
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Customer),
            2 => Ok(Role::Admin),
            other => Err(format!("unknown role {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub apartment: Option<String>,
    pub district_id: Option<i64>,
    pub thana_id: Option<i64>,
    pub role: Role,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub apartment: Option<String>,
    pub district_id: Option<i64>,
    pub thana_id: Option<i64>,
    /// Only written when a new photo was uploaded.
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thana {
    pub id: i64,
    pub name: String,
    pub district_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub name: String,
    pub review_text: String,
    pub rating: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct About {
    pub id: i64,
    pub heading: String,
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub id: i64,
    pub name: String,
    pub image: String,
}

fn default_shape() -> String {
    "square".to_string()
}

fn default_extent() -> f64 {
    100.0
}

fn shape_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::opt_string(deserializer)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default_shape))
}

/// Missing, null or zero sizes fall back to the editor's default extent.
fn extent_or_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient::opt_f64(deserializer)?
        .filter(|v| *v != 0.0)
        .unwrap_or_else(default_extent))
}

/// A table (or decoration) placed on the floor plan editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableLayoutItem {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub table_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub capacity: i64,
    #[serde(default = "default_shape", deserialize_with = "shape_or_default")]
    pub shape: String,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub rotation: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub pos_x: f64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub pos_y: f64,
    #[serde(rename = "type", default, deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    #[serde(
        rename = "isBookable",
        alias = "is_bookable",
        default,
        deserialize_with = "lenient::truthy"
    )]
    pub is_bookable: bool,
    #[serde(default = "default_extent", deserialize_with = "extent_or_default")]
    pub width: f64,
    #[serde(default = "default_extent", deserialize_with = "extent_or_default")]
    pub height: f64,
}
