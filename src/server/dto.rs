use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::{TableLayoutItem, User, lenient};

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub company_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub company_code: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCategoryResponse {
    pub message: &'static str,
    pub id: i64,
    pub code: i64,
    pub name: String,
}

/// Body of both `POST /api/menu/add` and `PUT /api/menu/update/{id}`.
#[derive(Debug, Deserialize)]
pub struct MenuItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub category_code: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateMenuItemResponse {
    pub message: &'static str,
    pub code: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMenuItemsRequest {
    #[serde(default, deserialize_with = "lenient_ids")]
    pub ids: Vec<i64>,
}

fn lenient_ids<'de, D>(deserializer: D) -> Result<Vec<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .iter()
        .filter_map(|v| match v {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub guest_number: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub event_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub time: Option<String>,
    /// A list of table numbers or a single string.
    #[serde(default)]
    pub table_number: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileUpdateResponse {
    pub message: &'static str,
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub review_text: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub rating: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    pub heading: String,
    pub text: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TableLayoutRequest {
    #[serde(default)]
    pub layout: Option<Value>,
}

impl TableLayoutRequest {
    /// Parses `layout`, which must be an array of table items.
    pub fn items(self) -> Result<Vec<TableLayoutItem>, String> {
        match self.layout {
            Some(value @ Value::Array(_)) => {
                serde_json::from_value(value).map_err(|e| format!("Invalid layout item: {e}"))
            }
            _ => Err("Layout must be an array".to_string()),
        }
    }
}
