use serde_json::Value;

use crate::server::dto::{MenuItemRequest, ReservationRequest};
use crate::server::response::ApiError;
use crate::types::{MenuItemInput, ReservationInput};

const MIN_RATING: i64 = 1;
const MAX_RATING: i64 = 5;

/// Returns the trimmed value, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn require(value: Option<String>, message: &'static str) -> Result<String, ApiError> {
    non_blank(value).ok_or_else(|| ApiError::bad_request(message))
}

/// Normalizes a reservation's `table_number`: arrays are joined with `", "`,
/// strings pass through, and empty values become `None`.
pub fn normalize_table_number(value: Option<Value>) -> Result<Option<String>, ApiError> {
    let joined = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.trim().to_string()),
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(ApiError::bad_request(
                    "table_number entries must be strings or numbers",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Some(_) => {
            return Err(ApiError::bad_request(
                "table_number must be a list or a string",
            ));
        }
    };

    Ok(non_blank(Some(joined)))
}

pub fn reservation_input(req: ReservationRequest) -> Result<ReservationInput, ApiError> {
    const MISSING: &str = "Please fill in all required fields.";

    let guest_number = req
        .guest_number
        .filter(|n| *n > 0)
        .ok_or_else(|| ApiError::bad_request(MISSING))?;

    Ok(ReservationInput {
        name: require(req.name, MISSING)?,
        phone: require(req.phone, MISSING)?,
        guest_number,
        event_name: non_blank(req.event_name),
        notes: non_blank(req.notes),
        date: require(req.date, MISSING)?,
        time: require(req.time, MISSING)?,
        table_number: normalize_table_number(req.table_number)?,
    })
}

pub fn menu_item_input(req: MenuItemRequest) -> Result<MenuItemInput, ApiError> {
    let name = require(req.name, "Item name is required")?;
    let category_code = req
        .category_code
        .ok_or_else(|| ApiError::bad_request("Category is required"))?;
    let price = req
        .price
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| ApiError::bad_request("Price must be a non-negative number"))?;

    Ok(MenuItemInput {
        category_code,
        name,
        description: non_blank(req.description),
        price,
    })
}

pub fn validate_rating(rating: Option<i64>) -> Result<i64, ApiError> {
    match rating {
        Some(r) if (MIN_RATING..=MAX_RATING).contains(&r) => Ok(r),
        Some(_) => Err(ApiError::bad_request(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        ))),
        None => Err(ApiError::bad_request("Review text and rating are required")),
    }
}

/// Trimmed, lowercased email with no format check. Used for lookups so
/// accounts created outside signup can still log in.
pub fn normalize_email(email: Option<String>) -> Result<String, ApiError> {
    Ok(require(email, "Email is required")?.to_lowercase())
}

pub fn validate_email(email: Option<String>) -> Result<String, ApiError> {
    let email = normalize_email(email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(ApiError::bad_request("Invalid email address")),
    }
}
