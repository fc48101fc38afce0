use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};

const REQUIRED_FIELDS: [&str; 3] = ["cust_name", "phone", "address"];

fn validate_order(order: &Value) -> Result<(), ApiError> {
    let Some(fields) = order.as_object() else {
        return Err(ApiError::bad_request("Order must be a JSON object"));
    };

    for name in REQUIRED_FIELDS {
        let present = match fields.get(name) {
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        };
        if !present {
            return Err(ApiError::bad_request(format!("{name} is required")));
        }
    }

    match fields.get("items") {
        Some(Value::Array(items)) if !items.is_empty() => Ok(()),
        _ => Err(ApiError::bad_request("Order must contain at least one item")),
    }
}

/// Forwards an order to the POS. The upstream status and body are passed
/// through; transport failures become 502.
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(mut order): Json<Value>,
) -> Result<Response, ApiError> {
    validate_order(&order)?;

    let company_code = state
        .store
        .get_company_code()
        .api_err("Failed to read settings")?
        .ok_or_else(|| ApiError::internal("Company Code missing from local DB"))?;

    if let Some(fields) = order.as_object_mut() {
        fields.insert("company_code".to_string(), Value::String(company_code.clone()));
    }

    let reply = match state.pos.place_order(&company_code, &order).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Order proxy failed: {}", e);
            let body = json!({ "message": "Proxy Connection Error", "details": e.to_string() });
            return Ok((StatusCode::BAD_GATEWAY, Json(body)).into_response());
        }
    };

    if reply.is_success() {
        tracing::info!("Order placed for company {}", company_code);
    } else {
        tracing::warn!("POS rejected order with status {}", reply.status);
    }

    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(reply.body)).into_response())
}
