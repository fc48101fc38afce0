use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::{SettingsResponse, UpdateSettingsRequest};
use crate::server::response::{ApiError, MessageResponse, StoreResultExt};
use crate::server::validation::require;

const COMPANY_CODE_MISSING: &str = "Company Code not set in Settings.";

/// Reads the company code fresh from settings; 404 when it is unset.
pub fn require_company_code(state: &AppState) -> Result<String, ApiError> {
    state
        .store
        .get_company_code()
        .api_err("Failed to read settings")?
        .ok_or_else(|| ApiError::not_found(COMPANY_CODE_MISSING))
}

pub async fn get_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let company_code = state
        .store
        .get_company_code()
        .api_err("Failed to read settings")?
        .unwrap_or_default();

    Ok::<_, ApiError>(Json(SettingsResponse { company_code }))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let company_code = require(req.company_code, "Company code is required")?;

    state
        .store
        .set_company_code(&company_code)
        .api_err("Failed to update settings")?;

    tracing::info!("Company code updated to {}", company_code);

    Ok::<_, ApiError>(MessageResponse::new("Settings updated successfully"))
}

/// The POS branch list, passed through verbatim.
pub async fn list_branches(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let company_code = require_company_code(&state)?;

    let branches = state
        .pos
        .fetch_branches(&company_code)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to fetch branches for {}: {}", company_code, e);
            ApiError::bad_gateway("Failed to fetch branches from POS")
        })?;

    Ok::<_, ApiError>(Json(branches))
}
