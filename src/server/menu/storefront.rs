use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::Value;

use crate::server::AppState;
use crate::server::response::ApiError;
use crate::server::site::require_company_code;
use crate::sync::{attach_local_images, serials};
use crate::types::lenient::is_truthy;

/// Branch used when the storefront asks for "All" branches.
const DEFAULT_BRANCH: &str = "1";

fn effective_branch(branch_id: Option<&str>) -> &str {
    match branch_id {
        None | Some("") | Some("All") => DEFAULT_BRANCH,
        Some(branch) => branch,
    }
}

/// `data` of a `{status, data: [...]}` envelope, or nothing when `status`
/// is falsy or `data` is not a list.
fn status_data(mut body: Value) -> Vec<Value> {
    if !body.get("status").is_some_and(is_truthy) {
        return Vec::new();
    }
    match body.get_mut("data").map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

fn branch_list(mut body: Value) -> Vec<Value> {
    if let Some(Value::Array(branches)) = body.pointer_mut("/data/branches").map(Value::take) {
        return branches;
    }
    match body {
        Value::Array(branches) => branches,
        _ => Vec::new(),
    }
}

/// Branches for the storefront picker. Upstream failures yield an empty list.
pub async fn list_branches(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let company_code = require_company_code(&state)?;

    let branches = match state.pos.fetch_branches(&company_code).await {
        Ok(body) => branch_list(body),
        Err(e) => {
            tracing::warn!("Failed to fetch branches from POS: {}", e);
            Vec::new()
        }
    };

    Ok::<_, ApiError>(Json(branches))
}

async fn categories_for(state: &AppState, branch_id: Option<&str>) -> Result<Vec<Value>, ApiError> {
    let company_code = require_company_code(state)?;
    let branch = effective_branch(branch_id);

    let body = state
        .pos
        .fetch_categories(&company_code, branch)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to fetch categories for branch {}: {}", branch, e);
            ApiError::bad_gateway("Failed to fetch categories")
        })?;

    Ok(status_data(body))
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let categories = categories_for(&state, None).await?;
    Ok::<_, ApiError>(Json(categories))
}

pub async fn list_branch_categories(
    State(state): State<Arc<AppState>>,
    Path(branch_id): Path<String>,
) -> impl IntoResponse {
    let categories = categories_for(&state, Some(&branch_id)).await?;
    Ok::<_, ApiError>(Json(categories))
}

/// Live POS items of one category, with locally uploaded images overlaid
/// by serial code.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Path((branch_id, category_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let company_code = require_company_code(&state)?;
    let branch = effective_branch(Some(&branch_id));

    let body = state
        .pos
        .fetch_category_items(&company_code, branch, &category_id)
        .await
        .map_err(|e| {
            tracing::warn!(
                "Failed to fetch items for branch {} category {}: {}",
                branch,
                category_id,
                e
            );
            ApiError::bad_gateway("Failed to fetch menu items")
        })?;

    let items = status_data(body);
    let serials = serials(&items);
    if serials.is_empty() {
        return Ok(Json(items));
    }

    let items = match state.store.get_menu_images(&serials) {
        Ok(images) => attach_local_images(items, &images),
        Err(e) => {
            tracing::error!("Failed to read local menu images: {}", e);
            items
        }
    };

    Ok::<_, ApiError>(Json(items))
}
