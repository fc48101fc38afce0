use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use crate::server::AppState;
use crate::server::dto::TableLayoutRequest;
use crate::server::response::{ApiError, MessageResponse, StoreResultExt};

pub async fn get_layout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let layout = state
        .store
        .list_table_layout()
        .api_err("Failed to load table layout")?;

    Ok::<_, ApiError>(Json(layout))
}

/// Replaces the whole floor plan in one transaction.
pub async fn update_layout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TableLayoutRequest>,
) -> impl IntoResponse {
    let mut items = req.items().map_err(ApiError::bad_request)?;

    // Items drawn in the editor but never saved carry no id yet.
    for item in &mut items {
        if item.id.as_deref().is_none_or(str::is_empty) {
            item.id = Some(Uuid::new_v4().to_string());
        }
    }

    state
        .store
        .replace_table_layout(&items)
        .api_err("Failed to save table layout")?;

    tracing::info!("Saved table layout with {} items", items.len());

    Ok::<_, ApiError>(MessageResponse::new("Layout updated successfully"))
}
