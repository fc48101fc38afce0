use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::server::AppState;
use crate::server::multipart::{MultipartForm, upload_error};
use crate::server::response::{ApiError, StoreResultExt};
use crate::server::validation::require;

/// Syncs the cache from the POS and returns the cached menu. Sync failures
/// fall back to the previous cache instead of erroring.
pub async fn sync_menu(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rows = state
        .menu_sync
        .sync_or_fallback()
        .await
        .api_err("Failed to load menu")?;

    Ok::<_, ApiError>(Json(rows))
}

/// Attaches an uploaded image to every cached row with the given serial.
/// The image survives later syncs.
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = MultipartForm::read(multipart).await?;
    let serial = require(form.text("serial"), "Serial is required")?;
    let file = form
        .take_file("image")
        .ok_or_else(|| ApiError::bad_request("Image file is required"))?;

    let previous = state
        .store
        .get_menu_images(std::slice::from_ref(&serial))
        .api_err("Failed to read menu image")?
        .remove(&serial);

    let stored = state
        .uploads
        .save("menu", None, file.file_name.as_deref(), &file.data)
        .await
        .map_err(upload_error)?;
    let image = stored.relative_path();

    let updated = match state
        .store
        .set_menu_image(&serial, &image)
        .api_err("Failed to save menu image")
    {
        Ok(n) => n,
        Err(e) => {
            state.uploads.remove_all([stored.file_name()]).await;
            return Err(e);
        }
    };

    if updated == 0 {
        state.uploads.remove_all([stored.file_name()]).await;
        return Err(ApiError::not_found("Menu item not found"));
    }

    // POS-provided images are remote URLs; only local uploads are ours to delete.
    if let Some(old) = previous.filter(|old| old.starts_with("uploads/") && *old != image) {
        state.uploads.remove_all([old]).await;
    }

    Ok::<_, ApiError>(Json(json!({
        "message": "Image uploaded successfully",
        "m_image": image,
        "updated": updated,
    })))
}
