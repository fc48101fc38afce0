use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::ProfileUpdateResponse;
use crate::server::multipart::{MultipartForm, upload_error};
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::server::validation::{non_blank, require};
use crate::types::ProfileUpdate;

const PROFILE_DIR: &str = "profiles";

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    Ok::<_, ApiError>(Json(user))
}

/// Updates profile fields from a multipart form. The photo is only replaced
/// when a `photo` file is sent.
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = MultipartForm::read(multipart).await?;

    let id = form
        .number("id")
        .ok_or_else(|| ApiError::bad_request("User id is required"))?;
    let name = require(form.text("name"), "Name is required")?;

    let existing = state
        .store
        .get_user(id)
        .api_err("Failed to get user")?
        .or_not_found("User not found")?;

    let photo_url = match form.take_file("photo") {
        Some(file) => Some(
            state
                .uploads
                .save("photo", Some(PROFILE_DIR), file.file_name.as_deref(), &file.data)
                .await
                .map_err(upload_error)?
                .url_path(),
        ),
        None => None,
    };

    let update = ProfileUpdate {
        id,
        name,
        phone: non_blank(form.text("phone")),
        address: non_blank(form.text("address")),
        apartment: non_blank(form.text("apartment")),
        district_id: form.number("district_id"),
        thana_id: form.number("thana_id"),
        photo_url: photo_url.clone(),
    };

    if let Err(e) = state
        .store
        .update_profile(&update)
        .api_err("Failed to update profile")
    {
        state.uploads.remove_all(photo_url.as_deref()).await;
        return Err(e);
    }

    if photo_url.is_some() {
        state.uploads.remove_all(existing.photo_url.as_deref()).await;
    }

    Ok::<_, ApiError>(Json(ProfileUpdateResponse {
        message: "Profile updated successfully",
        photo_url,
    }))
}

pub async fn list_districts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let districts = state
        .store
        .list_districts()
        .api_err("Failed to list districts")?;

    Ok::<_, ApiError>(Json(districts))
}

pub async fn list_thanas(
    State(state): State<Arc<AppState>>,
    Path(district_id): Path<i64>,
) -> impl IntoResponse {
    let thanas = state
        .store
        .list_thanas(district_id)
        .api_err("Failed to list thanas")?;

    Ok::<_, ApiError>(Json(thanas))
}
