use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{AboutResponse, CreatedResponse, ReviewRequest};
use crate::server::multipart::{MultipartForm, upload_error};
use crate::server::response::{ApiError, MessageResponse, StoreResultExt};
use crate::server::validation::{non_blank, require, validate_rating};

const ANONYMOUS: &str = "Anonymous";

pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReviewRequest>,
) -> impl IntoResponse {
    let review_text = require(req.review_text, "Review text and rating are required")?;
    let rating = validate_rating(req.rating)?;
    let name = non_blank(req.name).unwrap_or_else(|| ANONYMOUS.to_string());

    state
        .store
        .create_review(&name, &review_text, rating)
        .api_err("Failed to save review")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        MessageResponse::new("Review submitted successfully!"),
    ))
}

pub async fn list_reviews(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let reviews = state.store.list_reviews().api_err("Failed to list reviews")?;
    Ok::<_, ApiError>(Json(reviews))
}

/// Replaces the about section. Sending no image clears it.
pub async fn create_about(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = MultipartForm::read(multipart).await?;
    const MISSING: &str = "Please fill in all fields (Heading & Text).";
    let heading = require(form.text("heading"), MISSING)?;
    let text = require(form.text("text"), MISSING)?;

    let stored = match form.take_file("image") {
        Some(file) => Some(
            state
                .uploads
                .save("about", None, file.file_name.as_deref(), &file.data)
                .await
                .map_err(upload_error)?,
        ),
        None => None,
    };
    let image = stored.as_ref().map(|s| s.file_name());

    let (id, old_images) = match state
        .store
        .replace_about(&heading, &text, image)
        .api_err("Failed to save about section")
    {
        Ok(replaced) => replaced,
        Err(e) => {
            state.uploads.remove_all(image).await;
            return Err(e);
        }
    };

    let stale: Vec<String> = old_images
        .into_iter()
        .filter(|old| Some(old.as_str()) != image)
        .collect();
    state.uploads.remove_all(stale).await;

    Ok::<_, ApiError>(Json(CreatedResponse {
        message: "Content updated successfully!",
        id,
    }))
}

pub async fn get_about(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let about = state.store.get_about().api_err("Failed to fetch data")?;

    let body = match about {
        Some(about) => AboutResponse {
            heading: about.heading,
            text: about.text,
            image: about.image,
        },
        None => AboutResponse {
            heading: "Welcome".to_string(),
            text: "No content added yet.".to_string(),
            image: None,
        },
    };

    Ok::<_, ApiError>(Json(body))
}

/// Replaces the hero banner; the previous banner file is deleted once the
/// new row is committed.
pub async fn upload_hero(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut form = MultipartForm::read(multipart).await?;
    const MISSING: &str = "Name and Image are required";
    let name = require(form.text("name"), MISSING)?;
    let file = form
        .take_file("image")
        .ok_or_else(|| ApiError::bad_request(MISSING))?;

    let stored = state
        .uploads
        .save("hero", None, file.file_name.as_deref(), &file.data)
        .await
        .map_err(upload_error)?;

    let old_images = match state
        .store
        .replace_hero(&name, stored.file_name())
        .api_err("Failed to save hero")
    {
        Ok(old) => old,
        Err(e) => {
            state.uploads.remove_all([stored.file_name()]).await;
            return Err(e);
        }
    };

    state.uploads.remove_all(&old_images).await;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        MessageResponse::new("Hero uploaded successfully!"),
    ))
}

pub async fn get_hero(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let hero = state.store.get_hero().api_err("Failed to fetch hero")?;
    Ok::<_, ApiError>(Json(hero))
}
