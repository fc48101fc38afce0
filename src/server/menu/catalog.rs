use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{
    CreateCategoryRequest, CreateCategoryResponse, CreateMenuItemResponse, DeleteMenuItemsRequest,
    MenuItemRequest,
};
use crate::server::response::{ApiError, MessageResponse, StoreResultExt};
use crate::server::validation::{menu_item_input, require};

pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let categories = state
        .store
        .list_categories()
        .api_err("Failed to list categories")?;

    Ok::<_, ApiError>(Json(categories))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCategoryRequest>,
) -> impl IntoResponse {
    let name = require(req.name, "Category name is required")?;

    let category = state
        .store
        .create_category(&name)
        .api_err("Error adding category")?;

    tracing::info!("Created category {} with code {}", category.name, category.code);

    Ok::<_, ApiError>(Json(CreateCategoryResponse {
        message: "Category added",
        id: category.id,
        code: category.code,
        name: category.name,
    }))
}

pub async fn list_items(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let items = state
        .store
        .list_menu_items()
        .api_err("Failed to list menu items")?;

    Ok::<_, ApiError>(Json(items))
}

pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MenuItemRequest>,
) -> impl IntoResponse {
    let input = menu_item_input(req)?;

    let item = match state.store.create_menu_item(&input) {
        Ok(item) => item,
        Err(Error::NotFound) => return Err(ApiError::not_found("Category not found")),
        Err(e) => return Err(ApiError::from_store(e, "Error adding item")),
    };

    Ok::<_, ApiError>(Json(CreateMenuItemResponse {
        message: "Item added successfully",
        code: item.code,
    }))
}

pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<MenuItemRequest>,
) -> impl IntoResponse {
    let input = menu_item_input(req)?;

    match state.store.update_menu_item(id, &input) {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(ApiError::not_found("Menu item not found")),
        Err(e) => return Err(ApiError::from_store(e, "Failed to update menu item")),
    }

    Ok::<_, ApiError>(MessageResponse::new("Item updated successfully"))
}

pub async fn delete_items(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeleteMenuItemsRequest>,
) -> impl IntoResponse {
    if req.ids.is_empty() {
        return Err(ApiError::bad_request("No items selected for deletion"));
    }

    let deleted = state
        .store
        .delete_menu_items(&req.ids)
        .api_err("Failed to delete menu items")?;

    tracing::info!("Deleted {} of {} menu items", deleted, req.ids.len());

    Ok::<_, ApiError>(MessageResponse::new("Items deleted successfully"))
}
