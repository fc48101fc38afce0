mod cache;
mod catalog;
mod storefront;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn menu_router() -> Router<Arc<AppState>> {
    Router::new()
        // POS menu cache
        .route("/menu/list", get(cache::sync_menu))
        .route("/menu/upload", post(cache::upload_image))
        // Storefront, proxied live from the POS
        .route("/menu/branches", get(storefront::list_branches))
        .route("/menu/categories", get(storefront::list_categories))
        .route(
            "/menu/categories/{branch_id}",
            get(storefront::list_branch_categories),
        )
        .route(
            "/menu/items/{branch_id}/{category_id}",
            get(storefront::list_items),
        )
        // Locally authored catalog
        .route("/categories", get(catalog::list_categories))
        .route("/categories/add", post(catalog::create_category))
        .route("/menu/add", post(catalog::create_item))
        .route("/menu/items", get(catalog::list_items))
        .route("/menu/update/{id}", put(catalog::update_item))
        .route("/menu/delete", post(catalog::delete_items))
}
