mod checkout;
mod content;
mod settings;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::server::AppState;

pub use settings::require_company_code;

pub fn site_router() -> Router<Arc<AppState>> {
    Router::new()
        // Settings and POS branches
        .route("/settings", get(settings::get_settings))
        .route("/settings/update", post(settings::update_settings))
        .route("/branches", get(settings::list_branches))
        // Checkout
        .route("/proxy/place-order", post(checkout::place_order))
        // Reviews
        .route("/write-review", post(content::create_review))
        .route("/view-reviews", get(content::list_reviews))
        // About section
        .route("/about/create", post(content::create_about))
        .route("/view-about", get(content::get_about))
        // Hero banner
        .route("/upload-hero", post(content::upload_hero))
        .route("/get-hero", get(content::get_hero))
}
