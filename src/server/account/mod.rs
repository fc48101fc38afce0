mod auth;
mod profile;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::server::AppState;

pub fn account_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        // Profile and address reference data
        .route("/api/user/update", put(profile::update_profile))
        .route("/api/user/{id}", get(profile::get_user))
        .route("/api/districts", get(profile::list_districts))
        .route("/api/thanas/{district_id}", get(profile::list_thanas))
}
