use std::sync::Arc;
use std::time::Instant;

use axum::extract::{DefaultBodyLimit, Request};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::account::account_router;
use super::booking::booking_router;
use super::menu::menu_router;
use super::site::site_router;
use crate::pos::PosClient;
use crate::store::Store;
use crate::sync::MenuSync;
use crate::uploads::UploadStorage;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub pos: Arc<dyn PosClient>,
    pub menu_sync: MenuSync,
    pub uploads: UploadStorage,
    /// Request body cap, sized for image uploads.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        pos: Arc<dyn PosClient>,
        uploads: UploadStorage,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            menu_sync: MenuSync::new(store.clone(), pos.clone()),
            store,
            pos,
            uploads,
            max_upload_bytes,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(state.uploads.root());
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/health", get(health))
        .merge(account_router())
        .nest("/api", menu_router())
        .nest("/api", booking_router())
        .nest("/api", site_router())
        .nest_service("/uploads", uploads)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_request))
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
