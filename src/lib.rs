//! # Restaurant Server
//!
//! Backend for a restaurant ordering and reservation site. The menu is
//! pulled from an external POS and cached locally, with admin-uploaded
//! images kept across syncs. Usable both as a standalone binary and as a
//! library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! restaurant-server = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use restaurant_server::pos::HttpPosClient;
//! use restaurant_server::server::{AppState, create_router};
//! use restaurant_server::store::{SqliteStore, Store};
//! use restaurant_server::uploads::UploadStorage;
//!
//! let store = SqliteStore::new("./data/restaurant.db")?;
//! store.initialize()?;
//!
//! let pos = HttpPosClient::new("https://pos.chulkani.com", Duration::from_secs(30))?;
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     Arc::new(pos),
//!     UploadStorage::new("./data/public/uploads"),
//!     10 * 1024 * 1024,
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `restaurant-server` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod pos;
pub mod server;
pub mod store;
pub mod sync;
pub mod types;
pub mod uploads;
