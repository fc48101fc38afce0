use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Part;
use restaurant_server::pos::HttpPosClient;
use restaurant_server::server::{AppState, create_router};
use restaurant_server::store::{SqliteStore, Store};
use restaurant_server::uploads::UploadStorage;
use tempfile::TempDir;

use super::MockPos;

/// The full router served in-process against a temp data dir and a mock POS.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub pos: MockPos,
    pub store: Arc<SqliteStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Self {
        let pos = MockPos::start().await;

        let temp_dir = TempDir::new().expect("create temp dir");
        let uploads_dir = temp_dir.path().join("public").join("uploads");
        std::fs::create_dir_all(&uploads_dir).expect("create uploads dir");

        let store = Arc::new(
            SqliteStore::new(temp_dir.path().join("restaurant.db")).expect("open store"),
        );
        store.initialize().expect("initialize store");

        let http_pos =
            HttpPosClient::new(pos.base_url.clone(), Duration::from_secs(5)).expect("pos client");

        let state = Arc::new(AppState::new(
            store.clone() as Arc<dyn Store>,
            Arc::new(http_pos),
            UploadStorage::new(uploads_dir),
            1024 * 1024,
        ));
        let app = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://{}", addr),
            pos,
            store,
            client: reqwest::Client::new(),
        }
    }

    /// Starts a server with the company code already configured.
    pub async fn with_company_code(code: &str) -> Self {
        let server = Self::start().await;
        server.store.set_company_code(code).expect("set company code");
        server
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn upload_path(&self, relative: &str) -> PathBuf {
        self.data_dir().join("public").join(relative.trim_start_matches('/'))
    }
}

/// A file part for upload forms.
pub fn image_part(file_name: &str, data: &[u8]) -> Part {
    Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_str("application/octet-stream")
        .expect("valid mime")
}
