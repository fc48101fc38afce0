//! A stand-in for the POS HTTP API, served in-process on an ephemeral port.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde_json::{Value, json};

/// Cookie value for `XSRF-TOKEN`; the client must send it back decoded.
const XSRF_COOKIE: &str = "tok%3Dabc";
const XSRF_HEADER: &str = "tok=abc";

#[derive(Default)]
pub struct MockPosState {
    pub menu: Mutex<Value>,
    pub menu_fails: AtomicBool,
    pub expire_next_order: AtomicBool,
    pub orders: Mutex<Vec<Value>>,
    pub order_attempts: Mutex<u32>,
}

pub struct MockPos {
    pub base_url: String,
    pub state: Arc<MockPosState>,
}

impl MockPos {
    pub async fn start() -> Self {
        let state = Arc::new(MockPosState {
            menu: Mutex::new(json!([])),
            ..Default::default()
        });

        let app = Router::new()
            .route("/", get(home))
            .route("/login", get(login_page))
            .route("/company/api/menus/{code}", get(menu))
            .route("/company/all-branch-list/{code}", get(branches))
            .route("/company/menu-category/{code}/{branch}", get(categories))
            .route("/company/menu/{code}/{branch}/{category}", get(items))
            .route("/branch/order/confirm_order", post(confirm_order))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock pos");
        let addr = listener.local_addr().expect("mock pos addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock pos");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn set_menu(&self, menu: Value) {
        *self.state.menu.lock().expect("menu lock") = menu;
    }

    pub fn fail_menu(&self, fail: bool) {
        self.state.menu_fails.store(fail, Ordering::SeqCst);
    }

    pub fn expire_next_order(&self) {
        self.state.expire_next_order.store(true, Ordering::SeqCst);
    }

    pub fn orders(&self) -> Vec<Value> {
        self.state.orders.lock().expect("orders lock").clone()
    }

    pub fn order_attempts(&self) -> u32 {
        *self.state.order_attempts.lock().expect("attempts lock")
    }
}

/// Like the real POS, the home page hands out session cookies on a redirect.
async fn home() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        AppendHeaders([
            (header::SET_COOKIE, format!("XSRF-TOKEN={}; Path=/", XSRF_COOKIE)),
            (
                header::SET_COOKIE,
                "pos_session=s3ss10n; Path=/; HttpOnly".to_string(),
            ),
            (header::LOCATION, "/login".to_string()),
        ]),
    )
}

async fn login_page() -> impl IntoResponse {
    "<html></html>"
}

async fn menu(State(state): State<Arc<MockPosState>>, Path(_code): Path<String>) -> impl IntoResponse {
    if state.menu_fails.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "down"})));
    }
    let menu = state.menu.lock().expect("menu lock").clone();
    (StatusCode::OK, Json(menu))
}

async fn branches(Path(code): Path<String>) -> impl IntoResponse {
    Json(json!({
        "status": true,
        "data": {
            "company": code,
            "branches": [
                {"id": 1, "name": "Gulshan"},
                {"id": 2, "name": "Dhanmondi"},
            ]
        }
    }))
}

async fn categories(Path((_code, branch)): Path<(String, String)>) -> impl IntoResponse {
    Json(json!({
        "status": true,
        "data": [
            {"id": 5, "name": format!("Starters {branch}")},
            {"id": 6, "name": "Mains"},
        ]
    }))
}

async fn items(Path((_code, _branch, category)): Path<(String, String, String)>) -> impl IntoResponse {
    Json(json!({
        "status": 1,
        "data": [
            {"id": 1, "m_menu_sl": "S1", "m_menu_name": "Soup", "m_category_id": category, "m_image": "https://pos/soup.png"},
            {"id": 2, "m_menu_sl": "S2", "m_menu_name": "Salad", "m_category_id": category, "m_image": "https://pos/salad.png"},
            {"id": 3, "m_menu_sl": "S3", "m_menu_name": "Lassi", "m_category_id": category, "m_image": "https://pos/lassi.png"},
        ]
    }))
}

async fn confirm_order(
    State(state): State<Arc<MockPosState>>,
    headers: HeaderMap,
    Json(order): Json<Value>,
) -> impl IntoResponse {
    *state.order_attempts.lock().expect("attempts lock") += 1;

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    if state.expire_next_order.swap(false, Ordering::SeqCst) {
        return (
            StatusCode::from_u16(419).expect("419"),
            Json(json!({"message": "CSRF token mismatch."})),
        );
    }

    let cookie = header_value("cookie");
    if header_value("x-xsrf-token") != XSRF_HEADER
        || !cookie.contains("pos_session=s3ss10n")
        || header_value("company-code").is_empty()
    {
        return (
            StatusCode::from_u16(419).expect("419"),
            Json(json!({"message": "CSRF token mismatch."})),
        );
    }

    if order.get("items").and_then(Value::as_array).is_none_or(Vec::is_empty) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"message": "No items"})),
        );
    }

    state.orders.lock().expect("orders lock").push(order);
    (StatusCode::OK, Json(json!({"status": true, "order_id": 501})))
}
