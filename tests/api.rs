mod common;

use common::{TestServer, image_part};
use reqwest::multipart::Form;
use restaurant_server::auth::hash_password;
use restaurant_server::store::Store;
use restaurant_server::types::{NewUser, Role};
use serde_json::{Value, json};

fn pos_menu() -> Value {
    json!([
        {
            "id": 1,
            "m_menu_sl": "S1",
            "m_menu_name": "Chicken Biryani",
            "m_category_id": "3",
            "company_id": 7,
            "branch_id": "1-2",
            "ingredients": ["rice", "chicken"],
            "m_cost": "120.50",
            "m_price": 250,
            "m_status": 1,
            "m_image": "https://pos.example.com/biryani.jpg"
        },
        {
            "id": 2,
            "m_menu_sl": "S2",
            "m_menu_name": "Borhani",
            "m_category_id": 4,
            "company_id": 7,
            "m_price": "60",
            "m_status": 1,
            "m_image": null
        }
    ])
}

async fn get_json(server: &TestServer, path: &str) -> (u16, Value) {
    let resp = server
        .client
        .get(server.url(path))
        .send()
        .await
        .expect("send request");
    let status = resp.status().as_u16();
    let body = resp.json().await.expect("parse json");
    (status, body)
}

async fn post_json(server: &TestServer, path: &str, body: Value) -> (u16, Value) {
    let resp = server
        .client
        .post(server.url(path))
        .json(&body)
        .send()
        .await
        .expect("send request");
    let status = resp.status().as_u16();
    let body = resp.json().await.expect("parse json");
    (status, body)
}

fn serial_image<'a>(rows: &'a Value, serial: &str) -> Option<&'a str> {
    rows.as_array()
        .expect("menu array")
        .iter()
        .find(|row| row["m_menu_sl"] == serial)
        .and_then(|row| row["m_image"].as_str())
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("health");
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.expect("body"), "OK");
}

#[tokio::test]
async fn test_settings_round_trip() {
    let server = TestServer::start().await;

    let (status, body) = get_json(&server, "/api/settings").await;
    assert_eq!(status, 200);
    assert_eq!(body["company_code"], "");

    let (status, body) = get_json(&server, "/api/menu/categories").await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Company Code not set in Settings.");

    let (status, _) = post_json(&server, "/api/settings/update", json!({"company_code": "  "})).await;
    assert_eq!(status, 400);

    let (status, body) =
        post_json(&server, "/api/settings/update", json!({"company_code": "CHK01"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Settings updated successfully");

    let (_, body) = get_json(&server, "/api/settings").await;
    assert_eq!(body["company_code"], "CHK01");
}

#[tokio::test]
async fn test_menu_sync_is_idempotent() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.set_menu(pos_menu());

    let (status, first) = get_json(&server, "/api/menu/list").await;
    assert_eq!(status, 200);
    assert_eq!(first.as_array().expect("rows").len(), 2);

    let (_, second) = get_json(&server, "/api/menu/list").await;
    assert_eq!(first, second);

    let biryani = &first[0];
    assert_eq!(biryani["m_menu_sl"], "S1");
    assert_eq!(biryani["m_category_id"], 3);
    assert_eq!(biryani["m_cost"], 120.5);
    assert_eq!(biryani["branch_id"], "1-2");
    assert_eq!(biryani["ingredients"], r#"["rice","chicken"]"#);
}

#[tokio::test]
async fn test_uploaded_image_survives_resync() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.set_menu(pos_menu());
    get_json(&server, "/api/menu/list").await;

    let resp = server
        .client
        .post(server.url("/api/menu/upload"))
        .multipart(
            Form::new()
                .text("serial", "S1")
                .part("image", image_part("biryani.png", b"\x89PNG fake image")),
        )
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("upload json");
    let image = body["m_image"].as_str().expect("m_image").to_string();
    assert!(image.starts_with("uploads/menu_"));
    assert!(image.ends_with(".png"));
    assert!(server.upload_path(&image).exists());

    // The POS keeps reporting its own remote image for S1.
    let (_, rows) = get_json(&server, "/api/menu/list").await;
    assert_eq!(serial_image(&rows, "S1"), Some(image.as_str()));
    assert_eq!(serial_image(&rows, "S2"), None);

    let served = server
        .client
        .get(server.url(&format!("/{}", image)))
        .send()
        .await
        .expect("fetch upload");
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(served.bytes().await.expect("bytes").as_ref(), b"\x89PNG fake image");
}

#[tokio::test]
async fn test_upload_for_unknown_serial_is_not_found() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.set_menu(pos_menu());
    get_json(&server, "/api/menu/list").await;

    let resp = server
        .client
        .post(server.url("/api/menu/upload"))
        .multipart(
            Form::new()
                .text("serial", "NOPE")
                .part("image", image_part("x.jpg", b"jpeg")),
        )
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status().as_u16(), 404);

    let leftovers = std::fs::read_dir(server.data_dir().join("public").join("uploads"))
        .expect("read uploads")
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_menu_list_falls_back_to_cache_when_pos_fails() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.set_menu(pos_menu());
    let (_, cached) = get_json(&server, "/api/menu/list").await;

    server.pos.fail_menu(true);
    let (status, rows) = get_json(&server, "/api/menu/list").await;
    assert_eq!(status, 200);
    assert_eq!(rows, cached);

    // A bad payload must not wipe the cache either.
    server.pos.fail_menu(false);
    server.pos.set_menu(json!({"unexpected": true}));
    let (_, rows) = get_json(&server, "/api/menu/list").await;
    assert_eq!(rows, cached);
}

#[tokio::test]
async fn test_menu_list_without_company_code_serves_cache() {
    let server = TestServer::start().await;
    server.pos.set_menu(pos_menu());

    let (status, rows) = get_json(&server, "/api/menu/list").await;
    assert_eq!(status, 200);
    assert_eq!(rows, json!([]));
}

#[tokio::test]
async fn test_storefront_overlays_local_images() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.set_menu(pos_menu());
    get_json(&server, "/api/menu/list").await;
    server
        .store
        .set_menu_image("S2", "uploads/menu_local.png")
        .expect("set image");

    let (status, branches) = get_json(&server, "/api/menu/branches").await;
    assert_eq!(status, 200);
    assert_eq!(branches.as_array().expect("branches").len(), 2);

    let (status, categories) = get_json(&server, "/api/menu/categories/All").await;
    assert_eq!(status, 200);
    assert_eq!(categories[0]["name"], "Starters 1");

    let (status, items) = get_json(&server, "/api/menu/items/2/5").await;
    assert_eq!(status, 200);
    // Cached images win over the live ones; items missing from the cache keep theirs.
    assert_eq!(
        serial_image(&items, "S1"),
        Some("https://pos.example.com/biryani.jpg")
    );
    assert_eq!(serial_image(&items, "S2"), Some("uploads/menu_local.png"));
    assert_eq!(serial_image(&items, "S3"), Some("https://pos/lassi.png"));
}

#[tokio::test]
async fn test_storefront_prefers_uploaded_image_over_live() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.set_menu(pos_menu());
    get_json(&server, "/api/menu/list").await;

    let resp = server
        .client
        .post(server.url("/api/menu/upload"))
        .multipart(
            Form::new()
                .text("serial", "S1")
                .part("image", image_part("soup.webp", b"webp")),
        )
        .send()
        .await
        .expect("upload");
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.expect("upload json");
    let uploaded = body["m_image"].as_str().expect("m_image").to_string();

    let (_, items) = get_json(&server, "/api/menu/items/1/5").await;
    assert_eq!(serial_image(&items, "S1"), Some(uploaded.as_str()));
    assert_ne!(serial_image(&items, "S1"), Some("https://pos/soup.png"));
}

#[tokio::test]
async fn test_catalog_codes() {
    let server = TestServer::start().await;

    let (status, starters) =
        post_json(&server, "/api/categories/add", json!({"name": "Starters"})).await;
    assert_eq!(status, 200);
    assert_eq!(starters["code"], 11);

    let (_, mains) = post_json(&server, "/api/categories/add", json!({"name": "Mains"})).await;
    assert_eq!(mains["code"], 12);

    let (status, _) = post_json(&server, "/api/categories/add", json!({"name": ""})).await;
    assert_eq!(status, 400);

    let mut codes = Vec::new();
    for name in ["Kebab", "Curry", "Naan"] {
        let (status, body) = post_json(
            &server,
            "/api/menu/add",
            json!({"name": name, "category_code": "12", "price": "180", "description": ""}),
        )
        .await;
        assert_eq!(status, 200);
        codes.push(body["code"].as_i64().expect("code"));
    }
    assert_eq!(codes, vec![1211, 1212, 1213]);

    let (status, _) = post_json(
        &server,
        "/api/menu/add",
        json!({"name": "Ghost", "category_code": 99, "price": 10}),
    )
    .await;
    assert_eq!(status, 404);

    let (_, items) = get_json(&server, "/api/menu/items").await;
    let items = items.as_array().expect("items");
    assert_eq!(items.len(), 3);
    let first_id = items[0]["id"].as_i64().expect("id");

    let (status, _) = post_json(&server, "/api/menu/delete", json!({"ids": [first_id]})).await;
    assert_eq!(status, 200);

    // Codes are never reused after a delete.
    let (_, body) = post_json(
        &server,
        "/api/menu/add",
        json!({"name": "Paratha", "category_code": 12, "price": 40}),
    )
    .await;
    assert_eq!(body["code"], 1214);

    let (status, _) = post_json(&server, "/api/menu/delete", json!({"ids": []})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_reservation_lifecycle() {
    let server = TestServer::start().await;

    let (status, body) = post_json(
        &server,
        "/api/reservation/create",
        json!({
            "name": "Karim",
            "phone": "01700000000",
            "guest_number": "4",
            "date": "2026-11-02",
            "time": "19:30",
            "table_number": [3, "5"]
        }),
    )
    .await;
    assert_eq!(status, 200);
    let id = body["id"].as_i64().expect("id");

    let (_, list) = get_json(&server, "/api/reservation").await;
    assert_eq!(list[0]["table_number"], "3, 5");
    assert_eq!(list[0]["guest_number"], 4);

    let resp = server
        .client
        .put(server.url(&format!("/api/reservation/update/{}", id)))
        .json(&json!({
            "name": "Karim",
            "phone": "01700000000",
            "guest_number": 6,
            "date": "2026-11-02",
            "time": "20:00",
            "table_number": ""
        }))
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status().as_u16(), 200);

    let (_, list) = get_json(&server, "/api/reservation").await;
    assert_eq!(list[0]["guest_number"], 6);
    assert_eq!(list[0]["table_number"], Value::Null);

    let (status, body) = post_json(
        &server,
        "/api/reservation/create",
        json!({"name": "Karim", "phone": "017"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Please fill in all required fields.");

    let delete = |id: i64| {
        server
            .client
            .delete(server.url(&format!("/api/reservation/delete/{}", id)))
            .send()
    };
    assert_eq!(delete(id).await.expect("delete").status().as_u16(), 200);
    assert_eq!(delete(id).await.expect("delete").status().as_u16(), 404);
}

#[tokio::test]
async fn test_signup_and_login() {
    let server = TestServer::start().await;

    let signup = json!({"name": "Nadia", "email": "Nadia@Example.com", "password": "s3cret"});
    let (status, body) = post_json(&server, "/signup", signup.clone()).await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = post_json(&server, "/signup", signup).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "Email already exists");

    let (status, _) = post_json(
        &server,
        "/login",
        json!({"email": "nadia@example.com", "password": "wrong"}),
    )
    .await;
    assert_eq!(status, 401);

    let (status, _) = post_json(
        &server,
        "/login",
        json!({"email": "nobody@example.com", "password": "s3cret"}),
    )
    .await;
    assert_eq!(status, 404);

    let (status, body) = post_json(
        &server,
        "/login",
        json!({"email": "NADIA@example.com", "password": "s3cret"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["email"], "nadia@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("password").is_none());

    let user = server
        .store
        .get_user_by_email("nadia@example.com")
        .expect("lookup")
        .expect("user");
    assert!(user.password_hash.starts_with("$2"));
}

#[tokio::test]
async fn test_login_accepts_addresses_created_outside_signup() {
    let server = TestServer::start().await;
    server
        .store
        .create_user(&NewUser {
            name: "Owner".to_string(),
            email: "admin@localhost".to_string(),
            password_hash: hash_password("hunter22").expect("hash"),
            role: Role::Admin,
        })
        .expect("create user");

    let (status, body) = post_json(
        &server,
        "/login",
        json!({"email": " Admin@Localhost ", "password": "hunter22"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["user"]["email"], "admin@localhost");
    assert_eq!(body["user"]["role"], 2);

    // Signup still insists on a well-formed address.
    let (status, _) = post_json(
        &server,
        "/signup",
        json!({"name": "Other", "email": "other@localhost", "password": "pw"}),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_checkout_proxy_keeps_cookies_from_redirects() {
    let server = TestServer::with_company_code("CHK01").await;

    let (status, body) = post_json(
        &server,
        "/api/proxy/place-order",
        json!({
            "cust_name": "Rahim",
            "phone": "01711111111",
            "address": "Road 11, Banani",
            "items": [{"id": 2, "qty": 1}]
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], true);
    assert_eq!(server.pos.order_attempts(), 1);
}

#[tokio::test]
async fn test_checkout_proxy_retries_expired_session() {
    let server = TestServer::with_company_code("CHK01").await;
    server.pos.expire_next_order();

    let (status, body) = post_json(
        &server,
        "/api/proxy/place-order",
        json!({
            "cust_name": "Rahim",
            "phone": "01711111111",
            "address": "Road 11, Banani",
            "items": [{"id": 1, "qty": 2}]
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["order_id"], 501);
    assert_eq!(server.pos.order_attempts(), 2);

    let orders = server.pos.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["company_code"], "CHK01");
}

#[tokio::test]
async fn test_checkout_validation_and_missing_code() {
    let server = TestServer::start().await;
    let order = json!({
        "cust_name": "Rahim",
        "phone": "017",
        "address": "Road 11",
        "items": [{"id": 1, "qty": 1}]
    });

    let (status, body) = post_json(&server, "/api/proxy/place-order", order.clone()).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Company Code missing from local DB");

    let mut no_address = order;
    no_address["address"] = json!("");
    let (status, _) = post_json(&server, "/api/proxy/place-order", no_address).await;
    assert_eq!(status, 400);
    assert_eq!(server.pos.order_attempts(), 0);
}

#[tokio::test]
async fn test_site_content() {
    let server = TestServer::start().await;

    let (status, hero) = get_json(&server, "/api/get-hero").await;
    assert_eq!(status, 200);
    assert_eq!(hero, Value::Null);

    let resp = server
        .client
        .post(server.url("/api/upload-hero"))
        .multipart(
            Form::new()
                .text("name", "Taste of Dhaka")
                .part("image", image_part("hero.jpg", b"hero-bytes")),
        )
        .send()
        .await
        .expect("upload hero");
    assert_eq!(resp.status().as_u16(), 201);

    let (_, hero) = get_json(&server, "/api/get-hero").await;
    assert_eq!(hero["name"], "Taste of Dhaka");
    let image = hero["image"].as_str().expect("hero image").to_string();
    assert!(server.upload_path(&format!("uploads/{}", image)).exists());

    let (status, _) = post_json(
        &server,
        "/api/write-review",
        json!({"review_text": "Great biryani", "rating": 5}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, _) = post_json(
        &server,
        "/api/write-review",
        json!({"review_text": "Meh", "rating": 9}),
    )
    .await;
    assert_eq!(status, 400);

    let (_, reviews) = get_json(&server, "/api/view-reviews").await;
    assert_eq!(reviews.as_array().expect("reviews").len(), 1);
    assert_eq!(reviews[0]["name"], "Anonymous");
}

#[tokio::test]
async fn test_about_replace_removes_previous_image() {
    let server = TestServer::start().await;

    let (_, about) = get_json(&server, "/api/view-about").await;
    assert_eq!(about["heading"], "Welcome");
    assert_eq!(about["image"], Value::Null);

    let post_about = |heading: &'static str, image: &'static [u8]| {
        server
            .client
            .post(server.url("/api/about/create"))
            .multipart(
                Form::new()
                    .text("heading", heading)
                    .text("text", "Family recipes since 1998")
                    .part("image", image_part("about.jpg", image)),
            )
            .send()
    };

    let resp = post_about("Our Story", b"first").await.expect("create about");
    assert_eq!(resp.status().as_u16(), 200);
    let (_, about) = get_json(&server, "/api/view-about").await;
    let first = about["image"].as_str().expect("about image").to_string();
    assert!(server.upload_path(&format!("uploads/{}", first)).exists());

    let resp = post_about("Our Kitchen", b"second").await.expect("replace about");
    assert_eq!(resp.status().as_u16(), 200);
    let (_, about) = get_json(&server, "/api/view-about").await;
    assert_eq!(about["heading"], "Our Kitchen");
    let second = about["image"].as_str().expect("about image").to_string();
    assert_ne!(first, second);
    assert!(server.upload_path(&format!("uploads/{}", second)).exists());
    assert!(!server.upload_path(&format!("uploads/{}", first)).exists());
}

#[tokio::test]
async fn test_table_layout_replace() {
    let server = TestServer::start().await;

    let (status, _) = post_json(
        &server,
        "/api/tables/update-layout",
        json!({"layout": [
            {"label": "T1", "table_number": 1, "capacity": 4, "shape": "round", "pos_x": 10, "pos_y": 20, "type": "table", "isBookable": true},
            {"label": "Bar", "type": "decor", "isBookable": false}
        ]}),
    )
    .await;
    assert_eq!(status, 200);

    let (_, layout) = get_json(&server, "/api/tables").await;
    let layout = layout.as_array().expect("layout");
    assert_eq!(layout.len(), 2);
    assert!(layout.iter().all(|item| item["id"].as_str().is_some_and(|id| !id.is_empty())));

    let (status, _) =
        post_json(&server, "/api/tables/update-layout", json!({"layout": "nope"})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_table_layout_accepts_loose_values() {
    let server = TestServer::start().await;

    let (status, _) = post_json(
        &server,
        "/api/tables/update-layout",
        json!({"layout": [
            {"id": "t1", "rotation": null, "capacity": null, "pos_x": null, "pos_y": "40",
             "width": null, "height": null, "type": "table", "isBookable": 1}
        ]}),
    )
    .await;
    assert_eq!(status, 200);

    let (_, layout) = get_json(&server, "/api/tables").await;
    let item = &layout[0];
    assert_eq!(item["id"], "t1");
    assert_eq!(item["rotation"], 0.0);
    assert_eq!(item["capacity"], 0);
    assert_eq!(item["pos_y"], 40.0);
    assert_eq!(item["width"], 100.0);
    assert_eq!(item["isBookable"], true);
}
