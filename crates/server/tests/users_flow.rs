use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::routes;
use server::state::{AppState, CookieSettings};
use service::auth::domain::RegisterInput;
use service::auth::repository::mock::MockUserRepository;
use service::auth::repository::UserRepository;
use service::auth::{AccountService, PasswordHasher, TokenIssuer};
use service::catalog::domain::{ProductDetail, ProductView, ReviewView};
use service::catalog::repository::mock::InMemoryProductRepository;
use service::catalog::repository::ProductRepository;
use service::catalog::CatalogService;

const SECRET: &[u8] = b"router-test-secret";

struct TestApp {
    router: Router,
    state: AppState,
    products: Arc<InMemoryProductRepository>,
}

fn build_app() -> TestApp {
    let users: Arc<dyn UserRepository> = Arc::new(MockUserRepository::default());
    let products = Arc::new(InMemoryProductRepository::default());
    let catalog_repo: Arc<dyn ProductRepository> = products.clone();
    let hasher = PasswordHasher::with_params(1024, 1, 1).expect("argon2 params");
    let accounts = AccountService::new(users, hasher, Arc::new(TokenIssuer::with_default_ttl(SECRET)));
    let state = AppState::new(accounts, CatalogService::new(catalog_repo), CookieSettings::default());
    let router = routes::build_router(state.clone(), CorsLayer::very_permissive());
    TestApp { router, state, products }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Value,
}

impl Reply {
    /// `name=value` pair of the Set-Cookie header.
    fn cookie(&self) -> String {
        let raw = self.headers.get(header::SET_COOKIE).expect("set-cookie").to_str().unwrap();
        raw.split(';').next().unwrap().to_string()
    }

    fn set_cookie(&self) -> String {
        self.headers.get(header::SET_COOKIE).expect("set-cookie").to_str().unwrap().to_string()
    }
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>, cookie: Option<&str>) -> Reply {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        req = req.header(header::COOKIE, c);
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
    Reply { status, headers, body }
}

async fn register(app: &TestApp, name: &str, email: &str, password: &str) -> Reply {
    send(app, Method::POST, "/api/users", Some(json!({"name": name, "email": email, "password": password})), None).await
}

async fn login(app: &TestApp, email: &str, password: &str) -> Reply {
    send(app, Method::POST, "/api/users/auth", Some(json!({"email": email, "password": password})), None).await
}

/// Provision an administrator and return its session cookie.
async fn admin_cookie(app: &TestApp) -> String {
    let input = RegisterInput { name: "Root".into(), email: "root@x.com".into(), password: "Rr1!rrrr".into() };
    app.state.accounts.provision(input, true).await.unwrap();
    let reply = login(app, "root@x.com", "Rr1!rrrr").await;
    assert_eq!(reply.status, StatusCode::OK);
    reply.cookie()
}

#[tokio::test]
async fn register_login_update_delete_scenario() {
    let app = build_app();
    let admin = admin_cookie(&app).await;

    let reg = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await;
    assert_eq!(reg.status, StatusCode::CREATED);
    assert_eq!(reg.body["isAdmin"], json!(false));
    assert!(reg.body.get("password").is_none());
    let ann_id = reg.body["id"].as_str().unwrap().to_string();

    let auth = login(&app, "ann@x.com", "Aa1!aaaa").await;
    assert_eq!(auth.status, StatusCode::OK);
    assert_eq!(auth.body["id"], json!(ann_id));
    let ann = auth.cookie();

    let bad = send(&app, Method::PUT, "/api/users/profile", Some(json!({"email": "bad"})), Some(&ann)).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["message"], "Invalid email");

    let del = send(&app, Method::DELETE, &format!("/api/users/{ann_id}"), None, Some(&admin)).await;
    assert_eq!(del.status, StatusCode::OK);
    assert_eq!(del.body, json!({"message": "User removed successfully"}));

    let gone = send(&app, Method::GET, &format!("/api/users/{ann_id}"), None, Some(&admin)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["message"], "User not found");
}

#[tokio::test]
async fn session_cookie_is_http_only_and_strict() {
    let app = build_app();
    let reg = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await;
    let set_cookie = reg.set_cookie();
    assert!(set_cookie.starts_with("jwt="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Max-Age=2592000"));
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = build_app();
    register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await;
    let again = register(&app, "Other", "ANN@x.com", "Bb2@bbbb").await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.body["message"], "User already exists");
    assert!(again.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn weak_password_is_rejected() {
    let app = build_app();
    let reply = register(&app, "Ann", "ann@x.com", "password").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["message"], "Min 8 chars for password, upper, lower, number and symbol");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let app = build_app();
    register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await;
    let wrong = login(&app, "ann@x.com", "Zz9?zzzz").await;
    let unknown = login(&app, "nobody@x.com", "Aa1!aaaa").await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, unknown.body);
    assert_eq!(wrong.body["message"], "Invalid email or password");
}

#[tokio::test]
async fn profile_requires_a_valid_token() {
    let app = build_app();
    let none = send(&app, Method::GET, "/api/users/profile", None, None).await;
    assert_eq!(none.status, StatusCode::UNAUTHORIZED);
    assert_eq!(none.body["message"], "Not authorized, no token");

    let forged = send(&app, Method::GET, "/api/users/profile", None, Some("jwt=not.a.token")).await;
    assert_eq!(forged.status, StatusCode::UNAUTHORIZED);
    assert_eq!(forged.body["message"], "Not authorized, token failed");
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = build_app();
    let reg = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await;
    let id = Uuid::parse_str(reg.body["id"].as_str().unwrap()).unwrap();
    let old = TokenIssuer::with_default_ttl(SECRET)
        .issue_at(id, Utc::now() - chrono::Duration::days(31))
        .unwrap();
    let reply = send(&app, Method::GET, "/api/users/profile", None, Some(&format!("jwt={}", old.value))).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let app = build_app();
    register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await;
    let cookie = login(&app, "ann@x.com", "Aa1!aaaa").await.cookie();
    let token = cookie.trim_start_matches("jwt=");

    let req = Request::builder()
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let resp = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn profile_update_ignores_admin_flag() {
    let app = build_app();
    let cookie = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await.cookie();
    let reply = send(
        &app,
        Method::PUT,
        "/api/users/profile",
        Some(json!({"name": "Annie", "isAdmin": true})),
        Some(&cookie),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["name"], "Annie");
    assert_eq!(reply.body["isAdmin"], json!(false));

    let profile = send(&app, Method::GET, "/api/users/profile", None, Some(&cookie)).await;
    assert_eq!(profile.body["name"], "Annie");
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let app = build_app();
    let cookie = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await.cookie();
    let reply = send(&app, Method::GET, "/api/users", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.body["message"], "Not authorized as admin");

    let anon = send(&app, Method::GET, "/api/users", None, None).await;
    assert_eq!(anon.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_lists_updates_and_cannot_delete_admins() {
    let app = build_app();
    let admin = admin_cookie(&app).await;
    let ann_id = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await.body["id"].as_str().unwrap().to_string();

    let list = send(&app, Method::GET, "/api/users", None, Some(&admin)).await;
    assert_eq!(list.status, StatusCode::OK);
    let users = list.body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password").is_none() && u.get("passwordHash").is_none()));

    let promoted = send(&app, Method::PUT, &format!("/api/users/{ann_id}"), Some(json!({"isAdmin": true})), Some(&admin)).await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["isAdmin"], json!(true));

    let refused = send(&app, Method::DELETE, &format!("/api/users/{ann_id}"), None, Some(&admin)).await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(refused.body["message"], "Can not delete admin user");

    // an update without isAdmin clears the flag
    let renamed = send(&app, Method::PUT, &format!("/api/users/{ann_id}"), Some(json!({"name": "Annie"})), Some(&admin)).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.body["isAdmin"], json!(false));
    let removed = send(&app, Method::DELETE, &format!("/api/users/{ann_id}"), None, Some(&admin)).await;
    assert_eq!(removed.status, StatusCode::OK);

    let missing = send(&app, Method::PUT, &format!("/api/users/{}", Uuid::new_v4()), Some(json!({"name": "X"})), Some(&admin)).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = build_app();
    let cookie = register(&app, "Ann", "ann@x.com", "Aa1!aaaa").await.cookie();
    let reply = send(&app, Method::POST, "/api/users/logout", None, Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["message"], "User logged out");
    let set_cookie = reply.set_cookie();
    assert!(set_cookie.starts_with("jwt=;"));
    assert!(set_cookie.contains("Max-Age=0"));

    // idempotent without a session
    let again = send(&app, Method::POST, "/api/users/logout", None, None).await;
    assert_eq!(again.status, StatusCode::OK);
}

async fn send_raw(app: &TestApp, uri: &str, content_type: Option<&str>, body: &'static str) -> (StatusCode, Value) {
    let mut req = Request::builder().method(Method::POST).uri(uri);
    if let Some(ct) = content_type {
        req = req.header(header::CONTENT_TYPE, ct);
    }
    let resp = app.router.clone().oneshot(req.body(Body::from(body)).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let app = build_app();
    let (status, body) = send_raw(&app, "/api/users/auth", Some("application/json"), "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn body_shape_errors_are_400() {
    let app = build_app();

    // missing password
    let (status, body) =
        send_raw(&app, "/api/users", Some("application/json"), r#"{"name":"Ann","email":"ann@x.com"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("password"));

    // wrong field type
    let (status, _) =
        send_raw(&app, "/api/users/auth", Some("application/json"), r#"{"email":"ann@x.com","password":7}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // no content type
    let (status, body) =
        send_raw(&app, "/api/users", None, r#"{"name":"Ann","email":"ann@x.com","password":"Aa1!aaaa"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    // nothing was created along the way
    let attempt = login(&app, "ann@x.com", "Aa1!aaaa").await;
    assert_eq!(attempt.status, StatusCode::UNAUTHORIZED);
}

fn product(name: &str, ratings: &[i32]) -> ProductDetail {
    let now = Utc::now();
    ProductDetail {
        product: ProductView {
            id: Uuid::new_v4(),
            user_id: Some(Uuid::new_v4()),
            name: name.into(),
            image: "/images/p.jpg".into(),
            brand: "Brand".into(),
            category: "Electronics".into(),
            description: "desc".into(),
            price: Decimal::new(4999, 2),
            rating: 0.0,
            num_reviews: ratings.len() as i32,
            count_in_stock: 7,
            created_at: now,
            updated_at: now,
        },
        reviews: ratings
            .iter()
            .map(|r| ReviewView {
                id: Uuid::new_v4(),
                user_id: Some(Uuid::new_v4()),
                name: "Reviewer".into(),
                rating: *r,
                comment: "ok".into(),
                created_at: now,
            })
            .collect(),
    }
}

#[tokio::test]
async fn products_are_public_and_paged() {
    let app = build_app();
    for i in 0..3 {
        app.products.insert(product(&format!("p{i}"), &[]));
    }
    let page = send(&app, Method::GET, "/api/products?page=2&perPage=2", None, None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["page"], 2);
    assert_eq!(page.body["perPage"], 2);
    assert_eq!(page.body["products"].as_array().unwrap().len(), 1);
    assert_eq!(page.body["products"][0]["name"], "p2");

    let defaults = send(&app, Method::GET, "/api/products", None, None).await;
    assert_eq!(defaults.body["perPage"], 20);
    assert_eq!(defaults.body["total"], 3);
}

#[tokio::test]
async fn product_detail_and_not_found() {
    let app = build_app();
    let p = product("cam", &[5, 4]);
    let id = p.product.id;
    app.products.insert(p);

    let detail = send(&app, Method::GET, &format!("/api/products/{id}"), None, None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["name"], "cam");
    assert_eq!(detail.body["price"], "49.99");
    assert_eq!(detail.body["reviews"].as_array().unwrap().len(), 2);

    let missing = send(&app, Method::GET, &format!("/api/products/{}", Uuid::new_v4()), None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["message"], "Product not found");

    let bad_id = send(&app, Method::GET, "/api/products/not-a-uuid", None, None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_openapi_are_served() {
    let app = build_app();
    let health = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(health.body, json!({"status": "ok"}));

    let doc = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(doc.status, StatusCode::OK);
    assert!(doc.body["paths"]["/api/users/auth"].is_object());
}
