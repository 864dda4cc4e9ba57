//! HTTP round-trip tests for the auth and blog endpoints

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

use super::{build_router, AppState};
use crate::config::{AuthConfig, BlogConfig};
use crate::db::repositories::{SqlxBlogRepository, SqlxSessionRepository, SqlxUserRepository};
use crate::db::{create_test_pool, migrations};
use crate::services::{BlogService, UserService};

async fn test_server() -> TestServer {
    let pool = create_test_pool().await.expect("Failed to create test pool");
    migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        user_service: Arc::new(UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
        )),
        blog_service: Arc::new(BlogService::new(SqlxBlogRepository::boxed(pool.clone()))),
        auth: Arc::new(AuthConfig::default()),
        blog: Arc::new(BlogConfig::default()),
    };

    let app = build_router(state, "http://localhost:3000").expect("Failed to build router");
    TestServer::new(app).expect("Failed to start test server")
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    )
}

fn session_cookie(response: &TestResponse) -> String {
    let value = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a cookie")
        .to_str()
        .unwrap()
        .to_string();
    value
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("session="))
        .expect("cookie should carry the session token")
        .to_string()
}

async fn register(server: &TestServer, username: &str, password: &str) -> TestResponse {
    server
        .post("/auth/register")
        .json(&json!({ "username": username, "password": password }))
        .await
}

/// Register and return the session token
async fn signup(server: &TestServer, username: &str) -> String {
    let response = register(server, username, "password123").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    session_cookie(&response)
}

async fn create_blog(server: &TestServer, token: &str, title: &str) -> Value {
    let (name, value) = bearer(token);
    let response = server
        .post("/blog")
        .add_header(name, value)
        .json(&json!({ "title": title, "content": format!("{} body", title) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json::<Value>()["data"].clone()
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_auth_status_anonymous() {
    let server = test_server().await;

    let response = server.get("/auth").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["isLogin"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_register_logs_in() {
    let server = test_server().await;

    let response = register(&server, "alice", "password123").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["msg"], "register success");
    assert_eq!(body["isLogin"], true);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "admin");
    assert!(body["data"].get("passwordHash").is_none());

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains(&format!("Max-Age={}", 7 * 24 * 60 * 60)));

    let token = session_cookie(&response);
    let (name, value) = bearer(&token);
    let status = server.get("/auth").add_header(name, value).await;
    let body = status.json::<Value>();
    assert_eq!(body["isLogin"], true);
    assert_eq!(body["data"]["username"], "alice");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let server = test_server().await;
    signup(&server, "alice").await;

    let response = register(&server, "alice", "different1").await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let body = response.json::<Value>();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["msg"], "username already exist");
    assert_eq!(body["isLogin"], false);
}

#[tokio::test]
async fn test_register_validation() {
    let server = test_server().await;

    let response = register(&server, "", "password123").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "invalid username");

    let response = register(&server, "abcdefghijklmnop", "password123").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "invalid username");

    let response = register(&server, "bob", "12345").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "invalid password");

    // Missing fields count as empty
    let response = server.post("/auth/register").json(&json!({})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_flow() {
    let server = test_server().await;
    signup(&server, "alice").await;

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "password123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "login success");
    assert_eq!(body["isLogin"], true);
    assert!(!session_cookie(&response).is_empty());

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "alice", "password": "wrongpass" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["msg"], "incorrect password");

    let response = server
        .post("/auth/login")
        .json(&json!({ "username": "nobody", "password": "password123" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["msg"], "user does not exist");
}

#[tokio::test]
async fn test_session_cookie_is_accepted() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;

    let response = server
        .get("/auth")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("session={}", token)).unwrap(),
        )
        .await;
    assert_eq!(response.json::<Value>()["isLogin"], true);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;

    let (name, value) = bearer(&token);
    let response = server
        .get("/auth/logout")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["msg"], "logout success");
    assert_eq!(body["isLogin"], false);
    let cleared = response.headers().get(header::SET_COOKIE).unwrap();
    assert!(cleared.to_str().unwrap().contains("Max-Age=0"));

    let status = server
        .get("/auth")
        .add_header(name.clone(), value.clone())
        .await;
    assert_eq!(status.json::<Value>()["isLogin"], false);

    let again = server.get("/auth/logout").add_header(name, value).await;
    assert_eq!(again.status_code(), StatusCode::UNAUTHORIZED);
    let body = again.json::<Value>();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["msg"], "user not logged in");
}

#[tokio::test]
async fn test_logout_without_session() {
    let server = test_server().await;

    let response = server.get("/auth/logout").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["msg"], "user not logged in");
}

// ============================================================================
// Blog
// ============================================================================

#[tokio::test]
async fn test_create_blog_requires_login() {
    let server = test_server().await;

    let response = server
        .post("/blog")
        .json(&json!({ "title": "t", "content": "c" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["msg"], "user not logged in");

    let (name, value) = bearer("not-a-real-token");
    let response = server
        .post("/blog")
        .add_header(name, value)
        .json(&json!({ "title": "t", "content": "c" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_then_get_blog() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;

    let (name, value) = bearer(&token);
    let response = server
        .post("/blog")
        .add_header(name, value)
        .json(&json!({
            "title": "Hello",
            "content": "Some content",
            "description": "Short"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let created = response.json::<Value>()["data"].clone();
    let id = created["id"].as_i64().unwrap();

    let fetched = server.get(&format!("/blog/{}", id)).await;
    assert_eq!(fetched.status_code(), StatusCode::OK);
    let blog = fetched.json::<Value>()["data"].clone();
    assert_eq!(blog["title"], "Hello");
    assert_eq!(blog["content"], "Some content");
    assert_eq!(blog["description"], "Short");
    assert_eq!(blog["userId"], created["userId"]);
    assert_eq!(blog["user"]["username"], "alice");
}

#[tokio::test]
async fn test_get_missing_blog() {
    let server = test_server().await;

    let response = server.get("/blog/12345").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>()["status"], "fail");
}

#[tokio::test]
async fn test_create_blog_validation() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;

    let (name, value) = bearer(&token);
    let response = server
        .post("/blog")
        .add_header(name, value)
        .json(&json!({ "title": "", "content": "body" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blog_list_pagination() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;
    for i in 1..=5 {
        create_blog(&server, &token, &format!("Post {}", i)).await;
    }

    let response = server.get("/blog?page=2&pageSize=2").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 2);
    assert_eq!(body["totalPage"], 3);

    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Post 3", "Post 2"]);

    let defaults = server.get("/blog").await.json::<Value>();
    assert_eq!(defaults["page"], 1);
    assert_eq!(defaults["data"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_blog_list_bad_query_values() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;
    create_blog(&server, &token, "Only post").await;

    let response = server.get("/blog?page=-1").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["page"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let response = server.get("/blog?pageSize=abc").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["msg"], "invalid query");
}

#[tokio::test]
async fn test_non_numeric_blog_id_is_rejected_with_envelope() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;

    let response = server.get("/blog/abc").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "fail");
    assert_eq!(body["msg"], "invalid blog id");

    let (name, value) = bearer(&token);
    let response = server.delete("/blog/abc").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["msg"], "invalid blog id");
}

#[tokio::test]
async fn test_blog_list_by_user() {
    let server = test_server().await;
    let alice = signup(&server, "alice").await;
    let bob = signup(&server, "bob").await;

    create_blog(&server, &alice, "a1").await;
    create_blog(&server, &alice, "a2").await;
    let b1 = create_blog(&server, &bob, "b1").await;
    let bob_id = b1["userId"].as_i64().unwrap();

    let body = server
        .get(&format!("/blog?userId={}", bob_id))
        .await
        .json::<Value>();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["title"], "b1");
}

#[tokio::test]
async fn test_update_and_delete_permissions() {
    let server = test_server().await;
    let admin = signup(&server, "admin").await;
    let alice = signup(&server, "alice").await;
    let bob = signup(&server, "bob").await;

    let blog = create_blog(&server, &alice, "Mine").await;
    let path = format!("/blog/{}", blog["id"]);
    let edit = json!({ "title": "Edited", "content": "new body" });

    let (name, value) = bearer(&bob);
    let response = server
        .patch(&path)
        .add_header(name.clone(), value.clone())
        .json(&edit)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let response = server.delete(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(&alice);
    let response = server.patch(&path).add_header(name, value).json(&edit).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["data"]["title"], "Edited");
    assert_eq!(body["data"]["description"], "new body");

    // The first account is an admin and may delete anyone's post
    let (name, value) = bearer(&admin);
    let response = server.delete(&path).add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["msg"], "deleted");

    assert_eq!(server.get(&path).await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_missing_blog() {
    let server = test_server().await;
    let token = signup(&server, "alice").await;

    let (name, value) = bearer(&token);
    let response = server
        .patch("/blog/999")
        .add_header(name, value)
        .json(&json!({ "title": "t", "content": "c" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
