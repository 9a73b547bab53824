mod common;

use actix_web::test;
use serde_json::{json, Value};

#[actix_web::test]
async fn register_then_login() {
    let st = common::setup().await;
    let app = crate::init_app!(&st);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"username": "alice", "email": "alice@example.org", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["accessToken"].is_string());
    assert_eq!(body["user"]["username"], "alice");

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"username": "alice", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = test::read_body_json(resp).await;
    let token = body["accessToken"].as_str().unwrap().to_owned();

    // the token actually works
    let req = test::TestRequest::get()
        .uri("/channels/mine")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
}

#[actix_web::test]
async fn register_rejects_weak_credentials_and_duplicates() {
    let st = common::setup().await;
    let app = crate::init_app!(&st);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"username": "al", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"username": "alice", "password": "short"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);

    common::seed_user(&st, "alice").await;
    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({"username": "alice", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "username already taken");
}

#[actix_web::test]
async fn login_rejects_wrong_passwords() {
    let st = common::setup().await;
    common::seed_user(&st, "alice").await;
    let app = crate::init_app!(&st);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"username": "alice", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({"username": "nobody", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 401);
}
