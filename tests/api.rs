//! API endpoint integration tests

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use secrecy::SecretString;
use tokio::sync::RwLock;
use tower::ServiceExt;

use lingo_gateway::config::AuthSettings;
use lingo_gateway::db::{NewUser, UserRepo};
use lingo_gateway::security::TokenService;
use lingo_gateway::tutor::TutorDefaults;
use lingo_gateway::DbPool;

mod common;
use common::setup_test_db;

fn token_service() -> TokenService {
    TokenService::new(&AuthSettings {
        jwt_secret: SecretString::from("api-test-secret"),
        token_ttl_minutes: 30,
    })
}

/// Build a test API router with no external clients configured
fn build_test_router(db: DbPool) -> axum::Router {
    use axum::Router;

    let user_repo = UserRepo::new(db.clone());

    let state = Arc::new(lingo_gateway::api::ApiState {
        db,
        user_repo,
        tokens: token_service(),
        pipeline: None,
        stt: None,
        tts: None,
        sessions: Arc::new(RwLock::new(HashMap::new())),
        tutor_defaults: TutorDefaults::default(),
    });

    Router::new()
        .nest("/api/auth", lingo_gateway::api::auth::router(state.clone()))
        .nest("/api/admin", lingo_gateway::api::admin::router(state.clone()))
        .nest("/api/chat", lingo_gateway::api::chat::router(state.clone()))
        .nest("/api/voice", lingo_gateway::api::voice::router(state.clone()))
        .merge(lingo_gateway::api::health::router())
        .merge(lingo_gateway::api::health::ready_router(state))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_test_router(setup_test_db());

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_ready_degraded_without_completion_key() {
    let app = build_test_router(setup_test_db());

    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["completion"]["status"], "unavailable");
}

#[tokio::test]
async fn test_chat_option_lists() {
    let app = build_test_router(setup_test_db());

    let response = app.clone().oneshot(get("/api/chat/topics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["topics"].as_array().unwrap().len(), 6);

    let response = app.clone().oneshot(get("/api/chat/personas")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["personas"].as_array().unwrap().len(), 3);

    let response = app.clone().oneshot(get("/api/chat/levels")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["levels"].as_array().unwrap().len(), 3);

    let response = app.oneshot(get("/api/chat/languages")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["languages"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_send_unconfigured_is_503() {
    let app = build_test_router(setup_test_db());

    let response = app
        .oneshot(post_json(
            "/api/chat/send",
            &serde_json::json!({ "message": "Hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn test_voice_capabilities_unconfigured() {
    let app = build_test_router(setup_test_db());

    let response = app.oneshot(get("/api/voice/capabilities")).await.unwrap();
    let json = body_json(response).await;
    assert_eq!(json["stt_available"], false);
    assert_eq!(json["tts_available"], false);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_generically() {
    let db = setup_test_db();
    common::create_test_user(&db, "learner", "s3cret");
    let app = build_test_router(db);

    // Unknown user and wrong password get the same response
    for (username, password) in [("ghost", "s3cret"), ("learner", "wrong")] {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                &serde_json::json!({ "username": username, "password": password }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "invalid username or password");
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let app = build_test_router(setup_test_db());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            &serde_json::json!({
                "username": "newbie",
                "email": "newbie@example.com",
                "password": "pass-phrase",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["username"], "newbie");
    assert_eq!(json["user"]["is_admin"], false);

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({ "username": "newbie", "password": "pass-phrase" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_guarded() {
    let db = setup_test_db();
    let repo = UserRepo::new(db.clone());

    repo.create(&NewUser {
        username: "root".to_string(),
        password: "admin-pass".to_string(),
        email: None,
        full_name: None,
        is_admin: true,
    })
    .unwrap();
    let member = common::create_test_user(&db, "member", "member-pass");

    let app = build_test_router(db);
    let tokens = token_service();

    // No token
    let response = app.clone().oneshot(get("/api/admin/users")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Non-admin token
    let member_token = tokens.issue("member", member.id).unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .header("authorization", format!("Bearer {member_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Admin token, acquired through the login flow
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &serde_json::json!({ "username": "root", "password": "admin-pass" }),
        ))
        .await
        .unwrap();
    let admin_token = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/users")
                .header("authorization", format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
}
