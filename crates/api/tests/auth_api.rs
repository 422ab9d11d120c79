//! HTTP-level integration tests for the auth endpoints and RBAC.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, get_auth, post_json, post_json_auth, TEST_PASSWORD};
use coursely_core::roles::Role;
use sqlx::PgPool;

async fn login(app: axum::Router, email: &str, password: &str) -> axum::response::Response {
    let body = serde_json::json!({ "email": email, "password": password });
    post_json(app, "/api/v1/auth/login", body).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_creates_student_and_returns_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "full_name": "Abebe Kebede",
        "email": "abebe@test.com",
        "password": "long-enough-password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["role"], "student");
    assert_eq!(json["user"]["email"], "abebe@test.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_rejects_bad_email_and_short_password(pool: PgPool) {
    let app = common::build_test_app(pool);

    let bad_email = serde_json::json!({
        "full_name": "X", "email": "not-an-email", "password": "long-enough-password",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", bad_email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let short = serde_json::json!({
        "full_name": "X", "email": "x@test.com", "password": "short",
    });
    let response = post_json(app, "/api/v1/auth/register", short).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn register_duplicate_email_is_conflict(pool: PgPool) {
    create_user(&pool, "taken", Role::Student).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "full_name": "Again", "email": "TAKEN@test.com", "password": "long-enough-password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_success_and_me(pool: PgPool) {
    let user = create_user(&pool, "loginuser", Role::Instructor).await;
    let app = common::build_test_app(pool);

    let response = login(app.clone(), "loginuser@test.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], user.id);
    assert_eq!(json["user"]["role"], "instructor");

    let token = json["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/auth/me", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["data"]["email"], "loginuser@test.com");
    assert_eq!(me["data"]["telegram_linked"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_wrong_password_is_unauthorized(pool: PgPool) {
    create_user(&pool, "wrongpw", Role::Student).await;
    let app = common::build_test_app(pool);

    let response = login(app, "wrongpw@test.com", "incorrect_password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn account_locks_after_repeated_failures(pool: PgPool) {
    create_user(&pool, "locked", Role::Student).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let response = login(app.clone(), "locked@test.com", "nope-nope-nope").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    // Even the right password is refused while locked.
    let response = login(app, "locked@test.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "ACCOUNT_LOCKED");
    assert!(json["error"].as_str().unwrap().contains("Try again in"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    create_user(&pool, "rotator", Role::Student).await;
    let app = common::build_test_app(pool);

    let json = body_json(login(app.clone(), "rotator@test.com", TEST_PASSWORD).await).await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], json["refresh_token"]);

    // The old refresh token is single-use.
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    create_user(&pool, "leaver", Role::Student).await;
    let app = common::build_test_app(pool);

    let json = body_json(login(app.clone(), "leaver@test.com", TEST_PASSWORD).await).await;
    let access = json["access_token"].as_str().unwrap();

    let response =
        post_json_auth(app.clone(), "/api/v1/auth/logout", access, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": json["refresh_token"] });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn manager_routes_require_manager_role(pool: PgPool) {
    let student = create_user(&pool, "student", Role::Student).await;
    let manager = create_user(&pool, "boss", Role::Manager).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/v1/manager/users", &common::token_for(&student)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), "/api/v1/manager/users", &common::token_for(&manager)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = common::get(app, "/api/v1/manager/users").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn role_directory_counts_active_accounts(pool: PgPool) {
    let manager = create_user(&pool, "boss", Role::Manager).await;
    create_user(&pool, "one", Role::Student).await;
    create_user(&pool, "two", Role::Student).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/manager/roles", &common::token_for(&manager)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let roles = json["data"].as_array().unwrap();
    assert_eq!(roles.len(), 4);
    assert_eq!(roles[0]["name"], "manager");
    assert_eq!(roles[0]["active_users"], 1);
    assert_eq!(roles[3]["name"], "student");
    assert_eq!(roles[3]["active_users"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sessions_record_the_signing_in_device(pool: PgPool) {
    use axum::body::Body;
    use axum::http::Request;

    create_user(&pool, "device", Role::Student).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "device@test.com", "password": TEST_PASSWORD });
    let request = Request::post("/api/v1/auth/login")
        .header("content-type", "application/json")
        .header("user-agent", "CourselyMobile/2.1")
        .header("x-forwarded-for", "196.188.4.7, 10.0.0.1")
        .body(Body::from(body.to_string()))
        .unwrap();
    let json = body_json(common::send(app.clone(), request).await).await;
    let token = json["access_token"].as_str().unwrap();

    // A second login without device headers.
    login(app.clone(), "device@test.com", TEST_PASSWORD).await;

    let response = get_auth(app, "/api/v1/auth/sessions", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let sessions = body_json(response).await["data"].as_array().unwrap().clone();
    assert_eq!(sessions.len(), 2);
    let mobile = sessions
        .iter()
        .find(|s| s["user_agent"] == "CourselyMobile/2.1")
        .expect("mobile session listed");
    assert_eq!(mobile["ip_address"], "196.188.4.7");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn telegram_link_code_belongs_to_the_caller(pool: PgPool) {
    use coursely_core::link_codes::hash_link_code;
    use coursely_db::repositories::{TelegramLinkRepo, UserRepo};

    let student = create_user(&pool, "linker", Role::Student).await;
    let app = common::build_test_app(pool.clone());
    let uri = "/api/v1/me/telegram/link-code";

    let response = post_json(app.clone(), uri, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = common::token_for(&student);
    let response = post_json_auth(app.clone(), uri, &token, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let code = json["data"]["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 32);
    assert_eq!(json["data"]["command"], format!("/link {code}"));
    assert!(json["data"]["expires_at"].is_string());

    let hash = hash_link_code(&code);
    assert_eq!(TelegramLinkRepo::redeem(&pool, &hash).await.unwrap(), Some(student.id));
    assert_eq!(TelegramLinkRepo::redeem(&pool, &hash).await.unwrap(), None);

    UserRepo::link_telegram(&pool, student.id, 4242).await.unwrap();
    let response = post_json_auth(app, uri, &token, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}
