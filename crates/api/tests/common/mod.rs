//! Shared helpers for the API integration tests.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use coursely_api::auth::jwt::{generate_access_token, JwtConfig};
use coursely_api::auth::password::hash_password;
use coursely_api::config::{GatewayConfig, ServerConfig};
use coursely_api::router::build_app_router;
use coursely_api::state::AppState;
use coursely_core::payments::OrderStatus;
use coursely_core::roles::Role;
use coursely_db::models::activity::{CreateActivity, CreateSubActivity, SubActivity};
use coursely_db::models::course::{Course, CreateCourse};
use coursely_db::models::order::{CreateOrder, Order};
use coursely_db::models::user::{CreateUser, UpdateUser, User};
use coursely_db::repositories::{
    ActivityRepo, CourseRepo, OrderRepo, SubActivityRepo, UserRepo,
};

pub const TEST_PASSWORD: &str = "test_password_123!";
pub const CHAPA_WEBHOOK_SECRET: &str = "chapa_webhook_secret";
pub const STRIPE_WEBHOOK_SECRET: &str = "whsec_stripe_test";

/// Build a test `ServerConfig` with safe defaults.
///
/// Both gateways are configured with webhook secrets; their API clients
/// point at the real providers and are never called unless a test
/// replaces them in [`AppState`].
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        public_base_url: "http://localhost:3000".to_string(),
        chapa: Some(GatewayConfig {
            secret_key: "CHASECK_TEST-key".to_string(),
            webhook_secret: CHAPA_WEBHOOK_SECRET.to_string(),
        }),
        stripe: Some(GatewayConfig {
            secret_key: "sk_test_key".to_string(),
            webhook_secret: STRIPE_WEBHOOK_SECRET.to_string(),
        }),
        telegram_bot_token: None,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config())
}

/// Build the full application router (same middleware stack as `main.rs`).
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_with_state(test_state(pool))
}

pub fn build_app_with_state(state: AppState) -> Router {
    let config = state.config.as_ref().clone();
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::post(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::put(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::delete(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// POST a raw body with extra headers (webhooks).
pub async fn post_raw(
    app: Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: &[u8],
) -> Response {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::from(body.to_vec())).unwrap()).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Assert the status and return the JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_user(pool: &PgPool, name: &str, role: Role) -> User {
    let input = CreateUser {
        full_name: format!("{name} Tester"),
        email: format!("{name}@test.com"),
        phone: None,
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role_id: role.id(),
        referral_code: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Give `user` an affiliate referral code.
pub async fn set_referral_code(pool: &PgPool, user: &User, code: &str) -> User {
    let input = UpdateUser {
        referral_code: Some(code.to_string()),
        ..Default::default()
    };
    UserRepo::update(pool, user.id, &input)
        .await
        .expect("user update should succeed")
        .expect("user should exist")
}

/// Access token for `user`, signed with the test secret.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, user.role().unwrap(), &test_config().jwt)
        .expect("token generation should succeed")
}

pub async fn create_course(
    pool: &PgPool,
    instructor: &User,
    title: &str,
    price_etb: i64,
    price_usd: i64,
) -> Course {
    let input = CreateCourse {
        title: title.to_string(),
        description: Some(format!("All about {title}")),
        thumbnail_url: None,
        price_etb,
        price_usd,
        is_published: Some(true),
    };
    CourseRepo::create(pool, instructor.id, &input)
        .await
        .expect("course creation should succeed")
}

/// Add one section with `count` lessons; returns the lessons in order.
pub async fn add_lessons(pool: &PgPool, course: &Course, count: usize) -> Vec<SubActivity> {
    let activity = ActivityRepo::create(
        pool,
        course.id,
        &CreateActivity {
            title: "Section 1".to_string(),
            position: None,
        },
    )
    .await
    .expect("activity creation should succeed");

    let mut lessons = Vec::with_capacity(count);
    for i in 1..=count {
        let lesson = SubActivityRepo::create(
            pool,
            activity.id,
            &CreateSubActivity {
                title: format!("Lesson {i}"),
                video_url: None,
                content: Some("Body".to_string()),
                position: None,
                duration_secs: None,
            },
        )
        .await
        .expect("lesson creation should succeed");
        lessons.push(lesson);
    }
    lessons
}

/// Insert an order directly, bypassing the gateways.
pub async fn create_order(
    pool: &PgPool,
    buyer: &User,
    course: &Course,
    status: OrderStatus,
    tx_ref: Option<&str>,
) -> Order {
    let input = CreateOrder {
        user_id: buyer.id,
        course_id: course.id,
        seller_id: None,
        currency: "ETB".to_string(),
        amount: course.price_etb,
        status,
        tx_ref: tx_ref.map(str::to_string),
        code: None,
        paid_at: (status == OrderStatus::Paid).then(Utc::now),
    };
    OrderRepo::create(pool, &input)
        .await
        .expect("order creation should succeed")
}
