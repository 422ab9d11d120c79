//! Catalog and course authoring endpoints.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_course, create_user, delete_auth, expect_json, get, post_json_auth,
    put_json_auth, token_for,
};
use coursely_core::roles::Role;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn guests_see_only_published_courses(pool: PgPool) {
    let instructor = create_user(&pool, "tutor", Role::Instructor).await;
    let published = create_course(&pool, &instructor, "Rust 101", 50_000, 2_000).await;
    let app = common::build_test_app(pool);

    let draft = serde_json::json!({ "title": "Draft course", "price_etb": 100 });
    let response =
        post_json_auth(app.clone(), "/api/v1/courses", &token_for(&instructor), draft).await;
    let draft = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(draft["data"]["is_published"], false);

    let json = expect_json(get(app.clone(), "/api/v1/courses").await, StatusCode::OK).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Rust 101"]);
    assert_eq!(json["data"][0]["instructor_name"], "tutor Tester");

    let response = get(app.clone(), &format!("/api/v1/courses/{}", published.id)).await;
    let detail = expect_json(response, StatusCode::OK).await;
    assert_eq!(detail["data"]["rating_count"], 0);
    assert!(detail["data"]["sections"].as_array().unwrap().is_empty());

    let draft_id = draft["data"]["id"].as_i64().unwrap();
    let response = get(app, &format!("/api/v1/courses/{draft_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn catalog_search_filters_by_title(pool: PgPool) {
    let instructor = create_user(&pool, "tutor", Role::Instructor).await;
    create_course(&pool, &instructor, "Rust for beginners", 100, 0).await;
    create_course(&pool, &instructor, "Cooking injera", 100, 0).await;
    let app = common::build_test_app(pool);

    let json = expect_json(get(app, "/api/v1/courses?search=rust").await, StatusCode::OK).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["title"], "Rust for beginners");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn students_cannot_create_courses(pool: PgPool) {
    let student = create_user(&pool, "student", Role::Student).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "title": "Nope" });
    let response = post_json_auth(app, "/api/v1/courses", &token_for(&student), body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn negative_price_is_rejected(pool: PgPool) {
    let instructor = create_user(&pool, "tutor", Role::Instructor).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "title": "Cheap", "price_etb": -1 });
    let response = post_json_auth(app, "/api/v1/courses", &token_for(&instructor), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_the_owner_edits_a_course(pool: PgPool) {
    let owner = create_user(&pool, "owner", Role::Instructor).await;
    let other = create_user(&pool, "other", Role::Instructor).await;
    let manager = create_user(&pool, "boss", Role::Manager).await;
    let course = create_course(&pool, &owner, "Owned", 100, 0).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/courses/{}", course.id);

    let body = serde_json::json!({ "title": "Hijacked" });
    let response = put_json_auth(app.clone(), &uri, &token_for(&other), body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = serde_json::json!({ "title": "Renamed" });
    let response = put_json_auth(app.clone(), &uri, &token_for(&owner), body).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"]["title"], "Renamed");

    // Managers may edit any course.
    let body = serde_json::json!({ "price_usd": 1_500 });
    let response = put_json_auth(app, &uri, &token_for(&manager), body).await;
    let json = expect_json(response, StatusCode::OK).await;
    assert_eq!(json["data"]["price_usd"], 1_500);
    assert_eq!(json["data"]["title"], "Renamed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_courses_disappear(pool: PgPool) {
    let owner = create_user(&pool, "owner", Role::Instructor).await;
    let course = create_course(&pool, &owner, "Short lived", 100, 0).await;
    let app = common::build_test_app(pool);
    let uri = format!("/api/v1/courses/{}", course.id);

    let response = delete_auth(app.clone(), &uri, &token_for(&owner)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(get(app.clone(), &uri).await.status(), StatusCode::NOT_FOUND);
    let response = delete_auth(app, &uri, &token_for(&owner)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn outline_is_built_through_the_api(pool: PgPool) {
    let owner = create_user(&pool, "owner", Role::Instructor).await;
    let course = create_course(&pool, &owner, "Structured", 100, 0).await;
    let app = common::build_test_app(pool);
    let token = token_for(&owner);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/courses/{}/activities", course.id),
        &token,
        serde_json::json!({ "title": "Basics" }),
    )
    .await;
    let section = expect_json(response, StatusCode::CREATED).await;
    let section_id = section["data"]["id"].as_i64().unwrap();
    assert_eq!(section["data"]["position"], 1);

    for title in ["Intro", "Setup"] {
        let response = post_json_auth(
            app.clone(),
            &format!("/api/v1/activities/{section_id}/lessons"),
            &token,
            serde_json::json!({ "title": title, "video_url": "https://video.test/1" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(app, &format!("/api/v1/courses/{}", course.id)).await;
    let detail = expect_json(response, StatusCode::OK).await;
    let sections = detail["data"]["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["title"], "Basics");
    let lessons = sections[0]["lessons"].as_array().unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0]["title"], "Intro");
    assert_eq!(lessons[1]["position"], 2);
    // The public outline never exposes lesson videos.
    assert!(lessons[0].get("video_url").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_announcements_list(pool: PgPool) {
    let manager = create_user(&pool, "boss", Role::Manager).await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "title": "Welcome", "body": "Enrollment is open" });
    let response = post_json_auth(
        app.clone(),
        "/api/v1/manager/announcements",
        &token_for(&manager),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(app, "/api/v1/announcements").await).await;
    assert_eq!(json["data"][0]["title"], "Welcome");
    assert!(json["data"][0]["course_id"].is_null());
}
