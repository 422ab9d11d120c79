//! Repository integration tests against a real database.

use chrono::{Duration, Utc};
use coursely_core::payments::{Currency, OrderStatus};
use coursely_core::reporting::{DateRange, SaleChannel};
use coursely_core::roles::Role;
use coursely_core::types::DbId;
use coursely_db::models::activity::{CreateActivity, CreateSubActivity};
use coursely_db::models::course::{CourseListQuery, CreateCourse, UpdateCourse};
use coursely_db::models::feedback::UpsertFeedback;
use coursely_db::models::order::CreateOrder;
use coursely_db::models::report::{FactQuery, ReportScope};
use coursely_db::models::user::CreateUser;
use coursely_db::repositories::{
    ActivityRepo, CompletionRepo, CourseRepo, FeedbackRepo, OrderRepo, ReportRepo,
    SubActivityRepo, TelegramLinkRepo, UserRepo,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn user(pool: &PgPool, name: &str, role: Role, code: Option<&str>) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            full_name: name.to_string(),
            email: format!("{name}@example.com"),
            phone: None,
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id(),
            referral_code: code.map(str::to_string),
        },
    )
    .await
    .unwrap()
    .id
}

async fn course(pool: &PgPool, instructor_id: DbId, title: &str) -> DbId {
    CourseRepo::create(
        pool,
        instructor_id,
        &CreateCourse {
            title: title.to_string(),
            description: None,
            thumbnail_url: None,
            price_etb: 50_000,
            price_usd: 2_000,
            is_published: Some(true),
        },
    )
    .await
    .unwrap()
    .id
}

struct Sale<'a> {
    buyer: DbId,
    course: DbId,
    seller: Option<DbId>,
    tx_ref: Option<&'a str>,
    code: Option<&'a str>,
    amount: i64,
    status: OrderStatus,
}

async fn order(pool: &PgPool, sale: Sale<'_>) -> DbId {
    let paid_at = (sale.status == OrderStatus::Paid).then(Utc::now);
    OrderRepo::create(
        pool,
        &CreateOrder {
            user_id: sale.buyer,
            course_id: sale.course,
            seller_id: sale.seller,
            currency: "ETB".to_string(),
            amount: sale.amount,
            status: sale.status,
            tx_ref: sale.tx_ref.map(str::to_string),
            code: sale.code.map(str::to_string),
            paid_at,
        },
    )
    .await
    .unwrap()
    .id
}

fn today_range() -> DateRange {
    let today = Utc::now().date_naive();
    DateRange::new(today - Duration::days(1), today)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_email_lookup_is_case_insensitive(pool: PgPool) {
    let id = user(&pool, "abebe", Role::Student, None).await;
    let found = UserRepo::find_by_email(&pool, "ABEBE@Example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_email_violates_uq_constraint(pool: PgPool) {
    user(&pool, "dup", Role::Student, None).await;
    let err = UserRepo::create(
        &pool,
        &CreateUser {
            full_name: "Dup Again".to_string(),
            email: "DUP@example.com".to_string(),
            phone: None,
            password_hash: "x".to_string(),
            role_id: Role::Student.id(),
            referral_code: None,
        },
    )
    .await
    .unwrap_err();
    let db_err = err.as_database_error().expect("database error");
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_link_telegram_refuses_rebinding(pool: PgPool) {
    let id = user(&pool, "tg", Role::Student, None).await;
    assert!(UserRepo::link_telegram(&pool, id, 1001).await.unwrap());
    // Same account again is fine.
    assert!(UserRepo::link_telegram(&pool, id, 1001).await.unwrap());
    // A different Telegram account is refused.
    assert!(!UserRepo::link_telegram(&pool, id, 2002).await.unwrap());

    let found = UserRepo::find_by_telegram_id(&pool, 1001).await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_link_codes_redeem_once(pool: PgPool) {
    let id = user(&pool, "coder", Role::Student, None).await;

    let first = TelegramLinkRepo::issue(&pool, id, "hash-1", 15).await.unwrap();
    assert!(first.expires_at > Utc::now());
    assert!(first.used_at.is_none());

    // Issuing again drops the unused first code.
    TelegramLinkRepo::issue(&pool, id, "hash-2", 15).await.unwrap();
    assert_eq!(TelegramLinkRepo::redeem(&pool, "hash-1").await.unwrap(), None);

    assert_eq!(TelegramLinkRepo::redeem(&pool, "hash-2").await.unwrap(), Some(id));
    assert_eq!(TelegramLinkRepo::redeem(&pool, "hash-2").await.unwrap(), None);

    // Expired codes are refused.
    TelegramLinkRepo::issue(&pool, id, "hash-3", -1).await.unwrap();
    assert_eq!(TelegramLinkRepo::redeem(&pool, "hash-3").await.unwrap(), None);
}

// ---------------------------------------------------------------------------
// Courses & lessons
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_catalogue_hides_drafts_and_deleted(pool: PgPool) {
    let tutor = user(&pool, "tutor", Role::Instructor, None).await;
    let visible = course(&pool, tutor, "Visible").await;
    let draft = course(&pool, tutor, "Draft").await;
    let deleted = course(&pool, tutor, "Deleted").await;

    CourseRepo::update(
        &pool,
        draft,
        &UpdateCourse {
            is_published: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(CourseRepo::soft_delete(&pool, deleted).await.unwrap());
    assert!(!CourseRepo::soft_delete(&pool, deleted).await.unwrap());

    let cards = CourseRepo::list_published(&pool, &CourseListQuery::default(), 20, 0)
        .await
        .unwrap();
    let ids: Vec<DbId> = cards.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![visible]);
    assert_eq!(cards[0].instructor_name, "tutor");
    assert_eq!(cards[0].rating_count, 0);
    assert!(CourseRepo::find_by_id(&pool, deleted).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lessons_are_ordered_by_section_then_position(pool: PgPool) {
    let tutor = user(&pool, "tutor", Role::Instructor, None).await;
    let course_id = course(&pool, tutor, "Ordered").await;

    let second = ActivityRepo::create(
        &pool,
        course_id,
        &CreateActivity {
            title: "Second".into(),
            position: Some(2),
        },
    )
    .await
    .unwrap();
    let first = ActivityRepo::create(
        &pool,
        course_id,
        &CreateActivity {
            title: "First".into(),
            position: Some(1),
        },
    )
    .await
    .unwrap();

    let lesson = |title: &str| CreateSubActivity {
        title: title.into(),
        video_url: None,
        content: None,
        position: None,
        duration_secs: Some(60),
    };
    let b1 = SubActivityRepo::create(&pool, second.id, &lesson("b1")).await.unwrap();
    let a1 = SubActivityRepo::create(&pool, first.id, &lesson("a1")).await.unwrap();
    let a2 = SubActivityRepo::create(&pool, first.id, &lesson("a2")).await.unwrap();
    assert_eq!(a2.position, a1.position + 1);

    let ids = SubActivityRepo::ordered_ids_for_course(&pool, course_id)
        .await
        .unwrap();
    assert_eq!(ids, vec![a1.id, a2.id, b1.id]);
    assert_eq!(
        SubActivityRepo::course_id_of(&pool, b1.id).await.unwrap(),
        Some(course_id)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completion_is_idempotent(pool: PgPool) {
    let tutor = user(&pool, "tutor", Role::Instructor, None).await;
    let student = user(&pool, "student", Role::Student, None).await;
    let course_id = course(&pool, tutor, "C").await;
    let section = ActivityRepo::create(
        &pool,
        course_id,
        &CreateActivity {
            title: "S".into(),
            position: None,
        },
    )
    .await
    .unwrap();
    let lesson = SubActivityRepo::create(
        &pool,
        section.id,
        &CreateSubActivity {
            title: "L".into(),
            video_url: None,
            content: None,
            position: None,
            duration_secs: None,
        },
    )
    .await
    .unwrap();

    assert!(CompletionRepo::mark_complete(&pool, student, lesson.id).await.unwrap());
    assert!(!CompletionRepo::mark_complete(&pool, student, lesson.id).await.unwrap());
    let done = CompletionRepo::completed_ids_for_course(&pool, student, course_id)
        .await
        .unwrap();
    assert_eq!(done, vec![lesson.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_feedback_upsert_replaces_rating(pool: PgPool) {
    let tutor = user(&pool, "tutor", Role::Instructor, None).await;
    let student = user(&pool, "student", Role::Student, None).await;
    let course_id = course(&pool, tutor, "Rated").await;

    for rating in [2, 4] {
        FeedbackRepo::upsert(
            &pool,
            course_id,
            student,
            &UpsertFeedback {
                rating,
                comment: None,
            },
        )
        .await
        .unwrap();
    }
    let summary = FeedbackRepo::summary(&pool, course_id).await.unwrap();
    assert_eq!(summary.rating_count, 1);
    assert_eq!(summary.rating_avg, Some(4.0));
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_transition_is_compare_and_set(pool: PgPool) {
    let tutor = user(&pool, "tutor", Role::Instructor, None).await;
    let buyer = user(&pool, "buyer", Role::Student, None).await;
    let course_id = course(&pool, tutor, "C").await;
    let id = order(
        &pool,
        Sale {
            buyer,
            course: course_id,
            seller: None,
            tx_ref: Some("CRS-1"),
            code: None,
            amount: 50_000,
            status: OrderStatus::Pending,
        },
    )
    .await;

    let paid = OrderRepo::transition(&pool, id, OrderStatus::Pending, OrderStatus::Paid, Some("gw-1"))
        .await
        .unwrap()
        .expect("first transition applies");
    assert_eq!(paid.status, "paid");
    assert!(paid.paid_at.is_some());
    assert_eq!(paid.gateway_reference.as_deref(), Some("gw-1"));

    let again = OrderRepo::transition(&pool, id, OrderStatus::Pending, OrderStatus::Paid, None)
        .await
        .unwrap();
    assert!(again.is_none(), "stale `from` status must not match");
    assert!(OrderRepo::has_paid(&pool, buyer, course_id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_load_facts_scopes(pool: PgPool) {
    let tutor_a = user(&pool, "tutor_a", Role::Instructor, None).await;
    let tutor_b = user(&pool, "tutor_b", Role::Instructor, None).await;
    let seller = user(&pool, "seller", Role::Seller, Some("SELL-1")).await;
    let buyer = user(&pool, "buyer", Role::Student, None).await;
    let course_a = course(&pool, tutor_a, "A").await;
    let course_b = course(&pool, tutor_b, "B").await;

    // Offline sale by the seller on course A.
    order(
        &pool,
        Sale {
            buyer,
            course: course_a,
            seller: Some(seller),
            tx_ref: None,
            code: None,
            amount: 1_000,
            status: OrderStatus::Paid,
        },
    )
    .await;
    // Online sale on course B with the seller's code in lower case.
    order(
        &pool,
        Sale {
            buyer,
            course: course_b,
            seller: None,
            tx_ref: Some("CRS-2"),
            code: Some("sell-1"),
            amount: 2_000,
            status: OrderStatus::Paid,
        },
    )
    .await;
    // Own sale on course B.
    order(
        &pool,
        Sale {
            buyer,
            course: course_b,
            seller: None,
            tx_ref: Some("CRS-3"),
            code: None,
            amount: 4_000,
            status: OrderStatus::Paid,
        },
    )
    .await;
    // Pending orders never count.
    order(
        &pool,
        Sale {
            buyer,
            course: course_a,
            seller: None,
            tx_ref: Some("CRS-4"),
            code: None,
            amount: 8_000,
            status: OrderStatus::Pending,
        },
    )
    .await;

    let load = |scope: ReportScope| {
        let pool = pool.clone();
        async move {
            ReportRepo::load_facts(
                &pool,
                &FactQuery {
                    currency: Currency::Etb,
                    range: today_range(),
                    scope,
                },
            )
            .await
            .unwrap()
        }
    };

    let all = load(ReportScope::All).await;
    assert_eq!(all.iter().map(|f| f.amount).sum::<i64>(), 7_000);
    let channels: Vec<SaleChannel> = all.iter().map(|f| f.channel()).collect();
    assert!(channels.contains(&SaleChannel::Seller));
    assert!(channels.contains(&SaleChannel::Affiliate));
    assert!(channels.contains(&SaleChannel::Own));

    let instructor_b = load(ReportScope::Instructor(tutor_b)).await;
    assert_eq!(instructor_b.iter().map(|f| f.amount).sum::<i64>(), 6_000);

    let reseller = load(ReportScope::Reseller {
        seller_id: seller,
        referral_code: Some("SELL-1".into()),
    })
    .await;
    assert_eq!(reseller.iter().map(|f| f.amount).sum::<i64>(), 3_000);

    let usd = ReportRepo::load_facts(
        &pool,
        &FactQuery {
            currency: Currency::Usd,
            range: today_range(),
            scope: ReportScope::All,
        },
    )
    .await
    .unwrap();
    assert!(usd.is_empty());
}
