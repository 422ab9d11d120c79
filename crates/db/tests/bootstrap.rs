use sqlx::PgPool;

/// Connect, migrate, and verify seed data.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    coursely_db::health_check(&pool).await.unwrap();

    let roles: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM roles ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    let names: Vec<&str> = roles.iter().map(|(_, n)| n.as_str()).collect();
    assert_eq!(names, vec!["manager", "instructor", "seller", "student"]);

    let rates = coursely_db::repositories::IncomeRateRepo::current(&pool)
        .await
        .unwrap();
    assert!(coursely_core::commission::validate_rates(&rates).is_ok());
}

/// Seeded role ids must match the ids hard-coded in `coursely_core::roles`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_ids_match_core(pool: PgPool) {
    use coursely_core::roles::Role;

    for role in [Role::Manager, Role::Instructor, Role::Seller, Role::Student] {
        let row = coursely_db::repositories::RoleRepo::find_by_id(&pool, role.id())
            .await
            .unwrap()
            .unwrap_or_else(|| panic!("role {} missing", role.name()));
        assert_eq!(row.name, role.name());
    }
}
