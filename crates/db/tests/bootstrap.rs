use sqlx::PgPool;

/// Full bootstrap test: connect, migrate, verify schema.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    // Health check
    tagalong_db::health_check(&pool).await.unwrap();

    // The status lookup table must exist and carry the five seed rows in
    // state-machine order.
    let rows: Vec<(i16, String)> = sqlx::query_as("SELECT id, name FROM ride_statuses ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();

    let names: Vec<(i16, &str)> = rows.iter().map(|(id, name)| (*id, name.as_str())).collect();
    assert_eq!(
        names,
        vec![
            (1, "waiting"),
            (2, "accepted"),
            (3, "in_transit"),
            (4, "completed"),
            (5, "cancelled"),
        ]
    );
}

/// The rides and ride_members tables exist and start empty.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_tables_exist(pool: PgPool) {
    for table in ["rides", "ride_members"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}
