#![cfg(feature = "pool")]

use pgseal::{Database, SealResult, named_params, sql, sql_delete, sql_insert, sql_update};
use std::time::{SystemTime, UNIX_EPOCH};

#[tokio::test]
async fn sealed_statements_roundtrip() -> SealResult<()> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping sealed_statements_roundtrip");
            return Ok(());
        }
    };

    let db = Database::from_url(&database_url)?;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    let tag = format!("pgseal_{}_{}", std::process::id(), nanos);

    db.provider()
        .get()
        .await?
        .batch_execute(
            "CREATE TABLE IF NOT EXISTS pgseal_items (
                id BIGSERIAL PRIMARY KEY,
                tag TEXT NOT NULL,
                qty INT NOT NULL
            )",
        )
        .await?;

    let inserted = sql_insert!(&db, "INSERT INTO pgseal_items (tag, qty) VALUES (@tag, 1), (@tag2, 2)")?
        .with_params(named_params! { "tag" => tag.clone(), "tag2" => tag.clone() })?
        .insert_in(2_u64)
        .await?;
    assert_eq!(inserted.affected_rows, 2);

    let total: i64 = sql!(&db, "SELECT SUM(qty)::BIGINT AS data FROM pgseal_items WHERE tag = @tag")?
        .with_params(named_params! { "tag" => tag.clone() })?
        .data()
        .await?;
    assert_eq!(total, 3);

    let updated = sql_update!(&db, "UPDATE pgseal_items SET qty = qty + 1 WHERE tag = @tag")?
        .with_params(named_params! { "tag" => tag.clone() })?
        .update_in([1_u64, 2])
        .await?;
    assert_eq!(updated.affected_rows, 2);

    let err = sql_delete!(&db, "DELETE FROM pgseal_items WHERE tag = @tag")?
        .with_params(named_params! { "tag" => tag.clone() })?
        .delete_in(1_u64)
        .await
        .unwrap_err();
    assert!(err.is_range_violation());

    // Rows are gone even though the range check failed afterwards.
    let remaining: i64 = sql!(&db, "SELECT COUNT(*) AS data FROM pgseal_items WHERE tag = @tag")?
        .with_params(named_params! { "tag" => tag })?
        .data()
        .await?;
    assert_eq!(remaining, 0);

    Ok(())
}
