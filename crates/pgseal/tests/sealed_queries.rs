mod common;

use common::{Script, StubProvider, returning, stub_database};
use futures_util::future::join_all;
use pgseal::{
    Database, ExpectedRange, RangePolicy, SealError, SealResult, StatementOptions, StatementType,
    named_params, sql, sql_delete, sql_insert, sql_update,
};
use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Deserialize, PartialEq)]
struct Ticket {
    id: i64,
    title: String,
}

#[tokio::test]
async fn select_two_rows_within_range() {
    let (db, counters) = stub_database(returning(vec![
        json!({ "id": 1, "title": "first" }),
        json!({ "id": 2, "title": "second" }),
    ]));

    let tickets: Vec<Ticket> = sql!(&db, "SELECT id, title FROM tickets WHERE project = @project")
        .unwrap()
        .with_params(named_params! { "project" => 7_i64 })
        .unwrap()
        .entries_in([1_u64, 5])
        .await
        .unwrap();

    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[1].title, "second");
    assert_eq!(
        counters.statements(),
        vec![("SELECT id, title FROM tickets WHERE project = $1".to_string(), 1)]
    );
    assert_eq!(counters.acquired(), 1);
    assert_eq!(counters.released(), 1);
}

#[tokio::test]
async fn delete_authored_as_select_fails_before_acquire() {
    let (db, counters) = stub_database(Script::default());

    let err = sql!(&db, "DELETE t1 FROM t1 JOIN t2 ON t1.id = t2.t1_id").unwrap_err();

    match &err {
        SealError::SanityCheck { kind, violations } => {
            assert_eq!(*kind, StatementType::Select);
            assert!(violations[0].contains("DELETE"), "{violations:?}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("SELECT"));
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test]
async fn interpolated_values_are_rejected() {
    let (db, counters) = stub_database(Script::default());
    let err = sql!(&db, "SELECT * FROM tickets WHERE id = {}", 5).unwrap_err();
    assert!(matches!(err, SealError::TemplateInjection { slots: 2 }));

    let err = sql_update!(&db, "UPDATE tickets SET title = {title} WHERE id = 1").unwrap_err();
    assert!(matches!(err, SealError::TemplateInjection { slots: 1 }));
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test]
async fn driver_failure_releases_connection() {
    let (db, counters) = stub_database(Script {
        fail_query: true,
        ..Script::default()
    });

    let err = sql_update!(&db, "UPDATE tickets SET closed = true WHERE id = @id")
        .unwrap()
        .with_params(named_params! { "id" => 3_i64 })
        .unwrap()
        .update()
        .await
        .unwrap_err();

    assert!(err.is_query_execution());
    assert!(err.to_string().contains("UPDATE"));
    assert_eq!(counters.acquired(), 1);
    assert_eq!(counters.released(), 1);
}

#[tokio::test]
async fn acquisition_failure_is_wrapped() {
    let (db, counters) = stub_database(Script {
        fail_acquire: true,
        ..Script::default()
    });

    let err = sql!(&db, "SELECT 1 AS data")
        .unwrap()
        .data::<i64>()
        .await
        .unwrap_err();

    match err {
        SealError::QueryExecution { source, .. } => {
            assert!(matches!(*source, SealError::Pool(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(counters.released(), 0);
}

#[tokio::test]
async fn range_failure_releases_connection() {
    let (db, counters) = stub_database(Script {
        affected: 4,
        ..Script::default()
    });

    let err = sql_delete!(&db, "DELETE FROM tickets WHERE project = @project")
        .unwrap()
        .with_params(named_params! { "project" => 1_i64 })
        .unwrap()
        .delete_in(ExpectedRange::Between(1, 3))
        .await
        .unwrap_err();

    match err {
        SealError::RangeViolation { message, query } => {
            assert_eq!(message, "expected between 1 and 3 rows but got 4");
            assert!(query.starts_with("DELETE FROM\n  tickets"), "{query}");
            assert!(!query.contains("$1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(counters.acquired(), counters.released());
}

#[tokio::test]
async fn warn_policy_returns_rows_but_entry_still_needs_one() {
    let (db, _) = stub_database(returning(vec![]));
    let db = db.with_range_policy(RangePolicy::Warn);

    let all: Vec<Value> = sql!(&db, "SELECT id FROM tickets")
        .unwrap()
        .entries_in(1_u64..)
        .await
        .unwrap();
    assert!(all.is_empty());

    let err = sql!(&db, "SELECT id FROM tickets")
        .unwrap()
        .entry::<Value>()
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn maybe_entry_without_rows() {
    let (db, _) = stub_database(returning(vec![]));
    let ticket: Option<Ticket> = sql!(&db, "SELECT id, title FROM tickets WHERE id = @id")
        .unwrap()
        .with_params(named_params! { "id" => 404_i64 })
        .unwrap()
        .maybe_entry()
        .await
        .unwrap();
    assert_eq!(ticket, None);
}

#[tokio::test]
async fn parameter_contract_lists_every_problem() {
    let (db, counters) = stub_database(Script::default());

    let err = sql_insert!(&db, "INSERT INTO tickets (title, owner) VALUES (@title, @owner)")
        .unwrap()
        .with_params(named_params! { "title" => "t", "project" => 1_i64 })
        .unwrap_err();

    match err {
        SealError::ParameterContract {
            missing,
            duplicate,
            unknown,
        } => {
            assert_eq!(missing, ["owner"]);
            assert!(duplicate.is_empty());
            assert_eq!(unknown, ["project"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(counters.acquired(), 0);
}

#[tokio::test]
async fn table_alias_through_executor() {
    let (db, counters) = stub_database(returning(vec![]));

    sql!(
        &db,
        "SELECT t.id, p.name FROM tickets t JOIN projects p ON p.id = t.project"
    )
    .unwrap()
    .with_table_alias([("tickets", "tickets_archive"), ("projects", "projects_archive")])
    .unwrap()
    .with_config(StatementOptions::new().prepare_statement(false))
    .entries::<Value>()
    .await
    .unwrap();

    assert_eq!(
        counters.statements()[0].0,
        "SELECT t.id, p.name FROM tickets_archive t JOIN projects_archive p ON p.id = t.project"
    );
}

#[tokio::test]
async fn insert_returning_all_maps_each_row() {
    let (db, _) = stub_database(returning(vec![
        json!({ "id": 10, "title": "a" }),
        json!({ "id": 11, "title": "b" }),
    ]));

    let created: Vec<Ticket> = sql_insert!(
        &db,
        "INSERT INTO tickets (title) VALUES ('a'), ('b') RETURNING id, title"
    )
    .unwrap()
    .insert_returning_all()
    .await
    .unwrap();

    assert_eq!(created.iter().map(|t| t.id).collect::<Vec<_>>(), [10, 11]);
}

async fn read_number(db: &Database<StubProvider>, n: i64) -> SealResult<i64> {
    sql!(db, "SELECT @n AS data")?
        .with_params(named_params! { "n" => n })?
        .data()
        .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_executions_each_use_one_connection() {
    let (db, counters) = stub_database(returning(vec![json!({ "data": 1 })]));

    let results = join_all((0..16).map(|n| read_number(&db, n))).await;

    assert!(results.iter().all(|r| matches!(r, Ok(1))));
    assert_eq!(counters.acquired(), 16);
    assert_eq!(counters.released(), 16);
}
