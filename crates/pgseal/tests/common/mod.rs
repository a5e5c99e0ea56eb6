#![allow(dead_code)]

use pgseal::{Connection, ConnectionProvider, Database, RangePolicy, SealError, SealResult};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_postgres::types::ToSql;

/// Canned behaviour of a [`StubProvider`].
#[derive(Default)]
pub struct Script {
    pub rows: Vec<Value>,
    pub affected: u64,
    pub fail_acquire: bool,
    pub fail_query: bool,
}

#[derive(Default)]
pub struct Counters {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub in_use: AtomicUsize,
    pub max_in_use: AtomicUsize,
    pub statements: Mutex<Vec<(String, usize)>>,
}

impl Counters {
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<(String, usize)> {
        self.statements.lock().unwrap().clone()
    }
}

pub struct StubConnection {
    script: Arc<Script>,
    counters: Arc<Counters>,
}

impl StubConnection {
    async fn run(&self, sql: &str, params: usize) -> SealResult<()> {
        self.counters
            .statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params));
        tokio::task::yield_now().await;
        if self.script.fail_query {
            return Err(SealError::validation("connection reset by peer"));
        }
        Ok(())
    }
}

impl Drop for StubConnection {
    fn drop(&mut self) {
        self.counters.in_use.fetch_sub(1, Ordering::SeqCst);
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl Connection for StubConnection {
    type Row = Value;

    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SealResult<Vec<Value>> {
        self.run(sql, params.len()).await?;
        Ok(self.script.rows.clone())
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SealResult<u64> {
        self.run(sql, params.len()).await?;
        Ok(self.script.affected)
    }
}

/// In-memory provider returning JSON rows and counting connection use.
pub struct StubProvider {
    script: Arc<Script>,
    counters: Arc<Counters>,
}

impl ConnectionProvider for StubProvider {
    type Conn = StubConnection;

    async fn acquire(&self) -> SealResult<StubConnection> {
        if self.script.fail_acquire {
            return Err(SealError::Pool("timed out waiting for a connection".into()));
        }
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        let in_use = self.counters.in_use.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_use.fetch_max(in_use, Ordering::SeqCst);
        Ok(StubConnection {
            script: Arc::clone(&self.script),
            counters: Arc::clone(&self.counters),
        })
    }
}

pub fn stub_provider(script: Script) -> (StubProvider, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let provider = StubProvider {
        script: Arc::new(script),
        counters: Arc::clone(&counters),
    };
    (provider, counters)
}

/// A database over a [`StubProvider`] with range violations as errors.
pub fn stub_database(script: Script) -> (Database<StubProvider>, Arc<Counters>) {
    let (provider, counters) = stub_provider(script);
    (
        Database::new(provider).with_range_policy(RangePolicy::Error),
        counters,
    )
}

pub fn returning(rows: Vec<Value>) -> Script {
    Script {
        rows,
        ..Script::default()
    }
}
