use std::path::Path;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::Result;

/// Handle on the relational store: a bounded pool of SQLite connections.
///
/// Every connection runs in WAL mode with a busy timeout, so concurrent
/// writers queue on the database lock instead of failing outright.
#[derive(Clone)]
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
}

impl Store {
    /// Open (creating if necessary) the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(move |conn| {
            conn.busy_timeout(busy_timeout)?;
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")
        });
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        debug!(
            "Opened store at {} with {pool_size} connections",
            path.as_ref().display()
        );
        Ok(Self { pool })
    }

    /// Check out a connection directly. Blocks; async code should use [`Store::run`].
    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Run a blocking store operation on tokio's blocking pool with a pooled
    /// connection, so it never stalls the worker serving other clients.
    pub async fn run<F, T>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut conn)
        })
        .await?
    }
}
