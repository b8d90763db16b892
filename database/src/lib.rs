pub mod db_connection_pool;

pub use db_connection_pool::DbConnection;
pub use db_connection_pool::DbConnectionPool;

use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct DatabaseError(#[from] pub tokio_postgres::Error);

/// Runs SQL statements against the store.
///
/// The import pipeline is generic over this seam, so it can be exercised
/// against a recording fake without a running Postgres.
pub trait SqlExecutor {
    async fn execute_sql(&self, sql: &str) -> Result<(), DatabaseError>;
}

impl SqlExecutor for tokio_postgres::Client {
    async fn execute_sql(&self, sql: &str) -> Result<(), DatabaseError> {
        self.batch_execute(sql).await.map_err(DatabaseError)
    }
}
