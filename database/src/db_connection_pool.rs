use std::ops::Deref;

use deadpool_postgres::Manager;
use deadpool_postgres::ManagerConfig;
use deadpool_postgres::Object;
use deadpool_postgres::Pool;
use deadpool_postgres::RecyclingMethod;
use tokio::task::JoinHandle;
use tokio_postgres::Client;
use tokio_postgres::NoTls;
use tracing::trace;
use url::Url;

use crate::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum DatabasePoolBuildError {
    #[error("invalid database url: '{0}'")]
    InvalidUrl(#[from] tokio_postgres::Error),
    #[error("an error occurred while building the database pool: '{0}'")]
    Build(#[from] deadpool_postgres::BuildError),
}

#[derive(Debug, thiserror::Error)]
#[error("an error occurred while getting a connection from the database pool: '{0}'")]
pub struct DatabasePoolError(#[from] deadpool_postgres::PoolError);

/// A single Postgres session, owned exclusively by its holder for the
/// duration of a run.
///
/// The wire task is spawned when the session is established and aborted when
/// the value is dropped, so the session is released on every exit path of the
/// owning scope, including failures.
pub struct DbConnection {
    client: Client,
    io_handle: JoinHandle<()>,
}

impl DbConnection {
    pub async fn connect(url: &Url) -> Result<Self, DatabaseError> {
        let (client, connection) = tokio_postgres::connect(url.as_str(), NoTls).await?;
        // The connection object performs the actual communication with the database,
        // so spawn it off to run on its own.
        let io_handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("connection error: {}", e);
            }
        });
        Ok(Self { client, io_handle })
    }
}

impl Deref for DbConnection {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl Drop for DbConnection {
    fn drop(&mut self) {
        self.io_handle.abort();
    }
}

/// Connection pool for the read side, held for the lifetime of the server.
#[derive(Clone)]
pub struct DbConnectionPool {
    pool: Pool,
}

impl DbConnectionPool {
    /// Creates a connection pool with the given settings
    pub fn try_initialize(url: &Url, max_size: usize) -> Result<Self, DatabasePoolBuildError> {
        let pg_config: tokio_postgres::Config = url.as_str().parse()?;
        let manager_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let manager = Manager::from_config(pg_config, NoTls, manager_config);
        let pool = Pool::builder(manager).max_size(max_size).build()?;
        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> Result<Object, DatabasePoolError> {
        Ok(self.pool.get().await?)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("could not ping the database: '{0}'")]
pub struct PingError(#[from] tokio_postgres::Error);

pub async fn ping_database(client: &Client) -> Result<(), PingError> {
    client.batch_execute("SELECT 1").await?;
    trace!("Database ping successful");
    Ok(())
}
