pub mod mirror;

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use database::DbConnectionPool;
use database::db_connection_pool::ping_database;
use tokio::net::TcpListener;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use url::Url;

use crate::error::Result;

pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub postgres_url: Url,
    pub pool_size: usize,
}

/// The mirror holds its own long-lived pool, independent of any importer
/// session that may be rebuilding tables at the same time. Reads during an
/// in-progress import may observe a half-rebuilt schema; that gap is
/// accepted, a rerun of the import squares it.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<DbConnectionPool>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(mirror::list_documents))
        .route("/health", get(health))
        .route("/asset/{asset_id}", get(mirror::asset))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

pub struct Server {
    router: Router,
    listener: TcpListener,
}

impl Server {
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let db_pool = DbConnectionPool::try_initialize(&config.postgres_url, config.pool_size)?;
        let state = AppState {
            db_pool: Arc::new(db_pool),
        };
        let listener = TcpListener::bind((config.address.as_str(), config.port)).await?;
        info!(address = %config.address, port = config.port, "Starting the mirror server");
        Ok(Self {
            router: router(state),
            listener,
        })
    }

    pub async fn start(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}

async fn health(State(AppState { db_pool }): State<AppState>) -> Result<&'static str> {
    let conn = db_pool.get().await?;
    ping_database(&conn).await?;
    Ok("ok")
}
