use clap::Args;

use super::PostgresConfig;
use crate::views;

#[derive(Args, Debug)]
pub struct RunserverArgs {
    #[arg(long, env = "CONTENTCAST_PORT", default_value_t = 8090)]
    port: u16,
    #[arg(long, env = "CONTENTCAST_ADDRESS", default_value_t = String::from("0.0.0.0"))]
    address: String,
    /// Number of pooled store connections held by the mirror
    #[arg(long, env = "CONTENTCAST_POOL_SIZE", default_value_t = 4)]
    pool_size: usize,
}

/// Create and run the server
pub async fn runserver(
    RunserverArgs {
        port,
        address,
        pool_size,
    }: RunserverArgs,
    postgres: PostgresConfig,
) -> anyhow::Result<()> {
    let config = views::ServerConfig {
        port,
        address,
        postgres_url: postgres.url(),
        pool_size,
    };
    let server = views::Server::new(config).await?;
    Ok(server.start().await?)
}
