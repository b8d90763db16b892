use clap::Parser;
use common::tracing::Stream;
use common::tracing::TracingConfig;
use common::tracing::create_tracing_subscriber;
use tracing_subscriber::filter::LevelFilter;

use contentcast::client::Client;
use contentcast::client::Commands;
use contentcast::client::import_commands;
use contentcast::client::runserver;

#[tokio::main]
async fn main() {
    let client = Client::parse();

    let subscriber = create_tracing_subscriber(
        TracingConfig {
            stream: Stream::Stderr,
            directives: vec![],
        },
        LevelFilter::INFO,
    );
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    if let Err(error) = run(client).await {
        tracing::error!("{error:#}");
        std::process::exit(1);
    }
}

async fn run(client: Client) -> anyhow::Result<()> {
    match client.command {
        Commands::Import(args) => import_commands::import(args, client.postgres_config).await,
        Commands::Runserver(args) => runserver::runserver(args, client.postgres_config).await,
    }
}
