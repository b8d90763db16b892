pub mod import_commands;
mod postgres_config;
pub mod runserver;
mod source_config;

use clap::Parser;
use clap::Subcommand;

use import_commands::ImportArgs;
pub use postgres_config::PostgresConfig;
use runserver::RunserverArgs;
pub use source_config::SourceConfig;

#[derive(Parser, Debug)]
#[command(author, version)]
pub struct Client {
    #[command(flatten)]
    pub postgres_config: PostgresConfig,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about,
        long_about = "Replace the derived schema and data with a fresh import of the source repository"
    )]
    Import(ImportArgs),
    #[command(about, long_about = "Launch the mirror server")]
    Runserver(RunserverArgs),
}
