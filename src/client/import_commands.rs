use clap::Args;

use super::PostgresConfig;
use super::SourceConfig;
use crate::import;

#[derive(Args, Debug)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: SourceConfig,
    /// Page size for source collection fetches
    #[arg(long, env = "CONTENTCAST_PAGE_SIZE", default_value_t = 100)]
    pub page_size: u64,
}

pub async fn import(args: ImportArgs, postgres: PostgresConfig) -> anyhow::Result<()> {
    let source = args.source.into_client();
    let report = import::run(&source, &postgres.url(), args.page_size).await?;
    println!(
        "Imported {} models, {} entries and {} assets",
        report.models, report.entries, report.assets
    );
    Ok(())
}
