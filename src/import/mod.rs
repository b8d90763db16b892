//! Import orchestration.
//!
//! A full import is a strictly sequential pipeline over one store session:
//! fetch models, synthesize the schema, fetch and insert entries, fetch and
//! insert assets. There is no resume and no partial-success mode: any
//! failure aborts the remaining steps and a rerun starts over from scratch,
//! which is safe because the schema step rebuilds everything anyway.

pub mod flatten;
pub mod schema;
pub mod sql;
pub mod type_map;

use std::collections::HashSet;
use std::fmt;

use database::DatabaseError;
use database::DbConnection;
use database::SqlExecutor;
use source_client::SourceClient;
use source_client::paginator::fetch_all;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::models::Asset;
use crate::models::ContentModel;
use crate::models::Entry;
use crate::models::ModelError;

use self::flatten::flatten;
use self::flatten::insert_statement;
use self::schema::ASSET_TABLE;
use self::sql::bytea_literal;
use self::sql::quote_ident;
use self::sql::quote_literal;

/// Pipeline steps, in execution order. Every step logs a start/finish pair;
/// a failure in any step surfaces the step in the error report and ends the
/// run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStep {
    Connecting,
    FetchingModels,
    SynthesizingSchema,
    FetchingEntries,
    InsertingEntries,
    FetchingAssets,
    InsertingAssets,
}

impl fmt::Display for ImportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::FetchingModels => "fetching models",
            Self::SynthesizingSchema => "synthesizing schema",
            Self::FetchingEntries => "fetching entries",
            Self::InsertingEntries => "inserting entries",
            Self::FetchingAssets => "fetching assets",
            Self::InsertingAssets => "inserting assets",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub models: usize,
    pub entries: usize,
    pub assets: usize,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("source fetch failed: {0}")]
    Source(#[from] source_client::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("connecting to the store failed: {0}")]
    Connection(#[source] DatabaseError),

    #[error("schema DDL failed for table '{table}': {source}")]
    Schema {
        table: String,
        #[source]
        source: DatabaseError,
    },

    #[error("row insert failed for entry '{entry}' in table '{table}': {source}")]
    RowInsert {
        entry: String,
        table: String,
        #[source]
        source: DatabaseError,
    },

    /// An entry whose model was never fetched cannot be silently dropped.
    #[error("entry '{entry}' names content type '{content_type}', which has no synthesized table")]
    MissingModel { entry: String, content_type: String },

    #[error("asset download failed for asset '{asset}': {source}")]
    AssetDownload {
        asset: String,
        #[source]
        source: source_client::Error,
    },

    #[error("asset insert failed for asset '{asset}': {source}")]
    AssetInsert {
        asset: String,
        #[source]
        source: DatabaseError,
    },
}

/// Runs a full import against the store at `postgres_url`.
///
/// Destructive: the whole derived schema is dropped and rebuilt (see
/// [schema::synthesize]). The store session is held for the duration of the
/// run and released on every exit path, success or failure.
pub async fn run(
    source: &SourceClient,
    postgres_url: &Url,
    page_size: u64,
) -> Result<ImportReport, ImportError> {
    let step = ImportStep::Connecting;
    info!(%step, "Import step starting");
    let connection = DbConnection::connect(postgres_url)
        .await
        .map_err(ImportError::Connection)?;
    info!(%step, "Import step finished");

    // the session's wire task is torn down when `connection` drops, whichever
    // way this returns
    let result = run_pipeline(source, &*connection, page_size).await;
    if let Err(ref error) = result {
        tracing::error!(error = %error, "Import failed");
    }
    result
}

/// The pipeline proper, generic over the SQL seam so tests can drive it with
/// a recording store.
pub async fn run_pipeline<E: SqlExecutor>(
    source: &SourceClient,
    store: &E,
    page_size: u64,
) -> Result<ImportReport, ImportError> {
    let mut report = ImportReport::default();

    let step = ImportStep::FetchingModels;
    info!(%step, "Import step starting");
    let items = fetch_all(page_size, |skip, limit| {
        source.content_types_page(skip, limit)
    })
    .await?;
    let models = items
        .iter()
        .map(ContentModel::from_source)
        .collect::<Result<Vec<_>, _>>()?;
    report.models = models.len();
    info!(%step, count = report.models, "Import step finished");

    let step = ImportStep::SynthesizingSchema;
    info!(%step, "Import step starting");
    schema::synthesize(store, &models).await?;
    info!(%step, count = report.models + 1, "Import step finished");

    let step = ImportStep::FetchingEntries;
    info!(%step, "Import step starting");
    let items = fetch_all(page_size, |skip, limit| source.entries_page(skip, limit)).await?;
    let entries = items
        .iter()
        .map(Entry::from_source)
        .collect::<Result<Vec<_>, _>>()?;
    info!(%step, count = entries.len(), "Import step finished");

    let step = ImportStep::InsertingEntries;
    info!(%step, "Import step starting");
    let tables: HashSet<&str> = models.iter().map(|model| model.id.as_str()).collect();
    for entry in &entries {
        let content_type = entry.content_type_id();
        if !tables.contains(content_type) {
            return Err(ImportError::MissingModel {
                entry: entry.sys.id.clone(),
                content_type: content_type.to_string(),
            });
        }
        let row = flatten(entry);
        store
            .execute_sql(&insert_statement(&row))
            .await
            .map_err(|source| ImportError::RowInsert {
                entry: entry.sys.id.clone(),
                table: row.table.clone(),
                source,
            })?;
    }
    report.entries = entries.len();
    info!(%step, count = report.entries, "Import step finished");

    let step = ImportStep::FetchingAssets;
    info!(%step, "Import step starting");
    let items = fetch_all(page_size, |skip, limit| source.assets_page(skip, limit)).await?;
    let assets = items
        .iter()
        .map(Asset::from_source)
        .collect::<Result<Vec<_>, _>>()?;
    info!(%step, count = assets.len(), "Import step finished");

    let step = ImportStep::InsertingAssets;
    info!(%step, "Import step starting");
    for asset in &assets {
        let bytes = source
            .download(&asset.fields.file.url)
            .await
            .map_err(|source| ImportError::AssetDownload {
                asset: asset.sys.id.clone(),
                source,
            })?;
        let statement = format!(
            r#"INSERT INTO {} ("id", "type", "name", "data") VALUES ({}, {}, {}, {})"#,
            quote_ident(ASSET_TABLE),
            quote_literal(&asset.sys.id),
            quote_literal(&asset.fields.file.content_type),
            quote_literal(&asset.fields.file.file_name),
            bytea_literal(&bytes),
        );
        store
            .execute_sql(&statement)
            .await
            .map_err(|source| ImportError::AssetInsert {
                asset: asset.sys.id.clone(),
                source,
            })?;
    }
    report.assets = assets.len();
    info!(%step, count = report.assets, "Import step finished");

    info!(
        models = report.models,
        entries = report.entries,
        assets = report.assets,
        "Import done"
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;

    use database::DatabaseError;
    use database::SqlExecutor;

    /// Records every executed statement; optionally fails on a matching one.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingExecutor {
        statements: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingExecutor {
        pub(crate) fn failing_on(pattern: &'static str) -> Self {
            Self {
                statements: RefCell::new(Vec::new()),
                fail_on: Some(pattern),
            }
        }

        pub(crate) fn statements(&self) -> Vec<String> {
            self.statements.borrow().clone()
        }
    }

    impl SqlExecutor for RecordingExecutor {
        async fn execute_sql(&self, sql: &str) -> Result<(), DatabaseError> {
            if let Some(pattern) = self.fail_on
                && sql.contains(pattern)
            {
                // a config parse failure is the only engine error that can be
                // minted without a server
                let error = "not a valid dsn".parse::<tokio_postgres::Config>().unwrap_err();
                return Err(DatabaseError(error));
            }
            self.statements.borrow_mut().push(sql.to_string());
            Ok(())
        }
    }
}
