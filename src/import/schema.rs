use database::SqlExecutor;
use itertools::Itertools;
use tracing::debug;

use crate::models::ContentModel;

use super::ImportError;
use super::sql::quote_ident;
use super::type_map::column_type;

/// The one fixed table; everything else is derived from the models.
pub const ASSET_TABLE: &str = "asset";

pub fn drop_table_statement(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

pub fn create_asset_table_statement() -> String {
    format!(
        r#"CREATE TABLE {} ("id" TEXT PRIMARY KEY, "type" TEXT, "name" TEXT, "data" BYTEA)"#,
        quote_ident(ASSET_TABLE)
    )
}

/// One table per model: `id TEXT PRIMARY KEY` plus one column per field, in
/// the model's declared order.
pub fn create_model_table_statement(model: &ContentModel) -> String {
    let columns = std::iter::once(r#""id" TEXT PRIMARY KEY"#.to_string())
        .chain(
            model
                .fields
                .iter()
                .map(|field| format!("{} {}", quote_ident(&field.id), column_type(field))),
        )
        .join(", ");
    format!("CREATE TABLE {} ({columns})", quote_ident(&model.id))
}

/// Replaces every derived table: the fixed asset table first, then one table
/// per model, each as drop-if-exists followed by create.
///
/// Destructive: any data in a same-named table is lost, every import is a
/// full rebuild. A DDL failure aborts immediately with the table that
/// failed; no partial-schema continuation is attempted.
pub async fn synthesize<E: SqlExecutor>(
    store: &E,
    models: &[ContentModel],
) -> Result<(), ImportError> {
    for statement in [
        drop_table_statement(ASSET_TABLE),
        create_asset_table_statement(),
    ] {
        store
            .execute_sql(&statement)
            .await
            .map_err(|source| ImportError::Schema {
                table: ASSET_TABLE.to_string(),
                source,
            })?;
    }
    for model in models {
        debug!(model = %model.id, "Synthesizing table");
        for statement in [
            drop_table_statement(&model.id),
            create_model_table_statement(model),
        ] {
            store
                .execute_sql(&statement)
                .await
                .map_err(|source| ImportError::Schema {
                    table: model.id.clone(),
                    source,
                })?;
        }
    }
    Ok(())
}
