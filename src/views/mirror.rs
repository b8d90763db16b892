//! Read-side reconstruction of source-shaped documents.
//!
//! The contract is shape compatibility: a consumer written against the
//! source API's `{sys, fields}` entries and `includes.Asset` list keeps
//! working against the mirror unmodified. Reference fields come back in
//! their reduced id form, the stable projection the flattener wrote.

use axum::Json;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tokio_postgres::Row;
use tokio_postgres::types::Type;

use super::AppState;
use crate::error::Result;
use crate::import::schema::ASSET_TABLE;
use crate::import::sql::quote_ident;

#[derive(Debug, Serialize)]
pub struct DocumentsResponse {
    items: Vec<Document>,
    includes: Includes,
}

#[derive(Debug, Serialize)]
struct Document {
    sys: DocumentSys,
    fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct DocumentSys {
    id: String,
    #[serde(rename = "contentType")]
    content_type: TypeRef,
}

#[derive(Debug, Serialize)]
struct TypeRef {
    sys: IdRef,
}

#[derive(Debug, Serialize)]
struct IdRef {
    id: String,
}

#[derive(Debug, Serialize)]
struct Includes {
    #[serde(rename = "Asset")]
    asset: Vec<IncludedAsset>,
}

#[derive(Debug, Serialize)]
struct IncludedAsset {
    sys: IdRef,
    fields: IncludedAssetFields,
}

#[derive(Debug, Serialize)]
struct IncludedAssetFields {
    title: String,
    file: IncludedFile,
}

#[derive(Debug, Serialize)]
struct IncludedFile {
    url: String,
    #[serde(rename = "fileName")]
    file_name: String,
}

/// Rebuilds every stored document, wrapped the way the source delivers them.
///
/// Assets are listed separately under `includes.Asset`, their file reference
/// rewritten to a URL on this server keyed by id, so clients fetch bytes
/// lazily instead of receiving them inline.
pub(in crate::views) async fn list_documents(
    State(AppState { db_pool }): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DocumentsResponse>> {
    let conn = db_pool.get().await?;
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost")
        .to_string();

    let mut items = Vec::new();
    for table in derived_tables(&conn).await? {
        let select = format!(r#"SELECT * FROM {} ORDER BY "id""#, quote_ident(&table));
        for row in conn.query(&select, &[]).await? {
            items.push(document_from_row(&table, &row)?);
        }
    }

    let asset_rows = conn
        .query(r#"SELECT "id", "name" FROM "asset" ORDER BY "id""#, &[])
        .await?;
    let asset = asset_rows
        .iter()
        .map(|row| {
            let id: String = row.get("id");
            let name: Option<String> = row.get("name");
            let name = name.unwrap_or_default();
            IncludedAsset {
                fields: IncludedAssetFields {
                    title: name.clone(),
                    file: IncludedFile {
                        url: asset_url(&host, &id),
                        file_name: name,
                    },
                },
                sys: IdRef { id },
            }
        })
        .collect();

    Ok(Json(DocumentsResponse {
        items,
        includes: Includes { asset },
    }))
}

/// Serves an asset's stored bytes under its stored MIME type.
pub(in crate::views) async fn asset(
    State(AppState { db_pool }): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<Response> {
    let conn = db_pool.get().await?;
    let row = conn
        .query_opt(
            r#"SELECT "type", "data" FROM "asset" WHERE "id" = $1"#,
            &[&asset_id],
        )
        .await?;
    // a lookup miss is an expected outcome, not a failure
    let Some(row) = row else {
        return Ok((StatusCode::NOT_FOUND, "Asset not found!").into_response());
    };
    let content_type: Option<String> = row.try_get("type")?;
    let data: Vec<u8> = row.try_get("data")?;
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

/// All derived tables, which is every table in the schema except the fixed
/// asset table. Ordered by name so repeated reads of unchanged rows come
/// back identical.
async fn derived_tables(
    conn: &tokio_postgres::Client,
) -> std::result::Result<Vec<String>, tokio_postgres::Error> {
    let rows = conn
        .query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_type = 'BASE TABLE' AND table_name <> $1 \
             ORDER BY table_name",
            &[&ASSET_TABLE],
        )
        .await?;
    Ok(rows.iter().map(|row| row.get(0)).collect())
}

fn document_from_row(
    table: &str,
    row: &Row,
) -> std::result::Result<Document, tokio_postgres::Error> {
    let mut id = String::new();
    let mut fields = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        if column.name() == "id" {
            id = row.try_get(index)?;
            continue;
        }
        // NULL columns are fields the entry never populated: omitted, like
        // the source omits them
        if let Some(value) = column_value(row, index, column.type_())? {
            fields.insert(column.name().to_string(), value);
        }
    }
    Ok(Document {
        sys: DocumentSys {
            id,
            content_type: TypeRef {
                sys: IdRef {
                    id: table.to_string(),
                },
            },
        },
        fields,
    })
}

/// Converts one column of a row back to JSON, driven by the column's engine
/// type. Covers exactly the types the type mapper can produce.
fn column_value(
    row: &Row,
    index: usize,
    ty: &Type,
) -> std::result::Result<Option<Value>, tokio_postgres::Error> {
    let value = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(index)?.map(Value::from)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(index)?.map(Value::from)
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(index)?.map(Value::from)
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(index)?.map(Value::from)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(index)?
            .map(|v| Value::from(v as f64))
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(index)?.map(Value::from)
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<chrono::NaiveDate>>(index)?
            .map(|date| Value::String(date.to_string()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<Value>>(index)?
    } else if *ty == Type::BOOL_ARRAY {
        row.try_get::<_, Option<Vec<bool>>>(index)?.map(Value::from)
    } else if *ty == Type::INT4_ARRAY {
        row.try_get::<_, Option<Vec<i32>>>(index)?.map(Value::from)
    } else if *ty == Type::FLOAT4_ARRAY {
        row.try_get::<_, Option<Vec<f32>>>(index)?
            .map(|values| Value::from(values.into_iter().map(f64::from).collect::<Vec<_>>()))
    } else if *ty == Type::DATE_ARRAY {
        row.try_get::<_, Option<Vec<chrono::NaiveDate>>>(index)?
            .map(|dates| Value::from(dates.into_iter().map(|d| d.to_string()).collect::<Vec<_>>()))
    } else if *ty == Type::JSON_ARRAY || *ty == Type::JSONB_ARRAY {
        row.try_get::<_, Option<Vec<Value>>>(index)?.map(Value::from)
    } else if *ty == Type::TEXT_ARRAY || *ty == Type::VARCHAR_ARRAY {
        row.try_get::<_, Option<Vec<String>>>(index)?
            .map(Value::from)
    } else {
        // TEXT, VARCHAR and any remaining textual type
        row.try_get::<_, Option<String>>(index)?.map(Value::String)
    };
    Ok(value)
}

fn asset_url(host: &str, id: &str) -> String {
    // protocol-relative, host-qualified from the request
    format!("//{host}/asset/{id}")
}
