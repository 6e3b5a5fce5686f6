use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool, Postgres};
use std::time::Duration;

use super::{expect_object, Query, Store, StoreError, StoreResult, Table};

/// Direct Postgres access to the hosted store's tables
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Quote a column name, rejecting anything that is not a plain identifier
fn quote_ident(name: &str) -> StoreResult<String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());

    if valid {
        Ok(format!("\"{name}\""))
    } else {
        Err(StoreError::InvalidRow(format!("invalid column name: {name}")))
    }
}

fn map_insert_error(table: Table, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict {
                table,
                column: table.unique_key().to_string(),
            };
        }
    }
    StoreError::Database(err)
}

/// Build the SELECT for `query_all`, returning the SQL and its bind values
fn select_sql(table: Table, query: &Query) -> StoreResult<(String, Vec<String>)> {
    let mut sql = format!("SELECT to_jsonb(t) FROM \"{}\" t", table.name());
    let mut binds = Vec::with_capacity(query.filters.len());

    for (i, (column, value)) in query.filters.iter().enumerate() {
        let keyword = if i == 0 { "WHERE" } else { "AND" };
        sql.push_str(&format!(
            " {keyword} t.{}::text = ${}",
            quote_ident(column)?,
            i + 1
        ));
        binds.push(value.clone());
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "DESC" } else { "ASC" };
        sql.push_str(&format!(
            " ORDER BY t.{} {direction}",
            quote_ident(&order.column)?
        ));
    }

    if let Some(limit) = query.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    Ok((sql, binds))
}

/// Build an INSERT fed from `jsonb_populate_record` so every column keeps its
/// declared type. With `on_conflict`, only the supplied columns are updated.
fn insert_sql(table: Table, row: &Value, on_conflict: Option<&str>) -> StoreResult<String> {
    let fields = expect_object(row)?;
    let columns = fields
        .keys()
        .map(|k| quote_ident(k))
        .collect::<StoreResult<Vec<_>>>()?;
    if columns.is_empty() {
        return Err(StoreError::InvalidRow("row has no columns".to_string()));
    }

    let name = table.name();
    let column_list = columns.join(", ");
    let mut sql = format!(
        "INSERT INTO \"{name}\" ({column_list}) \
         SELECT {column_list} FROM jsonb_populate_record(NULL::\"{name}\", $1)"
    );

    if let Some(conflict) = on_conflict {
        let updates = columns
            .iter()
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(
            " ON CONFLICT ({}) DO UPDATE SET {updates}",
            quote_ident(conflict)?
        ));
    }

    sql.push_str(&format!(" RETURNING to_jsonb(\"{name}\".*)"));
    Ok(sql)
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a bounded pool to `database_url`
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        tracing::info!("Creating database connection pool...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        tracing::info!("Database connection pool created successfully");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_by_key(
        &self,
        table: Table,
        column: &str,
        key: &str,
    ) -> StoreResult<Option<Value>> {
        let (sql, binds) = select_sql(table, &Query::new().eq(column, key).limit(1))?;
        let mut query = sqlx::query_scalar::<Postgres, Value>(&sql);
        for value in binds {
            query = query.bind(value);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn query_all(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>> {
        let (sql, binds) = select_sql(table, query)?;
        let mut select = sqlx::query_scalar::<Postgres, Value>(&sql);
        for value in binds {
            select = select.bind(value);
        }
        Ok(select.fetch_all(&self.pool).await?)
    }

    async fn upsert(
        &self,
        table: Table,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> StoreResult<Vec<Value>> {
        let mut tx = self.pool.begin().await?;
        let mut written = Vec::with_capacity(rows.len());

        for row in rows {
            let sql = insert_sql(table, &row, Some(on_conflict))?;
            let stored = sqlx::query_scalar::<Postgres, Value>(&sql)
                .bind(Json(row))
                .fetch_one(&mut *tx)
                .await?;
            written.push(stored);
        }

        tx.commit().await?;
        Ok(written)
    }

    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value> {
        let sql = insert_sql(table, &row, None)?;
        sqlx::query_scalar::<Postgres, Value>(&sql)
            .bind(Json(row))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_insert_error(table, e))
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
