pub mod memory;
pub mod postgres;
pub mod rest;
pub mod tables;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::config::Config;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use rest::RestStore;
pub use tables::Table;

/// Shared handle to whichever store backend is configured
pub type DynStore = Arc<dyn Store>;

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Duplicate value for {table}.{column}")]
    Conflict { table: Table, column: String },

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Ordering applied to a `Query`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Read options for `Store::query_all`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Equality filters, compared on the column's text representation
    pub filters: Vec<(String, String)>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn order_asc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Row-level access to the external store.
///
/// Rows travel as JSON objects; typing happens in the handlers. Uniqueness is
/// enforced by the store itself, never by callers.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the single row whose `column` equals `key`
    async fn get_by_key(&self, table: Table, column: &str, key: &str)
        -> StoreResult<Option<Value>>;

    /// Fetch all rows matching `query`
    async fn query_all(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>>;

    /// Insert or merge rows on `on_conflict`, returning the stored rows.
    /// Columns absent from a row keep their previous value; last write wins.
    async fn upsert(&self, table: Table, rows: Vec<Value>, on_conflict: &str)
        -> StoreResult<Vec<Value>>;

    /// Insert a new row, failing with `StoreError::Conflict` if its unique key exists
    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    /// Cheap connectivity check
    async fn ping(&self) -> StoreResult<()> {
        self.query_all(Table::Settings, &Query::new().limit(1))
            .await
            .map(|_| ())
    }
}

/// Require `row` to be a JSON object
pub(crate) fn expect_object(row: &Value) -> StoreResult<&serde_json::Map<String, Value>> {
    row.as_object()
        .ok_or_else(|| StoreError::InvalidRow(format!("expected a JSON object, got {row}")))
}

/// Open the store backend selected by the configuration
///
/// `DATABASE_URL` wins over the REST credentials. Without either, rows live in
/// process memory and are lost on restart.
pub async fn open_store(config: &Config) -> StoreResult<DynStore> {
    if let Some(url) = &config.database_url {
        tracing::info!("Using Postgres store");
        return Ok(Arc::new(PgStore::connect(url).await?));
    }

    if let (Some(url), Some(key)) = (&config.supabase_url, &config.supabase_key) {
        tracing::info!("Using REST store at {}", url);
        return Ok(Arc::new(RestStore::new(url, key)?));
    }

    tracing::warn!("No store credentials configured, using in-memory store");
    Ok(Arc::new(MemoryStore::new()))
}
