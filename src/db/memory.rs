use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use tokio::sync::RwLock;

use super::{expect_object, Query, Store, StoreError, StoreResult, Table};

/// In-process store with the same upsert/insert semantics as the hosted one
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Map<String, Value>>>>,
    next_id: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Text form of a column value, as used by equality filters
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn column_matches(row: &Map<String, Value>, column: &str, expected: &str) -> bool {
    row.get(column)
        .filter(|v| !v.is_null())
        .is_some_and(|v| text_of(v) == expected)
}

/// Order two column values; missing and null sort lowest
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        (Some(Value::Null) | None, _) => Ordering::Less,
        (_, Some(Value::Null) | None) => Ordering::Greater,
        (Some(x), Some(y)) => text_of(x).cmp(&text_of(y)),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of rows currently held in `table`
    pub async fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .get(&table)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn assign_id(&self, table: Table, row: &mut Map<String, Value>) {
        if table.has_serial_id() && row.get("id").map_or(true, Value::is_null) {
            let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
            row.insert("id".to_string(), Value::from(id));
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_by_key(
        &self,
        table: Table,
        column: &str,
        key: &str,
    ) -> StoreResult<Option<Value>> {
        let tables = self.tables.read().await;
        let row = tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|row| column_matches(row, column, key)))
            .cloned()
            .map(Value::Object);
        Ok(row)
    }

    async fn query_all(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Map<String, Value>> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|(column, value)| column_matches(row, column, value))
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .take(limit)
            .cloned()
            .map(Value::Object)
            .collect())
    }

    async fn upsert(
        &self,
        table: Table,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> StoreResult<Vec<Value>> {
        for row in &rows {
            let fields = expect_object(row)?;
            if fields.get(on_conflict).map_or(true, Value::is_null) {
                return Err(StoreError::InvalidRow(format!(
                    "missing conflict column {on_conflict}"
                )));
            }
        }

        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();
        let mut written = Vec::with_capacity(rows.len());

        for row in rows {
            let Value::Object(fields) = row else {
                continue;
            };
            let key = text_of(&fields[on_conflict]);

            match stored
                .iter_mut()
                .find(|existing| column_matches(existing, on_conflict, &key))
            {
                Some(existing) => {
                    existing.extend(fields);
                    written.push(Value::Object(existing.clone()));
                }
                None => {
                    let mut fields = fields;
                    self.assign_id(table, &mut fields);
                    written.push(Value::Object(fields.clone()));
                    stored.push(fields);
                }
            }
        }

        Ok(written)
    }

    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value> {
        let mut fields = expect_object(&row)?.clone();
        let column = table.unique_key();

        let mut tables = self.tables.write().await;
        let stored = tables.entry(table).or_default();

        if let Some(key) = fields.get(column).filter(|v| !v.is_null()).map(text_of) {
            if stored
                .iter()
                .any(|existing| column_matches(existing, column, &key))
            {
                return Err(StoreError::Conflict {
                    table,
                    column: column.to_string(),
                });
            }
        }

        self.assign_id(table, &mut fields);
        stored.push(fields.clone());
        Ok(Value::Object(fields))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
