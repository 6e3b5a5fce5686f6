use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::{expect_object, Query, Store, StoreError, StoreResult, Table};

const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=representation";
const INSERT_PREFER: &str = "return=representation";

/// Client for the hosted store's PostgREST interface
#[derive(Debug, Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    key: String,
}

/// Encode `query` as PostgREST query parameters
fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{value}")));
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }

    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

/// Turn a non-success response into `StoreError::Api`, or decode the rows
async fn read_rows(response: Response) -> StoreResult<Vec<Value>> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

impl RestStore {
    pub fn new(base_url: &str, key: &str) -> StoreResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn request(&self, method: Method, table: Table) -> RequestBuilder {
        self.http
            .request(method, self.table_url(table))
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }
}

#[async_trait]
impl Store for RestStore {
    async fn get_by_key(
        &self,
        table: Table,
        column: &str,
        key: &str,
    ) -> StoreResult<Option<Value>> {
        let params = query_params(&Query::new().eq(column, key).limit(1));
        let response = self
            .request(Method::GET, table)
            .query(&params)
            .send()
            .await?;
        Ok(read_rows(response).await?.into_iter().next())
    }

    async fn query_all(&self, table: Table, query: &Query) -> StoreResult<Vec<Value>> {
        let response = self
            .request(Method::GET, table)
            .query(&query_params(query))
            .send()
            .await?;
        read_rows(response).await
    }

    async fn upsert(
        &self,
        table: Table,
        rows: Vec<Value>,
        on_conflict: &str,
    ) -> StoreResult<Vec<Value>> {
        for row in &rows {
            expect_object(row)?;
        }

        let response = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", UPSERT_PREFER)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&rows)
            .send()
            .await?;
        read_rows(response).await
    }

    async fn insert(&self, table: Table, row: Value) -> StoreResult<Value> {
        expect_object(&row)?;

        let response = self
            .request(Method::POST, table)
            .header("Prefer", INSERT_PREFER)
            .json(&[row])
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict {
                table,
                column: table.unique_key().to_string(),
            });
        }

        read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidRow("insert returned no row".to_string()))
    }

    fn backend(&self) -> &'static str {
        "rest"
    }
}
