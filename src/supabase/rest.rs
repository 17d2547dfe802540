use serde_json::Value;

use super::{read_json, ApiError, SupabaseClient};
use crate::backend::Query;

/// Render a query as PostgREST URL parameters
pub fn query_pairs(query: &Query) -> Vec<(String, String)> {
    let mut pairs = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        pairs.push((filter.column.clone(), format!("eq.{}", filter.value)));
    }

    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|o| {
                let direction = if o.ascending { "asc" } else { "desc" };
                format!("{}.{}", o.column, direction)
            })
            .collect::<Vec<_>>()
            .join(",");
        pairs.push(("order".to_string(), order));
    }

    if let Some(limit) = query.limit {
        pairs.push(("limit".to_string(), limit.to_string()));
    }

    pairs
}

impl SupabaseClient {
    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    pub(crate) async fn select_rows(&self, query: &Query) -> Result<Vec<Value>, ApiError> {
        let url = self.table_url(&query.table);
        let token = self.auth.access_token().await;

        tracing::debug!(table = %query.table, "Selecting rows");

        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .query(&query_pairs(query))
            .send()
            .await?;

        read_json(response).await
    }

    pub(crate) async fn insert_rows(&self, table: &str, rows: &[Value]) -> Result<Vec<Value>, ApiError> {
        let url = self.table_url(table);
        let token = self.auth.access_token().await;

        tracing::debug!(table = %table, count = rows.len(), "Inserting rows");

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=representation")
            .bearer_auth(token)
            .json(rows)
            .send()
            .await?;

        read_json(response).await
    }
}
