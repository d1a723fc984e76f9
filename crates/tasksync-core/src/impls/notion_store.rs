//! NotionStore - the production `TableStore`, backed by the Notion REST API.
//!
//! # Endpoints
//! - `POST   /v1/pages`                  create
//! - `POST   /v1/databases/{id}/query`   query
//! - `GET    /v1/pages/{id}`             retrieve
//! - `PATCH  /v1/pages/{id}`             update / archive
//!
//! No retries and no timeouts beyond reqwest's defaults: a failed call is
//! returned to the caller as is.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::notion_codec::{decode_error, decode_page, encode_filter, encode_properties};
use crate::config::NotionSettings;
use crate::domain::errors::{ConfigError, StoreError};
use crate::domain::{DatabaseId, Properties, Record, RecordId};
use crate::ports::{QueryPage, QueryRequest, TableStore};

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    next_cursor: Option<String>,
    #[serde(default)]
    has_more: bool,
}

/// HTTP adapter for the Notion API.
pub struct NotionStore {
    client: Client,
    base_url: String,
    token: String,
    api_version: String,
}

impl NotionStore {
    /// Build a store from settings. The token must be set.
    pub fn new(settings: &NotionSettings) -> Result<Self, ConfigError> {
        Self::with_client(settings, Client::new())
    }

    pub fn with_client(settings: &NotionSettings, client: Client) -> Result<Self, ConfigError> {
        if settings.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if !settings.base_url.starts_with("http://") && !settings.base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                key: "NOTION_BASE_URL",
                value: settings.base_url.clone(),
            });
        }
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            api_version: settings.api_version.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }

    /// Send a request with auth headers and decode the JSON body.
    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let resp = request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(decode_error(status.as_u16(), &text));
        }
        Ok(resp.json().await?)
    }

    async fn patch_page(&self, id: &RecordId, body: Value) -> Result<Record, StoreError> {
        let page = self
            .send(self.client.patch(self.url(&format!("pages/{id}"))).json(&body))
            .await?;
        decode_page(&page)
    }
}

#[async_trait]
impl TableStore for NotionStore {
    #[tracing::instrument(skip_all, fields(database = %database))]
    async fn create(
        &self,
        database: &DatabaseId,
        properties: Properties,
    ) -> Result<RecordId, StoreError> {
        let body = json!({
            "parent": { "database_id": database.as_str() },
            "properties": encode_properties(&properties),
        });
        let page = self.send(self.client.post(self.url("pages")).json(&body)).await?;
        let record = decode_page(&page)?;
        debug!(record = %record.id, "page created");
        Ok(record.id)
    }

    #[tracing::instrument(skip_all, fields(database = %database))]
    async fn query(
        &self,
        database: &DatabaseId,
        request: QueryRequest,
    ) -> Result<QueryPage, StoreError> {
        let mut body = serde_json::Map::new();
        if let Some(filter) = &request.filter {
            body.insert("filter".into(), encode_filter(filter));
        }
        if let Some(cursor) = &request.start_cursor {
            body.insert("start_cursor".into(), json!(cursor));
        }
        if let Some(size) = request.page_size {
            body.insert("page_size".into(), json!(size));
        }

        let url = self.url(&format!("databases/{database}/query"));
        let raw = self
            .send(self.client.post(url).json(&Value::Object(body)))
            .await?;
        let resp: QueryResponse = serde_json::from_value(raw)?;

        let records = resp
            .results
            .iter()
            .map(decode_page)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = records.len(), has_more = resp.has_more, "query page");

        Ok(QueryPage {
            records,
            next_cursor: if resp.has_more { resp.next_cursor } else { None },
        })
    }

    async fn retrieve(&self, id: &RecordId) -> Result<Record, StoreError> {
        let page = self
            .send(self.client.get(self.url(&format!("pages/{id}"))))
            .await?;
        decode_page(&page)
    }

    async fn update(&self, id: &RecordId, properties: Properties) -> Result<Record, StoreError> {
        self.patch_page(id, json!({ "properties": encode_properties(&properties) }))
            .await
    }

    async fn archive(&self, id: &RecordId) -> Result<Record, StoreError> {
        self.patch_page(id, json!({ "archived": true })).await
    }
}
