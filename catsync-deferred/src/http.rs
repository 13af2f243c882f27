//! [`KeyValueClient`] over the platform's custom-object REST endpoints.

use crate::client::{KeyValueClient, PageRequest, Query, StoredEntry};
use crate::error::{DeferredError, DeferredResult};
use async_trait::async_trait;
use catsync_batch::RequestError;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Connection settings for [`HttpKeyValueClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpStoreConfig {
    /// API root, without trailing slash.
    pub api_base_url: String,
    pub project_key: String,
    /// Bearer token. Usually supplied through the environment rather than a
    /// config file.
    #[serde(skip_serializing)]
    pub access_token: String,
    /// Entries fetched per query request.
    pub page_size: usize,
    pub timeout_secs: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.europe-west1.gcp.commercetools.com".to_string(),
            project_key: String::new(),
            access_token: String::new(),
            page_size: 500,
            timeout_secs: 60,
        }
    }
}

/// Wire shape of a stored custom object.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomObject {
    container: String,
    key: String,
    value: Value,
    version: u64,
    last_modified_at: DateTime<Utc>,
}

impl From<CustomObject> for StoredEntry {
    fn from(object: CustomObject) -> Self {
        Self {
            container: object.container,
            key: object.key,
            value: object.value,
            version: object.version,
            last_modified_at: object.last_modified_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PagedResponse {
    results: Vec<CustomObject>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    current_version: Option<u64>,
}

/// HTTP-backed key-value client.
pub struct HttpKeyValueClient {
    config: HttpStoreConfig,
    client: Client,
}

impl HttpKeyValueClient {
    pub fn new(config: HttpStoreConfig) -> DeferredResult<Self> {
        if config.project_key.trim().is_empty() {
            return Err(DeferredError::Config("project key is empty".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeferredError::Config(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpStoreConfig {
        &self.config
    }

    fn objects_url(&self) -> String {
        format!(
            "{}/{}/custom-objects",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.project_key
        )
    }

    fn object_url(&self, container: &str, key: &str) -> String {
        format!("{}/{container}/{key}", self.objects_url())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(classify(response).await)
    }
}

async fn classify(response: Response) -> RequestError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = if body.message.is_empty() { text } else { body.message };
    debug!(status = status.as_u16(), "custom-object request failed: {message}");
    match status {
        StatusCode::NOT_FOUND => RequestError::NotFound(message),
        StatusCode::CONFLICT => RequestError::Conflict {
            current_version: body.errors.iter().find_map(|e| e.current_version),
            message,
        },
        _ => RequestError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, RequestError> {
    response
        .json()
        .await
        .map_err(|e| RequestError::Invalid(format!("malformed response: {e}")))
}

#[async_trait]
impl KeyValueClient for HttpKeyValueClient {
    async fn get(&self, container: &str, key: &str) -> Result<Option<StoredEntry>, RequestError> {
        let request = self.client.get(self.object_url(container, key));
        match self.send(request).await {
            Ok(response) => Ok(Some(decode::<CustomObject>(response).await?.into())),
            Err(RequestError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn query(
        &self,
        container: &str,
        query: &Query,
        page: PageRequest,
    ) -> Result<Vec<StoredEntry>, RequestError> {
        let request = self
            .client
            .get(format!("{}/{container}", self.objects_url()))
            .query(&[
                ("where", query.to_predicate()),
                ("sort", "key asc".to_string()),
                ("limit", page.limit.to_string()),
                ("offset", page.offset.to_string()),
                ("withTotal", "false".to_string()),
            ]);
        let response = self.send(request).await?;
        let paged: PagedResponse = decode(response).await?;
        Ok(paged.results.into_iter().map(StoredEntry::from).collect())
    }

    async fn upsert(&self, container: &str, key: &str, value: Value) -> Result<StoredEntry, RequestError> {
        let request = self.client.post(self.objects_url()).json(&json!({
            "container": container,
            "key": key,
            "value": value,
        }));
        let response = self.send(request).await?;
        Ok(decode::<CustomObject>(response).await?.into())
    }

    async fn delete(&self, container: &str, key: &str) -> Result<StoredEntry, RequestError> {
        let request = self.client.delete(self.object_url(container, key));
        let response = self.send(request).await?;
        Ok(decode::<CustomObject>(response).await?.into())
    }
}
