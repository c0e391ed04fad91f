use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search result from the document index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// A full document fetched by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Value,
}

/// Read-only access to the legal document index.
#[async_trait]
pub trait DocumentSearch: Send + Sync {
    /// Top `limit` documents relevant to `query`, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;

    /// Fetch one document by its reference; `None` when it does not exist.
    async fn fetch(&self, doc_id: &str) -> Result<Option<DocumentRecord>>;
}

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

/// HTTP client for the document search service.
///
/// `POST {base}/search` with `{query, limit}` returns `{results: [...]}`;
/// `GET {base}/documents/{id}` returns the record or 404.
pub struct HttpSearchClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpSearchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl DocumentSearch for HttpSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .json(&SearchPayload { query, limit })
            .send()
            .await
            .context("failed to reach document search service")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("document search error ({}): {}", status, error_text);
        }

        let body: SearchResponse = response
            .json()
            .await
            .context("malformed search response")?;
        Ok(body.results)
    }

    async fn fetch(&self, doc_id: &str) -> Result<Option<DocumentRecord>> {
        let response = self
            .http_client
            .get(format!("{}/documents/{}", self.base_url, doc_id))
            .send()
            .await
            .context("failed to reach document search service")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("document fetch error ({}): {}", status, error_text);
        }

        let record: DocumentRecord = response
            .json()
            .await
            .context("malformed document response")?;
        Ok(Some(record))
    }
}
