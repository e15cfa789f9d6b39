//! Pinecone REST client.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::SemanticConfig;
use crate::semantic::store::{
    IndexStats, QueryMatch, VectorRecord, VectorStore, VectorStoreError,
};

/// Pinecone accepts at most this many vectors per upsert request.
const UPSERT_BATCH: usize = 100;

const METRIC: &str = "cosine";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    index_fullness: f32,
    total_vector_count: u64,
}

/// Blocking client for one named Pinecone index.
pub struct PineconeIndex {
    client: Client,
    index_name: String,
    /// Data-plane host, e.g. `https://name-project.svc.env.pinecone.io`
    host: String,
    /// Control-plane host, e.g. `https://controller.env.pinecone.io`
    controller: String,
    dimension: usize,
}

impl PineconeIndex {
    /// Builds a client for `config.index_name`.
    ///
    /// The API key is read from `PINECONE_API_KEY`.
    pub fn new(config: &SemanticConfig) -> Result<Self, VectorStoreError> {
        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| VectorStoreError::Config("PINECONE_API_KEY is not set".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim())
                .map_err(|_| VectorStoreError::Config("invalid PINECONE_API_KEY".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            index_name: config.index_name.clone(),
            host: config.index_host.trim_end_matches('/').to_string(),
            controller: config.controller_url.trim_end_matches('/').to_string(),
            dimension: config.dimension,
        })
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Whether a data-plane host is configured. Only `ensure_index` works
    /// without one.
    pub fn has_host(&self) -> bool {
        !self.host.is_empty()
    }

    /// Create the index (cosine metric, configured dimension) unless it
    /// already exists. Returns true when it was created.
    pub fn ensure_index(&self) -> Result<bool, VectorStoreError> {
        let url = format!("{}/databases", self.controller);
        let resp = check(self.client.get(&url).send()?)?;
        let existing: Vec<String> = resp.json()?;

        if existing.iter().any(|name| name == &self.index_name) {
            log::info!("index {} already exists", self.index_name);
            return Ok(false);
        }

        log::info!(
            "creating index {} (dimension={}, metric={METRIC})",
            self.index_name,
            self.dimension
        );
        let body = json!({
            "name": self.index_name,
            "dimension": self.dimension,
            "metric": METRIC,
        });
        check(self.client.post(&url).json(&body).send()?)?;
        Ok(true)
    }
}

impl VectorStore for PineconeIndex {
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>, VectorStoreError> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata,
            include_values: false,
        };
        let resp = check(
            self.client
                .post(format!("{}/query", self.host))
                .json(&request)
                .send()?,
        )?;
        let payload: QueryResponse = resp.json()?;
        Ok(payload.matches)
    }

    fn upsert(&self, vectors: &[VectorRecord]) -> Result<usize, VectorStoreError> {
        let mut written = 0;
        for batch in vectors.chunks(UPSERT_BATCH) {
            let resp = check(
                self.client
                    .post(format!("{}/vectors/upsert", self.host))
                    .json(&UpsertRequest { vectors: batch })
                    .send()?,
            )?;
            let payload: UpsertResponse = resp.json()?;
            written += payload.upserted_count;
        }
        Ok(written)
    }

    fn describe_index_stats(&self) -> Result<IndexStats, VectorStoreError> {
        let resp = check(
            self.client
                .get(format!("{}/describe_index_stats", self.host))
                .send()?,
        )?;
        let payload: StatsResponse = resp.json()?;
        Ok(IndexStats {
            fullness: payload.index_fullness.clamp(0.0, 1.0),
            total_count: payload.total_vector_count,
        })
    }
}

fn check(
    resp: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, VectorStoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp
        .text()
        .unwrap_or_else(|_| "<body unavailable>".to_string());
    Err(VectorStoreError::Status {
        status: status.as_u16(),
        body,
    })
}
