//! Vector store seam and the records it holds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::flatten::Record;

/// Metadata stored next to each post embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedPost {
    pub title: String,
    /// Omitted for deleted accounts; the store rejects null metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub text: String,
    /// Signed sentiment of `text`.
    pub sentiment: f32,
}

impl IndexedPost {
    pub fn from_record(record: &Record, sentiment: f32) -> Self {
        Self {
            title: record.thread_title.clone(),
            author: record.author.clone(),
            created_at: record.created_at,
            text: record.text.clone(),
            sentiment,
        }
    }

    /// Stable vector id derived from the post content, so re-indexing the
    /// same post overwrites its vector.
    pub fn vector_id(&self) -> String {
        let created_at = self.created_at.to_rfc3339();
        let fields = [
            self.title.as_str(),
            self.author.as_deref().unwrap_or(""),
            created_at.as_str(),
            self.text.as_str(),
        ];

        let mut hasher = Sha256::new();
        hasher.update([self.author.is_some() as u8]);
        for field in fields {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

/// A vector to upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: IndexedPost,
}

/// One nearest-neighbor hit as the store reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Index occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    /// In [0, 1].
    pub fullness: f32,
    pub total_count: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("vector store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("vector store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected vector store response: {0}")]
    Malformed(String),

    #[error("vector store misconfigured: {0}")]
    Config(String),
}

/// Remote vector index.
pub trait VectorStore: Send + Sync {
    /// `top_k` nearest vectors by the index metric, best first.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>, VectorStoreError>;

    /// Insert or overwrite vectors. Returns the number written.
    fn upsert(&self, vectors: &[VectorRecord]) -> Result<usize, VectorStoreError>;

    fn describe_index_stats(&self) -> Result<IndexStats, VectorStoreError>;
}
