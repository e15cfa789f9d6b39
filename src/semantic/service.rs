//! Semantic search service over indexed forum posts.
//!
//! Provides a high-level interface for semantic search operations:
//! - Embeds queries and runs top-K lookups against the vector store
//! - Reports index statistics on a best-effort basis
//! - Embeds and upserts scored posts

use std::sync::Arc;

use serde::Serialize;

use crate::semantic::embeddings::{Embedder, EmbeddingError};
use crate::semantic::store::{IndexStats, IndexedPost, VectorRecord, VectorStore, VectorStoreError};

/// Largest `top_k` a query may ask for.
pub const MAX_TOP_K: usize = 500;

/// Errors that can occur during semantic search operations.
#[derive(Debug, thiserror::Error)]
pub enum SemanticSearchError {
    #[error("top_k must be between 1 and 500, got {0}")]
    InvalidTopK(usize),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector store error: {0}")]
    Store(#[from] VectorStoreError),

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// A post returned by a semantic query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    pub id: String,
    /// Similarity reported by the store.
    pub score: f32,
    pub post: IndexedPost,
}

/// Service for semantic search over posts held in a remote vector index.
pub struct SemanticSearchService {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    dimensions: usize,
}

impl SemanticSearchService {
    /// # Arguments
    /// * `embedder` - Sentence embedding model
    /// * `store` - Vector index holding post embeddings
    /// * `dimensions` - Embedding dimensions the index was created with
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, dimensions: usize) -> Self {
        Self {
            embedder,
            store,
            dimensions,
        }
    }

    /// Search for posts semantically similar to `query`.
    ///
    /// # Returns
    /// At most `top_k` posts in the order the store ranked them (most
    /// similar first). Matches without readable metadata are skipped.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchMatch>, SemanticSearchError> {
        if !(1..=MAX_TOP_K).contains(&top_k) {
            return Err(SemanticSearchError::InvalidTopK(top_k));
        }

        let vector = self.embedder.embed(query)?;
        self.check_dimensions(&vector)?;

        let matches = self.store.query(&vector, top_k, true)?;
        log::info!("semantic query top_k={top_k} matches={}", matches.len());

        let results = matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                match serde_json::from_value::<IndexedPost>(metadata) {
                    Ok(post) => Some(SearchMatch {
                        id: m.id,
                        score: m.score,
                        post,
                    }),
                    Err(e) => {
                        log::warn!("skipping match {} with unreadable metadata: {e}", m.id);
                        None
                    }
                }
            })
            .take(top_k)
            .collect();

        Ok(results)
    }

    /// Index fullness and size, or `None` when the store cannot be reached.
    pub fn describe_index(&self) -> Option<IndexStats> {
        match self.store.describe_index_stats() {
            Ok(stats) => Some(stats),
            Err(e) => {
                log::warn!("index statistics unavailable: {e}");
                None
            }
        }
    }

    /// Embed and upsert `posts`, each under its content-derived id.
    ///
    /// Returns the number of vectors the store reports as written.
    pub fn index_posts(&self, posts: &[IndexedPost]) -> Result<usize, SemanticSearchError> {
        if posts.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = posts.iter().map(|p| p.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts)?;
        if embeddings.len() != posts.len() {
            return Err(SemanticSearchError::Embedding(EmbeddingError::EmbeddingFailed(
                format!("{} embeddings for {} posts", embeddings.len(), posts.len()),
            )));
        }

        let vectors = posts
            .iter()
            .zip(embeddings)
            .map(|(post, values)| {
                self.check_dimensions(&values)?;
                Ok(VectorRecord {
                    id: post.vector_id(),
                    values,
                    metadata: post.clone(),
                })
            })
            .collect::<Result<Vec<_>, SemanticSearchError>>()?;

        let written = self.store.upsert(&vectors)?;
        log::info!("indexed {written} posts");
        Ok(written)
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), SemanticSearchError> {
        if vector.len() != self.dimensions {
            return Err(SemanticSearchError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }
        Ok(())
    }
}
