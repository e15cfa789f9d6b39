//! Semantic search over indexed forum posts.
//!
//! Post embeddings live in a remote vector index; this module embeds
//! queries locally with fastembed-rs and asks the index for neighbors.
//!
//! # Architecture
//!
//! - `embeddings`: Wraps fastembed for embedding generation
//! - `store`: Vector store seam and stored metadata
//! - `pinecone`: Pinecone REST implementation of the store
//! - `service`: High-level semantic search service

pub mod embeddings;
pub mod pinecone;
mod service;
pub mod store;

pub use embeddings::{Embedder, EmbeddingError, EmbeddingModel, LazyEmbeddingModel};
pub use pinecone::PineconeIndex;
pub use service::{SearchMatch, SemanticSearchError, SemanticSearchService, MAX_TOP_K};
pub use store::{IndexStats, IndexedPost, QueryMatch, VectorRecord, VectorStore, VectorStoreError};

/// Default embedding model (384 dimensions).
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

/// Embedding dimensions of the index.
pub const DEFAULT_DIMENSIONS: usize = 384;
