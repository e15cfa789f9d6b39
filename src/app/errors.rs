use crate::{
    config::ConfigError,
    forum::ForumError,
    semantic::{EmbeddingError, SemanticSearchError, VectorStoreError},
    sentiment::{ClassifierError, ScoreError},
};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("forum: {0}")]
    Forum(#[from] ForumError),

    #[error("sentiment: {0}")]
    Score(#[from] ScoreError),

    #[error("classifier: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("semantic search: {0}")]
    Semantic(#[from] SemanticSearchError),

    #[error("vector store: {0}")]
    Store(#[from] VectorStoreError),

    #[error("embedding: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("semantic search is disabled: set PINECONE_API_KEY and semantic.index_host")]
    SemanticDisabled,

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Errors caused by the request itself rather than a collaborator.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Semantic(SemanticSearchError::InvalidTopK(_))
        )
    }
}
