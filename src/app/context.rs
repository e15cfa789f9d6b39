use crate::{
    app::AppError, config::Config, scraper::Scraper, semantic::SemanticSearchService,
    sentiment::SentimentScorer,
};

/// Shared state built once at startup: the configuration and the two
/// pipelines with their caches.
pub struct AppContext {
    config: Config,
    scraper: Scraper,
    scorer: SentimentScorer,
    /// `None` when the vector index is not configured.
    semantic: Option<SemanticSearchService>,
}

impl AppContext {
    pub fn new(
        config: Config,
        scraper: Scraper,
        scorer: SentimentScorer,
        semantic: Option<SemanticSearchService>,
    ) -> Self {
        Self {
            config,
            scraper,
            scorer,
            semantic,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scraper(&self) -> &Scraper {
        &self.scraper
    }

    pub fn scorer(&self) -> &SentimentScorer {
        &self.scorer
    }

    pub fn semantic(&self) -> Result<&SemanticSearchService, AppError> {
        self.semantic.as_ref().ok_or(AppError::SemanticDisabled)
    }

    pub fn has_semantic(&self) -> bool {
        self.semantic.is_some()
    }
}
