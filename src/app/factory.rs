use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use homedir::my_home;

use crate::{
    app::{AppContext, AppError, AppService},
    config::Config,
    forum::RedditClient,
    scraper::Scraper,
    semantic::{LazyEmbeddingModel, PineconeIndex, SemanticSearchService},
    sentiment::{HuggingFaceClassifier, SentimentScorer, TokenizerOptions},
};

const BASE_PATH_ENV: &str = "FORUM_SENTIMENT_HOME";

/// Builds application components from configuration
pub struct AppFactory;

impl AppFactory {
    /// Load config from the base path and wire up the real clients.
    pub fn create_app_service() -> anyhow::Result<AppService> {
        let base_path = Self::get_base_path()?;
        let config = Config::load_with(&base_path)
            .with_context(|| format!("failed to load config from {}", base_path.display()))?;

        let context = Self::create_context(config)?;
        Ok(AppService::new(context))
    }

    pub fn create_context(config: Config) -> Result<AppContext, AppError> {
        let forum = Arc::new(RedditClient::new(&config.forum)?);
        let scraper = Scraper::new(forum, Duration::from_secs(config.scrape.cache_ttl_secs));

        let classifier = Arc::new(HuggingFaceClassifier::new(&config.sentiment)?);
        let options = TokenizerOptions {
            max_length: config.sentiment.max_length,
            ..Default::default()
        };
        let scorer = SentimentScorer::new(
            classifier,
            options,
            config.sentiment.max_chars,
            Duration::from_secs(config.sentiment.cache_ttl_secs),
        );

        let semantic = Self::create_semantic_service(&config);

        Ok(AppContext::new(config, scraper, scorer, semantic))
    }

    /// Semantic search needs a reachable index; without one the rest of the
    /// app still works.
    fn create_semantic_service(config: &Config) -> Option<SemanticSearchService> {
        let index = match PineconeIndex::new(&config.semantic) {
            Ok(index) if index.has_host() => index,
            Ok(_) => {
                log::warn!("semantic search disabled: semantic.index_host is not set");
                return None;
            }
            Err(e) => {
                log::warn!("semantic search disabled: {e}");
                return None;
            }
        };

        let embedder = Arc::new(LazyEmbeddingModel::new(
            &config.semantic.embedding_model,
            config.base_path().to_path_buf(),
        ));

        Some(SemanticSearchService::new(
            embedder,
            Arc::new(index),
            config.semantic.dimension,
        ))
    }

    /// Client for index administration; works without a data-plane host.
    pub fn create_index(config: &Config) -> Result<PineconeIndex, AppError> {
        Ok(PineconeIndex::new(&config.semantic)?)
    }

    /// `FORUM_SENTIMENT_HOME`, else `~/.local/share/forum-sentiment`
    pub fn get_base_path() -> anyhow::Result<PathBuf> {
        if let Ok(path) = std::env::var(BASE_PATH_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home = my_home()
            .context("could not determine home directory")?
            .context("home directory path is empty")?;
        Ok(home.join(".local/share/forum-sentiment"))
    }
}
