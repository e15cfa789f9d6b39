use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::{self, StorageManager};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_CACHE_TTL_SECS: u64 = crate::cache::DEFAULT_TTL.as_secs();
/// Default sentiment model (reports LABEL_0..LABEL_2)
const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment";
const DEFAULT_INFERENCE_ENDPOINT: &str = "https://api-inference.huggingface.co";
/// Largest `top_k` a semantic query may request
const MAX_TOP_K: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("{field}: {message}")]
    Invalid { field: &'static str, message: String },
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Where posts are scraped from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    /// Subreddit searched for keywords (without the `r/` prefix)
    pub subreddit: String,
    pub base_url: String,
    /// Overridden by `REDDIT_USER_AGENT`
    pub user_agent: String,
    /// Maximum threads per search
    pub search_limit: u32,
    pub timeout_secs: u64,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            subreddit: "nus".to_string(),
            base_url: "https://www.reddit.com".to_string(),
            user_agent: concat!("forum-sentiment/", env!("CARGO_PKG_VERSION")).to_string(),
            search_limit: 100,
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub cache_ttl_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Sentiment classification settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Hugging Face model id
    pub model: String,
    pub endpoint: String,
    /// Characters kept per text after removing course codes
    pub max_chars: usize,
    /// Tokenizer max sequence length
    pub max_length: usize,
    pub cache_ttl_secs: u64,
    pub timeout_secs: u64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_SENTIMENT_MODEL.to_string(),
            endpoint: DEFAULT_INFERENCE_ENDPOINT.to_string(),
            max_chars: crate::sanitize::MAX_SANITIZED_CHARS,
            max_length: 512,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            timeout_secs: 120,
        }
    }
}

/// Configuration for semantic search functionality
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    pub embedding_model: String,
    pub index_name: String,
    /// Data-plane URL of the index
    pub index_host: String,
    /// Control-plane URL used to create the index
    pub controller_url: String,
    pub dimension: usize,
    /// `top_k` used when a query does not give one, [1, 500]
    pub default_top_k: usize,
    pub timeout_secs: u64,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            embedding_model: crate::semantic::DEFAULT_MODEL.to_string(),
            index_name: "nus-sentiment".to_string(),
            index_host: String::new(),
            controller_url: "https://controller.us-west1-gcp.pinecone.io".to_string(),
            dimension: crate::semantic::DEFAULT_DIMENSIONS,
            default_top_k: 10,
            timeout_secs: 30,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub bind: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forum: ForumConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub semantic: SemanticConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.forum.subreddit.trim().is_empty() {
            return Err(ConfigError::invalid("forum.subreddit", "must not be empty"));
        }
        if self.scrape.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid("scrape.cache_ttl_secs", "must be greater than 0"));
        }

        let sentiment = &self.sentiment;
        if sentiment.cache_ttl_secs == 0 {
            return Err(ConfigError::invalid(
                "sentiment.cache_ttl_secs",
                "must be greater than 0",
            ));
        }
        if sentiment.max_chars == 0 {
            return Err(ConfigError::invalid("sentiment.max_chars", "must be greater than 0"));
        }
        if sentiment.max_length == 0 {
            return Err(ConfigError::invalid("sentiment.max_length", "must be greater than 0"));
        }

        let semantic = &self.semantic;
        if semantic.dimension == 0 {
            return Err(ConfigError::invalid("semantic.dimension", "must be greater than 0"));
        }
        if !(1..=MAX_TOP_K).contains(&semantic.default_top_k) {
            return Err(ConfigError::invalid(
                "semantic.default_top_k",
                format!(
                    "must be between 1 and {MAX_TOP_K}, got {}",
                    semantic.default_top_k
                ),
            ));
        }

        Ok(())
    }

    /// Load `config.yaml` from `base_path`, creating it with defaults when
    /// missing and re-saving it when defaults were filled in.
    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base_path = base_path.as_ref();
        let store = storage::BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = storage::BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store.write(CONFIG_FILE, config_str.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
