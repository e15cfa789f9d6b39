use serde::{Deserialize, Serialize};

/// Tokenizer options forwarded to the classification model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    pub padding: bool,
    pub truncation: bool,
    /// Maximum sequence length in subword tokens.
    pub max_length: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            padding: true,
            truncation: true,
            max_length: 512,
        }
    }
}

/// A label/score pair as the model reports it. Labels are model-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrediction {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("classifier returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected classifier response: {0}")]
    Malformed(String),

    #[error("classifier misconfigured: {0}")]
    Config(String),
}

/// Text-classification model.
///
/// Implementations return one prediction per input, in input order.
pub trait TextClassifier: Send + Sync {
    fn classify(
        &self,
        texts: &[String],
        options: &TokenizerOptions,
    ) -> Result<Vec<RawPrediction>, ClassifierError>;

    fn name(&self) -> &str;
}
