//! Sentiment scoring and aggregation.
//!
//! # Architecture
//!
//! - `classifier`: the text-classification model seam
//! - `huggingface`: classifier backed by the Hugging Face Inference API
//! - `labels`: raw model label -> three-way taxonomy
//! - `scorer`: batched, cached scoring of sanitized text
//! - `aggregate`: counts and signed values for charts

pub mod aggregate;
pub mod classifier;
pub mod huggingface;
mod labels;
mod scorer;

use serde::{Deserialize, Serialize};

pub use aggregate::{count_by_sentiment, count_by_signed, to_signed, SentimentCounts};
pub use classifier::{ClassifierError, RawPrediction, TextClassifier, TokenizerOptions};
pub use huggingface::HuggingFaceClassifier;
pub use scorer::{ScoreError, SentimentScorer};

/// Three-way sentiment taxonomy used everywhere past the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label and confidence for one input text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: Sentiment,
    /// Model probability of `label`, in [0, 1].
    pub confidence: f32,
}

impl SentimentResult {
    pub fn new(label: Sentiment, confidence: f32) -> Self {
        Self { label, confidence }
    }

    /// +confidence for positive, -confidence for negative, 0 for neutral.
    pub fn signed(&self) -> f32 {
        match self.label {
            Sentiment::Positive => self.confidence,
            Sentiment::Negative => -self.confidence,
            Sentiment::Neutral => 0.0,
        }
    }
}
