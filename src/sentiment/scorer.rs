//! Batched sentiment scoring with result memoization.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{fingerprint, Fingerprint, TtlCache};
use crate::sanitize::sanitize_with_limit;
use crate::sentiment::classifier::{ClassifierError, TextClassifier, TokenizerOptions};
use crate::sentiment::labels::map_label;
use crate::sentiment::SentimentResult;

#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("classifier returned {got} predictions for {expected} texts")]
    Misaligned { expected: usize, got: usize },

    #[error("classifier returned unknown label {0:?}")]
    UnknownLabel(String),
}

/// Scores text with a classification model, one batch call per request.
pub struct SentimentScorer {
    classifier: Arc<dyn TextClassifier>,
    options: TokenizerOptions,
    max_chars: usize,
    cache: TtlCache<Fingerprint, Vec<SentimentResult>>,
}

impl SentimentScorer {
    /// # Arguments
    /// * `classifier` - Model handle, shared for the whole process
    /// * `options` - Tokenizer options forwarded on every call
    /// * `max_chars` - Character budget per text after sanitizing
    /// * `ttl` - Lifetime of cached results
    pub fn new(
        classifier: Arc<dyn TextClassifier>,
        options: TokenizerOptions,
        max_chars: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            classifier,
            options,
            max_chars,
            cache: TtlCache::new(ttl),
        }
    }

    /// Sanitize every text, preserving order.
    pub fn prepare<S: AsRef<str>>(&self, texts: &[S]) -> Vec<String> {
        texts
            .iter()
            .map(|text| sanitize_with_limit(text.as_ref(), self.max_chars))
            .collect()
    }

    /// Score `texts`, index-aligned with the input. Never cached.
    ///
    /// Any classifier failure aborts the whole batch.
    pub fn score<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<SentimentResult>, ScoreError> {
        let prepared = self.prepare(texts);
        self.score_prepared(&prepared)
    }

    /// Score `texts` for `keyword`, reusing a fresh result for the same
    /// keyword and sanitized texts without calling the model.
    pub fn score_cached<S: AsRef<str>>(
        &self,
        keyword: &str,
        texts: &[S],
    ) -> Result<Vec<SentimentResult>, ScoreError> {
        let prepared = self.prepare(texts);
        let key = fingerprint(keyword, &prepared);
        self.cache
            .get_or_try_insert_with(key, || self.score_prepared(&prepared))
    }

    /// Drop stale cached results. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }

    fn score_prepared(&self, texts: &[String]) -> Result<Vec<SentimentResult>, ScoreError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        log::info!(
            "scoring {} texts with {}",
            texts.len(),
            self.classifier.name()
        );
        let predictions = self.classifier.classify(texts, &self.options)?;

        if predictions.len() != texts.len() {
            return Err(ScoreError::Misaligned {
                expected: texts.len(),
                got: predictions.len(),
            });
        }

        predictions
            .into_iter()
            .map(|prediction| {
                let label = map_label(&prediction.label)
                    .ok_or(ScoreError::UnknownLabel(prediction.label))?;
                let confidence = if prediction.score.is_nan() {
                    0.0
                } else {
                    prediction.score.clamp(0.0, 1.0)
                };
                Ok(SentimentResult { label, confidence })
            })
            .collect()
    }
}
