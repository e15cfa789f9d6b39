//! Reductions over scored items, shaped for bar/pie and trend charts.

use serde::{Deserialize, Serialize};

use crate::sentiment::{Sentiment, SentimentResult};

/// Per-category tallies. All three buckets always exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    pub negative: usize,
    pub neutral: usize,
    pub positive: usize,
}

impl SentimentCounts {
    pub fn add(&mut self, label: Sentiment) {
        match label {
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Positive => self.positive += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.negative + self.neutral + self.positive
    }

    /// Buckets in display order.
    pub fn buckets(&self) -> Vec<(Sentiment, usize)> {
        vec![
            (Sentiment::Negative, self.negative),
            (Sentiment::Neutral, self.neutral),
            (Sentiment::Positive, self.positive),
        ]
    }

    /// Display buckets with the neutral one removed.
    pub fn without_neutral(&self) -> Vec<(Sentiment, usize)> {
        self.buckets()
            .into_iter()
            .filter(|(label, _)| *label != Sentiment::Neutral)
            .collect()
    }
}

/// Tally labels. Order-independent.
pub fn count_by_sentiment(results: &[SentimentResult]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for result in results {
        counts.add(result.label);
    }
    counts
}

/// Signed value per result, index-aligned with `results`.
pub fn to_signed(results: &[SentimentResult]) -> Vec<f32> {
    results.iter().map(SentimentResult::signed).collect()
}

/// Tally stored signed values: >0 positive, <0 negative, anything else neutral.
pub fn count_by_signed(values: &[f32]) -> SentimentCounts {
    let mut counts = SentimentCounts::default();
    for value in values {
        let label = if *value > 0.0 {
            Sentiment::Positive
        } else if *value < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        };
        counts.add(label);
    }
    counts
}
