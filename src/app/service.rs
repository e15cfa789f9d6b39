use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    app::{AppContext, AppError},
    flatten::Record,
    semantic::{IndexStats, IndexedPost, SearchMatch},
    sentiment::{
        count_by_sentiment, count_by_signed, to_signed, Sentiment, SentimentCounts,
        SentimentResult,
    },
};

/// A scraped record with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub sentiment: SentimentResult,
    /// `sentiment` as a signed value for trend plots.
    pub signed: f32,
}

/// Everything needed to chart the sentiment of one keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordReport {
    pub keyword: String,
    pub records: Vec<ScoredRecord>,
    pub counts: SentimentCounts,
    /// Bar chart buckets; neutral is left out when excluded.
    pub buckets: Vec<(Sentiment, usize)>,
    /// Vectors written when indexing was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed: Option<usize>,
}

/// Semantic matches plus their sentiment summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticReport {
    pub query: String,
    pub matches: Vec<SearchMatch>,
    pub counts: SentimentCounts,
    /// (created_at, signed sentiment) per match, oldest first.
    pub trend: Vec<(DateTime<Utc>, f32)>,
}

pub struct AppService {
    context: AppContext,
}

impl AppService {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Scrape, score and summarize `keyword`, optionally indexing the
    /// scored records for semantic search.
    pub fn keyword_report(
        &self,
        keyword: &str,
        exclude_neutral: bool,
        index: bool,
    ) -> Result<KeywordReport, AppError> {
        let records = self.context.scraper().get_or_scrape(keyword)?;
        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        let results = self.context.scorer().score_cached(keyword, &texts)?;

        let counts = count_by_sentiment(&results);
        let signed = to_signed(&results);
        let buckets = if exclude_neutral {
            counts.without_neutral()
        } else {
            counts.buckets()
        };

        let indexed = if index {
            let posts: Vec<IndexedPost> = records
                .iter()
                .zip(&signed)
                .map(|(record, value)| IndexedPost::from_record(record, *value))
                .collect();
            Some(self.context.semantic()?.index_posts(&posts)?)
        } else {
            None
        };

        log::info!(
            "keyword={keyword:?} records={} negative={} neutral={} positive={}",
            records.len(),
            counts.negative,
            counts.neutral,
            counts.positive
        );

        let records = records
            .into_iter()
            .zip(results)
            .zip(signed)
            .map(|((record, sentiment), signed)| ScoredRecord {
                record,
                sentiment,
                signed,
            })
            .collect();

        Ok(KeywordReport {
            keyword: keyword.to_string(),
            records,
            counts,
            buckets,
            indexed,
        })
    }

    /// Semantic query; `top_k` falls back to `semantic.default_top_k`.
    pub fn semantic_report(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<SemanticReport, AppError> {
        let top_k = top_k.unwrap_or(self.context.config().semantic.default_top_k);
        let matches = self.context.semantic()?.search(query, top_k)?;

        let signed: Vec<f32> = matches.iter().map(|m| m.post.sentiment).collect();
        let counts = count_by_signed(&signed);

        let mut trend: Vec<(DateTime<Utc>, f32)> = matches
            .iter()
            .map(|m| (m.post.created_at, m.post.sentiment))
            .collect();
        trend.sort_by_key(|(created_at, _)| *created_at);

        Ok(SemanticReport {
            query: query.to_string(),
            matches,
            counts,
            trend,
        })
    }

    /// Drop stale entries from both caches.
    pub fn purge_expired(&self) -> usize {
        self.context.scraper().purge_expired() + self.context.scorer().purge_expired()
    }

    /// Index statistics, `None` when the index is disabled or unreachable.
    pub fn index_stats(&self) -> Option<IndexStats> {
        self.context
            .semantic()
            .ok()
            .and_then(|semantic| semantic.describe_index())
    }
}
