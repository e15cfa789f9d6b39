//! Keyword scraping with per-keyword memoization.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlCache;
use crate::flatten::{flatten, Record};
use crate::forum::{ForumError, ForumSource};

/// Scrapes the forum for a keyword, remembering results for `ttl`.
pub struct Scraper {
    source: Arc<dyn ForumSource>,
    cache: TtlCache<String, Vec<Record>>,
}

impl Scraper {
    pub fn new(source: Arc<dyn ForumSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// Flattened records for `keyword`, scraped at most once per TTL window.
    ///
    /// The keyword is matched exactly (case-sensitive). Failed scrapes are
    /// not remembered.
    pub fn get_or_scrape(&self, keyword: &str) -> Result<Vec<Record>, ForumError> {
        self.cache
            .get_or_try_insert_with(keyword.to_string(), || self.scrape(keyword))
    }

    /// Scrape without consulting the cache.
    pub fn scrape(&self, keyword: &str) -> Result<Vec<Record>, ForumError> {
        log::info!("scraping keyword={keyword:?}");
        let threads = self.source.search(keyword)?;
        let records = flatten(self.source.as_ref(), &threads)?;
        log::info!(
            "scraped keyword={keyword:?} threads={} records={}",
            threads.len(),
            records.len()
        );
        Ok(records)
    }

    /// Drop stale keywords.
    pub fn purge_expired(&self) -> usize {
        self.cache.purge_expired()
    }
}
