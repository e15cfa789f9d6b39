//! Forum threads and their lazily expandable comment forests.
//!
//! - `reddit`: blocking client for the public Reddit JSON API

pub mod reddit;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use reddit::RedditClient;

/// Author name Reddit reports for deleted accounts.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// A top-level post matched by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub body: String,
    /// Top-level comment nodes, in the order the forum returned them.
    pub comments: Vec<CommentNode>,
}

/// A node of a comment forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CommentNode {
    Comment(Comment),
    /// "Load more comments" stand-in; must be expanded to continue.
    More(MoreComments),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    /// `None` for deleted accounts.
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub body: String,
    /// Replies already loaded with this comment.
    #[serde(default)]
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoreComments {
    pub parent_id: String,
    /// Ids of the comments hidden behind this placeholder.
    pub children: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ForumError {
    #[error("forum request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("forum returned status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("unexpected forum response: {0}")]
    Malformed(String),

    #[error("invalid forum url: {0}")]
    Url(#[from] url::ParseError),
}

/// Read access to a forum.
pub trait ForumSource: Send + Sync {
    /// Threads matching `keyword`, comments included.
    fn search(&self, keyword: &str) -> Result<Vec<Thread>, ForumError>;

    /// Fetch the nodes hidden behind a "load more" placeholder of `thread`.
    fn expand_more(
        &self,
        thread: &Thread,
        more: &MoreComments,
    ) -> Result<Vec<CommentNode>, ForumError>;
}

/// Convert forum epoch seconds to a UTC timestamp.
///
/// Out-of-range values collapse to the Unix epoch.
pub fn timestamp_from_epoch(secs: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs.trunc() as i64, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// Map the forum's deleted-author marker to `None`.
pub fn normalize_author(author: Option<&str>) -> Option<String> {
    match author {
        None | Some(DELETED_AUTHOR) | Some("") => None,
        Some(name) => Some(name.to_string()),
    }
}
