use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;
use url::Url;

use crate::config::ForumConfig;
use crate::forum::{
    normalize_author, timestamp_from_epoch, Comment, CommentNode, ForumError, ForumSource,
    MoreComments, Thread,
};

/// Reddit caps `morechildren` requests at 100 ids.
const MORE_CHILDREN_BATCH: usize = 100;

/// Blocking client for one subreddit of the public Reddit JSON API.
pub struct RedditClient {
    client: Client,
    base_url: String,
    subreddit: String,
    search_limit: u32,
}

impl RedditClient {
    pub fn new(config: &ForumConfig) -> Result<Self, ForumError> {
        let user_agent = std::env::var("REDDIT_USER_AGENT")
            .unwrap_or_else(|_| config.user_agent.clone());

        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            subreddit: config.subreddit.clone(),
            search_limit: config.search_limit,
        })
    }

    fn get_json(&self, url: Url) -> Result<Value, ForumError> {
        log::debug!("GET {url}");
        let resp = self.client.get(url.clone()).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ForumError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.json::<Value>()?)
    }

    fn fetch_comments(&self, thread_id: &str) -> Result<Vec<CommentNode>, ForumError> {
        let url = Url::parse_with_params(
            &format!("{}/comments/{thread_id}.json", self.base_url),
            &[("raw_json", "1")],
        )?;
        let resp = self.get_json(url)?;

        // [post listing, comment listing]
        let listing = resp
            .get(1)
            .ok_or_else(|| ForumError::Malformed(format!("no comment listing for {thread_id}")))?;
        Ok(parse_listing(listing))
    }

    /// Expand a "continue this thread" stub, which lists no children: load
    /// the parent comment on its own page and return its replies.
    fn continue_thread(
        &self,
        thread: &Thread,
        more: &MoreComments,
    ) -> Result<Vec<CommentNode>, ForumError> {
        let Some(parent) = more.parent_id.strip_prefix("t1_") else {
            log::debug!("nothing to expand below {:?}", more.parent_id);
            return Ok(Vec::new());
        };

        let url = Url::parse_with_params(
            &format!("{}/comments/{}.json", self.base_url, thread.id),
            &[("comment", parent), ("raw_json", "1")],
        )?;
        let resp = self.get_json(url)?;

        let listing = resp.get(1).ok_or_else(|| {
            ForumError::Malformed(format!("no comment listing below {parent}"))
        })?;
        Ok(replies_of(parse_listing(listing), parent))
    }
}

impl ForumSource for RedditClient {
    fn search(&self, keyword: &str) -> Result<Vec<Thread>, ForumError> {
        let limit = self.search_limit.to_string();
        let url = Url::parse_with_params(
            &format!("{}/r/{}/search.json", self.base_url, self.subreddit),
            &[
                ("q", keyword),
                ("restrict_sr", "1"),
                ("limit", limit.as_str()),
                ("raw_json", "1"),
            ],
        )?;
        let resp = self.get_json(url)?;

        let posts = resp
            .get("data")
            .and_then(|d| d.get("children"))
            .and_then(|c| c.as_array())
            .ok_or_else(|| ForumError::Malformed("search listing has no children".to_string()))?;

        let mut threads = Vec::with_capacity(posts.len());
        for post in posts {
            let Some(data) = post.get("data") else {
                continue;
            };
            let Some(id) = str_field(data, "id") else {
                log::warn!("skipping search result without id");
                continue;
            };

            let comments = self.fetch_comments(&id)?;
            threads.push(Thread {
                title: str_field(data, "title").unwrap_or_default(),
                author: normalize_author(data.get("author").and_then(|v| v.as_str())),
                created_at: timestamp_from_epoch(f64_field(data, "created_utc")),
                body: str_field(data, "selftext").unwrap_or_default(),
                comments,
                id,
            });
        }

        log::info!(
            "r/{} search keyword={keyword:?} threads={}",
            self.subreddit,
            threads.len()
        );
        Ok(threads)
    }

    fn expand_more(
        &self,
        thread: &Thread,
        more: &MoreComments,
    ) -> Result<Vec<CommentNode>, ForumError> {
        if more.children.is_empty() {
            return self.continue_thread(thread, more);
        }

        let link_id = format!("t3_{}", thread.id);
        let mut nodes = Vec::new();

        for batch in more.children.chunks(MORE_CHILDREN_BATCH) {
            let children = batch.join(",");
            let url = Url::parse_with_params(
                &format!("{}/api/morechildren.json", self.base_url),
                &[
                    ("api_type", "json"),
                    ("raw_json", "1"),
                    ("link_id", link_id.as_str()),
                    ("children", children.as_str()),
                ],
            )?;
            let resp = self.get_json(url)?;

            let things = resp
                .get("json")
                .and_then(|j| j.get("data"))
                .and_then(|d| d.get("things"))
                .and_then(|t| t.as_array())
                .ok_or_else(|| ForumError::Malformed("morechildren has no things".to_string()))?;

            nodes.extend(things.iter().filter_map(parse_node));
        }

        Ok(nodes)
    }
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(|v| v.as_str()).map(str::to_owned)
}

fn f64_field(data: &Value, key: &str) -> f64 {
    data.get(key).and_then(|v| v.as_f64()).unwrap_or_default()
}

/// Parse the children of a Reddit `Listing`. Anything else yields nothing.
fn parse_listing(listing: &Value) -> Vec<CommentNode> {
    listing
        .get("data")
        .and_then(|d| d.get("children"))
        .and_then(|c| c.as_array())
        .map(|children| children.iter().filter_map(parse_node).collect())
        .unwrap_or_default()
}

/// Replies of comment `parent_id` within `nodes`, searched breadth-first.
fn replies_of(nodes: Vec<CommentNode>, parent_id: &str) -> Vec<CommentNode> {
    let mut queue = std::collections::VecDeque::from(nodes);
    while let Some(node) = queue.pop_front() {
        if let CommentNode::Comment(comment) = node {
            if comment.id == parent_id {
                return comment.replies;
            }
            queue.extend(comment.replies);
        }
    }
    Vec::new()
}

/// Parse a `t1` (comment) or `more` thing.
fn parse_node(thing: &Value) -> Option<CommentNode> {
    let kind = thing.get("kind")?.as_str()?;
    let data = thing.get("data")?;

    match kind {
        "t1" => Some(CommentNode::Comment(Comment {
            id: str_field(data, "id").unwrap_or_default(),
            author: normalize_author(data.get("author").and_then(|v| v.as_str())),
            created_at: timestamp_from_epoch(f64_field(data, "created_utc")),
            body: str_field(data, "body").unwrap_or_default(),
            // `replies` is "" when empty, a Listing otherwise
            replies: data.get("replies").map(parse_listing).unwrap_or_default(),
        })),
        "more" => Some(CommentNode::More(MoreComments {
            parent_id: str_field(data, "parent_id").unwrap_or_default(),
            children: data
                .get("children")
                .and_then(|c| c.as_array())
                .map(|ids| {
                    ids.iter()
                        .filter_map(|id| id.as_str().map(str::to_owned))
                        .collect()
                })
                .unwrap_or_default(),
        })),
        other => {
            log::debug!("ignoring thing of kind {other}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_comment_with_nested_replies() {
        let thing = json!({
            "kind": "t1",
            "data": {
                "id": "c1",
                "author": "alice",
                "created_utc": 1_672_531_200.0,
                "body": "agree",
                "replies": {
                    "kind": "Listing",
                    "data": {"children": [
                        {"kind": "t1", "data": {"id": "c2", "author": "[deleted]", "created_utc": 1_672_531_260.0, "body": "same", "replies": ""}},
                        {"kind": "more", "data": {"parent_id": "t1_c1", "children": ["c3", "c4"]}}
                    ]}
                }
            }
        });

        let Some(CommentNode::Comment(comment)) = parse_node(&thing) else {
            panic!("expected a comment");
        };
        assert_eq!(comment.author.as_deref(), Some("alice"));
        assert_eq!(comment.body, "agree");
        assert_eq!(comment.replies.len(), 2);

        match &comment.replies[0] {
            CommentNode::Comment(reply) => assert_eq!(reply.author, None),
            other => panic!("unexpected node {other:?}"),
        }
        match &comment.replies[1] {
            CommentNode::More(more) => {
                assert_eq!(more.parent_id, "t1_c1");
                assert_eq!(more.children, vec!["c3", "c4"]);
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn test_empty_replies_string() {
        let thing = json!({"kind": "t1", "data": {"id": "c1", "author": "bob", "body": "hi", "created_utc": 0, "replies": ""}});
        let Some(CommentNode::Comment(comment)) = parse_node(&thing) else {
            panic!("expected a comment");
        };
        assert!(comment.replies.is_empty());
    }

    #[test]
    fn test_continue_thread_stub_has_no_children() {
        let thing = json!({"kind": "more", "data": {"id": "_", "parent_id": "t1_deep", "count": 0, "children": []}});
        let Some(CommentNode::More(more)) = parse_node(&thing) else {
            panic!("expected a placeholder");
        };
        assert_eq!(more.parent_id, "t1_deep");
        assert!(more.children.is_empty());
    }

    #[test]
    fn test_replies_of_continued_comment() {
        // what `comments/{id}.json?comment=deep` returns: the parent on top
        let listing = json!({
            "kind": "Listing",
            "data": {"children": [
                {"kind": "t1", "data": {"id": "deep", "author": "alice", "body": "deep", "created_utc": 0, "replies": {
                    "kind": "Listing",
                    "data": {"children": [
                        {"kind": "t1", "data": {"id": "d1", "author": "bob", "body": "deeper", "created_utc": 0, "replies": ""}},
                        {"kind": "t1", "data": {"id": "d2", "author": "carol", "body": "deepest", "created_utc": 0, "replies": ""}}
                    ]}
                }}}
            ]}
        });

        let replies = replies_of(parse_listing(&listing), "deep");
        let ids: Vec<&str> = replies
            .iter()
            .filter_map(|node| match node {
                CommentNode::Comment(c) => Some(c.id.as_str()),
                CommentNode::More(_) => None,
            })
            .collect();
        assert_eq!(ids, vec!["d1", "d2"]);

        assert!(replies_of(parse_listing(&listing), "missing").is_empty());
    }

    #[test]
    fn test_unknown_kind_ignored() {
        let thing = json!({"kind": "t5", "data": {}});
        assert!(parse_node(&thing).is_none());
    }
}
