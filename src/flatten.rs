//! Breadth-first flattening of comment forests into records.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::forum::{Comment, CommentNode, ForumError, ForumSource, Thread};
use crate::sanitize::has_too_many_codes;

/// Moderation bot whose comments are boilerplate.
pub const AUTOMODERATOR: &str = "AutoModerator";

/// Body Reddit substitutes for removed comments.
pub const DELETED_BODY: &str = "[deleted]";

/// One post or comment, flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub thread_title: String,
    /// `None` for deleted accounts.
    pub author: Option<String>,
    pub created_at: DateTime<Utc>,
    pub text: String,
}

/// Whether a comment carries discussion worth scoring.
pub fn is_valid_comment(comment: &Comment) -> bool {
    comment.author.as_deref() != Some(AUTOMODERATOR)
        && comment.body != DELETED_BODY
        && !has_too_many_codes(&comment.body)
}

/// Flatten every thread into its body record followed by its valid comments.
///
/// Comments are visited breadth-first. A "load more" placeholder is expanded
/// through `source` and the fetched nodes go to the back of the queue, after
/// everything already queued. Replies of a visited comment are queued whether
/// or not the comment itself is kept.
pub fn flatten(
    source: &dyn ForumSource,
    threads: &[Thread],
) -> Result<Vec<Record>, ForumError> {
    let mut records = Vec::new();

    for thread in threads {
        records.push(Record {
            thread_title: thread.title.clone(),
            author: thread.author.clone(),
            created_at: thread.created_at,
            text: thread.body.clone(),
        });

        let before = records.len();
        let mut expansions = 0usize;
        let mut queue: VecDeque<CommentNode> = thread.comments.iter().cloned().collect();

        while let Some(node) = queue.pop_front() {
            match node {
                CommentNode::More(more) => {
                    expansions += 1;
                    queue.extend(source.expand_more(thread, &more)?);
                }
                CommentNode::Comment(comment) => {
                    if is_valid_comment(&comment) {
                        records.push(Record {
                            thread_title: thread.title.clone(),
                            author: comment.author.clone(),
                            created_at: comment.created_at,
                            text: comment.body.clone(),
                        });
                    }
                    queue.extend(comment.replies);
                }
            }
        }

        log::debug!(
            "thread={} comments_kept={} expansions={expansions}",
            thread.id,
            records.len() - before
        );
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forum::MoreComments;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves placeholder expansions from a fixed map and records call order.
    #[derive(Default)]
    struct FakeForum {
        expansions: HashMap<String, Vec<CommentNode>>,
        calls: Mutex<Vec<String>>,
    }

    impl ForumSource for FakeForum {
        fn search(&self, _keyword: &str) -> Result<Vec<Thread>, ForumError> {
            Ok(vec![])
        }

        fn expand_more(
            &self,
            _thread: &Thread,
            more: &MoreComments,
        ) -> Result<Vec<CommentNode>, ForumError> {
            self.calls.lock().unwrap().push(more.parent_id.clone());
            Ok(self.expansions.get(&more.parent_id).cloned().unwrap_or_default())
        }
    }

    fn comment(author: &str, body: &str) -> CommentNode {
        comment_with_replies(author, body, vec![])
    }

    fn comment_with_replies(author: &str, body: &str, replies: Vec<CommentNode>) -> CommentNode {
        CommentNode::Comment(Comment {
            id: body.to_string(),
            author: Some(author.to_string()),
            created_at: DateTime::UNIX_EPOCH,
            body: body.to_string(),
            replies,
        })
    }

    fn more(key: &str) -> CommentNode {
        CommentNode::More(MoreComments {
            parent_id: key.to_string(),
            children: vec![],
        })
    }

    fn thread(comments: Vec<CommentNode>) -> Thread {
        Thread {
            id: "t1".to_string(),
            title: "CS1010S thoughts".to_string(),
            author: Some("op".to_string()),
            created_at: DateTime::UNIX_EPOCH,
            body: "great module".to_string(),
            comments,
        }
    }

    fn texts(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_thread_without_comments_yields_body() {
        let records = flatten(&FakeForum::default(), &[thread(vec![])]).unwrap();
        assert_eq!(texts(&records), vec!["great module"]);
        assert_eq!(records[0].thread_title, "CS1010S thoughts");
        assert_eq!(records[0].author.as_deref(), Some("op"));
    }

    #[test]
    fn test_filters_noise() {
        let comments = vec![
            comment("alice", "agree"),
            comment("bob", "[deleted]"),
            comment("AutoModerator", "Please read the rules"),
            comment("carol", "CS1010S CS2030 CS2040"),
            comment("dave", "CS1010S then CS2030"),
        ];
        let records = flatten(&FakeForum::default(), &[thread(comments)]).unwrap();

        assert_eq!(
            texts(&records),
            vec!["great module", "agree", "CS1010S then CS2030"]
        );
    }

    #[test]
    fn test_authorless_comment_is_kept() {
        let node = CommentNode::Comment(Comment {
            id: "x".to_string(),
            author: None,
            created_at: DateTime::UNIX_EPOCH,
            body: "from a deleted account".to_string(),
            replies: vec![],
        });
        let records = flatten(&FakeForum::default(), &[thread(vec![node])]).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].author, None);
    }

    #[test]
    fn test_expanded_children_go_to_the_back() {
        let mut forum = FakeForum::default();
        forum.expansions.insert(
            "m1".to_string(),
            vec![comment("e", "expanded-1"), more("m2")],
        );
        forum
            .expansions
            .insert("m2".to_string(), vec![comment("f", "expanded-2")]);

        let comments = vec![comment("a", "first"), more("m1"), comment("b", "second")];
        let records = flatten(&forum, &[thread(comments)]).unwrap();

        assert_eq!(
            texts(&records),
            vec!["great module", "first", "second", "expanded-1", "expanded-2"]
        );
        assert_eq!(*forum.calls.lock().unwrap(), vec!["m1", "m2"]);
    }

    #[test]
    fn test_replies_visited_breadth_first() {
        let comments = vec![
            comment_with_replies("a", "a", vec![comment("a1", "a.1")]),
            comment_with_replies("b", "[deleted]", vec![comment("b1", "b.1")]),
            comment("c", "c"),
        ];
        let records = flatten(&FakeForum::default(), &[thread(comments)]).unwrap();

        assert_eq!(texts(&records), vec!["great module", "a", "c", "a.1", "b.1"]);
    }

    #[test]
    fn test_count_matches_valid_nodes_at_any_depth() {
        let mut forum = FakeForum::default();
        let mut expected_valid = 0;
        // chain of placeholders, each hiding one valid and one deleted comment
        for depth in 0..10 {
            let mut nodes = vec![
                comment("x", &format!("valid-{depth}")),
                comment("y", "[deleted]"),
            ];
            expected_valid += 1;
            if depth < 9 {
                nodes.push(more(&format!("m{}", depth + 1)));
            }
            forum.expansions.insert(format!("m{depth}"), nodes);
        }

        let records = flatten(&forum, &[thread(vec![more("m0")])]).unwrap();
        assert_eq!(records.len(), 1 + expected_valid);
        assert_eq!(forum.calls.lock().unwrap().len(), 10);
    }

    #[test]
    fn test_multiple_threads_keep_their_titles() {
        let mut second = thread(vec![comment("z", "reply")]);
        second.title = "Other".to_string();
        second.body = "other body".to_string();

        let records =
            flatten(&FakeForum::default(), &[thread(vec![]), second]).unwrap();

        assert_eq!(texts(&records), vec!["great module", "other body", "reply"]);
        assert_eq!(records[2].thread_title, "Other");
    }

    #[test]
    fn test_is_valid_comment() {
        let CommentNode::Comment(ok) = comment("alice", "agree") else { unreachable!() };
        let CommentNode::Comment(bot) = comment("AutoModerator", "agree") else { unreachable!() };
        assert!(is_valid_comment(&ok));
        assert!(!is_valid_comment(&bot));
    }
}
