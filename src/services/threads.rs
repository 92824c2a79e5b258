use serde::Serialize;

use crate::entities::comment::Comment;

/// A top-level comment with its direct replies, ready for rendering.
#[derive(Debug, Serialize)]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Partition a flat, unordered comment list into top-level threads.
/// Top-level comments and reply groups are both ordered newest-first
/// (descending snowflake id). Replies whose parent is not in the input
/// are dropped.
pub fn assemble(comments: Vec<Comment>) -> Vec<CommentThread> {
    let (tops, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| !c.is_reply);

    let mut threads: Vec<CommentThread> = tops
        .into_iter()
        .map(|comment| CommentThread {
            comment,
            replies: Vec::new(),
        })
        .collect();
    threads.sort_by(|a, b| sort_key(&b.comment).cmp(&sort_key(&a.comment)));

    for reply in replies {
        let Some(parent_id) = reply.reply_to.as_deref() else {
            continue;
        };
        if let Some(thread) = threads
            .iter_mut()
            .find(|t| t.comment.comment_id == parent_id)
        {
            thread.replies.push(reply);
        }
    }

    for thread in &mut threads {
        thread.replies.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));
    }

    threads
}

// Snowflake ids are numeric and time-ordered; fall back to the
// string itself if one ever fails to parse.
fn sort_key(comment: &Comment) -> (u64, String) {
    (
        comment.comment_id.parse().unwrap_or(0),
        comment.comment_id.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64, reply_to: Option<u64>) -> Comment {
        Comment {
            comment_id: id.to_string(),
            post_id: "1".to_string(),
            user_id: "10".to_string(),
            content: format!("comment {}", id),
            image_url: None,
            is_reply: reply_to.is_some(),
            reply_to: reply_to.map(|p| p.to_string()),
            created_at: id as i64,
        }
    }

    fn ids(threads: &[CommentThread]) -> Vec<(&str, Vec<&str>)> {
        threads
            .iter()
            .map(|t| {
                (
                    t.comment.comment_id.as_str(),
                    t.replies.iter().map(|r| r.comment_id.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn groups_replies_under_parent() {
        let threads = assemble(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
        ]);
        assert_eq!(ids(&threads), vec![("3", vec![]), ("1", vec!["2"])]);
    }

    #[test]
    fn newest_first_in_both_levels() {
        let threads = assemble(vec![
            comment(5, Some(1)),
            comment(1, None),
            comment(9, None),
            comment(7, Some(1)),
        ]);
        assert_eq!(ids(&threads), vec![("9", vec![]), ("1", vec!["7", "5"])]);
    }

    #[test]
    fn assembly_is_stable_across_passes() {
        // Same input must yield the same order every time; ordering is
        // decided here, not mutated per render.
        let input = || {
            vec![
                comment(2, Some(1)),
                comment(1, None),
                comment(4, Some(1)),
                comment(3, None),
            ]
        };
        let first = ids(&assemble(input()))
            .iter()
            .map(|(a, b)| (a.to_string(), b.iter().map(|s| s.to_string()).collect()))
            .collect::<Vec<(String, Vec<String>)>>();
        for _ in 0..3 {
            let again = ids(&assemble(input()))
                .iter()
                .map(|(a, b)| (a.to_string(), b.iter().map(|s| s.to_string()).collect()))
                .collect::<Vec<(String, Vec<String>)>>();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn orphan_replies_are_dropped() {
        let threads = assemble(vec![comment(1, None), comment(2, Some(99))]);
        assert_eq!(ids(&threads), vec![("1", vec![])]);
    }

    #[test]
    fn empty_input() {
        assert!(assemble(Vec::new()).is_empty());
    }
}
