//! Cross-linking of posts onto authors and tags.
//!
//! Grouping operates on already-normalized posts; URLs are stripped in a
//! separate pass beforehand, never inside these predicates. Group order is
//! the posts collection order.

use super::Post;

/// Posts whose primary author matches `author_id`.
pub fn posts_by_author(author_id: &str, posts: &[Post]) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| p.primary_author.as_ref().is_some_and(|a| a.id == author_id))
        .cloned()
        .collect()
}

/// Posts carrying the tag `tag_id`.
pub fn posts_by_tag(tag_id: &str, posts: &[Post]) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| p.tags.iter().any(|t| t.id == tag_id))
        .cloned()
        .collect()
}
