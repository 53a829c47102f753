use crate::social::{Comment, Post};

/// Sorts comments newest first. Equal timestamps keep their input order.
pub fn order(comments: &[Comment]) -> Vec<Comment> {
    let mut sorted = comments.to_vec();
    if sorted.len() > 1 {
        // stable, so ties stay in insertion order
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    sorted
}

pub fn order_post(post: Post) -> Post {
    if post.comments.len() <= 1 {
        return post;
    }
    Post {
        comments: order(&post.comments),
        ..post
    }
}
