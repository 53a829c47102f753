use crate::{
    ownership::tag_comment,
    social::{Comment, Post},
};

/// Combines a freshly received post with the locally held copy.
///
/// Server fields come from `updated`. `is_liked` and `is_own_post` come from `existing`,
/// and comments already known locally keep their ownership tag. New comments are tagged
/// against `viewer`. Without `existing`, `updated` is returned as is.
pub fn merge(updated: Post, existing: Option<&Post>, viewer: Option<&str>) -> Post {
    let Some(existing) = existing else {
        return updated;
    };

    let comments = updated
        .comments
        .iter()
        .map(|comment| merge_comment(comment, existing, viewer))
        .collect();

    Post {
        is_liked: existing.is_liked,
        is_own_post: existing.is_own_post,
        comments,
        ..updated
    }
}

fn merge_comment(comment: &Comment, existing: &Post, viewer: Option<&str>) -> Comment {
    match existing.comment(comment.id) {
        Some(known) => Comment {
            is_own_comment: known.is_own_comment,
            ..comment.clone()
        },
        None => tag_comment(comment, viewer),
    }
}
