use crate::social::{Comment, Post};

/// Marks every post and nested comment with whether `viewer` authored it.
///
/// Ownership flags sent by the server are ignored. Without a viewer nothing is owned.
pub fn tag_ownership(posts: &[Post], viewer: Option<&str>) -> Vec<Post> {
    posts.iter().map(|post| tag_post(post, viewer)).collect()
}

pub fn tag_post(post: &Post, viewer: Option<&str>) -> Post {
    Post {
        is_own_post: Some(post.is_authored_by(viewer)),
        comments: post
            .comments
            .iter()
            .map(|comment| tag_comment(comment, viewer))
            .collect(),
        ..post.clone()
    }
}

pub fn tag_comment(comment: &Comment, viewer: Option<&str>) -> Comment {
    Comment {
        is_own_comment: Some(comment.is_authored_by(viewer)),
        ..comment.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures;

    #[test]
    fn tags_posts_and_comments_against_viewer() {
        let mut post = fixtures::post(1, "ana");
        post.comments = vec![
            fixtures::comment(10, "ana", 1),
            fixtures::comment(11, "bo", 2),
        ];
        let other = fixtures::post(2, "bo");
        let input = vec![post, other];

        let tagged = tag_ownership(&input, Some("ana"));

        assert_eq!(tagged[0].is_own_post, Some(true));
        assert_eq!(tagged[1].is_own_post, Some(false));
        assert_eq!(tagged[0].comments[0].is_own_comment, Some(true));
        assert_eq!(tagged[0].comments[1].is_own_comment, Some(false));
        // input untouched
        assert_eq!(input[0].is_own_post, None);
        assert_eq!(input[0].comments[0].is_own_comment, None);
    }

    #[test]
    fn untrusted_server_flags_are_overwritten() {
        let mut post = fixtures::post(1, "bo");
        post.is_own_post = Some(true);
        let tagged = tag_post(&post, Some("ana"));
        assert_eq!(tagged.is_own_post, Some(false));
    }

    #[test]
    fn no_viewer_owns_nothing() {
        let mut post = fixtures::post(1, "ana");
        post.comments = vec![fixtures::comment(10, "ana", 1)];
        let tagged = tag_post(&post, None);
        assert_eq!(tagged.is_own_post, Some(false));
        assert_eq!(tagged.comments[0].is_own_comment, Some(false));
    }
}
