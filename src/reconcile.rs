use std::collections::HashSet;

use futures::future::join_all;
use log::debug;

use crate::{
    api::SocialApi,
    error::CoreError,
    social::{Post, PostId},
};

/// Fills in `is_liked` for a batch of posts with one status probe per post.
#[derive(Clone)]
pub struct LikeStatusReconciler {
    api: SocialApi,
}

impl LikeStatusReconciler {
    pub fn new(api: SocialApi) -> Self {
        Self { api }
    }

    /// Probes every post concurrently and waits for all of them.
    ///
    /// A failed probe counts as "not liked". Output order matches input order, and only
    /// `is_liked` is touched. Duplicate post ids are rejected before anything is sent.
    pub async fn reconcile(&self, posts: Vec<Post>) -> Result<Vec<Post>, CoreError> {
        if posts.is_empty() {
            return Ok(posts);
        }

        let mut seen = HashSet::with_capacity(posts.len());
        if let Some(post) = posts.iter().find(|post| !seen.insert(post.id)) {
            return Err(CoreError::precondition(format!(
                "post {} appears twice in the batch",
                post.id
            )));
        }

        let probes = posts.iter().map(|post| self.probe(post.id));
        // join_all yields in input order regardless of completion order
        let statuses = join_all(probes).await;

        Ok(posts
            .into_iter()
            .zip(statuses)
            .map(|(post, liked)| Post {
                is_liked: Some(liked),
                ..post
            })
            .collect())
    }

    /// Single-post variant of [`reconcile`](Self::reconcile), with the same fail-open rule.
    pub async fn reconcile_one(&self, post: Post) -> Post {
        let liked = self.probe(post.id).await;
        Post {
            is_liked: Some(liked),
            ..post
        }
    }

    async fn probe(&self, id: PostId) -> bool {
        match self.api.is_liked_by_viewer(id).await {
            Ok(liked) => liked,
            Err(e) => {
                debug!("like status of post {} unavailable, assuming not liked: {}", id, e);
                false
            }
        }
    }
}
