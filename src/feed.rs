use std::{collections::HashSet, sync::Arc};

use log::{debug, warn};
use tokio::sync::broadcast;

use crate::{
    api::SocialApi,
    error::{CoreError, ErrorInfo},
    order::order_post,
    ownership::{tag_ownership, tag_post},
    reconcile::LikeStatusReconciler,
    social::{Page, Post, PostId, User, UserSummary},
    store::{EntityEvent, ViewHandle},
    viewer::ViewerIdentity,
};

/// Everything a profile view shows besides the posts.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user: User,
    pub is_own_profile: bool,
    pub follower_count: u32,
    pub following_count: u32,
    pub followers: Vec<UserSummary>,
    pub following: Vec<UserSummary>,
    pub is_following: bool,
}

/// Fetches listings and runs them through ownership tagging and like reconciliation.
#[derive(Clone)]
pub struct FeedLoader {
    api: SocialApi,
    viewer: Arc<dyn ViewerIdentity>,
    reconciler: LikeStatusReconciler,
    events: broadcast::Sender<EntityEvent>,
}

impl FeedLoader {
    pub fn new(api: SocialApi, viewer: Arc<dyn ViewerIdentity>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            reconciler: LikeStatusReconciler::new(api.clone()),
            api,
            viewer,
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.events.subscribe()
    }

    /// Loads a page of the viewer's feed for the view behind `owner`.
    ///
    /// Returns `Ok(None)` when the view was torn down before the result was ready.
    pub async fn load_feed(
        &self,
        owner: &ViewHandle,
        page: u32,
        size: u32,
    ) -> Result<Option<Vec<Post>>, CoreError> {
        let listing = self.api.get_feed(page, size).await?;
        self.prepare(owner, listing).await
    }

    pub async fn load_user_posts(
        &self,
        owner: &ViewHandle,
        username: &str,
        page: u32,
        size: u32,
    ) -> Result<Option<Vec<Post>>, CoreError> {
        let listing = self.api.get_posts_by_user(username, page, size).await?;
        self.prepare(owner, listing).await
    }

    /// Fetches one post for a detail view: tagged, like state probed, comments newest first.
    pub async fn load_post(&self, post_id: PostId) -> Result<Post, CoreError> {
        let post = self.api.get_post(post_id).await?;
        let viewer = self.viewer.current_viewer_id();
        let post = self.reconciler.reconcile_one(tag_post(&post, viewer.as_deref())).await;
        Ok(order_post(post))
    }

    async fn prepare(
        &self,
        owner: &ViewHandle,
        listing: Page<Post>,
    ) -> Result<Option<Vec<Post>>, CoreError> {
        if !owner.is_alive() {
            debug!("view closed, dropping {} fetched posts", listing.content.len());
            return Ok(None);
        }

        let viewer = self.viewer.current_viewer_id();
        let posts = tag_ownership(&unique(listing.content), viewer.as_deref());
        let posts = self.reconciler.reconcile(posts).await?;

        if !owner.is_alive() {
            debug!("view closed, dropping {} reconciled posts", posts.len());
            return Ok(None);
        }

        let _ = self
            .events
            .send(EntityEvent::ReconciliationCompleted(posts.clone()));
        Ok(Some(posts))
    }

    /// Loads a profile with its follow data. `username` of `None` means the viewer.
    ///
    /// Only the user lookup is fatal. Counts, lists and follow status fall back to
    /// empty values when their requests fail.
    pub async fn load_profile(&self, username: Option<&str>) -> Result<Profile, CoreError> {
        let viewer = self.viewer.current_viewer_id();
        let is_own_profile = match username {
            None => true,
            Some(name) => name == "me" || viewer.as_deref() == Some(name),
        };

        let user = match username {
            Some(name) if !is_own_profile => self.api.get_user(name).await?,
            _ => self.api.fetch_profile().await?,
        };

        let id = user.id;
        let (follower_count, following_count, followers, following, status) = tokio::join!(
            self.api.follower_count(id),
            self.api.following_count(id),
            self.api.followers(id),
            self.api.following(id),
            async {
                if is_own_profile {
                    Ok(false)
                } else {
                    self.api.follow_status(id).await.map(|status| status.following)
                }
            },
        );

        Ok(Profile {
            user,
            is_own_profile,
            follower_count: or_default("follower count", follower_count),
            following_count: or_default("following count", following_count),
            followers: or_default("followers", followers.map(|r| r.followers)),
            following: or_default("following", following.map(|r| r.following)),
            is_following: or_default("follow status", status),
        })
    }
}

/// Drops later repeats of a post id, keeping page order.
fn unique(posts: Vec<Post>) -> Vec<Post> {
    let mut seen = HashSet::with_capacity(posts.len());
    posts
        .into_iter()
        .filter(|post| {
            let first = seen.insert(post.id);
            if !first {
                debug!("post {} repeated in listing, skipping", post.id);
            }
            first
        })
        .collect()
}

fn or_default<T: Default>(what: &str, result: Result<T, ErrorInfo>) -> T {
    result.unwrap_or_else(|e| {
        warn!("Failed to load {}: {}", what, e);
        T::default()
    })
}
