use std::{
    collections::HashSet,
    fmt::{self, Display},
    sync::{Arc, Mutex, MutexGuard},
};

use log::debug;
use tokio::sync::broadcast;

use crate::{
    api::SocialApi,
    error::{CoreError, ErrorInfo, StatusSummary},
    merge::merge,
    notify::{NotificationKind, NotificationSink},
    order::order_post,
    social::{CommentId, Post, PostId, UserId},
    store::EntityEvent,
    viewer::ViewerIdentity,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    LikeToggle,
    AddComment,
    RemoveComment,
    DeletePost,
    Follow,
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MutationKind::LikeToggle => write!(f, "like toggle"),
            MutationKind::AddComment => write!(f, "comment add"),
            MutationKind::RemoveComment => write!(f, "comment removal"),
            MutationKind::DeletePost => write!(f, "post deletion"),
            MutationKind::Follow => write!(f, "follow change"),
        }
    }
}

type MutationKey = (u64, MutationKind);

/// Pending marker for one (entity, kind) pair. Dropping it returns the pair to idle,
/// also when the mutation future is dropped mid-flight.
struct PendingGuard {
    pending: Arc<Mutex<HashSet<MutationKey>>>,
    key: MutationKey,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.key);
        debug!("{} {}: idle", self.key.1, self.key.0);
    }
}

fn lock(pending: &Mutex<HashSet<MutationKey>>) -> MutexGuard<'_, HashSet<MutationKey>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs user mutations against the server, at most one per (entity, kind) at a time.
///
/// Nothing is applied locally before the server confirms. Results are returned to the
/// caller and broadcast as [`EntityEvent`]s for every collection owner.
#[derive(Clone)]
pub struct MutationCoordinator {
    api: SocialApi,
    viewer: Arc<dyn ViewerIdentity>,
    notifier: Arc<dyn NotificationSink>,
    pending: Arc<Mutex<HashSet<MutationKey>>>,
    events: broadcast::Sender<EntityEvent>,
}

impl MutationCoordinator {
    pub fn new(
        api: SocialApi,
        viewer: Arc<dyn ViewerIdentity>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            viewer,
            notifier,
            pending: Default::default(),
            events,
        }
    }

    /// Events of every mutation committed after this call.
    ///
    /// A receiver that falls more than `EVENT_CAPACITY` events behind gets
    /// [`RecvError::Lagged`](broadcast::error::RecvError::Lagged) and has missed events,
    /// removals included. Its owner must then reload its collection from the server
    /// instead of applying further events to stale contents.
    pub fn subscribe(&self) -> broadcast::Receiver<EntityEvent> {
        self.events.subscribe()
    }

    pub fn is_pending(&self, id: u64, kind: MutationKind) -> bool {
        lock(&self.pending).contains(&(id, kind))
    }

    fn begin(&self, id: u64, kind: MutationKind) -> Result<PendingGuard, CoreError> {
        let key = (id, kind);
        if !lock(&self.pending).insert(key) {
            debug!("{} {}: rejected, already pending", kind, id);
            let error = CoreError::ConcurrentMutationRejected { id, kind };
            self.notifier.notify(NotificationKind::Warn, &error.to_string());
            return Err(error);
        }
        debug!("{} {}: pending", kind, id);
        Ok(PendingGuard {
            pending: self.pending.clone(),
            key,
        })
    }

    fn committed(&self, kind: MutationKind, id: u64, event: EntityEvent) {
        debug!("{} {}: committed", kind, id);
        // owners that were torn down no longer listen
        let _ = self.events.send(event);
    }

    fn failed(&self, kind: MutationKind, id: u64, action: &str, error: ErrorInfo) -> CoreError {
        debug!("{} {}: failed ({})", kind, id, error);
        self.notifier.error(&format!(
            "{}: {} ({})",
            action,
            error.detail,
            StatusSummary(error.status)
        ));
        error.into()
    }

    fn viewer(&self) -> Option<String> {
        self.viewer.current_viewer_id()
    }

    /// Likes or unlikes `post` depending on its known `is_liked`.
    ///
    /// On success the returned post carries the server's like count and the confirmed state.
    pub async fn toggle_like(&self, post: &Post) -> Result<Post, CoreError> {
        let _guard = self.begin(post.id, MutationKind::LikeToggle)?;
        self.send_like(post, !post.liked()).await
    }

    /// Like [`toggle_like`](Self::toggle_like), but asks the server for the current like
    /// state first instead of trusting the local flag.
    pub async fn toggle_like_verified(&self, post: &Post) -> Result<Post, CoreError> {
        let kind = MutationKind::LikeToggle;
        let _guard = self.begin(post.id, kind)?;
        let liked = match self.api.is_liked_by_viewer(post.id).await {
            Ok(liked) => liked,
            Err(e) => return Err(self.failed(kind, post.id, "Failed to check like status", e)),
        };
        self.send_like(post, !liked).await
    }

    async fn send_like(&self, post: &Post, like: bool) -> Result<Post, CoreError> {
        let kind = MutationKind::LikeToggle;
        let response = if like {
            self.api.like_post(post.id).await
        } else {
            self.api.unlike_post(post.id).await
        };

        match response {
            Ok(response) => {
                let updated = Post {
                    like_count: response.like_count,
                    is_liked: Some(like),
                    ..post.clone()
                };
                let event = EntityEvent::LikeChanged {
                    id: post.id,
                    like_count: response.like_count,
                    is_liked: like,
                };
                self.committed(kind, post.id, event);
                Ok(updated)
            }
            Err(e) => {
                let action = if like {
                    "Failed to like post"
                } else {
                    "Failed to unlike post"
                };
                Err(self.failed(kind, post.id, action, e))
            }
        }
    }

    /// Posts a comment on `post`, the currently held copy.
    ///
    /// The server's updated post is merged against `post` and its comments re-sorted.
    /// `content` is only borrowed, so the caller's draft survives a failure.
    pub async fn add_comment(&self, post: &Post, content: &str) -> Result<Post, CoreError> {
        let kind = MutationKind::AddComment;
        let _guard = self.begin(post.id, kind)?;

        match self.api.add_comment(post.id, content).await {
            Ok(response) => {
                let updated = self.absorb(response.post_details, post);
                self.committed(kind, post.id, EntityEvent::Updated(updated.clone()));
                self.notifier.success("Comment added");
                Ok(updated)
            }
            Err(e) => Err(self.failed(kind, post.id, "Failed to add comment", e)),
        }
    }

    /// Deletes the selected comment of `post`. Calling without a selection is an error.
    pub async fn remove_comment(
        &self,
        post: &Post,
        comment_id: Option<CommentId>,
    ) -> Result<Post, CoreError> {
        let kind = MutationKind::RemoveComment;
        let Some(comment_id) = comment_id else {
            let error = CoreError::precondition("no comment selected for removal");
            self.notifier.error(&error.to_string());
            return Err(error);
        };
        let _guard = self.begin(post.id, kind)?;

        match self.api.remove_comment(post.id, comment_id).await {
            Ok(response) => {
                let updated = self.absorb(response.post_details, post);
                self.committed(kind, post.id, EntityEvent::Updated(updated.clone()));
                self.notifier.success("Comment deleted successfully");
                Ok(updated)
            }
            Err(e) => Err(self.failed(kind, post.id, "Failed to delete comment", e)),
        }
    }

    /// Deletes a post. Success is announced with [`EntityEvent::Removed`].
    pub async fn delete_post(&self, post_id: PostId) -> Result<(), CoreError> {
        let kind = MutationKind::DeletePost;
        let _guard = self.begin(post_id, kind)?;

        match self.api.remove_post(post_id).await {
            Ok(_) => {
                self.committed(kind, post_id, EntityEvent::Removed(post_id));
                self.notifier.success("Post deleted successfully");
                Ok(())
            }
            Err(e) => Err(self.failed(kind, post_id, "Failed to delete post", e)),
        }
    }

    /// Follows or unfollows a user. Returns the new following state.
    pub async fn set_following(&self, user_id: UserId, follow: bool) -> Result<bool, CoreError> {
        let kind = MutationKind::Follow;
        let _guard = self.begin(user_id, kind)?;

        let response = if follow {
            self.api.follow_user(user_id).await
        } else {
            self.api.unfollow_user(user_id).await
        };

        match response {
            Ok(_) => {
                let event = EntityEvent::FollowChanged {
                    user_id,
                    following: follow,
                };
                self.committed(kind, user_id, event);
                Ok(follow)
            }
            Err(e) => {
                let action = if follow {
                    "Failed to follow user"
                } else {
                    "Failed to unfollow user"
                };
                Err(self.failed(kind, user_id, action, e))
            }
        }
    }

    fn absorb(&self, details: Post, held: &Post) -> Post {
        let viewer = self.viewer();
        order_post(merge(details, Some(held), viewer.as_deref()))
    }
}
