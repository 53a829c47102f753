use std::sync::{Arc, Weak};

use log::debug;

use crate::{
    merge::merge,
    social::{Post, PostId, UserId},
};

/// Notifications the core sends to whoever owns a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Removed(PostId),
    Updated(Post),
    /// Confirmed like toggle. Only the like fields of held copies change.
    LikeChanged {
        id: PostId,
        like_count: u32,
        is_liked: bool,
    },
    ReconciliationCompleted(Vec<Post>),
    FollowChanged { user_id: UserId, following: bool },
}

/// Keeps a view's results from being applied after the view is gone.
///
/// The view holds the lifetime, asynchronous work holds a [`ViewHandle`].
#[derive(Debug, Default)]
pub struct ViewLifetime(Arc<()>);

impl ViewLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ViewHandle {
        ViewHandle(Arc::downgrade(&self.0))
    }
}

#[derive(Debug, Clone)]
pub struct ViewHandle(Weak<()>);

impl ViewHandle {
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Ordered posts of one view (feed, profile listing, detail), unique by id.
#[derive(Debug, Default)]
pub struct PostCollection {
    name: String,
    posts: Vec<Post>,
    lifetime: ViewLifetime,
}

impl PostCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> ViewHandle {
        self.lifetime.handle()
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Independent copy for a detail view.
    pub fn clone_for_detail(&self, id: PostId) -> Option<Post> {
        self.get(id).cloned()
    }

    /// Replaces the whole listing, dropping later duplicates of an id.
    pub fn replace_all(&mut self, posts: Vec<Post>) {
        let mut unique: Vec<Post> = Vec::with_capacity(posts.len());
        for post in posts {
            if unique.iter().any(|p| p.id == post.id) {
                debug!("{}: ignoring duplicate post {}", self.name, post.id);
                continue;
            }
            unique.push(post);
        }
        self.posts = unique;
    }

    pub fn apply(&mut self, event: &EntityEvent) {
        match event {
            EntityEvent::Removed(id) => {
                let before = self.posts.len();
                self.posts.retain(|post| post.id != *id);
                if self.posts.len() != before {
                    debug!("{}: removed post {}", self.name, id);
                }
            }
            // last writer applies
            EntityEvent::Updated(post) => {
                if let Some(held) = self.posts.iter_mut().find(|p| p.id == post.id) {
                    *held = post.clone();
                    debug!("{}: updated post {}", self.name, post.id);
                }
            }
            EntityEvent::LikeChanged {
                id,
                like_count,
                is_liked,
            } => {
                if let Some(held) = self.posts.iter_mut().find(|p| p.id == *id) {
                    held.like_count = *like_count;
                    held.is_liked = Some(*is_liked);
                    debug!("{}: post {} like state updated", self.name, id);
                }
            }
            EntityEvent::ReconciliationCompleted(posts) => {
                for post in posts {
                    if let Some(held) = self.posts.iter_mut().find(|p| p.id == post.id) {
                        held.is_liked = post.is_liked;
                    }
                }
            }
            EntityEvent::FollowChanged { .. } => {}
        }
    }

    /// Folds a refreshed copy of a held post in, keeping local viewer state.
    ///
    /// Returns false when the post is not part of this collection.
    pub fn absorb_refresh(&mut self, fresh: Post, viewer: Option<&str>) -> bool {
        let Some(held) = self.posts.iter_mut().find(|p| p.id == fresh.id) else {
            return false;
        };
        *held = merge(fresh, Some(&*held), viewer);
        true
    }
}
