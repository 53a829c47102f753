use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Comment, UserSummary};

pub type PostId = u64;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub author_summary: UserSummary,
    #[serde(default)]
    pub caption: String,
    pub image_url: String,
    pub created_at: NaiveDateTime,
    pub like_count: u32,
    /// Viewer-relative, derived locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    /// Viewer-relative, derived locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_own_post: Option<bool>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Post {
    pub fn liked(&self) -> bool {
        self.is_liked.unwrap_or(false)
    }

    pub fn is_authored_by(&self, viewer: Option<&str>) -> bool {
        viewer.is_some_and(|viewer| self.author_summary.user_name == viewer)
    }

    pub fn comment(&self, id: u64) -> Option<&Comment> {
        self.comments.iter().find(|comment| comment.id == id)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub post_id: PostId,
    pub like_count: u32,
    #[serde(default)]
    pub message: Option<String>,
}

/// Answer to adding or removing a comment: the post's full, updated detail.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub post_id: PostId,
    pub comment_count: u32,
    pub post_details: Post,
}
