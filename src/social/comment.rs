use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::{PostId, UserSummary};

pub type CommentId = u64;

pub const MAX_COMMENT_LENGTH: usize = 500;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    #[serde(default)]
    pub post_id: Option<PostId>,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub author_summary: UserSummary,
    /// Viewer-relative, derived locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_own_comment: Option<bool>,
}

impl Comment {
    pub fn is_authored_by(&self, viewer: Option<&str>) -> bool {
        viewer.is_some_and(|viewer| self.author_summary.user_name == viewer)
    }
}

/// Checks comment text before it is handed to the mutation coordinator.
pub fn validate_content(content: &str) -> Result<&str, CoreError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("comment is empty".to_string()));
    }
    let length = content.chars().count();
    if length > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "comment is {} characters long (max {})",
            length, MAX_COMMENT_LENGTH
        )));
    }
    Ok(content)
}
