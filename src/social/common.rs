use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub type UserId = u64;

/// Reference snapshot of a user embedded in posts, comments and follow lists.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl UserSummary {
    pub fn name(&self) -> &str {
        &self.user_name
    }
}

/// Full user profile as returned by `users/me`, `users/{username}` and the search endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            user_name: user.user_name,
            profile_image_url: user.profile_image_url,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of a paginated listing.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default = "default_last")]
    pub last: bool,
}

fn default_last() -> bool {
    true
}
