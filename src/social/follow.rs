use serde::{Deserialize, Serialize};

use super::{UserId, UserSummary};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowerCountResponse {
    pub follower_count: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowingCountResponse {
    pub following_count: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowStatusResponse {
    pub following: bool,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub target_user_id: Option<UserId>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowersResponse {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub followers: Vec<UserSummary>,
    #[serde(default)]
    pub count: u32,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FollowingResponse {
    #[serde(default)]
    pub user_id: Option<UserId>,
    pub following: Vec<UserSummary>,
    #[serde(default)]
    pub count: u32,
}
