use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    error::ErrorInfo,
    social::{
        ApiResponse, CommentId, CommentResponse, FollowStatusResponse, FollowerCountResponse,
        FollowersResponse, FollowingCountResponse, FollowingResponse, LikeResponse, Page, Post,
        PostId, User, UserId,
    },
};

use super::Transport;

pub type APIPostPage = Page<Post>;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Typed endpoints of the social API on top of any [`Transport`].
#[derive(Clone)]
pub struct SocialApi {
    transport: Arc<dyn Transport>,
}

impl SocialApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ErrorInfo> {
        serde_json::from_value(value).map_err(ErrorInfo::decode)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ErrorInfo> {
        Self::decode(self.transport.get(path).await?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T, ErrorInfo> {
        Self::decode(self.transport.post(path, Some(body)).await?)
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ErrorInfo> {
        Self::decode(self.transport.delete(path).await?)
    }

    //===================================================
    // Posts
    //===================================================

    pub async fn get_feed(&self, page: u32, size: u32) -> Result<APIPostPage, ErrorInfo> {
        self.get(&format!("posts/feed?page={}&size={}", page, size)).await
    }

    pub async fn get_posts_by_user(
        &self,
        username: &str,
        page: u32,
        size: u32,
    ) -> Result<APIPostPage, ErrorInfo> {
        let url = format!(
            "posts/user/{}?page={}&size={}",
            urlencoding::encode(username),
            page,
            size
        );
        self.get(&url).await
    }

    pub async fn get_post(&self, post_id: PostId) -> Result<Post, ErrorInfo> {
        self.get(&format!("posts/{}", post_id)).await
    }

    pub async fn remove_post(&self, post_id: PostId) -> Result<ApiResponse, ErrorInfo> {
        self.delete(&format!("posts/{}", post_id)).await
    }

    pub async fn like_post(&self, post_id: PostId) -> Result<LikeResponse, ErrorInfo> {
        self.post(&format!("posts/{}/like", post_id), json!({})).await
    }

    pub async fn unlike_post(&self, post_id: PostId) -> Result<LikeResponse, ErrorInfo> {
        self.delete(&format!("posts/{}/like", post_id)).await
    }

    pub async fn is_liked_by_viewer(&self, post_id: PostId) -> Result<bool, ErrorInfo> {
        let response: ApiResponse = self.get(&format!("posts/{}/status", post_id)).await?;
        Ok(response.success)
    }

    pub async fn add_comment(
        &self,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentResponse, ErrorInfo> {
        let url = format!("posts/{}/comment", post_id);
        self.post(&url, json!({ "content": content })).await
    }

    pub async fn remove_comment(
        &self,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<CommentResponse, ErrorInfo> {
        self.delete(&format!("posts/{}/comment/{}", post_id, comment_id))
            .await
    }

    //===================================================
    // Users
    //===================================================

    pub async fn fetch_profile(&self) -> Result<User, ErrorInfo> {
        self.get("users/me").await
    }

    pub async fn get_user(&self, username: &str) -> Result<User, ErrorInfo> {
        self.get(&format!("users/{}", urlencoding::encode(username)))
            .await
    }

    pub async fn search_users(&self, username: &str) -> Result<Vec<User>, ErrorInfo> {
        let url = format!("users/search?username={}", urlencoding::encode(username));
        self.get(&url).await
    }

    //===================================================
    // Follows
    //===================================================

    pub async fn follower_count(&self, user_id: UserId) -> Result<u32, ErrorInfo> {
        let response: FollowerCountResponse =
            self.get(&format!("follows/followers/count/{}", user_id)).await?;
        Ok(response.follower_count)
    }

    pub async fn following_count(&self, user_id: UserId) -> Result<u32, ErrorInfo> {
        let response: FollowingCountResponse =
            self.get(&format!("follows/following/count/{}", user_id)).await?;
        Ok(response.following_count)
    }

    pub async fn follow_user(&self, target: UserId) -> Result<ApiResponse, ErrorInfo> {
        self.post(&format!("follows/{}", target), json!({})).await
    }

    pub async fn unfollow_user(&self, target: UserId) -> Result<ApiResponse, ErrorInfo> {
        self.delete(&format!("follows/{}", target)).await
    }

    pub async fn follow_status(&self, user_id: UserId) -> Result<FollowStatusResponse, ErrorInfo> {
        self.get(&format!("follows/status/{}", user_id)).await
    }

    pub async fn followers(&self, user_id: UserId) -> Result<FollowersResponse, ErrorInfo> {
        self.get(&format!("follows/user/{}/followers", user_id)).await
    }

    pub async fn following(&self, user_id: UserId) -> Result<FollowingResponse, ErrorInfo> {
        self.get(&format!("follows/user/{}/following", user_id)).await
    }
}
