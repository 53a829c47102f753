use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};

use crate::{
    api::{SocialApi, Transport},
    error::ErrorInfo,
    feed::FeedLoader,
    mutation::MutationCoordinator,
    notify::{NotificationKind, NotificationSink},
    store::PostCollection,
    viewer::SessionViewer,
};

type Route = (Result<Value, ErrorInfo>, Duration);

/// Scripted transport: answers by method and path, records every call.
/// Unscripted routes fail with 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), Route>>,
    calls: Mutex<Vec<(Method, String, Option<Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn route(&self, method: Method, path: &str, reply: Result<Value, ErrorInfo>, delay: Duration) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (reply, delay));
    }

    pub fn reply(&self, method: Method, path: &str, body: Value) {
        self.route(method, path, Ok(body), Duration::ZERO);
    }

    pub fn reply_after(&self, method: Method, path: &str, body: Value, delay: Duration) {
        self.route(method, path, Ok(body), delay);
    }

    pub fn fail(&self, method: Method, path: &str, error: ErrorInfo) {
        self.route(method, path, Err(error), Duration::ZERO);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, p, _)| *m == method && p == path)
            .count()
    }

    pub fn last_body(&self, method: Method, path: &str) -> Option<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(m, p, _)| *m == method && p == path)
            .and_then(|(_, _, body)| body.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ErrorInfo> {
        self.calls
            .lock()
            .unwrap()
            .push((method.clone(), path.to_string(), body));

        let route = self
            .routes
            .lock()
            .unwrap()
            .get(&(method, path.to_string()))
            .cloned();

        match route {
            Some((reply, delay)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                reply
            }
            None => Err(ErrorInfo::new(404, format!("no route for {}", path))),
        }
    }
}

#[derive(Default)]
pub struct RecordingNotifier(Mutex<Vec<(NotificationKind, String)>>);

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotificationKind, String)> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.0.lock().unwrap().iter().filter(|(k, _)| *k == kind).count()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.0.lock().unwrap().push((kind, message.to_string()));
    }
}

pub mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::social::{Comment, Post, UserSummary};

    pub fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|date| date.and_hms_opt(12, minute, 0))
            .unwrap()
    }

    pub fn user(name: &str) -> UserSummary {
        UserSummary {
            id: name.bytes().map(u64::from).sum(),
            user_name: name.to_string(),
            profile_image_url: None,
        }
    }

    pub fn post(id: u64, author: &str) -> Post {
        Post {
            id,
            author_summary: user(author),
            caption: format!("post {}", id),
            image_url: format!("https://img.example/{}.jpg", id),
            created_at: at(0),
            like_count: 0,
            is_liked: None,
            is_own_post: None,
            comments: vec![],
        }
    }

    pub fn comment(id: u64, author: &str, minute: u32) -> Comment {
        Comment {
            id,
            post_id: None,
            content: format!("comment {}", id),
            created_at: at(minute),
            author_summary: user(author),
            is_own_comment: None,
        }
    }
}

//===================================================
// Scenarios
//===================================================

fn session(transport: &Arc<MockTransport>, notifier: &Arc<RecordingNotifier>) -> (FeedLoader, MutationCoordinator) {
    let api = SocialApi::new(transport.clone());
    let viewer = Arc::new(SessionViewer::new(Some("cy".to_string())));
    (
        FeedLoader::new(api.clone(), viewer.clone()),
        MutationCoordinator::new(api, viewer, notifier.clone()),
    )
}

#[tokio::test]
async fn feed_reconciliation_fails_open_per_post() {
    let transport = Arc::new(MockTransport::new());
    let mut first = fixtures::post(10, "ana");
    first.like_count = 3;
    let mut second = fixtures::post(11, "bo");
    second.like_count = 7;
    transport.reply(
        Method::GET,
        "posts/feed?page=0&size=20",
        json!({ "content": [first, second] }),
    );
    transport.fail(Method::GET, "posts/10/status", ErrorInfo::new(0, "timeout"));
    transport.reply(Method::GET, "posts/11/status", json!({ "success": true }));

    let notifier = Arc::new(RecordingNotifier::default());
    let (loader, _) = session(&transport, &notifier);
    let mut feed = PostCollection::new("feed");

    let posts = loader.load_feed(&feed.handle(), 0, 20).await.unwrap().unwrap();
    feed.replace_all(posts);

    let ids: Vec<_> = feed.posts().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert_eq!(feed.get(10).unwrap().is_liked, Some(false));
    assert_eq!(feed.get(11).unwrap().is_liked, Some(true));
    assert_eq!(feed.get(10).unwrap().like_count, 3);
    assert_eq!(feed.get(11).unwrap().like_count, 7);
    // absorbed probe failures are not user-facing
    assert!(notifier.messages().is_empty());
}

#[tokio::test]
async fn comment_add_keeps_local_state_and_orders_newest_first() {
    let transport = Arc::new(MockTransport::new());

    let mut held = fixtures::post(10, "ana");
    held.is_liked = Some(true);
    held.is_own_post = Some(false);
    held.like_count = 5;
    let mut existing = fixtures::comment(1, "bo", 1);
    existing.is_own_comment = Some(false);
    held.comments = vec![existing];

    let mut details = fixtures::post(10, "ana");
    details.like_count = 5;
    let mut reply = fixtures::comment(2, "cy", 2);
    reply.content = "hi".to_string();
    details.comments = vec![fixtures::comment(1, "bo", 1), reply];
    transport.reply(
        Method::POST,
        "posts/10/comment",
        json!({ "postId": 10, "commentCount": 2, "postDetails": details }),
    );

    let notifier = Arc::new(RecordingNotifier::default());
    let (_, coordinator) = session(&transport, &notifier);
    let mut feed = PostCollection::new("feed");
    feed.replace_all(vec![held.clone()]);
    let mut events = coordinator.subscribe();

    let updated = coordinator.add_comment(&held, "hi").await.unwrap();

    assert_eq!(
        transport.last_body(Method::POST, "posts/10/comment"),
        Some(json!({ "content": "hi" }))
    );
    assert_eq!(updated.is_liked, Some(true));
    assert_eq!(updated.like_count, 5);
    let ids: Vec<_> = updated.comments.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![2, 1]);
    assert_eq!(updated.comments[0].is_own_comment, Some(true));
    assert_eq!(updated.comments[1].is_own_comment, Some(false));

    feed.apply(&events.try_recv().unwrap());
    assert_eq!(feed.get(10), Some(&updated));
}

#[tokio::test]
async fn deleted_post_leaves_every_view() {
    let transport = Arc::new(MockTransport::new());
    transport.reply(Method::DELETE, "posts/10", json!({ "success": true, "message": "ok" }));

    let notifier = Arc::new(RecordingNotifier::default());
    let (_, coordinator) = session(&transport, &notifier);

    let mut feed = PostCollection::new("feed");
    feed.replace_all(vec![fixtures::post(10, "cy"), fixtures::post(11, "ana")]);
    let mut profile = PostCollection::new("profile");
    profile.replace_all(vec![fixtures::post(10, "cy")]);
    let mut detail = PostCollection::new("detail");
    detail.replace_all(feed.clone_for_detail(10).into_iter().collect());

    let mut receivers = vec![
        coordinator.subscribe(),
        coordinator.subscribe(),
        coordinator.subscribe(),
    ];
    coordinator.delete_post(10).await.unwrap();

    for (view, events) in [&mut feed, &mut profile, &mut detail]
        .into_iter()
        .zip(receivers.iter_mut())
    {
        view.apply(&events.try_recv().unwrap());
        assert!(view.get(10).is_none(), "{} still holds the post", view.name());
    }
    assert_eq!(feed.len(), 1);
    assert_eq!(
        notifier.messages(),
        vec![(NotificationKind::Success, "Post deleted successfully".to_string())]
    );
}

#[tokio::test]
async fn slow_refresh_does_not_undo_a_like() {
    let transport = Arc::new(MockTransport::new());
    transport.reply(
        Method::POST,
        "posts/10/like",
        json!({ "postId": 10, "likeCount": 1 }),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let (_, coordinator) = session(&transport, &notifier);

    let mut feed = PostCollection::new("feed");
    feed.replace_all(vec![fixtures::post(10, "ana")]);
    let mut events = coordinator.subscribe();

    let held = feed.clone_for_detail(10).unwrap();
    coordinator.toggle_like(&held).await.unwrap();
    feed.apply(&events.try_recv().unwrap());

    // refresh issued before the like, arriving after it
    let mut refresh = fixtures::post(10, "ana");
    refresh.caption = "edited".to_string();
    refresh.like_count = 2;
    assert!(feed.absorb_refresh(refresh, Some("cy")));

    let post = feed.get(10).unwrap();
    assert_eq!(post.is_liked, Some(true));
    assert_eq!(post.caption, "edited");
    assert_eq!(post.like_count, 2);
}

#[tokio::test]
async fn torn_down_listener_does_not_block_commits() {
    let transport = Arc::new(MockTransport::new());
    transport.reply(Method::DELETE, "posts/10", json!({ "success": true }));
    let notifier = Arc::new(RecordingNotifier::default());
    let (_, coordinator) = session(&transport, &notifier);

    drop(coordinator.subscribe());
    assert!(coordinator.delete_post(10).await.is_ok());
    assert!(!matches!(
        notifier.messages().first(),
        Some((NotificationKind::Error, _))
    ));
}

#[tokio::test]
async fn like_from_stale_detail_copy_keeps_newer_feed_content() {
    let transport = Arc::new(MockTransport::new());
    transport.reply(
        Method::POST,
        "posts/10/like",
        json!({ "postId": 10, "likeCount": 1 }),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let (_, coordinator) = session(&transport, &notifier);

    let mut feed = PostCollection::new("feed");
    feed.replace_all(vec![fixtures::post(10, "ana")]);
    let detail = feed.clone_for_detail(10).unwrap();

    let mut refresh = fixtures::post(10, "ana");
    refresh.caption = "edited".to_string();
    refresh.comments = vec![fixtures::comment(1, "bo", 1)];
    assert!(feed.absorb_refresh(refresh, Some("cy")));

    let mut events = coordinator.subscribe();
    coordinator.toggle_like(&detail).await.unwrap();
    feed.apply(&events.try_recv().unwrap());

    let post = feed.get(10).unwrap();
    assert_eq!(post.caption, "edited");
    assert_eq!(post.comments.len(), 1);
    assert_eq!(post.is_liked, Some(true));
    assert_eq!(post.like_count, 1);
}

#[tokio::test]
async fn repeated_post_in_feed_page_still_loads() {
    let transport = Arc::new(MockTransport::new());
    transport.reply(
        Method::GET,
        "posts/feed?page=0&size=20",
        json!({ "content": [fixtures::post(10, "ana"), fixtures::post(11, "bo"), fixtures::post(10, "ana")] }),
    );
    transport.reply(Method::GET, "posts/10/status", json!({ "success": true }));
    transport.reply(Method::GET, "posts/11/status", json!({ "success": false }));

    let notifier = Arc::new(RecordingNotifier::default());
    let (loader, _) = session(&transport, &notifier);
    let mut feed = PostCollection::new("feed");

    let posts = loader.load_feed(&feed.handle(), 0, 20).await.unwrap().unwrap();
    feed.replace_all(posts);

    let ids: Vec<_> = feed.posts().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![10, 11]);
    assert_eq!(feed.get(10).unwrap().is_liked, Some(true));
    assert_eq!(transport.calls_to(Method::GET, "posts/10/status"), 1);
}
