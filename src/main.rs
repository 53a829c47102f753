use std::{error::Error, process::ExitCode, sync::Arc, time::Duration};

use log::info;
use social_mirror::{
    api::{social::DEFAULT_PAGE_SIZE, HttpTransport, SocialApi},
    config::{Command, Config},
    feed::FeedLoader,
    mutation::MutationCoordinator,
    notify::LogNotifier,
    search::{
        Lookup, LocalFilter, SearchDebouncer, SearchState, UserSearch, FOLLOW_FILTER_WINDOW,
        USER_SEARCH_WINDOW,
    },
    social::{validate_content, UserSummary},
    step,
    store::PostCollection,
    utils::{display_post, display_posts, display_users},
    viewer::SessionViewer,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let config = Config::parse();
    config.init_logger();

    let api = SocialApi::new(Arc::new(HttpTransport::new(&config)?));
    let viewer = Arc::new(SessionViewer::new(config.username()));
    let loader = FeedLoader::new(api.clone(), viewer.clone());
    let coordinator = MutationCoordinator::new(api.clone(), viewer, Arc::new(LogNotifier));

    // mutation failures are already reported through the notifier
    let committed = match config.command.clone() {
        Command::Feed { page } => {
            let mut feed = PostCollection::new("feed");
            let posts = step!(
                "Loading feed",
                loader.load_feed(&feed.handle(), page, DEFAULT_PAGE_SIZE).await?
            );
            feed.replace_all(posts.unwrap_or_default());
            display_posts(feed.posts());
            true
        }
        Command::Profile { username } => {
            let profile = step!("Loading profile", loader.load_profile(Some(&username)).await?);
            info!("@{} ({})", profile.user.user_name, profile.user.id);
            if let Some(biography) = &profile.user.biography {
                info!("{}", biography);
            }
            info!(
                "{} followers, {} following{}",
                profile.follower_count,
                profile.following_count,
                if profile.is_following { ", followed by you" } else { "" }
            );

            let mut listing = PostCollection::new("profile");
            let posts = step!(
                "Loading posts",
                loader
                    .load_user_posts(&listing.handle(), &profile.user.user_name, 0, DEFAULT_PAGE_SIZE)
                    .await?
            );
            listing.replace_all(posts.unwrap_or_default());
            info!("{} posts", listing.len());
            display_posts(listing.posts());
            true
        }
        Command::Post { id } => {
            let post = loader.load_post(id).await?;
            display_post(&post, true);
            true
        }
        Command::Like { id, verify } => {
            let post = loader.load_post(id).await?;
            let result = if verify {
                coordinator.toggle_like_verified(&post).await
            } else {
                coordinator.toggle_like(&post).await
            };
            result.map(|post| display_post(&post, false)).is_ok()
        }
        Command::Comment { id, content } => {
            validate_content(&content)?;
            let post = loader.load_post(id).await?;
            coordinator
                .add_comment(&post, &content)
                .await
                .map(|post| display_post(&post, true))
                .is_ok()
        }
        Command::Uncomment { id, comment_id } => {
            let post = loader.load_post(id).await?;
            coordinator
                .remove_comment(&post, comment_id)
                .await
                .map(|post| display_post(&post, true))
                .is_ok()
        }
        Command::Delete { id } => coordinator.delete_post(id).await.is_ok(),
        Command::Follow { username } | Command::Unfollow { username } => {
            let follow = matches!(config.command, Command::Follow { .. });
            let user = api.get_user(&username).await?;
            match coordinator.set_following(user.id, follow).await {
                Ok(true) => info!("Following @{}", user.user_name),
                Ok(false) => info!("Unfollowed @{}", user.user_name),
                Err(_) => return Ok(ExitCode::FAILURE),
            }
            true
        }
        Command::Search => {
            let window = config.debounce(USER_SEARCH_WINDOW);
            let search = SearchDebouncer::new(UserSearch::new(api.clone()), window);
            run_search(&search, window, |users| {
                display_users(&users.iter().cloned().map(UserSummary::from).collect::<Vec<_>>())
            })
            .await?;
            true
        }
        Command::Followers { username, following } => {
            let profile = loader.load_profile(Some(&username)).await?;
            let users = if following {
                profile.following
            } else {
                profile.followers
            };
            let window = config.debounce(FOLLOW_FILTER_WINDOW);
            let search = SearchDebouncer::new(LocalFilter::new(users.clone()), window);
            display_users(&users);
            run_search(&search, window, |users| display_users(users)).await?;
            true
        }
    };

    Ok(if committed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Feeds stdin lines into `search` and prints every settled result set.
async fn run_search<L: Lookup>(
    search: &SearchDebouncer<L>,
    window: Duration,
    show: impl Fn(&[L::Item]),
) -> Result<(), Box<dyn Error>> {
    let mut states = search.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut open = true;

    while open {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => search.push(line),
                None => open = false,
            },
            changed = states.changed() => {
                changed?;
                let state = states.borrow_and_update().clone();
                report(&state, &show);
            }
        }
    }

    // let the last query settle
    tokio::time::sleep(window).await;
    while states.borrow().is_loading() || states.has_changed()? {
        states.changed().await?;
        let state = states.borrow_and_update().clone();
        report(&state, &show);
    }
    Ok(())
}

fn report<T>(state: &SearchState<T>, show: &impl Fn(&[T])) {
    match state {
        SearchState::Idle => {}
        SearchState::Loading { query } => info!("Searching {:?}...", query),
        SearchState::Ready { query, results } => {
            info!("Results for {:?}:", query);
            show(results);
        }
        SearchState::Failed { query, error } => info!("Search for {:?} failed: {}", query, error),
    }
}
