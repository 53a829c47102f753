use crate::social::{Post, UserSummary};

#[macro_export]
macro_rules! step {
  ($name:expr, $($tail:tt)*) => {
    {
      log::info!("* {}", $name);
      let now = std::time::Instant::now();
      let value = $($tail)*;
      log::debug!("Done  `{}` ({} ms)", $name, now.elapsed().as_millis());
      value
    }
  };
}

pub fn display_posts(posts: &[Post]) {
    if !log::log_enabled!(log::Level::Info) {
        return;
    }
    for post in posts {
        display_post(post, false);
    }
}

pub fn display_post(post: &Post, with_comments: bool) {
    let liked = if post.liked() { "♥" } else { "♡" };
    let own = if post.is_own_post == Some(true) { " (yours)" } else { "" };
    log::info!(
        "[{}] @{}{} {} {} {}",
        post.id,
        post.author_summary.user_name,
        own,
        liked,
        post.like_count,
        post.caption
    );
    log::info!("      {} · {} comments", post.created_at.format("%Y-%m-%d %H:%M"), post.comments.len());
    if with_comments {
        for comment in &post.comments {
            let own = if comment.is_own_comment == Some(true) { "*" } else { " " };
            log::info!("   {} #{} @{}: {}", own, comment.id, comment.author_summary.user_name, comment.content);
        }
    }
}

pub fn display_users<'a>(users: impl IntoIterator<Item = &'a UserSummary>) {
    let mut count = 0;
    for user in users {
        count += 1;
        log::info!(" + {} ({})", user.user_name, user.id);
    }
    log::info!("{} users", count);
}
