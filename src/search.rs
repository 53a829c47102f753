use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use log::debug;
use tokio::{
    sync::{mpsc, watch},
    task::{JoinHandle, JoinSet},
    time::{sleep, Instant},
};

use crate::{
    api::SocialApi,
    error::ErrorInfo,
    social::{User, UserSummary},
};

pub const USER_SEARCH_WINDOW: Duration = Duration::from_millis(300);
pub const FOLLOW_FILTER_WINDOW: Duration = Duration::from_millis(200);

/// Source of search results for a settled query.
#[async_trait]
pub trait Lookup: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    async fn lookup(&self, query: &str) -> Result<Vec<Self::Item>, ErrorInfo>;

    /// Results for a blank query, produced without calling [`lookup`](Self::lookup).
    fn blank(&self) -> Vec<Self::Item> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState<T> {
    Idle,
    Loading { query: String },
    Ready { query: String, results: Vec<T> },
    Failed { query: String, error: ErrorInfo },
}

impl<T> SearchState<T> {
    pub fn results(&self) -> &[T] {
        match self {
            SearchState::Ready { results, .. } => results,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SearchState::Loading { .. })
    }
}

type Completion<T> = (u64, String, Result<Vec<T>, ErrorInfo>);

/// Debounced, latest-wins query pipeline.
///
/// Queries pushed within `window` of each other collapse into the last one. A settled
/// query equal to the previous settled query is skipped, blank queries never reach the
/// lookup, and superseded lookups are cancelled. Dropping the debouncer stops it along
/// with any lookup still in flight.
pub struct SearchDebouncer<L: Lookup> {
    queries: mpsc::UnboundedSender<String>,
    state: watch::Receiver<SearchState<L::Item>>,
    driver: JoinHandle<()>,
}

impl<L: Lookup> SearchDebouncer<L> {
    /// Must be called within a tokio runtime.
    pub fn new(lookup: L, window: Duration) -> Self {
        let (queries, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(SearchState::Idle);
        let driver = tokio::spawn(drive(Arc::new(lookup), window, rx, state_tx));
        Self {
            queries,
            state,
            driver,
        }
    }

    pub fn push(&self, query: impl Into<String>) {
        // the driver only stops when self is dropped
        let _ = self.queries.send(query.into());
    }

    pub fn state(&self) -> SearchState<L::Item> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState<L::Item>> {
        self.state.clone()
    }
}

impl<L: Lookup> Drop for SearchDebouncer<L> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive<L: Lookup>(
    lookup: Arc<L>,
    window: Duration,
    mut queries: mpsc::UnboundedReceiver<String>,
    state: watch::Sender<SearchState<L::Item>>,
) {
    // dropped together with the driver, which cancels whatever is still running
    let mut inflight: JoinSet<Completion<L::Item>> = JoinSet::new();
    let deadline = sleep(window);
    tokio::pin!(deadline);

    let mut waiting: Option<String> = None;
    let mut last_settled: Option<String> = None;
    let mut generation: u64 = 0;

    loop {
        tokio::select! {
            query = queries.recv() => {
                let Some(query) = query else { break };
                waiting = Some(query);
                deadline.as_mut().reset(Instant::now() + window);
            }
            () = &mut deadline, if waiting.is_some() => {
                let Some(query) = waiting.take() else { continue };
                if last_settled.as_deref() == Some(query.as_str()) {
                    debug!("search {:?} unchanged, skipping", query);
                    continue;
                }
                last_settled = Some(query.clone());
                generation += 1;
                inflight.abort_all();

                if query.trim().is_empty() {
                    state.send_replace(SearchState::Ready { query, results: lookup.blank() });
                    continue;
                }

                debug!("search {:?} (generation {})", query, generation);
                state.send_replace(SearchState::Loading { query: query.clone() });

                let lookup = lookup.clone();
                let issued = generation;
                inflight.spawn(async move {
                    let result = lookup.lookup(&query).await;
                    (issued, query, result)
                });
            }
            Some(joined) = inflight.join_next(), if !inflight.is_empty() => {
                // aborted lookups end here with a cancelled join error
                let Ok((issued, query, result)) = joined else { continue };
                if issued != generation {
                    debug!("discarding stale search {:?} (generation {} < {})", query, issued, generation);
                    continue;
                }
                let next = match result {
                    Ok(results) => SearchState::Ready { query, results },
                    Err(error) => SearchState::Failed { query, error },
                };
                state.send_replace(next);
            }
        }
    }
}

/// Remote username search.
#[derive(Clone)]
pub struct UserSearch {
    api: SocialApi,
}

impl UserSearch {
    pub fn new(api: SocialApi) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Lookup for UserSearch {
    type Item = User;

    async fn lookup(&self, query: &str) -> Result<Vec<User>, ErrorInfo> {
        self.api.search_users(query.trim()).await
    }
}

/// Case-insensitive username filter over an already loaded follower/following list.
///
/// A blank query shows the whole list.
#[derive(Debug, Clone)]
pub struct LocalFilter {
    users: Arc<Vec<UserSummary>>,
}

impl LocalFilter {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self {
            users: Arc::new(users),
        }
    }

    pub fn filter(&self, query: &str) -> Vec<UserSummary> {
        let needle = query.trim().to_lowercase();
        self.users
            .iter()
            .filter(|user| user.user_name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Lookup for LocalFilter {
    type Item = UserSummary;

    async fn lookup(&self, query: &str) -> Result<Vec<UserSummary>, ErrorInfo> {
        Ok(self.filter(query))
    }

    fn blank(&self) -> Vec<UserSummary> {
        self.users.as_ref().clone()
    }
}
